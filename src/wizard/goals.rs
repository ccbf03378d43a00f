//! Goal selection operations.
//!
//! The priority invariant: among selected goals, priorities are always a
//! permutation of `1..=k` for `k` selected goals. Every operation here
//! preserves that invariant — selection appends at the end of the order,
//! deselection compacts the remaining priorities, and reassigning a goal
//! onto an occupied priority swaps the two goals' priorities.

use thiserror::Error;
use tracing::debug;

use super::state::{GoalSelection, SelectedGoal};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GoalError {
    #[error("goal '{goal_id}' is not selected")]
    UnknownGoal { goal_id: String },
    #[error("priority {priority} is out of range for {selected} selected goal(s)")]
    PriorityOutOfRange { priority: u8, selected: usize },
}

impl GoalSelection {
    /// Select a goal, appending it at the lowest priority. Selecting an
    /// already-selected goal is a no-op.
    pub fn select(&mut self, goal_id: &str) {
        if self.is_selected(goal_id) {
            return;
        }
        let priority = self.selected.len() as u8 + 1;
        self.selected.push(SelectedGoal {
            goal_id: goal_id.to_string(),
            priority,
            setup_now: true,
        });
        debug!(goal_id, priority, "goal selected");
    }

    /// Deselect a goal and compact the remaining priorities so they stay
    /// contiguous from 1, preserving relative order. Unknown ids are a
    /// no-op.
    pub fn deselect(&mut self, goal_id: &str) {
        let before = self.selected.len();
        self.selected.retain(|g| g.goal_id != goal_id);
        if self.selected.len() == before {
            return;
        }
        self.selected.sort_by_key(|g| g.priority);
        for (index, goal) in self.selected.iter_mut().enumerate() {
            goal.priority = index as u8 + 1;
        }
        debug!(goal_id, remaining = self.selected.len(), "goal deselected");
    }

    /// Move a goal to the given priority. If another goal already holds
    /// that priority, the two goals exchange priorities (classic
    /// two-element swap), so the permutation invariant is preserved.
    pub fn set_priority(&mut self, goal_id: &str, priority: u8) -> Result<(), GoalError> {
        let count = self.selected.len();
        if priority == 0 || priority as usize > count {
            return Err(GoalError::PriorityOutOfRange { priority, selected: count });
        }
        let mover = self
            .selected
            .iter()
            .position(|g| g.goal_id == goal_id)
            .ok_or_else(|| GoalError::UnknownGoal { goal_id: goal_id.to_string() })?;

        let old_priority = self.selected[mover].priority;
        if old_priority == priority {
            return Ok(());
        }
        if let Some(holder) = self.selected.iter().position(|g| g.priority == priority) {
            self.selected[holder].priority = old_priority;
        }
        self.selected[mover].priority = priority;
        debug!(goal_id, from = old_priority, to = priority, "goal priority swapped");
        Ok(())
    }

    /// Toggle whether a goal should be set up immediately after onboarding.
    pub fn set_setup_now(&mut self, goal_id: &str, setup_now: bool) -> Result<(), GoalError> {
        let goal = self
            .selected
            .iter_mut()
            .find(|g| g.goal_id == goal_id)
            .ok_or_else(|| GoalError::UnknownGoal { goal_id: goal_id.to_string() })?;
        goal.setup_now = setup_now;
        Ok(())
    }

    pub fn is_selected(&self, goal_id: &str) -> bool {
        self.selected.iter().any(|g| g.goal_id == goal_id)
    }

    /// Selected goal ids in priority order.
    pub fn ids_by_priority(&self) -> Vec<String> {
        let mut ordered: Vec<&SelectedGoal> = self.selected.iter().collect();
        ordered.sort_by_key(|g| g.priority);
        ordered.iter().map(|g| g.goal_id.clone()).collect()
    }

    /// Whether the priorities form a permutation of `1..=k`.
    pub fn priorities_valid(&self) -> bool {
        let mut priorities: Vec<u8> = self.selected.iter().map(|g| g.priority).collect();
        priorities.sort_unstable();
        priorities
            .iter()
            .enumerate()
            .all(|(index, &p)| p as usize == index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection_of(ids: &[&str]) -> GoalSelection {
        let mut selection = GoalSelection::default();
        for id in ids {
            selection.select(id);
        }
        selection
    }

    #[test]
    fn test_select_appends_contiguous_priorities() {
        let selection = selection_of(&["instagram", "crm", "courses"]);
        assert_eq!(selection.ids_by_priority(), vec!["instagram", "crm", "courses"]);
        assert!(selection.priorities_valid());
    }

    #[test]
    fn test_reselect_is_noop() {
        let mut selection = selection_of(&["instagram"]);
        selection.select("instagram");
        assert_eq!(selection.selected.len(), 1);
    }

    #[test]
    fn test_deselect_compacts_priorities() {
        let mut selection = selection_of(&["instagram", "crm", "courses"]);
        selection.deselect("crm");
        assert_eq!(selection.ids_by_priority(), vec!["instagram", "courses"]);
        assert!(selection.priorities_valid());
    }

    #[test]
    fn test_set_priority_swaps_with_holder() {
        let mut selection = selection_of(&["instagram", "crm", "courses"]);
        selection.set_priority("courses", 1).unwrap();
        assert_eq!(selection.ids_by_priority(), vec!["courses", "crm", "instagram"]);
        assert!(selection.priorities_valid());
    }

    #[test]
    fn test_set_priority_to_own_value_is_noop() {
        let mut selection = selection_of(&["instagram", "crm"]);
        selection.set_priority("crm", 2).unwrap();
        assert_eq!(selection.ids_by_priority(), vec!["instagram", "crm"]);
    }

    #[test]
    fn test_set_priority_rejects_out_of_range() {
        let mut selection = selection_of(&["instagram", "crm"]);
        assert_eq!(
            selection.set_priority("crm", 3),
            Err(GoalError::PriorityOutOfRange { priority: 3, selected: 2 })
        );
        assert_eq!(
            selection.set_priority("crm", 0),
            Err(GoalError::PriorityOutOfRange { priority: 0, selected: 2 })
        );
    }

    #[test]
    fn test_set_priority_rejects_unknown_goal() {
        let mut selection = selection_of(&["instagram"]);
        assert!(matches!(
            selection.set_priority("storefront", 1),
            Err(GoalError::UnknownGoal { .. })
        ));
    }

    #[test]
    fn test_setup_now_toggle() {
        let mut selection = selection_of(&["instagram"]);
        selection.set_setup_now("instagram", false).unwrap();
        assert!(!selection.selected[0].setup_now);
    }
}
