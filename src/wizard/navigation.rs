//! Step navigation primitives.
//!
//! This is a linear wizard, not a state graph: a bounded integer pointer
//! plus a set of completed steps. Skippable steps (team, branding) are the
//! same step accepting an empty payload, not alternate states. These are
//! the reducer-level primitives; they do not re-check validation — gating
//! the forward action on `can_proceed` is the caller's responsibility
//! (see `WizardSession::try_advance`).

use tracing::debug;

use super::state::{WizardState, TOTAL_STEPS};

impl WizardState {
    /// Jump directly to a step. Out-of-range targets are silently ignored,
    /// not an error.
    pub fn go_to_step(&mut self, step: u8) {
        if !(1..=TOTAL_STEPS).contains(&step) {
            debug!(step, "ignoring out-of-range step jump");
            return;
        }
        self.current_step = step;
    }

    /// Mark the current step completed and advance. No-op on the last step.
    /// The completion mark and the pointer increment are one transition:
    /// callers never observe one without the other.
    pub fn next_step(&mut self) {
        if self.current_step >= TOTAL_STEPS {
            return;
        }
        self.completed_steps.insert(self.current_step);
        self.current_step += 1;
        debug!(step = self.current_step, "advanced to next step");
    }

    /// Step back one step. No-op on the first step. Never removes entries
    /// from `completed_steps`.
    pub fn previous_step(&mut self) {
        if self.current_step <= 1 {
            return;
        }
        self.current_step -= 1;
        debug!(step = self.current_step, "stepped back");
    }

    /// Whether a step may be navigated to: the first step, a step whose
    /// predecessor is completed, or any step at or before the current one.
    pub fn is_step_reachable(&self, step: u8) -> bool {
        if !(1..=TOTAL_STEPS).contains(&step) {
            return false;
        }
        step == 1 || self.completed_steps.contains(&(step - 1)) || step <= self.current_step
    }

    /// Position in the flow as a rounded percentage.
    pub fn progress_percentage(&self) -> u8 {
        ((self.current_step as f64 / TOTAL_STEPS as f64) * 100.0).round() as u8
    }
}

#[cfg(test)]
mod tests {
    use crate::wizard::state::{WizardState, TOTAL_STEPS};

    #[test]
    fn test_go_to_step_ignores_out_of_range() {
        let mut state = WizardState::default();
        state.go_to_step(0);
        assert_eq!(state.current_step, 1);
        state.go_to_step(7);
        assert_eq!(state.current_step, 1);
        state.go_to_step(4);
        assert_eq!(state.current_step, 4);
    }

    #[test]
    fn test_next_step_marks_completed_and_advances() {
        let mut state = WizardState::default();
        state.next_step();
        assert_eq!(state.current_step, 2);
        assert!(state.completed_steps.contains(&1));
    }

    #[test]
    fn test_next_step_is_noop_on_last_step() {
        let mut state = WizardState::default();
        state.go_to_step(TOTAL_STEPS);
        state.next_step();
        assert_eq!(state.current_step, TOTAL_STEPS);
        assert!(!state.completed_steps.contains(&TOTAL_STEPS));
    }

    #[test]
    fn test_previous_step_keeps_completion() {
        let mut state = WizardState::default();
        state.next_step();
        state.next_step();
        state.previous_step();
        assert_eq!(state.current_step, 2);
        assert!(state.completed_steps.contains(&1));
        assert!(state.completed_steps.contains(&2));
    }

    #[test]
    fn test_previous_step_is_noop_on_first_step() {
        let mut state = WizardState::default();
        state.previous_step();
        assert_eq!(state.current_step, 1);
    }

    #[test]
    fn test_reachability_rule() {
        let mut state = WizardState::default();
        assert!(state.is_step_reachable(1));
        assert!(!state.is_step_reachable(3));

        state.next_step(); // completes 1, now on 2
        assert!(state.is_step_reachable(2));
        assert!(!state.is_step_reachable(4));
        // already-passed steps stay reachable
        assert!(state.is_step_reachable(1));
    }

    #[test]
    fn test_progress_percentage_rounds() {
        let mut state = WizardState::default();
        assert_eq!(state.progress_percentage(), 17); // 1/6 = 16.7%
        state.go_to_step(3);
        assert_eq!(state.progress_percentage(), 50);
        state.go_to_step(6);
        assert_eq!(state.progress_percentage(), 100);
    }
}
