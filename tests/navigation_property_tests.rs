// Property-Based Testing for Wizard Navigation
// Navigation invariants must hold under every sequence of operations:
// the step pointer stays in bounds and completed steps are never removed.

use launchpad::{WizardState, TOTAL_STEPS};
use proptest::prelude::*;
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
enum NavOp {
    Next,
    Previous,
    GoTo(u8),
}

fn nav_op_strategy() -> impl Strategy<Value = NavOp> {
    prop_oneof![
        Just(NavOp::Next),
        Just(NavOp::Previous),
        // deliberately includes out-of-range targets
        (0u8..=9).prop_map(NavOp::GoTo),
    ]
}

fn apply(state: &mut WizardState, op: &NavOp) {
    match op {
        NavOp::Next => state.next_step(),
        NavOp::Previous => state.previous_step(),
        NavOp::GoTo(step) => state.go_to_step(*step),
    }
}

proptest! {
    /// The step pointer never leaves [1, TOTAL_STEPS], whatever the caller does.
    #[test]
    fn prop_current_step_stays_in_bounds(
        ops in prop::collection::vec(nav_op_strategy(), 0..64)
    ) {
        let mut state = WizardState::default();
        for op in &ops {
            apply(&mut state, op);
            prop_assert!((1..=TOTAL_STEPS).contains(&state.current_step));
        }
    }

    /// Once a step is completed it stays completed; no navigation removes it.
    #[test]
    fn prop_completed_steps_grow_monotonically(
        ops in prop::collection::vec(nav_op_strategy(), 0..64)
    ) {
        let mut state = WizardState::default();
        let mut previously_completed: BTreeSet<u8> = BTreeSet::new();
        for op in &ops {
            apply(&mut state, op);
            prop_assert!(
                state.completed_steps.is_superset(&previously_completed),
                "completed steps shrank after {:?}: {:?} -> {:?}",
                op,
                previously_completed,
                state.completed_steps
            );
            previously_completed = state.completed_steps.clone();
        }
    }

    /// Completed steps are always valid step indices.
    #[test]
    fn prop_completed_steps_are_valid_indices(
        ops in prop::collection::vec(nav_op_strategy(), 0..64)
    ) {
        let mut state = WizardState::default();
        for op in &ops {
            apply(&mut state, op);
        }
        prop_assert!(state.completed_steps.iter().all(|s| (1..=TOTAL_STEPS).contains(s)));
    }

    /// Progress is a percentage derived from the pointer alone.
    #[test]
    fn prop_progress_tracks_the_pointer(
        ops in prop::collection::vec(nav_op_strategy(), 0..64)
    ) {
        let mut state = WizardState::default();
        for op in &ops {
            apply(&mut state, op);
            let expected =
                ((state.current_step as f64 / TOTAL_STEPS as f64) * 100.0).round() as u8;
            prop_assert_eq!(state.progress_percentage(), expected);
            prop_assert!(state.progress_percentage() <= 100);
        }
    }
}

#[test]
fn test_reachability_never_exceeds_completed_frontier() {
    let mut state = WizardState::default();
    state.next_step(); // on 2, completed {1}
    for step in 1..=TOTAL_STEPS {
        let reachable = state.is_step_reachable(step);
        assert_eq!(reachable, step <= 2, "step {step} reachability");
    }
}
