// Wizard core: reducer-style state, navigation primitives, validation gates,
// and goal priority operations. No I/O lives here — persistence and boundary
// calls are composed on top by the session layer.

pub mod goals;
pub mod navigation;
pub mod state;
pub mod validation;

pub use goals::GoalError;
pub use state::{
    Branding, FeaturePriority, FeatureSelection, GoalSelection, InvitationDraft, PlanChoice,
    SelectedFeature, SelectedGoal, StepKey, TeamInvites, WizardFormData, WizardSnapshot,
    WizardState, WorkspaceBasics, SNAPSHOT_VERSION, TOTAL_STEPS,
};
pub use validation::{validate_step, StepValidation, DEFAULT_FREE_FEATURE_CAP};
