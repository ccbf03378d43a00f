// Launchpad Library - Workspace Onboarding Wizard Engine
// This exposes the core components for testing and integration

pub mod boundary;
pub mod catalog;
pub mod config;
pub mod persistence;
pub mod session;
pub mod telemetry;
pub mod wizard;

// Re-export key types for easy access
pub use boundary::{
    slugify, AuthContext, BoundaryError, InvitationOutcome, InvitationService, InvitationStatus,
    LocalSlugService, RecordingInvitationService, RecordingWorkspaceService, SlugService,
    StaticAuth, SubmissionPayload, UserId, WorkspaceId, WorkspaceService,
};
pub use catalog::{
    estimate_cost, recommend, recommend_flat, BillingCycle, CachedCatalog, CatalogError,
    CatalogService, CostEstimate, Feature, Goal, Industry, Plan, PricingError, PricingModel,
    RecommendationContext, RecommendationGroup, RecommendationReason, StaticCatalog,
    TeamSizeBucket,
};
pub use config::{LaunchpadConfig, WizardSettings};
pub use persistence::{FileStore, InMemoryStore, KeyValueStore, PersistenceError, WizardStorage};
pub use session::{Boundaries, SessionError, SubmissionReport, WizardSession};
pub use telemetry::init_telemetry;
pub use wizard::{
    validate_step, Branding, FeaturePriority, FeatureSelection, GoalError, GoalSelection,
    InvitationDraft, PlanChoice, SelectedFeature, SelectedGoal, StepKey, StepValidation,
    TeamInvites, WizardFormData, WizardSnapshot, WizardState, WorkspaceBasics,
    DEFAULT_FREE_FEATURE_CAP, TOTAL_STEPS,
};
