//! Wizard session orchestrator.
//!
//! `WizardSession` is the explicitly-constructed, dependency-injected
//! object a UI drives: it owns the wizard state, the per-user durable
//! storage, and handles to every boundary collaborator. Handler-level
//! rules live here — validation gates the forward action, the slug
//! availability check runs before leaving step 1, every persistable
//! change is mirrored to storage, and a failed boundary call never moves
//! the step pointer.
//!
//! The session is single-threaded and event-driven; the only suspension
//! points are boundary calls. `is_loading` is raised for their duration
//! through a drop-guard so it cannot stay stuck true, and every
//! navigation bumps an epoch so a result that arrives after the user has
//! moved on is discarded instead of applied.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::boundary::{
    AuthContext, BoundaryError, InvitationOutcome, InvitationService, SlugService,
    SubmissionPayload, UserId, WorkspaceId, WorkspaceService,
};
use crate::catalog::{
    estimate_cost, recommend, BillingCycle, CatalogError, CatalogService, CostEstimate, Feature,
    Goal, Industry, Plan, PricingError, RecommendationContext, RecommendationGroup,
    TeamSizeBucket,
};
use crate::config::WizardSettings;
use crate::persistence::{KeyValueStore, PersistenceError, WizardStorage};
use crate::wizard::{
    validate_step, Branding, FeaturePriority, GoalError, InvitationDraft, SelectedFeature,
    StepValidation, WizardState, TOTAL_STEPS,
};

/// Error key for boundary failures not tied to a single field.
const FORM_ERROR_KEY: &str = "form";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("auth context is not ready")]
    AuthNotReady,

    #[error("no authenticated user")]
    NotSignedIn,

    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("boundary error: {0}")]
    Boundary(#[from] BoundaryError),

    #[error("goal selection error: {0}")]
    Goal(#[from] GoalError),

    #[error("pricing error: {0}")]
    Pricing(#[from] PricingError),

    #[error("submission requires step {TOTAL_STEPS}; wizard is on step {current}")]
    NotOnFinalStep { current: u8 },

    #[error("step {step} is incomplete")]
    IncompleteStep { step: u8 },
}

/// Boundary collaborators injected into a session.
#[derive(Clone)]
pub struct Boundaries {
    pub catalog: Arc<dyn CatalogService>,
    pub slugs: Arc<dyn SlugService>,
    pub workspaces: Arc<dyn WorkspaceService>,
    pub invitations: Arc<dyn InvitationService>,
}

/// Result of a successful final submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReport {
    pub workspace_id: WorkspaceId,
    pub invitations: Vec<InvitationOutcome>,
}

/// Raises `is_loading` for the lifetime of a boundary call and lowers it
/// on drop, success or failure.
struct LoadingGuard<'a> {
    flag: &'a mut bool,
}

impl<'a> LoadingGuard<'a> {
    fn new(flag: &'a mut bool) -> Self {
        *flag = true;
        Self { flag }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        *self.flag = false;
    }
}

pub struct WizardSession {
    user: UserId,
    state: WizardState,
    storage: WizardStorage,
    boundaries: Boundaries,
    settings: WizardSettings,
    /// Bumped on every navigation; in-flight boundary results captured
    /// under an older epoch are discarded instead of applied.
    epoch: u64,
}

impl std::fmt::Debug for WizardSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardSession")
            .field("user", &self.user)
            .field("state", &self.state)
            .field("settings", &self.settings)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

impl WizardSession {
    /// Open (or resume) the wizard for the authenticated user. Durable
    /// state is only touched once the auth context reports ready.
    pub fn start(
        auth: &dyn AuthContext,
        store: Arc<dyn KeyValueStore>,
        boundaries: Boundaries,
        settings: WizardSettings,
    ) -> Result<Self, SessionError> {
        if !auth.is_ready() {
            return Err(SessionError::AuthNotReady);
        }
        let user = auth.current_user().ok_or(SessionError::NotSignedIn)?;
        let storage = WizardStorage::new(store);
        let state = match storage.load(&user) {
            Some(recovered) => {
                info!(user = %user, step = recovered.current_step, "resuming onboarding wizard");
                recovered
            }
            None => {
                info!(user = %user, "starting onboarding wizard from defaults");
                WizardState::default()
            }
        };
        Ok(Self { user, state, storage, boundaries, settings, epoch: 0 })
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    fn persist(&self) -> Result<(), SessionError> {
        self.storage.save(&self.user, &self.state)?;
        Ok(())
    }

    fn bump_epoch(&mut self) {
        self.epoch += 1;
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    // ---- step 1: workspace basics ----

    pub fn set_workspace_name(&mut self, name: &str) -> Result<(), SessionError> {
        self.state.form_data.basics.name = name.to_string();
        self.state.clear_field_error("name");
        self.persist()
    }

    pub fn set_slug(&mut self, slug: &str) -> Result<(), SessionError> {
        self.state.form_data.basics.slug = slug.to_string();
        self.state.clear_field_error("slug");
        self.persist()
    }

    /// Propose a slug for the current workspace name.
    pub fn suggest_slug(&self) -> String {
        self.boundaries.slugs.generate_slug(&self.state.form_data.basics.name)
    }

    pub fn choose_industry(&mut self, industry: &str) -> Result<(), SessionError> {
        self.state.form_data.basics.industry = Some(industry.to_string());
        self.state.clear_field_error("industry");
        self.persist()
    }

    pub fn choose_team_size(&mut self, bucket: TeamSizeBucket) -> Result<(), SessionError> {
        self.state.form_data.basics.team_size = Some(bucket);
        self.state.clear_field_error("team_size");
        self.persist()
    }

    // ---- step 2: goals ----

    pub fn select_goal(&mut self, goal_id: &str) -> Result<(), SessionError> {
        self.state.form_data.goals.select(goal_id);
        self.state.clear_field_error("goals");
        self.state.clear_field_error("goal_priorities");
        self.persist()
    }

    pub fn deselect_goal(&mut self, goal_id: &str) -> Result<(), SessionError> {
        self.state.form_data.goals.deselect(goal_id);
        self.state.clear_field_error("goals");
        self.state.clear_field_error("goal_priorities");
        self.persist()
    }

    pub fn set_goal_priority(&mut self, goal_id: &str, priority: u8) -> Result<(), SessionError> {
        self.state.form_data.goals.set_priority(goal_id, priority)?;
        self.state.clear_field_error("goal_priorities");
        self.persist()
    }

    pub fn set_goal_setup_now(&mut self, goal_id: &str, setup_now: bool) -> Result<(), SessionError> {
        self.state.form_data.goals.set_setup_now(goal_id, setup_now)?;
        self.persist()
    }

    // ---- step 3: features ----

    /// Add a feature to the selection (enabled, medium priority) or leave
    /// it as-is when already selected.
    pub fn select_feature(&mut self, feature_slug: &str) -> Result<(), SessionError> {
        let features = &mut self.state.form_data.features;
        if !features.selected.iter().any(|f| f.feature_slug == feature_slug) {
            features.selected.push(SelectedFeature {
                feature_slug: feature_slug.to_string(),
                is_enabled: true,
                priority: FeaturePriority::Medium,
            });
        }
        self.state.clear_field_error("features");
        self.refresh_cap_warning();
        self.persist()
    }

    pub fn deselect_feature(&mut self, feature_slug: &str) -> Result<(), SessionError> {
        self.state
            .form_data
            .features
            .selected
            .retain(|f| f.feature_slug != feature_slug);
        self.state.clear_field_error("features");
        self.refresh_cap_warning();
        self.persist()
    }

    pub fn set_feature_enabled(
        &mut self,
        feature_slug: &str,
        is_enabled: bool,
    ) -> Result<(), SessionError> {
        if let Some(feature) = self
            .state
            .form_data
            .features
            .selected
            .iter_mut()
            .find(|f| f.feature_slug == feature_slug)
        {
            feature.is_enabled = is_enabled;
        }
        self.state.clear_field_error("features");
        self.refresh_cap_warning();
        self.persist()
    }

    pub fn set_feature_priority(
        &mut self,
        feature_slug: &str,
        priority: FeaturePriority,
    ) -> Result<(), SessionError> {
        if let Some(feature) = self
            .state
            .form_data
            .features
            .selected
            .iter_mut()
            .find(|f| f.feature_slug == feature_slug)
        {
            feature.priority = priority;
        }
        self.persist()
    }

    /// Re-derive the free-tier cap advisory from the current selection so
    /// the warning tracks edits live instead of waiting for the gate.
    fn refresh_cap_warning(&mut self) {
        let report = validate_step(&self.state.form_data, 3, self.settings.free_feature_cap);
        match report.warnings.get("feature_cap") {
            Some(message) => {
                self.state.warnings.insert("feature_cap".to_string(), message.clone());
            }
            None => {
                self.state.warnings.remove("feature_cap");
            }
        }
    }

    // ---- step 4: plan ----

    pub fn choose_plan(&mut self, plan_slug: &str) -> Result<(), SessionError> {
        self.state.form_data.plan.plan_slug = Some(plan_slug.to_string());
        self.state.clear_field_error("plan");
        self.refresh_cap_warning();
        self.persist()
    }

    pub fn set_billing_cycle(&mut self, cycle: BillingCycle) -> Result<(), SessionError> {
        self.state.form_data.plan.billing_cycle = cycle;
        self.persist()
    }

    // ---- step 5: team ----

    pub fn add_invitation(&mut self, draft: InvitationDraft) -> Result<(), SessionError> {
        self.state
            .form_data
            .team
            .invitations
            .retain(|i| i.email != draft.email);
        self.state.form_data.team.invitations.push(draft);
        self.persist()
    }

    pub fn remove_invitation(&mut self, email: &str) -> Result<(), SessionError> {
        self.state.form_data.team.invitations.retain(|i| i.email != email);
        self.persist()
    }

    // ---- step 6: branding ----

    pub fn edit_branding(
        &mut self,
        edit: impl FnOnce(&mut Branding),
    ) -> Result<(), SessionError> {
        edit(&mut self.state.form_data.branding);
        self.persist()
    }

    // ---- navigation ----

    pub fn can_proceed(&self) -> bool {
        self.state.can_proceed(self.settings.free_feature_cap)
    }

    /// Validation report for the current step, without mutating state.
    pub fn current_validation(&self) -> StepValidation {
        validate_step(
            &self.state.form_data,
            self.state.current_step,
            self.settings.free_feature_cap,
        )
    }

    /// The handler behind the "Next" control. Re-checks the step gate,
    /// runs the slug availability check when leaving step 1, and only
    /// then advances. Returns whether the wizard moved forward; gate
    /// failures land in `state().errors` / `state().warnings`.
    pub async fn try_advance(&mut self) -> Result<bool, SessionError> {
        let report = self.current_validation();
        self.state.warnings.extend(report.warnings.clone());
        if !report.is_valid() {
            debug!(
                user = %self.user,
                step = self.state.current_step,
                errors = report.errors.len(),
                "step gate failed"
            );
            self.state.errors.extend(report.errors);
            return Ok(false);
        }

        if self.state.current_step == 1 && !self.confirm_slug_available().await? {
            return Ok(false);
        }

        self.state.clear_field_error(FORM_ERROR_KEY);
        self.state.next_step();
        self.bump_epoch();
        self.persist()?;
        info!(
            user = %self.user,
            step = self.state.current_step,
            progress = self.state.progress_percentage(),
            "advanced onboarding step"
        );
        self.prefetch_step_catalog().await;
        Ok(true)
    }

    /// Entering a step requests that step's catalog section, as an explicit
    /// navigation hook rather than a render-time side effect. Behind a
    /// `CachedCatalog` this warms the cache; a failure here is silent
    /// because the step's own accessor carries the retryable error surface.
    async fn prefetch_step_catalog(&mut self) {
        let catalog = Arc::clone(&self.boundaries.catalog);
        let prefetched = match self.state.current_step {
            1 => catalog.industries().await.map(|_| ()),
            2 => catalog.goals().await.map(|_| ()),
            3 => catalog.features().await.map(|_| ()),
            4 => catalog.plans().await.map(|_| ()),
            _ => Ok(()),
        };
        if let Err(e) = prefetched {
            debug!(user = %self.user, step = self.state.current_step, error = %e, "step catalog prefetch failed");
        }
    }

    /// Slug availability gate for step 1. A taken slug is a field-level
    /// error; a boundary failure lands under the form key. Neither moves
    /// the step pointer.
    async fn confirm_slug_available(&mut self) -> Result<bool, SessionError> {
        let slug = self.state.form_data.basics.slug.clone();
        let epoch = self.epoch;
        let slugs = Arc::clone(&self.boundaries.slugs);

        let guard = LoadingGuard::new(&mut self.state.is_loading);
        let checked = slugs.check_availability(&slug).await;
        drop(guard);

        if !self.is_current(epoch) {
            debug!(user = %self.user, slug, "discarding stale slug availability result");
            return Ok(false);
        }
        match checked {
            Ok(true) => Ok(true),
            Ok(false) => {
                self.state.errors.insert(
                    "slug".to_string(),
                    "This workspace URL is already taken".to_string(),
                );
                Ok(false)
            }
            Err(e) => {
                warn!(user = %self.user, error = %e, "slug availability check failed");
                self.state
                    .errors
                    .insert(FORM_ERROR_KEY.to_string(), e.to_string());
                Ok(false)
            }
        }
    }

    pub fn go_back(&mut self) -> Result<(), SessionError> {
        self.state.previous_step();
        self.state.clear_field_error(FORM_ERROR_KEY);
        self.bump_epoch();
        self.persist()
    }

    /// Jump to a step, honoring the reachability rule: the first step,
    /// any step at or before the current one, or a step whose
    /// predecessor is completed. Unreachable targets are ignored.
    pub fn go_to(&mut self, step: u8) -> Result<(), SessionError> {
        if !self.state.is_step_reachable(step) {
            debug!(user = %self.user, step, "ignoring jump to unreachable step");
            return Ok(());
        }
        self.state.go_to_step(step);
        self.state.clear_field_error(FORM_ERROR_KEY);
        self.bump_epoch();
        self.persist()
    }

    /// Restore defaults and erase the durable record.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.state = WizardState::default();
        self.bump_epoch();
        self.storage.clear(&self.user)?;
        info!(user = %self.user, "onboarding wizard reset");
        Ok(())
    }

    // ---- catalog access ----

    pub async fn industries(&mut self) -> Result<Vec<Industry>, SessionError> {
        let catalog = Arc::clone(&self.boundaries.catalog);
        self.fetch("industries", catalog.industries()).await
    }

    pub async fn goals(&mut self) -> Result<Vec<Goal>, SessionError> {
        let catalog = Arc::clone(&self.boundaries.catalog);
        self.fetch("goals", catalog.goals()).await
    }

    pub async fn plans(&mut self) -> Result<Vec<Plan>, SessionError> {
        let catalog = Arc::clone(&self.boundaries.catalog);
        self.fetch("plans", catalog.plans()).await
    }

    pub async fn features_for_goal(&mut self, goal_id: &str) -> Result<Vec<Feature>, SessionError> {
        let catalog = Arc::clone(&self.boundaries.catalog);
        self.fetch("features", catalog.features_by_goal(goal_id)).await
    }

    /// Shared wrapper for catalog reads: loading flag for the duration,
    /// and a retryable form-level error on failure. Calling the same
    /// accessor again is the retry.
    async fn fetch<T>(
        &mut self,
        section: &str,
        request: impl std::future::Future<Output = Result<T, CatalogError>>,
    ) -> Result<T, SessionError> {
        let guard = LoadingGuard::new(&mut self.state.is_loading);
        let fetched = request.await;
        drop(guard);

        match fetched {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(user = %self.user, section, error = %e, "catalog fetch failed");
                self.state.errors.insert(
                    FORM_ERROR_KEY.to_string(),
                    format!("Couldn't load {section}. Try again."),
                );
                Err(e.into())
            }
        }
    }

    /// Recommendations for the current form data, de-duplicated against
    /// the features already selected.
    pub async fn recommendations(&mut self) -> Result<Vec<RecommendationGroup>, SessionError> {
        let catalog = Arc::clone(&self.boundaries.catalog);
        let features = self.fetch("features", catalog.features()).await?;
        let goal_ids = self.state.form_data.goals.ids_by_priority();
        let already_selected = self.state.form_data.features.selected_slugs();
        let basics = &self.state.form_data.basics;
        let ctx = RecommendationContext {
            industry: basics.industry.as_deref().unwrap_or(""),
            team_size: basics.team_size.unwrap_or(TeamSizeBucket::Solo),
            selected_goal_ids: &goal_ids,
            already_selected: &already_selected,
        };
        Ok(recommend(&features, &ctx))
    }

    /// Cost estimate for the currently chosen plan and feature selection.
    pub async fn estimate(&mut self) -> Result<CostEstimate, SessionError> {
        let Some(plan_slug) = self.state.form_data.plan.plan_slug.clone() else {
            return Err(SessionError::IncompleteStep { step: 4 });
        };
        let catalog = Arc::clone(&self.boundaries.catalog);
        let plan = self.fetch("plans", catalog.plan_by_slug(&plan_slug)).await?;
        let enabled = self.state.form_data.features.enabled_count() as u32;
        Ok(estimate_cost(&plan, self.state.form_data.plan.billing_cycle, enabled)?)
    }

    // ---- submission ----

    /// Package the six steps and hand them to the workspace and
    /// invitation boundaries. On success the wizard resets and the
    /// durable record is erased; on failure nothing about the collected
    /// data changes and the user can retry.
    pub async fn submit(&mut self) -> Result<SubmissionReport, SessionError> {
        if self.state.current_step != TOTAL_STEPS {
            return Err(SessionError::NotOnFinalStep { current: self.state.current_step });
        }
        for step in 1..=TOTAL_STEPS {
            if !validate_step(&self.state.form_data, step, self.settings.free_feature_cap)
                .is_valid()
            {
                return Err(SessionError::IncompleteStep { step });
            }
        }

        let payload = SubmissionPayload::new(self.state.form_data.clone());
        let workspaces = Arc::clone(&self.boundaries.workspaces);
        let invitations = Arc::clone(&self.boundaries.invitations);
        let drafts = self.state.form_data.team.invitations.clone();

        let guard = LoadingGuard::new(&mut self.state.is_loading);
        let created = workspaces.create_workspace(&payload).await;
        let workspace_id = match created {
            Ok(id) => id,
            Err(e) => {
                drop(guard);
                warn!(user = %self.user, error = %e, "workspace creation failed");
                self.state
                    .errors
                    .insert(FORM_ERROR_KEY.to_string(), e.to_string());
                return Err(e.into());
            }
        };

        // The workspace now exists; an invitation transport failure must
        // not undo the submission. It degrades to per-invitation failures
        // the caller can resend from workspace settings.
        let outcomes = if drafts.is_empty() {
            Vec::new()
        } else {
            match invitations.send_invitations(&workspace_id, &drafts).await {
                Ok(outcomes) => outcomes,
                Err(e) => {
                    warn!(user = %self.user, error = %e, "invitation delivery failed");
                    drafts
                        .iter()
                        .map(|d| InvitationOutcome {
                            email: d.email.clone(),
                            status: crate::boundary::InvitationStatus::Failed {
                                reason: e.to_string(),
                            },
                        })
                        .collect()
                }
            }
        };
        drop(guard);

        let sent = outcomes.iter().filter(|o| o.sent()).count();
        info!(
            user = %self.user,
            workspace = %workspace_id,
            invitations_sent = sent,
            invitations_failed = outcomes.len() - sent,
            "onboarding submitted"
        );

        self.state = WizardState::default();
        self.bump_epoch();
        self.storage.clear(&self.user)?;

        Ok(SubmissionReport { workspace_id, invitations: outcomes })
    }
}
