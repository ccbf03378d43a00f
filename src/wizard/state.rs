//! Wizard state and per-step form payloads.
//!
//! One `WizardState` exists per in-progress onboarding session. The state is
//! a plain reducer-style value: navigation and edits mutate it in place, and
//! the persistable portion (`current_step`, `completed_steps`, `form_data`)
//! is captured as a `WizardSnapshot` for durable storage. Transient UI
//! surface (`errors`, `warnings`, `is_loading`) is never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::{BillingCycle, TeamSizeBucket};

/// Number of steps in the onboarding flow.
pub const TOTAL_STEPS: u8 = 6;

/// Snapshot schema version. Bump when the persisted shape changes;
/// mismatched snapshots are discarded in favor of a fresh wizard.
pub const SNAPSHOT_VERSION: &str = "1";

/// String identifier namespacing per-step form data (`step1`..`step6`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepKey {
    Step1,
    Step2,
    Step3,
    Step4,
    Step5,
    Step6,
}

impl StepKey {
    pub fn from_step(step: u8) -> Option<Self> {
        match step {
            1 => Some(StepKey::Step1),
            2 => Some(StepKey::Step2),
            3 => Some(StepKey::Step3),
            4 => Some(StepKey::Step4),
            5 => Some(StepKey::Step5),
            6 => Some(StepKey::Step6),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StepKey::Step1 => "step1",
            StepKey::Step2 => "step2",
            StepKey::Step3 => "step3",
            StepKey::Step4 => "step4",
            StepKey::Step5 => "step5",
            StepKey::Step6 => "step6",
        }
    }
}

/// Step 1: workspace basics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceBasics {
    pub name: String,
    pub slug: String,
    pub industry: Option<String>,
    pub team_size: Option<TeamSizeBucket>,
}

/// One chosen business objective. Priorities among selected goals are
/// always a permutation of `1..=k` (see `GoalSelection`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedGoal {
    pub goal_id: String,
    pub priority: u8,
    pub setup_now: bool,
}

/// Step 2: selected goals, priority-ordered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalSelection {
    pub selected: Vec<SelectedGoal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeaturePriority {
    High,
    Medium,
    Low,
}

impl Default for FeaturePriority {
    fn default() -> Self {
        FeaturePriority::Medium
    }
}

/// One chosen catalog feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFeature {
    pub feature_slug: String,
    pub is_enabled: bool,
    pub priority: FeaturePriority,
}

/// Step 3: selected features.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSelection {
    pub selected: Vec<SelectedFeature>,
}

impl FeatureSelection {
    pub fn enabled_count(&self) -> usize {
        self.selected.iter().filter(|f| f.is_enabled).count()
    }

    pub fn selected_slugs(&self) -> Vec<String> {
        self.selected.iter().map(|f| f.feature_slug.clone()).collect()
    }
}

/// Step 4: subscription plan choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanChoice {
    pub plan_slug: Option<String>,
    pub billing_cycle: BillingCycle,
}

impl Default for PlanChoice {
    fn default() -> Self {
        Self {
            plan_slug: None,
            billing_cycle: BillingCycle::Monthly,
        }
    }
}

/// One pending teammate invitation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationDraft {
    pub email: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Step 5: team invitations (optional step, may be empty).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamInvites {
    pub invitations: Vec<InvitationDraft>,
}

/// Step 6: branding (optional step, may be all-default).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Branding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
}

/// All collected form data, keyed on the wire by step (`step1`..`step6`).
///
/// Data for a step is never deleted by navigation; going back and changing
/// an earlier step does not invalidate later steps' already-collected data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WizardFormData {
    #[serde(rename = "step1", default)]
    pub basics: WorkspaceBasics,
    #[serde(rename = "step2", default)]
    pub goals: GoalSelection,
    #[serde(rename = "step3", default)]
    pub features: FeatureSelection,
    #[serde(rename = "step4", default)]
    pub plan: PlanChoice,
    #[serde(rename = "step5", default)]
    pub team: TeamInvites,
    #[serde(rename = "step6", default)]
    pub branding: Branding,
}

/// Root wizard state. `current_step` is always within `[1, TOTAL_STEPS]`.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardState {
    pub current_step: u8,
    pub completed_steps: BTreeSet<u8>,
    pub form_data: WizardFormData,
    /// Field-name -> human-readable message. Cleared per-field on edit,
    /// cleared in bulk on successful submit.
    pub errors: BTreeMap<String, String>,
    /// Non-blocking advisories (e.g. free-tier feature cap), kept separate
    /// from `errors` so they never gate advancement.
    pub warnings: BTreeMap<String, String>,
    pub is_loading: bool,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            current_step: 1,
            completed_steps: BTreeSet::new(),
            form_data: WizardFormData::default(),
            errors: BTreeMap::new(),
            warnings: BTreeMap::new(),
            is_loading: false,
        }
    }
}

impl WizardState {
    pub fn current_step_key(&self) -> StepKey {
        // current_step is invariant-bounded, so this lookup cannot miss
        StepKey::from_step(self.current_step).unwrap_or(StepKey::Step1)
    }

    /// Clear the validation error for a single field. Called whenever that
    /// field is edited; boundary errors under other keys are untouched.
    pub fn clear_field_error(&mut self, field: &str) {
        self.errors.remove(field);
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    /// Capture the persistable portion of the state.
    pub fn snapshot(&self) -> WizardSnapshot {
        WizardSnapshot {
            version: SNAPSHOT_VERSION.to_string(),
            current_step: self.current_step,
            completed_steps: self.completed_steps.clone(),
            form_data: self.form_data.clone(),
            saved_at: Utc::now(),
        }
    }
}

/// Durable representation of an in-progress wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardSnapshot {
    pub version: String,
    pub current_step: u8,
    pub completed_steps: BTreeSet<u8>,
    pub form_data: WizardFormData,
    pub saved_at: DateTime<Utc>,
}

impl WizardSnapshot {
    /// A snapshot is only usable if its schema version matches and its step
    /// pointer respects the state invariant.
    pub fn is_usable(&self) -> bool {
        self.version == SNAPSHOT_VERSION
            && (1..=TOTAL_STEPS).contains(&self.current_step)
            && self.completed_steps.iter().all(|s| (1..=TOTAL_STEPS).contains(s))
    }

    /// Rehydrate wizard state from a snapshot. Transient fields start clean.
    pub fn into_state(self) -> WizardState {
        WizardState {
            current_step: self.current_step,
            completed_steps: self.completed_steps,
            form_data: self.form_data,
            errors: BTreeMap::new(),
            warnings: BTreeMap::new(),
            is_loading: false,
        }
    }
}
