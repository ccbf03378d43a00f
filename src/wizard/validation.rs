//! Per-step validation gates.
//!
//! Pure functions over the collected form data. A failed rule produces a
//! field-keyed message; the offending input is never truncated or "fixed".
//! Exceeding the free-tier feature cap is an advisory, not an error — it
//! surfaces under `warnings` and never blocks advancement on its own.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use super::state::{GoalSelection, WizardFormData, WizardState, WorkspaceBasics};
use crate::catalog::FREE_PLAN_SLUG;

/// Default number of enabled features included in the free tier.
pub const DEFAULT_FREE_FEATURE_CAP: usize = 10;

fn slug_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("^[a-z0-9-]+$").expect("slug pattern is valid"))
}

/// Outcome of validating one step: blocking errors plus non-blocking
/// advisories, both keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepValidation {
    pub errors: BTreeMap<String, String>,
    pub warnings: BTreeMap<String, String>,
}

impl StepValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.insert(field.to_string(), message.into());
    }

    fn warn(&mut self, field: &str, message: impl Into<String>) {
        self.warnings.insert(field.to_string(), message.into());
    }
}

/// Validate the gate for a single step. Steps 5 and 6 are optional and
/// always pass; an unknown step index also passes (navigation already
/// bounds the pointer).
pub fn validate_step(form: &WizardFormData, step: u8, free_feature_cap: usize) -> StepValidation {
    match step {
        1 => validate_basics(&form.basics),
        2 => validate_goals(&form.goals),
        3 => validate_features(form, free_feature_cap),
        4 => validate_plan(form),
        _ => StepValidation::default(),
    }
}

fn validate_basics(basics: &WorkspaceBasics) -> StepValidation {
    let mut report = StepValidation::default();
    if basics.name.trim().is_empty() {
        report.error("name", "Workspace name is required");
    }
    if basics.slug.is_empty() {
        report.error("slug", "Workspace URL is required");
    } else if !slug_pattern().is_match(&basics.slug) {
        report.error(
            "slug",
            "Workspace URL may only contain lowercase letters, numbers, and hyphens",
        );
    }
    if basics.industry.is_none() {
        report.error("industry", "Select an industry");
    }
    if basics.team_size.is_none() {
        report.error("team_size", "Select a team size");
    }
    report
}

fn validate_goals(goals: &GoalSelection) -> StepValidation {
    let mut report = StepValidation::default();
    if goals.selected.is_empty() {
        report.error("goals", "Select at least one goal");
        return report;
    }
    if !goals.priorities_valid() {
        report.error(
            "goal_priorities",
            "Goal priorities must be unique and numbered 1 through the count of selected goals",
        );
    }
    report
}

fn validate_features(form: &WizardFormData, free_feature_cap: usize) -> StepValidation {
    let mut report = StepValidation::default();
    let features = &form.features;
    if features.selected.is_empty() {
        report.error("features", "Select at least one feature");
        return report;
    }
    let enabled = features.enabled_count();
    if enabled == 0 {
        report.error("features", "Enable at least one selected feature");
    }
    // before a plan is chosen (plan is a later step), assume the free tier
    let on_free_plan = form.plan.plan_slug.as_deref().map_or(true, |slug| slug == FREE_PLAN_SLUG);
    if on_free_plan && enabled > free_feature_cap {
        report.warn(
            "feature_cap",
            format!(
                "The free plan includes up to {free_feature_cap} enabled features; \
                 {enabled} are enabled. Extra features will be locked until you upgrade."
            ),
        );
    }
    report
}

fn validate_plan(form: &WizardFormData) -> StepValidation {
    let mut report = StepValidation::default();
    if form.plan.plan_slug.is_none() {
        report.error("plan", "Select a subscription plan");
    }
    report
}

impl WizardState {
    /// Pure gate for the forward action on the current step. Gates only
    /// "Next" — jumping and stepping back are never blocked by validation.
    pub fn can_proceed(&self, free_feature_cap: usize) -> bool {
        validate_step(&self.form_data, self.current_step, free_feature_cap).is_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TeamSizeBucket;
    use crate::wizard::state::{FeaturePriority, SelectedFeature, SelectedGoal};

    fn valid_basics() -> WorkspaceBasics {
        WorkspaceBasics {
            name: "Acme Creative".to_string(),
            slug: "acme-creative".to_string(),
            industry: Some("marketing".to_string()),
            team_size: Some(TeamSizeBucket::Small),
        }
    }

    #[test]
    fn test_step1_requires_every_field() {
        let form = WizardFormData::default();
        let report = validate_step(&form, 1, DEFAULT_FREE_FEATURE_CAP);
        assert!(!report.is_valid());
        assert!(report.errors.contains_key("name"));
        assert!(report.errors.contains_key("slug"));
        assert!(report.errors.contains_key("industry"));
        assert!(report.errors.contains_key("team_size"));
    }

    #[test]
    fn test_step1_rejects_malformed_slug_without_fixing_it() {
        let mut form = WizardFormData::default();
        form.basics = valid_basics();
        form.basics.slug = "Acme Creative!".to_string();
        let report = validate_step(&form, 1, DEFAULT_FREE_FEATURE_CAP);
        assert_eq!(
            report.errors.get("slug").unwrap(),
            "Workspace URL may only contain lowercase letters, numbers, and hyphens"
        );
        // the input itself is untouched
        assert_eq!(form.basics.slug, "Acme Creative!");
    }

    #[test]
    fn test_step1_passes_with_complete_basics() {
        let mut form = WizardFormData::default();
        form.basics = valid_basics();
        assert!(validate_step(&form, 1, DEFAULT_FREE_FEATURE_CAP).is_valid());
    }

    #[test]
    fn test_step2_requires_a_goal() {
        let form = WizardFormData::default();
        let report = validate_step(&form, 2, DEFAULT_FREE_FEATURE_CAP);
        assert!(report.errors.contains_key("goals"));
    }

    #[test]
    fn test_step2_rejects_duplicate_priorities() {
        let mut form = WizardFormData::default();
        form.goals.selected = vec![
            SelectedGoal { goal_id: "instagram".into(), priority: 1, setup_now: true },
            SelectedGoal { goal_id: "crm".into(), priority: 1, setup_now: false },
        ];
        let report = validate_step(&form, 2, DEFAULT_FREE_FEATURE_CAP);
        assert!(report.errors.contains_key("goal_priorities"));
    }

    #[test]
    fn test_step3_requires_an_enabled_feature() {
        let mut form = WizardFormData::default();
        form.features.selected = vec![SelectedFeature {
            feature_slug: "post_scheduler".into(),
            is_enabled: false,
            priority: FeaturePriority::High,
        }];
        let report = validate_step(&form, 3, DEFAULT_FREE_FEATURE_CAP);
        assert_eq!(
            report.errors.get("features").unwrap(),
            "Enable at least one selected feature"
        );
    }

    #[test]
    fn test_step3_over_cap_warns_but_still_valid() {
        let mut form = WizardFormData::default();
        form.features.selected = (0..12)
            .map(|i| SelectedFeature {
                feature_slug: format!("feature-{i}"),
                is_enabled: true,
                priority: FeaturePriority::Medium,
            })
            .collect();
        let report = validate_step(&form, 3, DEFAULT_FREE_FEATURE_CAP);
        assert!(report.is_valid());
        assert!(report.warnings.contains_key("feature_cap"));
    }

    #[test]
    fn test_step3_cap_warning_skipped_on_paid_plan() {
        let mut form = WizardFormData::default();
        form.plan.plan_slug = Some("pro".to_string());
        form.features.selected = (0..12)
            .map(|i| SelectedFeature {
                feature_slug: format!("feature-{i}"),
                is_enabled: true,
                priority: FeaturePriority::Medium,
            })
            .collect();
        let report = validate_step(&form, 3, DEFAULT_FREE_FEATURE_CAP);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_step4_requires_plan_choice() {
        let form = WizardFormData::default();
        assert!(!validate_step(&form, 4, DEFAULT_FREE_FEATURE_CAP).is_valid());
    }

    #[test]
    fn test_optional_steps_always_pass() {
        let form = WizardFormData::default();
        assert!(validate_step(&form, 5, DEFAULT_FREE_FEATURE_CAP).is_valid());
        assert!(validate_step(&form, 6, DEFAULT_FREE_FEATURE_CAP).is_valid());
    }
}
