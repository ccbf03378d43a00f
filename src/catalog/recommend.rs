//! Feature recommendation engine.
//!
//! Deterministic, side-effect-free table lookups: an industry table, a
//! team-size table, and a goal-complement table. Recommendations are
//! de-duplicated against the caller's current selection and against each
//! other (first-seen order wins), resolved against the in-memory feature
//! catalog (unresolved slugs are "not yet available" and dropped
//! silently), and capped per reason group, not globally.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{Feature, TeamSizeBucket};

/// Maximum recommendations surfaced per reason group.
pub const GROUP_CAP: usize = 3;

fn industry_table(industry: &str) -> &'static [&'static str] {
    match industry {
        "marketing" => &["post_scheduler", "content_calendar", "analytics_dashboard"],
        "ecommerce" => &["storefront", "inventory_manager", "payment_links"],
        "education" => &["course_builder", "student_progress", "email_campaigns"],
        // api_access is on the roadmap but not in the catalog yet; it is
        // dropped at resolution time until it ships
        "technology" => &["crm_pipeline", "analytics_dashboard", "automation_flows", "api_access"],
        "consulting" => &["crm_pipeline", "lead_capture", "email_campaigns"],
        "creator" => &["bio_link_page", "post_scheduler", "audience_insights"],
        _ => &[],
    }
}

fn team_size_table(bucket: TeamSizeBucket) -> &'static [&'static str] {
    match bucket {
        TeamSizeBucket::Solo => &["post_scheduler", "content_calendar"],
        TeamSizeBucket::Small => &["content_calendar", "crm_pipeline", "email_campaigns"],
        TeamSizeBucket::Medium => &["team_roles", "crm_pipeline", "analytics_dashboard"],
        TeamSizeBucket::Large => &["team_roles", "automation_flows", "audience_insights"],
    }
}

fn goal_complement_table(goal_id: &str) -> &'static [&'static str] {
    match goal_id {
        "instagram_management" => &["hashtag_research", "content_calendar"],
        "crm_sales" => &["lead_capture", "email_campaigns"],
        "course_creation" => &["student_progress", "payment_links"],
        "ecommerce_store" => &["review_manager", "inventory_manager"],
        "link_in_bio" => &["qr_codes"],
        "email_marketing" => &["automation_flows", "lead_capture"],
        _ => &[],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationReason {
    Industry,
    TeamSize,
    GoalComplementary,
}

/// One UI group of recommended features, capped at `GROUP_CAP`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationGroup {
    pub reason: RecommendationReason,
    pub features: Vec<Feature>,
}

/// Inputs to a recommendation pass.
#[derive(Debug, Clone)]
pub struct RecommendationContext<'a> {
    pub industry: &'a str,
    pub team_size: TeamSizeBucket,
    /// Selected goal ids, in priority order; drives the goal-complementary
    /// group. Empty when the caller has not picked goals yet.
    pub selected_goal_ids: &'a [String],
    /// Feature slugs already in the caller's selection, enabled or not.
    pub already_selected: &'a [String],
}

/// Run the recommendation tables against the given feature catalog.
/// Returns only non-empty groups, in fixed reason order.
pub fn recommend(catalog_features: &[Feature], ctx: &RecommendationContext<'_>) -> Vec<RecommendationGroup> {
    let mut seen: HashSet<&str> = ctx.already_selected.iter().map(String::as_str).collect();
    let mut groups = Vec::new();

    let goal_slugs: Vec<&'static str> = ctx
        .selected_goal_ids
        .iter()
        .flat_map(|id| goal_complement_table(id).iter().copied())
        .collect();

    let sources: [(RecommendationReason, Vec<&str>); 3] = [
        (RecommendationReason::Industry, industry_table(ctx.industry).to_vec()),
        (RecommendationReason::TeamSize, team_size_table(ctx.team_size).to_vec()),
        (RecommendationReason::GoalComplementary, goal_slugs),
    ];

    for (reason, slugs) in sources {
        let mut features = Vec::new();
        for slug in slugs {
            if features.len() >= GROUP_CAP {
                break;
            }
            if seen.contains(slug) {
                continue;
            }
            // unresolved slugs are not yet available, skip without error
            let Some(feature) = catalog_features.iter().find(|f| f.slug == slug) else {
                continue;
            };
            seen.insert(slug);
            features.push(feature.clone());
        }
        if !features.is_empty() {
            groups.push(RecommendationGroup { reason, features });
        }
    }
    groups
}

/// Flattened recommendation list, preserving group order then in-group
/// order. Convenience shape for callers that do not render reason groups.
pub fn recommend_flat(
    catalog_features: &[Feature],
    industry: &str,
    team_size: TeamSizeBucket,
    already_selected: &[String],
) -> Vec<Feature> {
    let ctx = RecommendationContext {
        industry,
        team_size,
        selected_goal_ids: &[],
        already_selected,
    };
    recommend(catalog_features, &ctx)
        .into_iter()
        .flat_map(|group| group.features)
        .collect()
}
