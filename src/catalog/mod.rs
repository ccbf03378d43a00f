//! Catalog domain types and the catalog boundary.
//!
//! The catalog is the read-only universe the wizard selects from:
//! industries, business goals, features, and subscription plans. Backends
//! implement `CatalogService`; the engine ships a built-in static catalog
//! (`StaticCatalog`) and a read-through cache (`CachedCatalog`) for the
//! per-step fetches.

pub mod cache;
pub mod local;
pub mod pricing;
pub mod recommend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cache::CachedCatalog;
pub use local::StaticCatalog;
pub use pricing::{estimate_cost, CostEstimate, PricingError};
pub use recommend::{
    recommend, recommend_flat, RecommendationContext, RecommendationGroup, RecommendationReason,
};

/// Slug of the free plan. The free tier is feature-capped, not
/// feature-priced, and several call sites special-case it by slug.
pub const FREE_PLAN_SLUG: &str = "free";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Industry {
    pub slug: String,
    pub name: String,
}

/// A business objective (e.g. "Instagram Management") grouping catalog
/// features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Features belonging to this goal, in display order.
    pub feature_slugs: Vec<String>,
}

/// A catalog capability (e.g. "Post Scheduler").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub slug: String,
    pub name: String,
    pub description: String,
    /// Minimum plan required, if tier-gated. `None` means available on
    /// every plan, free included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_plan: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingModel {
    Flat,
    FeatureBased,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

/// A subscription tier. Prices are whole currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub slug: String,
    pub name: String,
    pub pricing_model: PricingModel,
    pub base_price_monthly: u32,
    pub base_price_yearly: u32,
    /// Per-feature unit prices; only consulted for `FeatureBased` plans.
    #[serde(default)]
    pub feature_price_monthly: u32,
    #[serde(default)]
    pub feature_price_yearly: u32,
    /// Enabled-feature cap, if the tier is capped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_cap: Option<u32>,
}

/// Team headcount buckets used by the recommendation tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSizeBucket {
    Solo,
    Small,
    Medium,
    Large,
}

impl TeamSizeBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamSizeBucket::Solo => "solo",
            TeamSizeBucket::Small => "small",
            TeamSizeBucket::Medium => "medium",
            TeamSizeBucket::Large => "large",
        }
    }
}

impl std::str::FromStr for TeamSizeBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solo" => Ok(TeamSizeBucket::Solo),
            "small" => Ok(TeamSizeBucket::Small),
            "medium" => Ok(TeamSizeBucket::Medium),
            "large" => Ok(TeamSizeBucket::Large),
            other => Err(format!("unknown team size bucket: {other}")),
        }
    }
}

/// Errors surfaced by catalog backends. Cloneable so cached lookups can
/// hand the same failure to every waiter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog backend unavailable: {reason}")]
    Unavailable { reason: String },
    #[error("catalog file not found: {path}")]
    FileNotFound { path: String },
    #[error("catalog file is malformed: {reason}")]
    Malformed { reason: String },
    #[error("unknown plan: {slug}")]
    UnknownPlan { slug: String },
}

/// Read-side boundary for the onboarding catalog. Every method returns a
/// result; failures surface as retryable errors in the step that asked,
/// never as panics.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn industries(&self) -> Result<Vec<Industry>, CatalogError>;

    async fn goals(&self) -> Result<Vec<Goal>, CatalogError>;

    async fn features(&self) -> Result<Vec<Feature>, CatalogError>;

    async fn features_by_goal(&self, goal_id: &str) -> Result<Vec<Feature>, CatalogError>;

    async fn plans(&self) -> Result<Vec<Plan>, CatalogError>;

    async fn plan_by_slug(&self, slug: &str) -> Result<Plan, CatalogError> {
        self.plans()
            .await?
            .into_iter()
            .find(|p| p.slug == slug)
            .ok_or_else(|| CatalogError::UnknownPlan { slug: slug.to_string() })
    }
}
