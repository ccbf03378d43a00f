//! Static catalog backend.
//!
//! Serves the catalog from memory: either the built-in default data set or
//! a TOML file supplied by configuration. The built-in set is the one the
//! hosted product ships; the file override exists so deployments can add
//! or retire entries without a release.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    CatalogError, CatalogService, Feature, Goal, Industry, Plan, PricingModel, FREE_PLAN_SLUG,
};

/// Full catalog data set, also the TOML file schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub industries: Vec<Industry>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub plans: Vec<Plan>,
}

/// In-memory `CatalogService` implementation.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    data: CatalogData,
}

impl StaticCatalog {
    pub fn new(data: CatalogData) -> Self {
        Self { data }
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|_| CatalogError::FileNotFound {
            path: path.display().to_string(),
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let data: CatalogData =
            toml::from_str(raw).map_err(|e| CatalogError::Malformed { reason: e.to_string() })?;
        Ok(Self::new(data))
    }

    /// The catalog the hosted product ships with.
    pub fn builtin() -> Self {
        let industries = [
            ("marketing", "Marketing & Agencies"),
            ("ecommerce", "E-commerce & Retail"),
            ("education", "Education & Coaching"),
            ("technology", "Technology & SaaS"),
            ("consulting", "Consulting & Services"),
            ("creator", "Creators & Influencers"),
        ]
        .into_iter()
        .map(|(slug, name)| Industry { slug: slug.to_string(), name: name.to_string() })
        .collect();

        let goals = vec![
            goal(
                "instagram_management",
                "Instagram Management",
                "Plan, schedule, and analyze social content",
                &["post_scheduler", "content_calendar", "hashtag_research", "audience_insights"],
            ),
            goal(
                "crm_sales",
                "CRM & Sales Pipeline",
                "Track leads and move deals forward",
                &["crm_pipeline", "lead_capture", "email_campaigns"],
            ),
            goal(
                "course_creation",
                "Courses & Community",
                "Build and sell online courses",
                &["course_builder", "student_progress", "payment_links"],
            ),
            goal(
                "ecommerce_store",
                "Online Store",
                "Sell products with a hosted storefront",
                &["storefront", "inventory_manager", "review_manager", "payment_links"],
            ),
            goal(
                "link_in_bio",
                "Link in Bio",
                "One landing page for every channel",
                &["bio_link_page", "qr_codes", "analytics_dashboard"],
            ),
            goal(
                "email_marketing",
                "Email Marketing",
                "Campaigns, broadcasts, and automations",
                &["email_campaigns", "automation_flows", "lead_capture"],
            ),
        ];

        let features = vec![
            feature("post_scheduler", "Post Scheduler", "Queue posts across social accounts", None),
            feature("content_calendar", "Content Calendar", "Month-view planning for scheduled content", None),
            feature("analytics_dashboard", "Analytics Dashboard", "Cross-channel performance overview", None),
            feature("hashtag_research", "Hashtag Research", "Surface trending and related hashtags", None),
            feature("audience_insights", "Audience Insights", "Follower demographics and engagement windows", Some("pro")),
            feature("crm_pipeline", "CRM Pipeline", "Kanban lead and deal tracking", None),
            feature("lead_capture", "Lead Capture Forms", "Embeddable forms feeding the CRM", None),
            feature("email_campaigns", "Email Campaigns", "Design and send broadcast email", None),
            feature("automation_flows", "Automation Flows", "Trigger-based multi-step automations", Some("pro")),
            feature("course_builder", "Course Builder", "Structure lessons, modules, and drip schedules", None),
            feature("student_progress", "Student Progress", "Completion tracking and certificates", None),
            feature("storefront", "Storefront", "Hosted product pages and checkout", None),
            feature("inventory_manager", "Inventory Manager", "Stock levels and low-stock alerts", None),
            feature("review_manager", "Review Manager", "Collect and publish product reviews", Some("pro")),
            feature("payment_links", "Payment Links", "Shareable one-off checkout links", None),
            feature("bio_link_page", "Bio Link Page", "Customizable link-in-bio landing page", None),
            feature("qr_codes", "QR Codes", "Branded QR codes for offline funnels", None),
            feature("team_roles", "Team Roles", "Granular member permissions per workspace", Some("business")),
        ];

        let plans = vec![
            Plan {
                slug: FREE_PLAN_SLUG.to_string(),
                name: "Free".to_string(),
                pricing_model: PricingModel::Flat,
                base_price_monthly: 0,
                base_price_yearly: 0,
                feature_price_monthly: 0,
                feature_price_yearly: 0,
                feature_cap: Some(10),
            },
            Plan {
                slug: "pro".to_string(),
                name: "Pro".to_string(),
                pricing_model: PricingModel::Flat,
                base_price_monthly: 29,
                base_price_yearly: 290,
                feature_price_monthly: 0,
                feature_price_yearly: 0,
                feature_cap: None,
            },
            Plan {
                slug: "business".to_string(),
                name: "Business".to_string(),
                pricing_model: PricingModel::FeatureBased,
                base_price_monthly: 49,
                base_price_yearly: 490,
                feature_price_monthly: 5,
                feature_price_yearly: 50,
                feature_cap: None,
            },
        ];

        Self::new(CatalogData { industries, goals, features, plans })
    }
}

fn goal(id: &str, name: &str, description: &str, feature_slugs: &[&str]) -> Goal {
    Goal {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        feature_slugs: feature_slugs.iter().map(|s| s.to_string()).collect(),
    }
}

fn feature(slug: &str, name: &str, description: &str, min_plan: Option<&str>) -> Feature {
    Feature {
        slug: slug.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        min_plan: min_plan.map(|s| s.to_string()),
    }
}

#[async_trait]
impl CatalogService for StaticCatalog {
    async fn industries(&self) -> Result<Vec<Industry>, CatalogError> {
        Ok(self.data.industries.clone())
    }

    async fn goals(&self) -> Result<Vec<Goal>, CatalogError> {
        Ok(self.data.goals.clone())
    }

    async fn features(&self) -> Result<Vec<Feature>, CatalogError> {
        Ok(self.data.features.clone())
    }

    async fn features_by_goal(&self, goal_id: &str) -> Result<Vec<Feature>, CatalogError> {
        let Some(goal) = self.data.goals.iter().find(|g| g.id == goal_id) else {
            return Ok(Vec::new());
        };
        // preserve the goal's display order; slugs missing from the feature
        // list are treated as not yet available
        Ok(goal
            .feature_slugs
            .iter()
            .filter_map(|slug| self.data.features.iter().find(|f| &f.slug == slug))
            .cloned()
            .collect())
    }

    async fn plans(&self) -> Result<Vec<Plan>, CatalogError> {
        Ok(self.data.plans.clone())
    }
}
