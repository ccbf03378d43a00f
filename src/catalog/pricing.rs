//! Subscription cost estimator.
//!
//! Pure arithmetic over a plan's pricing model. The free plan is
//! feature-capped, not feature-priced, so it short-circuits to an all-zero
//! estimate regardless of how many features are selected. Negative yearly
//! savings on a paid plan means the pricing table itself is wrong; that is
//! a typed error, never a silent clamp.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{BillingCycle, Plan, PricingModel, FREE_PLAN_SLUG};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub monthly: u32,
    pub yearly: u32,
    /// `monthly × 12 − yearly`; meaningful for display when billing
    /// yearly, but always computed.
    pub savings: u32,
}

impl CostEstimate {
    pub const ZERO: CostEstimate = CostEstimate { monthly: 0, yearly: 0, savings: 0 };
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("pricing table error: plan '{plan}' yearly price exceeds twelve monthly payments by {excess}")]
    NegativeSavings { plan: String, excess: u32 },
}

/// Estimate the cost of a plan with the given number of selected features.
///
/// `billing_cycle` does not change the arithmetic — both cycles are always
/// reported so the UI can show the yearly savings next to the monthly
/// price — but it is part of the caller's choice and kept in the signature
/// for symmetry with the submission payload.
pub fn estimate_cost(
    plan: &Plan,
    _billing_cycle: BillingCycle,
    selected_feature_count: u32,
) -> Result<CostEstimate, PricingError> {
    if plan.slug == FREE_PLAN_SLUG {
        return Ok(CostEstimate::ZERO);
    }

    let (monthly, yearly) = match plan.pricing_model {
        PricingModel::Flat => (plan.base_price_monthly, plan.base_price_yearly),
        PricingModel::FeatureBased => (
            plan.base_price_monthly + selected_feature_count * plan.feature_price_monthly,
            plan.base_price_yearly + selected_feature_count * plan.feature_price_yearly,
        ),
    };

    let annualized = u64::from(monthly) * 12;
    let yearly_total = u64::from(yearly);
    if yearly_total > annualized {
        return Err(PricingError::NegativeSavings {
            plan: plan.slug.clone(),
            excess: (yearly_total - annualized) as u32,
        });
    }

    Ok(CostEstimate {
        monthly,
        yearly,
        savings: (annualized - yearly_total) as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_plan(slug: &str, monthly: u32, yearly: u32) -> Plan {
        Plan {
            slug: slug.to_string(),
            name: slug.to_string(),
            pricing_model: PricingModel::Flat,
            base_price_monthly: monthly,
            base_price_yearly: yearly,
            feature_price_monthly: 0,
            feature_price_yearly: 0,
            feature_cap: None,
        }
    }

    #[test]
    fn test_flat_plan_yearly_savings() {
        let plan = flat_plan("pro", 29, 290);
        let estimate = estimate_cost(&plan, BillingCycle::Yearly, 0).unwrap();
        assert_eq!(estimate, CostEstimate { monthly: 29, yearly: 290, savings: 58 });
    }

    #[test]
    fn test_feature_based_plan_scales_with_selection() {
        let plan = Plan {
            slug: "business".to_string(),
            name: "Business".to_string(),
            pricing_model: PricingModel::FeatureBased,
            base_price_monthly: 49,
            base_price_yearly: 490,
            feature_price_monthly: 5,
            feature_price_yearly: 50,
            feature_cap: None,
        };
        let estimate = estimate_cost(&plan, BillingCycle::Monthly, 4).unwrap();
        assert_eq!(estimate.monthly, 49 + 20);
        assert_eq!(estimate.yearly, 490 + 200);
        assert_eq!(estimate.savings, 69 * 12 - 690);
    }

    #[test]
    fn test_free_plan_is_zero_regardless_of_features() {
        let mut plan = flat_plan("free", 0, 0);
        // even a mispriced catalog entry must not leak a charge
        plan.base_price_monthly = 9;
        let estimate = estimate_cost(&plan, BillingCycle::Monthly, 8).unwrap();
        assert_eq!(estimate, CostEstimate::ZERO);
    }

    #[test]
    fn test_negative_savings_is_a_pricing_table_error() {
        let plan = flat_plan("pro", 10, 130);
        let err = estimate_cost(&plan, BillingCycle::Yearly, 0).unwrap_err();
        assert_eq!(err, PricingError::NegativeSavings { plan: "pro".to_string(), excess: 10 });
    }
}
