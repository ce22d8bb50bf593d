//! Content validation
//!
//! Field-level rules live on the model derives; this module adds the
//! configurable statutory ceiling on operational spending.

use crate::error::{validation_error, ApiResult};
use crate::proposal::ProposalContent;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Limits applied to proposal content on creation and revision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetLimits {
    /// Benefit value realised in the previous fiscal year; no ceiling when unset
    pub previous_year_benefit_value: Option<f64>,
    /// Share of that value operational spending may not exceed
    pub max_operational_ratio: f64,
}

impl Default for BudgetLimits {
    fn default() -> Self {
        Self {
            previous_year_benefit_value: None,
            max_operational_ratio: 0.05,
        }
    }
}

impl BudgetLimits {
    pub fn operational_ceiling(&self) -> Option<f64> {
        self.previous_year_benefit_value
            .map(|value| value * self.max_operational_ratio)
    }
}

/// Validate owner-supplied content, including the operational ceiling
pub fn validate_content(content: &ProposalContent, limits: &BudgetLimits) -> ApiResult<()> {
    content.validate()?;

    if let Some(ceiling) = limits.operational_ceiling() {
        if content.operational_budget > ceiling {
            return Err(validation_error(format!(
                "Operational budget exceeds {:.1}% limit: {:.0} > {:.0}",
                limits.max_operational_ratio * 100.0,
                content.operational_budget,
                ceiling
            )));
        }
    }

    Ok(())
}
