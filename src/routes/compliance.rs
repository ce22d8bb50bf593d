//! Compliance route handlers

use crate::compliance::{self, ComplianceReport, Estimate, EstimateRequest, Rules, RulesetSummary};
use crate::error::{not_found_error, ApiResult, AppError};
use crate::models::SuccessResponse;
use crate::state::SharedState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesetListResponse {
    pub rulesets: Vec<RulesetSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceResponse {
    pub report: ComplianceReport,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateBody {
    /// Cost-standard ruleset to take rates from
    #[serde(default)]
    pub ruleset_id: Option<String>,
    #[serde(flatten)]
    pub request: EstimateRequest,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResponse {
    pub ruleset_id: String,
    pub estimate: Estimate,
}

/// Score a proposal against a named ruleset
pub async fn get_compliance(
    State(state): State<SharedState>,
    Path((id, ruleset_id)): Path<(Uuid, String)>,
) -> ApiResult<Json<SuccessResponse<ComplianceResponse>>> {
    let ruleset = state.rulesets.get(&ruleset_id)?;
    let proposal = state.workflow.get(id).await?;
    let report = compliance::score(&proposal, ruleset);

    Ok(Json(SuccessResponse::with_data(
        format!("Compliance level {:?}", report.level),
        ComplianceResponse { report },
    )))
}

pub async fn list_rulesets(
    State(state): State<SharedState>,
) -> ApiResult<Json<SuccessResponse<RulesetListResponse>>> {
    let rulesets = state.rulesets.list();
    Ok(Json(SuccessResponse::with_data(
        "Rulesets retrieved",
        RulesetListResponse { rulesets },
    )))
}

/// Estimate an activity budget from standard rates
pub async fn estimate_cost(
    State(state): State<SharedState>,
    Json(body): Json<EstimateBody>,
) -> ApiResult<Json<SuccessResponse<EstimateResponse>>> {
    let ruleset = match &body.ruleset_id {
        Some(id) => state.rulesets.get(id)?,
        None => state
            .rulesets
            .default_cost_standard()
            .ok_or_else(|| not_found_error("No cost-standard ruleset configured"))?,
    };

    let Rules::CostStandard(rules) = &ruleset.rules else {
        return Err(AppError::BadRequest(format!(
            "Ruleset '{}' is not a cost-standard ruleset",
            ruleset.id
        )));
    };

    let estimate = compliance::estimate(&body.request, &rules.rates);
    Ok(Json(SuccessResponse::with_data(
        "Estimate calculated",
        EstimateResponse {
            ruleset_id: ruleset.id.clone(),
            estimate,
        },
    )))
}
