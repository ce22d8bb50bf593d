//! Proposal route handlers
//!
//! Creation, revision, workflow actions and audit trail of RKAT proposals.

use crate::error::ApiResult;
use crate::models::SuccessResponse;
use crate::principals::Principal;
use crate::proposal::{ActionKind, LineItem, Proposal, ProposalContent, ReviewAction};
use crate::state::SharedState;
use crate::workflow::ActionOutcome;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

// =============================================================================
// REQUEST/RESPONSE TYPES
// =============================================================================

/// Proposal content as submitted by its owner
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRequest {
    pub title: String,
    /// Defaults to the configured fiscal year
    pub fiscal_year: Option<i32>,
    pub total_budget: f64,
    pub operational_budget: f64,
    pub personnel_budget: f64,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub strategic_objectives: Vec<String>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

impl ProposalRequest {
    fn into_content(self, default_fiscal_year: i32) -> ProposalContent {
        ProposalContent {
            title: self.title,
            fiscal_year: self.fiscal_year.unwrap_or(default_fiscal_year),
            total_budget: self.total_budget,
            operational_budget: self.operational_budget,
            personnel_budget: self.personnel_budget,
            theme: self.theme,
            strategic_objectives: self.strategic_objectives,
            line_items: self.line_items,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub action: ActionKind,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalResponse {
    pub proposal: Proposal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalListResponse {
    pub proposals: Vec<Proposal>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub history: Vec<ReviewAction>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedActionsResponse {
    pub actions: Vec<ActionKind>,
}

// =============================================================================
// HANDLERS
// =============================================================================

/// Create a draft proposal
pub async fn create_proposal(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<ProposalRequest>,
) -> ApiResult<(StatusCode, Json<SuccessResponse<ProposalResponse>>)> {
    let content = req.into_content(state.settings.workflow.fiscal_year);
    let proposal = state.workflow.create(principal.id, content).await?;

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data(
            "Proposal created",
            ProposalResponse { proposal },
        )),
    ))
}

/// List proposals visible to the caller
pub async fn list_proposals(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<SuccessResponse<ProposalListResponse>>> {
    let proposals = state.workflow.list_for(principal.id).await?;
    debug!("{} proposal(s) visible to {}", proposals.len(), principal.id);

    Ok(Json(SuccessResponse::with_data(
        "Proposals retrieved",
        ProposalListResponse {
            total: proposals.len(),
            proposals,
        },
    )))
}

pub async fn get_proposal(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SuccessResponse<ProposalResponse>>> {
    let proposal = state.workflow.get(id).await?;
    Ok(Json(SuccessResponse::with_data(
        "Proposal retrieved",
        ProposalResponse { proposal },
    )))
}

/// Replace the content of a draft or returned proposal
pub async fn revise_proposal(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(req): Json<ProposalRequest>,
) -> ApiResult<Json<SuccessResponse<ProposalResponse>>> {
    // an omitted fiscal year keeps the stored one
    let current = state.workflow.get(id).await?;
    let content = req.into_content(current.content.fiscal_year);
    let proposal = state.workflow.revise(id, principal.id, content).await?;

    Ok(Json(SuccessResponse::with_data(
        "Proposal updated",
        ProposalResponse { proposal },
    )))
}

/// Submit, approve, reject or return a proposal
pub async fn perform_action(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(req): Json<ActionRequest>,
) -> ApiResult<Json<SuccessResponse<ActionOutcome>>> {
    let outcome = state
        .workflow
        .act(id, principal.id, req.action, req.comment)
        .await?;

    Ok(Json(SuccessResponse::with_data(
        format!("Proposal is now {}", outcome.proposal.status),
        outcome,
    )))
}

pub async fn get_history(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SuccessResponse<HistoryResponse>>> {
    let history = state.workflow.history(id).await?;
    Ok(Json(SuccessResponse::with_data(
        "History retrieved",
        HistoryResponse { history },
    )))
}

/// Actions the caller may take on a proposal right now
pub async fn get_allowed_actions(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SuccessResponse<AllowedActionsResponse>>> {
    let actions = state.workflow.allowed_actions(id, principal.id).await?;
    Ok(Json(SuccessResponse::with_data(
        "Allowed actions retrieved",
        AllowedActionsResponse { actions },
    )))
}
