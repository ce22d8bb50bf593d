//! Workflow service
//!
//! The caller around the pure engine: load the proposal, resolve the
//! actor's role, apply, commit proposal and audit entry together, then hand
//! the notification intent to the notifier. A `Conflict` from the store is
//! returned as-is; retrying is up to the caller.

use crate::error::{ApiResult, AppError};
use crate::principals::PrincipalDirectory;
use crate::proposal::{
    validate_content, ActionKind, BudgetLimits, Proposal, ProposalContent, ProposalStore,
    ReviewAction, Role,
};
use crate::workflow::engine::{self, Actor};
use crate::workflow::notify::Notifier;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Result of a committed workflow action
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    pub proposal: Proposal,
    pub review_action: ReviewAction,
}

pub struct WorkflowService {
    store: ProposalStore,
    principals: PrincipalDirectory,
    notifier: Arc<dyn Notifier>,
    limits: BudgetLimits,
}

impl WorkflowService {
    pub fn new(
        store: ProposalStore,
        principals: PrincipalDirectory,
        notifier: Arc<dyn Notifier>,
        limits: BudgetLimits,
    ) -> Self {
        Self {
            store,
            principals,
            notifier,
            limits,
        }
    }

    pub fn store(&self) -> &ProposalStore {
        &self.store
    }

    pub fn principals(&self) -> &PrincipalDirectory {
        &self.principals
    }

    async fn actor(&self, principal_id: Uuid) -> ApiResult<Actor> {
        let role = self.principals.role_of(principal_id).await?;
        Ok(Actor { principal_id, role })
    }

    /// Create a draft owned by `principal_id`
    pub async fn create(&self, principal_id: Uuid, content: ProposalContent) -> ApiResult<Proposal> {
        let actor = self.actor(principal_id).await?;
        if actor.role != Role::Proposer {
            return Err(AppError::Unauthorized(format!(
                "Role {} may not create proposals",
                actor.role
            )));
        }
        validate_content(&content, &self.limits)?;

        let proposal = self
            .store
            .insert(Proposal::draft(principal_id, content, Utc::now()))
            .await?;
        info!(
            "📝 Created proposal '{}' (id: {}) for fiscal year {}",
            proposal.content.title, proposal.id, proposal.content.fiscal_year
        );
        Ok(proposal)
    }

    /// Run one workflow action and commit it
    pub async fn act(
        &self,
        proposal_id: Uuid,
        principal_id: Uuid,
        action: ActionKind,
        comment: Option<String>,
    ) -> ApiResult<ActionOutcome> {
        let proposal = self.store.load(proposal_id).await?;
        let actor = self.actor(principal_id).await?;

        let transition = engine::apply(&proposal, &actor, action, comment, Utc::now())?;
        let review_action = transition.action.clone();
        let committed = self.store.commit(transition.proposal, transition.action).await?;

        info!(
            proposal_id = %committed.id,
            actor = %actor.principal_id,
            role = %actor.role,
            "🔄 {}: {} -> {}",
            action, review_action.previous_status, review_action.new_status
        );
        self.notifier.notify(&transition.event);

        Ok(ActionOutcome {
            proposal: committed,
            review_action,
        })
    }

    /// Replace draft content
    pub async fn revise(
        &self,
        proposal_id: Uuid,
        principal_id: Uuid,
        content: ProposalContent,
    ) -> ApiResult<Proposal> {
        let proposal = self.store.load(proposal_id).await?;
        let actor = self.actor(principal_id).await?;
        let revised = engine::revise(&proposal, &actor, content, &self.limits, Utc::now())?;
        let committed = self.store.update_content(revised).await?;
        debug!("Revised content of proposal {} (version {})", committed.id, committed.version);
        Ok(committed)
    }

    pub async fn get(&self, proposal_id: Uuid) -> ApiResult<Proposal> {
        self.store.load(proposal_id).await
    }

    pub async fn history(&self, proposal_id: Uuid) -> ApiResult<Vec<ReviewAction>> {
        self.store.history(proposal_id).await
    }

    /// Proposals visible to a principal
    pub async fn list_for(&self, principal_id: Uuid) -> ApiResult<Vec<Proposal>> {
        let actor = self.actor(principal_id).await?;
        Ok(self.store.list_visible_to(actor.principal_id, actor.role).await)
    }

    pub async fn allowed_actions(&self, proposal_id: Uuid, principal_id: Uuid) -> ApiResult<Vec<ActionKind>> {
        let proposal = self.store.load(proposal_id).await?;
        let actor = self.actor(principal_id).await?;
        Ok(engine::allowed_actions(&proposal, &actor))
    }
}
