//! Approval state machine
//!
//! Pure functions from (current proposal, actor, action) to the next
//! proposal, its audit entry and a notification intent. Nothing here
//! touches storage or delivers notifications; callers commit the returned
//! values atomically.
//!
//! ```text
//! Draft ─submit─▶ Submitted ─approve─▶ Stage1Approved ─approve─▶ Stage2Approved ─approve─▶ FinalApproved
//!                     │                      │                         │
//!                     ├── reject ────────────┴─────────────────────────┴──▶ Rejected
//!                     └── request_revision ──────────────────────────────▶ RevisionNeeded ─submit─▶ Submitted
//! ```

use crate::error::{ApiResult, AppError};
use crate::proposal::{
    validate_content, ActionKind, BudgetLimits, Proposal, ProposalContent, ReviewAction, Role,
    Status,
};
use crate::workflow::notify::{Audience, NotificationEvent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who is acting, with the role resolved from the principal directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub principal_id: Uuid,
    pub role: Role,
}

/// Outcome of a successful [`apply`]
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Proposal as it should be committed (same version as the input)
    pub proposal: Proposal,
    /// Audit entry to append in the same commit
    pub action: ReviewAction,
    /// Advisory intent for the notifier
    pub event: NotificationEvent,
}

/// Review role that owns a pending status
pub fn reviewer_for(status: Status) -> Option<Role> {
    match status {
        Status::Submitted => Some(Role::Stage1Reviewer),
        Status::Stage1Approved => Some(Role::Stage2Reviewer),
        Status::Stage2Approved => Some(Role::FinalApprover),
        _ => None,
    }
}

/// Status in which a review role is expected to act
pub fn pending_status_for(role: Role) -> Option<Status> {
    match role {
        Role::Stage1Reviewer => Some(Status::Submitted),
        Role::Stage2Reviewer => Some(Status::Stage1Approved),
        Role::FinalApprover => Some(Status::Stage2Approved),
        _ => None,
    }
}

/// The single transition table. `None` means the action is not legal
/// from that status.
pub fn next_status(status: Status, action: ActionKind) -> Option<Status> {
    use ActionKind::*;
    use Status::*;

    match (status, action) {
        (Draft | RevisionNeeded, Submit) => Some(Submitted),
        (Submitted, Approve) => Some(Stage1Approved),
        (Stage1Approved, Approve) => Some(Stage2Approved),
        (Stage2Approved, Approve) => Some(FinalApproved),
        (Submitted | Stage1Approved | Stage2Approved, Reject) => Some(Rejected),
        (Submitted | Stage1Approved | Stage2Approved, RequestRevision) => Some(RevisionNeeded),
        _ => None,
    }
}

/// Role expected to act once a proposal is in `status`
pub fn expected_actor(status: Status) -> Option<Role> {
    match status {
        Status::RevisionNeeded => Some(Role::Proposer),
        other => reviewer_for(other),
    }
}

/// Validate an action without producing anything. Returns the target status.
///
/// Checks run in a fixed order: terminal status, legal transition, authority.
pub fn check(proposal: &Proposal, actor: &Actor, action: ActionKind) -> ApiResult<Status> {
    if proposal.status.is_terminal() {
        return Err(AppError::AlreadyFinal(format!(
            "Proposal {} is {} and accepts no further actions",
            proposal.id, proposal.status
        )));
    }

    let next = next_status(proposal.status, action).ok_or_else(|| {
        AppError::InvalidTransition(format!(
            "Cannot {} a proposal in status {}",
            action, proposal.status
        ))
    })?;

    match action {
        ActionKind::Submit => {
            if actor.principal_id != proposal.created_by {
                return Err(AppError::Unauthorized(
                    "Only the creator of a proposal may submit it".to_string(),
                ));
            }
        }
        ActionKind::Approve | ActionKind::Reject | ActionKind::RequestRevision => {
            let required = reviewer_for(proposal.status);
            if required != Some(actor.role) {
                return Err(AppError::Unauthorized(format!(
                    "Role {} may not {} a proposal in status {}{}",
                    actor.role,
                    action,
                    proposal.status,
                    required
                        .map(|r| format!(" (requires {})", r))
                        .unwrap_or_default()
                )));
            }
        }
    }

    Ok(next)
}

/// Apply a workflow action.
///
/// The input proposal is never modified; on error nothing has changed.
/// A `now` earlier than the last update is raised to it, so timestamps never
/// run backwards along the audit trail.
pub fn apply(
    proposal: &Proposal,
    actor: &Actor,
    action: ActionKind,
    comment: Option<String>,
    now: DateTime<Utc>,
) -> ApiResult<Transition> {
    let next = check(proposal, actor, action)?;
    let previous = proposal.status;
    let now = now.max(proposal.updated_at);

    let mut updated = proposal.clone();
    updated.status = next;
    updated.current_reviewer = expected_actor(next);
    updated.updated_at = now;
    if previous == Status::Draft && updated.submitted_at.is_none() {
        updated.submitted_at = Some(now);
    }
    if next == Status::FinalApproved {
        updated.approved_at = Some(now);
    }

    let comment = comment.filter(|c| !c.trim().is_empty());

    let record = ReviewAction {
        id: Uuid::new_v4(),
        proposal_id: proposal.id,
        actor_id: actor.principal_id,
        actor_role: actor.role,
        action,
        previous_status: previous,
        new_status: next,
        comment: comment.clone(),
        created_at: now,
    };

    let audience = match updated.current_reviewer {
        Some(role) if role.is_reviewer() => Audience::Reviewers { role },
        _ => Audience::Creator {
            principal_id: proposal.created_by,
        },
    };

    let event = NotificationEvent {
        proposal_id: proposal.id,
        action,
        status: next,
        next_reviewer_role: updated.current_reviewer,
        audience,
        comment,
    };

    Ok(Transition {
        proposal: updated,
        action: record,
        event,
    })
}

/// Actions `actor` could successfully perform right now
pub fn allowed_actions(proposal: &Proposal, actor: &Actor) -> Vec<ActionKind> {
    ActionKind::ALL
        .into_iter()
        .filter(|action| check(proposal, actor, *action).is_ok())
        .collect()
}

/// Replace the owner-editable content of a proposal.
///
/// Only the creator may revise, and only while the proposal is a draft or
/// has been sent back for revision. Not an audit event.
pub fn revise(
    proposal: &Proposal,
    actor: &Actor,
    content: ProposalContent,
    limits: &BudgetLimits,
    now: DateTime<Utc>,
) -> ApiResult<Proposal> {
    if proposal.status.is_terminal() {
        return Err(AppError::AlreadyFinal(format!(
            "Proposal {} is {} and can no longer be edited",
            proposal.id, proposal.status
        )));
    }
    if !proposal.status.is_editable() {
        return Err(AppError::InvalidTransition(format!(
            "Proposal content is locked while {}",
            proposal.status
        )));
    }
    if actor.principal_id != proposal.created_by {
        return Err(AppError::Unauthorized(
            "Only the creator of a proposal may edit it".to_string(),
        ));
    }
    validate_content(&content, limits)?;

    let mut updated = proposal.clone();
    updated.content = content;
    updated.updated_at = now.max(proposal.updated_at);
    Ok(updated)
}

/// Fold an audit trail from `Draft` and return the status it leads to.
///
/// Every entry must start where the previous one ended and must be a legal
/// transition; otherwise the trail is inconsistent.
pub fn replay(history: &[ReviewAction]) -> ApiResult<Status> {
    history.iter().try_fold(Status::Draft, |status, entry| {
        if entry.previous_status != status {
            return Err(AppError::InvalidTransition(format!(
                "Audit entry {} starts from {} but the proposal was {}",
                entry.id, entry.previous_status, status
            )));
        }
        match next_status(status, entry.action) {
            Some(next) if next == entry.new_status => Ok(next),
            _ => Err(AppError::InvalidTransition(format!(
                "Audit entry {} records an illegal {} from {} to {}",
                entry.id, entry.action, entry.previous_status, entry.new_status
            ))),
        }
    })
}
