//! Notification intents
//!
//! The engine only describes who has to hear about a transition. Delivery
//! (mail, chat, queues) belongs to whatever implements [`Notifier`].

use crate::proposal::{ActionKind, Role, Status};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Who a notification is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Audience {
    /// Every principal holding the role that must act next
    Reviewers { role: Role },
    /// The proposal's creator
    #[serde(rename_all = "camelCase")]
    Creator { principal_id: Uuid },
}

/// Emitted after every successful transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    pub proposal_id: Uuid,
    pub action: ActionKind,
    pub status: Status,
    /// Role expected to act next; `None` once the proposal is final
    pub next_reviewer_role: Option<Role>,
    pub audience: Audience,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl NotificationEvent {
    /// Short human-readable subject line
    pub fn subject(&self) -> String {
        let outcome = match (self.action, self.status) {
            (ActionKind::Submit, _) => "awaits review",
            (ActionKind::Approve, Status::FinalApproved) => "was approved",
            (ActionKind::Approve, _) => "advanced to the next review stage",
            (ActionKind::Reject, _) => "was rejected",
            (ActionKind::RequestRevision, _) => "requires revision",
        };
        format!("RKAT {} {}", self.proposal_id, outcome)
    }
}

/// Receives notification intents once a transition is committed
pub trait Notifier: Send + Sync {
    fn notify(&self, event: &NotificationEvent);
}

/// Notifier that records every intent as a structured log event
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: &NotificationEvent) {
        info!(
            proposal_id = %event.proposal_id,
            action = %event.action,
            status = %event.status,
            next_reviewer_role = ?event.next_reviewer_role,
            audience = ?event.audience,
            "📨 {}",
            event.subject()
        );
    }
}
