//! Proposal data models
//!
//! Defines the RKAT budget proposal, its line items, the reviewing roles,
//! the workflow status vocabulary and the audit record of a transition.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Six-digit budget account code (e.g. `522111`)
static ACCOUNT_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6}$").expect("valid regex"));

/// Reviewing roles, ordered along the approval chain.
///
/// `Administrator` sorts last and carries no workflow authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Prepares and submits proposals
    Proposer,
    /// First review stage (internal audit)
    Stage1Reviewer,
    /// Second review stage (supervisory committee)
    Stage2Reviewer,
    /// Final decision (supervisory board)
    FinalApprover,
    /// Administrative access only
    Administrator,
}

impl Role {
    /// Roles that own a review stage
    pub fn is_reviewer(&self) -> bool {
        matches!(self, Role::Stage1Reviewer | Role::Stage2Reviewer | Role::FinalApprover)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Proposer => write!(f, "proposer"),
            Role::Stage1Reviewer => write!(f, "stage1_reviewer"),
            Role::Stage2Reviewer => write!(f, "stage2_reviewer"),
            Role::FinalApprover => write!(f, "final_approver"),
            Role::Administrator => write!(f, "administrator"),
        }
    }
}

/// Proposal status in the approval workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Being prepared by its owner
    Draft,
    /// Awaiting first-stage review
    Submitted,
    /// Awaiting second-stage review
    Stage1Approved,
    /// Awaiting the final decision
    Stage2Approved,
    /// Approved by the final approver
    FinalApproved,
    /// Sent back to the owner for changes
    RevisionNeeded,
    /// Rejected at some review stage
    Rejected,
}

impl Default for Status {
    fn default() -> Self {
        Status::Draft
    }
}

impl Status {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::FinalApproved | Status::Rejected)
    }

    /// Content fields may only change in these statuses
    pub fn is_editable(&self) -> bool {
        matches!(self, Status::Draft | Status::RevisionNeeded)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Status::Draft => "draft",
            Status::Submitted => "submitted",
            Status::Stage1Approved => "stage1_approved",
            Status::Stage2Approved => "stage2_approved",
            Status::FinalApproved => "final_approved",
            Status::RevisionNeeded => "revision_needed",
            Status::Rejected => "rejected",
        };
        write!(f, "{}", s)
    }
}

/// What a principal asks the workflow to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Submit,
    Approve,
    Reject,
    RequestRevision,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Submit,
        ActionKind::Approve,
        ActionKind::Reject,
        ActionKind::RequestRevision,
    ];
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Submit => write!(f, "submit"),
            ActionKind::Approve => write!(f, "approve"),
            ActionKind::Reject => write!(f, "reject"),
            ActionKind::RequestRevision => write!(f, "request_revision"),
        }
    }
}

/// References to the documents every line item must carry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportingDocuments {
    /// Terms of reference (KAK)
    pub justification: Option<String>,
    /// Cost breakdown (RAB)
    pub cost_breakdown: Option<String>,
    pub timeline: Option<String>,
}

impl SupportingDocuments {
    pub const REQUIRED: usize = 3;

    /// Number of references that are set and not blank
    pub fn present_count(&self) -> usize {
        [&self.justification, &self.cost_breakdown, &self.timeline]
            .into_iter()
            .filter(|doc| doc.as_deref().is_some_and(|d| !d.trim().is_empty()))
            .count()
    }
}

/// One budgeted activity of a proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[validate(custom(function = "validate_account_code"))]
    pub code: String,
    #[validate(length(min = 1, max = 200, message = "Line item name must be between 1 and 200 characters"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "Line item amount must not be negative"))]
    pub amount: f64,
    #[serde(default)]
    pub documents: SupportingDocuments,
}

/// The owner-editable part of a proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_budget_split"))]
pub struct ProposalContent {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    #[validate(range(min = 2000, max = 2100, message = "Fiscal year must be between 2000 and 2100"))]
    pub fiscal_year: i32,
    #[validate(range(min = 0.0, message = "Total budget must not be negative"))]
    pub total_budget: f64,
    #[validate(range(min = 0.0, message = "Operational budget must not be negative"))]
    pub operational_budget: f64,
    #[validate(range(min = 0.0, message = "Personnel budget must not be negative"))]
    pub personnel_budget: f64,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub strategic_objectives: Vec<String>,
    #[serde(default)]
    #[validate(nested)]
    pub line_items: Vec<LineItem>,
}

/// An RKAT budget proposal under review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: Uuid,
    /// Principal who created (and owns) the proposal
    pub created_by: Uuid,
    #[serde(flatten)]
    pub content: ProposalContent,
    pub status: Status,
    /// Role expected to act next, if anyone
    pub current_reviewer: Option<Role>,
    /// Store revision used for optimistic concurrency
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
}

impl Proposal {
    /// Create a new draft. Content is expected to be validated by the caller.
    pub fn draft(created_by: Uuid, content: ProposalContent, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_by,
            content,
            status: Status::Draft,
            current_reviewer: None,
            version: 0,
            created_at: now,
            updated_at: now,
            submitted_at: None,
            approved_at: None,
        }
    }
}

/// Immutable audit record of one successful transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAction {
    pub id: Uuid,
    pub proposal_id: Uuid,
    pub actor_id: Uuid,
    /// Role of the actor at the time of the action
    pub actor_role: Role,
    pub action: ActionKind,
    pub previous_status: Status,
    pub new_status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn validate_account_code(code: &str) -> Result<(), ValidationError> {
    if !ACCOUNT_CODE.is_match(code) {
        let mut err = ValidationError::new("invalid_account_code");
        err.message = Some("Line item code must be a 6-digit account code".into());
        return Err(err);
    }
    Ok(())
}

fn validate_budget_split(content: &ProposalContent) -> Result<(), ValidationError> {
    if content.title.trim().is_empty() {
        let mut err = ValidationError::new("blank_title");
        err.message = Some("Title must not be blank".into());
        return Err(err);
    }

    let amounts = [content.total_budget, content.operational_budget, content.personnel_budget];
    let item_amounts = content.line_items.iter().map(|item| item.amount);
    if amounts.iter().copied().chain(item_amounts).any(|a| !a.is_finite()) {
        let mut err = ValidationError::new("non_finite_amount");
        err.message = Some("Budget amounts must be finite numbers".into());
        return Err(err);
    }

    // a few ulps of slack so that e.g. 0.1 + 0.2 fits a total of 0.3
    let slack = content.total_budget.abs().max(1.0) * f64::EPSILON * 4.0;
    if content.operational_budget + content.personnel_budget - content.total_budget > slack {
        let mut err = ValidationError::new("budget_split");
        err.message = Some(
            format!(
                "Operational ({:.0}) plus personnel ({:.0}) budget exceeds total budget ({:.0})",
                content.operational_budget, content.personnel_budget, content.total_budget
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}
