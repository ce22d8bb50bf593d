//! Proposal storage
//!
//! In-memory store for proposals and their audit trail. Commits are
//! version-checked so that two callers racing on the same proposal cannot
//! both succeed from the same snapshot.

use crate::error::{conflict_error, not_found_error, AppError};
use crate::proposal::{Proposal, ReviewAction, Role};
use crate::workflow::pending_status_for;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Default)]
struct Records {
    proposals: HashMap<Uuid, Proposal>,
    history: HashMap<Uuid, Vec<ReviewAction>>,
}

/// Thread-safe proposal store
///
/// Proposals and audit entries sit behind one lock, so a commit writes
/// both or neither.
pub struct ProposalStore {
    records: Arc<RwLock<Records>>,
}

impl ProposalStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Records::default())),
        }
    }

    /// Insert a newly created proposal
    pub async fn insert(&self, proposal: Proposal) -> Result<Proposal, AppError> {
        let mut records = self.records.write().await;
        if records.proposals.contains_key(&proposal.id) {
            return Err(conflict_error(format!("Proposal {} already exists", proposal.id)));
        }
        records.history.insert(proposal.id, Vec::new());
        records.proposals.insert(proposal.id, proposal.clone());
        debug!("Stored new proposal {}", proposal.id);
        Ok(proposal)
    }

    /// Get a proposal by ID
    pub async fn load(&self, id: Uuid) -> Result<Proposal, AppError> {
        let records = self.records.read().await;
        records
            .proposals
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found_error(format!("Proposal {} not found", id)))
    }

    /// Commit a transition: the new proposal state plus its audit entry.
    ///
    /// `proposal.version` must equal the stored version (the version the
    /// caller loaded); the stored copy gets `version + 1`.
    pub async fn commit(&self, proposal: Proposal, action: ReviewAction) -> Result<Proposal, AppError> {
        if action.proposal_id != proposal.id {
            return Err(AppError::Internal(format!(
                "Audit entry for {} committed with proposal {}",
                action.proposal_id, proposal.id
            )));
        }

        let mut records = self.records.write().await;
        let committed = Self::swap_versioned(&mut records, proposal)?;
        records.history.entry(committed.id).or_default().push(action);
        Ok(committed)
    }

    /// Replace owner-editable content (no audit entry), version-checked
    pub async fn update_content(&self, proposal: Proposal) -> Result<Proposal, AppError> {
        let mut records = self.records.write().await;
        Self::swap_versioned(&mut records, proposal)
    }

    fn swap_versioned(records: &mut Records, mut proposal: Proposal) -> Result<Proposal, AppError> {
        let stored = records
            .proposals
            .get(&proposal.id)
            .ok_or_else(|| not_found_error(format!("Proposal {} not found", proposal.id)))?;

        if stored.version != proposal.version {
            warn!(
                "Stale write on proposal {}: expected version {}, found {}",
                proposal.id, proposal.version, stored.version
            );
            return Err(conflict_error(format!(
                "Proposal {} was modified concurrently (version {} is stale, current is {})",
                proposal.id, proposal.version, stored.version
            )));
        }

        proposal.version += 1;
        records.proposals.insert(proposal.id, proposal.clone());
        Ok(proposal)
    }

    /// Audit trail of a proposal in commit order
    pub async fn history(&self, id: Uuid) -> Result<Vec<ReviewAction>, AppError> {
        let records = self.records.read().await;
        if !records.proposals.contains_key(&id) {
            return Err(not_found_error(format!("Proposal {} not found", id)));
        }
        Ok(records.history.get(&id).cloned().unwrap_or_default())
    }

    /// Proposals a principal may see, newest first.
    ///
    /// Owners see their own proposals, reviewers see proposals that have
    /// reached their stage at least once, administrators see everything.
    pub async fn list_visible_to(&self, principal_id: Uuid, role: Role) -> Vec<Proposal> {
        let records = self.records.read().await;
        let mut visible: Vec<Proposal> = records
            .proposals
            .values()
            .filter(|p| match role {
                Role::Administrator => true,
                Role::Proposer => p.created_by == principal_id,
                reviewer => pending_status_for(reviewer).is_some_and(|stage| {
                    records
                        .history
                        .get(&p.id)
                        .is_some_and(|h| h.iter().any(|a| a.new_status == stage))
                }),
            })
            .cloned()
            .collect();
        visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        visible
    }
}

impl Default for ProposalStore {
    fn default() -> Self {
        Self::new()
    }
}
