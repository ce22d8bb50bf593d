//! Shared fixtures for unit tests

use crate::principals::{Principal, PrincipalDirectory};
use crate::proposal::{BudgetLimits, ProposalContent, ProposalStore, Role};
use crate::workflow::{Actor, NotificationEvent, Notifier, WorkflowService};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
pub struct PrincipalIds {
    pub proposer: Uuid,
    pub other_proposer: Uuid,
    pub stage1: Uuid,
    pub stage2: Uuid,
    pub final_approver: Uuid,
    pub admin: Uuid,
}

pub fn principal_ids() -> PrincipalIds {
    PrincipalIds {
        proposer: Uuid::from_u128(0xa1),
        other_proposer: Uuid::from_u128(0xa2),
        stage1: Uuid::from_u128(0xb1),
        stage2: Uuid::from_u128(0xb2),
        final_approver: Uuid::from_u128(0xb3),
        admin: Uuid::from_u128(0xc1),
    }
}

pub struct Actors {
    pub proposer: Actor,
    pub stage1: Actor,
    pub stage2: Actor,
    pub final_approver: Actor,
    pub admin: Actor,
}

pub fn actors() -> Actors {
    let ids = principal_ids();
    let actor = |principal_id, role| Actor { principal_id, role };
    Actors {
        proposer: actor(ids.proposer, Role::Proposer),
        stage1: actor(ids.stage1, Role::Stage1Reviewer),
        stage2: actor(ids.stage2, Role::Stage2Reviewer),
        final_approver: actor(ids.final_approver, Role::FinalApprover),
        admin: actor(ids.admin, Role::Administrator),
    }
}

pub fn content() -> ProposalContent {
    ProposalContent {
        title: "RKAT BPKH 2026".to_string(),
        fiscal_year: 2026,
        total_budget: 1_000_000_000.0,
        operational_budget: 400_000_000.0,
        personnel_budget: 300_000_000.0,
        theme: "Institutional Strengthening".to_string(),
        strategic_objectives: Vec::new(),
        line_items: Vec::new(),
    }
}

/// Notifier that keeps every event for later inspection
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<NotificationEvent>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().expect("notifier lock").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: &NotificationEvent) {
        self.events.lock().expect("notifier lock").push(event.clone());
    }
}

pub async fn seeded_directory() -> PrincipalDirectory {
    let ids = principal_ids();
    let directory = PrincipalDirectory::new();
    let seeds = [
        (ids.proposer, "Badan Pelaksana", Role::Proposer),
        (ids.other_proposer, "Unit Lain", Role::Proposer),
        (ids.stage1, "Audit Internal", Role::Stage1Reviewer),
        (ids.stage2, "Komite", Role::Stage2Reviewer),
        (ids.final_approver, "Dewan Pengawas", Role::FinalApprover),
        (ids.admin, "Admin", Role::Administrator),
    ];
    for (id, name, role) in seeds {
        directory
            .register(Principal::new(id, name, role))
            .await
            .expect("seed principal");
    }
    directory
}

pub async fn seeded_service() -> (WorkflowService, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let service = WorkflowService::new(
        ProposalStore::new(),
        seeded_directory().await,
        notifier.clone(),
        BudgetLimits::default(),
    );
    (service, notifier)
}
