//! Application state management
//!
//! Contains shared state accessible across all handlers.

use crate::compliance::RulesetRegistry;
use crate::config::Settings;
use crate::error::AppError;
use crate::principals::PrincipalDirectory;
use crate::proposal::ProposalStore;
use crate::workflow::{LogNotifier, WorkflowService};
use std::sync::Arc;
use tracing::info;

/// Application state shared across all handlers
pub struct AppState {
    /// Proposal lifecycle (store, principals, notifier)
    pub workflow: WorkflowService,

    /// Rulesets available for compliance scoring
    pub rulesets: RulesetRegistry,

    pub settings: Settings,
}

impl AppState {
    /// Build state from settings: rulesets, seeded principals, empty store
    pub async fn new(settings: Settings) -> Result<Self, AppError> {
        let mut rulesets = RulesetRegistry::with_builtins();
        if let Some(path) = &settings.workflow.rulesets_path {
            rulesets.load_file(path)?;
        }
        info!("📚 {} compliance ruleset(s) available", rulesets.len());

        let principals = PrincipalDirectory::new();
        principals.seed_defaults().await?;

        let workflow = WorkflowService::new(
            ProposalStore::new(),
            principals,
            Arc::new(LogNotifier),
            settings.workflow.limits,
        );

        Ok(Self {
            workflow,
            rulesets,
            settings,
        })
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
