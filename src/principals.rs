//! Principal directory
//!
//! Resolves principal identifiers to their workflow role. Handlers never
//! trust a role asserted by the caller; they look it up here.

use crate::error::{conflict_error, not_found_error, AppError};
use crate::proposal::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// A person or service account acting in the workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Principal {
    pub fn new(id: Uuid, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            created_at: Utc::now(),
        }
    }
}

/// In-memory principal directory
pub struct PrincipalDirectory {
    principals: Arc<RwLock<HashMap<Uuid, Principal>>>,
}

impl PrincipalDirectory {
    pub fn new() -> Self {
        Self {
            principals: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a principal
    pub async fn register(&self, principal: Principal) -> Result<Principal, AppError> {
        let mut principals = self.principals.write().await;
        if principals.contains_key(&principal.id) {
            return Err(conflict_error(format!("Principal {} already registered", principal.id)));
        }
        principals.insert(principal.id, principal.clone());
        Ok(principal)
    }

    /// Find principal by ID
    pub async fn find(&self, id: Uuid) -> Result<Principal, AppError> {
        let principals = self.principals.read().await;
        principals
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found_error(format!("Principal {} not found", id)))
    }

    /// Role of a principal
    pub async fn role_of(&self, id: Uuid) -> Result<Role, AppError> {
        self.find(id).await.map(|p| p.role)
    }

    /// Register one well-known principal per role (development setups).
    /// Returns how many were newly registered.
    pub async fn seed_defaults(&self) -> Result<usize, AppError> {
        let mut seeded = 0;
        for principal in default_principals() {
            match self.register(principal).await {
                Ok(p) => {
                    info!("👤 Seeded {} principal '{}' ({})", p.role, p.name, p.id);
                    seeded += 1;
                }
                Err(AppError::Conflict(message)) => debug!("Skipped seeding: {}", message),
                Err(e) => return Err(e),
            }
        }
        Ok(seeded)
    }
}

impl Default for PrincipalDirectory {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed development principals, one per role
pub fn default_principals() -> Vec<Principal> {
    vec![
        Principal::new(Uuid::from_u128(0x1), "Badan Pelaksana", Role::Proposer),
        Principal::new(Uuid::from_u128(0x2), "Audit Internal", Role::Stage1Reviewer),
        Principal::new(Uuid::from_u128(0x3), "Komite Dewan Pengawas", Role::Stage2Reviewer),
        Principal::new(Uuid::from_u128(0x4), "Dewan Pengawas", Role::FinalApprover),
        Principal::new(Uuid::from_u128(0x5), "Administrator", Role::Administrator),
    ]
}
