//! Proposal module - the RKAT document and its storage
//!
//! Holds the entity model shared by the workflow engine and the compliance
//! scorer, content validation, and the version-checked proposal store.

mod models;
mod store;
mod validation;

pub use models::*;
pub use store::ProposalStore;
pub use validation::{validate_content, BudgetLimits};
