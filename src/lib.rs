//! RKAT Approval Workflow
//!
//! Multi-stage review of annual budget proposals (RKAT): a pure workflow
//! engine, an advisory compliance scorer and a thin HTTP shell around both.
//!
//! - `workflow`: state machine, notification intents, service
//! - `compliance`: KUP policy and SBO unit-cost scoring, ruleset registry
//! - `proposal`: data model, validation, versioned in-memory store

pub mod auth;
pub mod compliance;
pub mod config;
pub mod error;
pub mod models;
pub mod principals;
pub mod proposal;
pub mod routes;
pub mod state;
pub mod workflow;

#[cfg(test)]
mod test_support;
