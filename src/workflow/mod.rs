//! Approval workflow
//!
//! The pure state machine ([`engine`]), the notification intents it emits
//! ([`notify`]) and the service that commits its results ([`service`]).

pub mod engine;
pub mod notify;
pub mod service;


pub use engine::{
    allowed_actions, apply, expected_actor, next_status, pending_status_for, replay, reviewer_for,
    revise, Actor, Transition,
};
pub use notify::{Audience, LogNotifier, NotificationEvent, Notifier};
pub use service::{ActionOutcome, WorkflowService};
