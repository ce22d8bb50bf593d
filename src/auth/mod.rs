//! Caller identification
//!
//! Resolves the acting principal of a request. Roles are never taken from the
//! request itself; they come from the principal directory.

mod middleware;

pub use middleware::{principal_middleware, PRINCIPAL_HEADER};
