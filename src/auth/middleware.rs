//! Principal middleware
//!
//! Reads the acting principal from the `x-principal-id` header and makes the
//! resolved [`Principal`] available to handlers as a request extension.

use crate::error::AppError;
use crate::principals::Principal;
use crate::state::SharedState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};
use uuid::Uuid;

pub const PRINCIPAL_HEADER: &str = "x-principal-id";

/// Resolve the acting principal and insert it into request extensions
pub async fn principal_middleware(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let raw = request
        .headers()
        .get(PRINCIPAL_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::BadRequest(format!("Missing {} header", PRINCIPAL_HEADER)))?;

    let principal_id = Uuid::parse_str(raw.trim()).map_err(|_| {
        warn!("Rejected malformed principal id '{}'", raw);
        AppError::BadRequest(format!("Invalid {} header", PRINCIPAL_HEADER))
    })?;

    let principal: Principal = state.workflow.principals().find(principal_id).await?;
    debug!("Request by {} ({})", principal.name, principal.role);

    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}
