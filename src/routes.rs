//! Route definitions and router setup
//!
//! Configures all API routes and middleware.

mod compliance;
mod proposal;

use crate::auth::principal_middleware;
use crate::config::Settings;
use crate::state::SharedState;
use axum::{
    http::{header, HeaderName, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::Level;

/// Create the application router with all routes and middleware
pub fn create_router(state: SharedState, settings: &Settings) -> Router {
    // Build CORS layer
    let cors = build_cors_layer(settings);

    // Build tracing/logging layer
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Build middleware stack
    let stack = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(trace_layer)
        .layer(CompressionLayer::new())
        .layer(cors)
        .propagate_x_request_id();

    // Every /api route acts on behalf of a resolved principal
    let api = Router::new()
        .route(
            "/api/proposals",
            get(proposal::list_proposals).post(proposal::create_proposal),
        )
        .route(
            "/api/proposals/{id}",
            get(proposal::get_proposal).put(proposal::revise_proposal),
        )
        .route("/api/proposals/{id}/actions", post(proposal::perform_action))
        .route("/api/proposals/{id}/history", get(proposal::get_history))
        .route(
            "/api/proposals/{id}/allowed-actions",
            get(proposal::get_allowed_actions),
        )
        .route(
            "/api/proposals/{id}/compliance/{ruleset_id}",
            get(compliance::get_compliance),
        )
        .route("/api/rulesets", get(compliance::list_rulesets))
        .route("/api/cost-standards/estimate", post(compliance::estimate_cost))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            principal_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(api)
        .layer(stack)
        .with_state(state)
}

/// Build CORS layer from settings
fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<_> = settings
        .cors
        .allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let principal_header = HeaderName::from_static(crate::auth::PRINCIPAL_HEADER);
    let cors = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        CorsLayer::new().allow_origin(origins)
    };

    cors.allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, principal_header])
        .max_age(Duration::from_secs(3600))
}

/// Health check endpoint
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "success": true,
        "message": "Server is running fine.",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::PRINCIPAL_HEADER;
    use crate::state::AppState;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    const PROPOSER: u128 = 0x1;
    const STAGE1: u128 = 0x2;
    const STAGE2: u128 = 0x3;
    const FINAL: u128 = 0x4;

    async fn app() -> Router {
        let settings = Settings::default();
        let state = Arc::new(AppState::new(settings.clone()).await.unwrap());
        create_router(state, &settings)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        principal: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(p) = principal {
            builder = builder.header(PRINCIPAL_HEADER, p);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn as_principal(id: u128) -> String {
        Uuid::from_u128(id).to_string()
    }

    fn proposal_body() -> Value {
        json!({
            "title": "RKAT Badan Pelaksana 2026",
            "totalBudget": 1_000_000_000.0,
            "operationalBudget": 400_000_000.0,
            "personnelBudget": 300_000_000.0,
            "theme": "Institutional Strengthening"
        })
    }

    async fn create(app: &Router) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/proposals",
            Some(&as_principal(PROPOSER)),
            Some(proposal_body()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["proposal"]["id"].as_str().unwrap().to_string()
    }

    async fn act(app: &Router, id: &str, principal: u128, action: &str) -> (StatusCode, Value) {
        send(
            app,
            Method::POST,
            &format!("/api/proposals/{}/actions", id),
            Some(&as_principal(principal)),
            Some(json!({ "action": action })),
        )
        .await
    }

    #[tokio::test]
    async fn test_health_needs_no_principal() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_principal_header_is_required_and_resolved() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/api/proposals", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");

        let (status, _) = send(&app, Method::GET, "/api/proposals", Some("not-a-uuid"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let unknown = Uuid::new_v4().to_string();
        let (status, body) = send(&app, Method::GET, "/api/proposals", Some(&unknown), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_create_uses_configured_fiscal_year() {
        let app = app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/proposals",
            Some(&as_principal(PROPOSER)),
            Some(proposal_body()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["proposal"]["fiscalYear"], 2026);
        assert_eq!(body["proposal"]["status"], "draft");
        assert_eq!(body["proposal"]["version"], 0);
    }

    #[tokio::test]
    async fn test_invalid_split_is_unprocessable() {
        let app = app().await;
        let mut body = proposal_body();
        body["operationalBudget"] = json!(900_000_000.0);
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/proposals",
            Some(&as_principal(PROPOSER)),
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_full_approval_over_http() {
        let app = app().await;
        let id = create(&app).await;

        let (status, body) = act(&app, &id, STAGE1, "approve").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "INVALID_TRANSITION");

        let (status, body) = act(&app, &id, PROPOSER, "submit").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["proposal"]["currentReviewer"], "stage1_reviewer");

        let (status, body) = act(&app, &id, PROPOSER, "approve").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "UNAUTHORIZED");

        act(&app, &id, STAGE1, "approve").await;
        act(&app, &id, STAGE2, "approve").await;
        let (status, body) = act(&app, &id, FINAL, "approve").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["proposal"]["status"], "final_approved");
        assert_eq!(body["reviewAction"]["previousStatus"], "stage2_approved");

        let (status, body) = act(&app, &id, FINAL, "reject").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "ALREADY_FINAL");

        let (_, body) = send(
            &app,
            Method::GET,
            &format!("/api/proposals/{}/history", id),
            Some(&as_principal(STAGE1)),
            None,
        )
        .await;
        assert_eq!(body["history"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_allowed_actions_and_listing() {
        let app = app().await;
        let id = create(&app).await;
        act(&app, &id, PROPOSER, "submit").await;

        let (_, body) = send(
            &app,
            Method::GET,
            &format!("/api/proposals/{}/allowed-actions", id),
            Some(&as_principal(STAGE1)),
            None,
        )
        .await;
        assert_eq!(body["actions"], json!(["approve", "reject", "request_revision"]));

        let (_, body) = send(&app, Method::GET, "/api/proposals", Some(&as_principal(STAGE2)), None).await;
        assert_eq!(body["total"], 0);
        let (_, body) = send(&app, Method::GET, "/api/proposals", Some(&as_principal(STAGE1)), None).await;
        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn test_revise_over_http() {
        let app = app().await;
        let id = create(&app).await;
        let mut body = proposal_body();
        body["title"] = json!("RKAT 2026 (revisi)");

        let (status, _) = send(
            &app,
            Method::PUT,
            &format!("/api/proposals/{}", id),
            Some(&as_principal(STAGE1)),
            Some(body.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, resp) = send(
            &app,
            Method::PUT,
            &format!("/api/proposals/{}", id),
            Some(&as_principal(PROPOSER)),
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp["proposal"]["title"], "RKAT 2026 (revisi)");
        assert_eq!(resp["proposal"]["version"], 1);
    }

    #[tokio::test]
    async fn test_revise_without_fiscal_year_keeps_stored_year() {
        let app = app().await;
        let mut body = proposal_body();
        body["fiscalYear"] = json!(2027);
        let (status, created) = send(
            &app,
            Method::POST,
            "/api/proposals",
            Some(&as_principal(PROPOSER)),
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["proposal"]["fiscalYear"], 2027);
        let id = created["proposal"]["id"].as_str().unwrap().to_string();

        let (status, resp) = send(
            &app,
            Method::PUT,
            &format!("/api/proposals/{}", id),
            Some(&as_principal(PROPOSER)),
            Some(proposal_body()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp["proposal"]["fiscalYear"], 2027);
    }

    #[tokio::test]
    async fn test_compliance_report_and_unknown_ruleset() {
        let app = app().await;
        let id = create(&app).await;

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/proposals/{}/compliance/kup-2026", id),
            Some(&as_principal(STAGE1)),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["report"]["totalScore"], 45);
        assert_eq!(body["report"]["level"], "POOR");

        let (status, _) = send(
            &app,
            Method::GET,
            &format!("/api/proposals/{}/compliance/kup-1999", id),
            Some(&as_principal(STAGE1)),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rulesets_and_estimate() {
        let app = app().await;
        let (_, body) = send(&app, Method::GET, "/api/rulesets", Some(&as_principal(PROPOSER)), None).await;
        assert_eq!(body["rulesets"].as_array().unwrap().len(), 2);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/cost-standards/estimate",
            Some(&as_principal(PROPOSER)),
            Some(json!({"activity": "meeting", "participants": 10, "package": "halfday"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rulesetId"], "sbo-2026");
        assert_eq!(body["estimate"]["total"], 54_500_000.0);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/cost-standards/estimate",
            Some(&as_principal(PROPOSER)),
            Some(json!({"rulesetId": "kup-2026", "activity": "travel", "travellers": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
