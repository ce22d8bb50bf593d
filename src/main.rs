//! RKAT Approval Workflow API
//!
//! Budget proposals move Draft -> Submitted -> Stage 1 -> Stage 2 -> Final,
//! with rejection and revision requests possible at every review stage.

use rkat_workflow::config::Settings;
use rkat_workflow::routes::create_router;
use rkat_workflow::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!("🚀 Starting RKAT approval workflow...");

    // Load configuration
    let settings = Settings::load()?;
    info!("📋 Configuration loaded (fiscal year {})", settings.workflow.fiscal_year);
    match settings.workflow.limits.operational_ceiling() {
        Some(ceiling) => info!("💰 Operational ceiling: {:.0}", ceiling),
        None => info!("💰 Operational ceiling disabled (no prior-year benefit value)"),
    }

    let state = Arc::new(AppState::new(settings.clone()).await?);

    // Build the router
    let app = create_router(state, &settings);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("🌐 Server listening on http://{}", addr);
    info!("📚 API Endpoints (x-principal-id header required under /api):");
    info!("   POST /api/proposals                              - Create draft");
    info!("   GET  /api/proposals                              - List visible proposals");
    info!("   GET  /api/proposals/{{id}}                         - Get proposal");
    info!("   PUT  /api/proposals/{{id}}                         - Revise content");
    info!("   POST /api/proposals/{{id}}/actions                 - Submit/approve/reject/return");
    info!("   GET  /api/proposals/{{id}}/history                 - Audit trail");
    info!("   GET  /api/proposals/{{id}}/allowed-actions         - Actions available to caller");
    info!("   GET  /api/proposals/{{id}}/compliance/{{ruleset}}    - Compliance report");
    info!("   GET  /api/rulesets                               - List rulesets");
    info!("   POST /api/cost-standards/estimate                - Estimate from standard rates");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rkat_workflow=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
