mod compiled;
mod handlers;
mod kernel;
mod ledger;
mod markup;
mod metrics;
mod orchestrator;
mod routes;
mod workspace;

use axum::Router;
use blockrun_common::Config;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use orchestrator::Orchestrator;

pub struct AppState {
    pub orchestrator: Orchestrator,
    pub start_time: std::time::Instant,
    pub started_at: DateTime<Utc>,
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Blockrun server booting...");

    // Initialize metrics
    metrics::init_metrics();
    info!("Metrics registry initialized");

    let config = Config::from_env();
    info!(
        kernel_timeout_ms = config.kernel_timeout_ms,
        python_bin = %config.python_bin,
        "Loaded configuration"
    );

    let state = Arc::new(AppState {
        orchestrator: Orchestrator::new(&config),
        start_time: std::time::Instant::now(),
        started_at: Utc::now(),
    });

    // Build router
    let app = Router::new().merge(routes::routes()).with_state(state);

    // Start server
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    info!("HTTP server listening on {}", addr);
    info!("Ready to accept code blocks");

    axum::serve(listener, app).await.expect("Server error");
}
