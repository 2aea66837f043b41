// Route definitions for the Blockrun server

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, AppState};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/execute", post(handlers::execute))
        .route("/execute_all", post(handlers::execute_all))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_text))
}
