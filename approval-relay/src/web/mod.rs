//! Web server module for the relay API and the local webhook sink.
//!
//! This module provides:
//! - The relay API the dashboard calls (queue listing, counters, operator actions)
//! - A sink that stands in for the automation endpoint during local runs
//!
//! Handlers stay thin: normalization and dispatch live in their own modules.

pub mod handlers;
pub mod sink;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{
    health, list_queue, post_action, queue_stats, ActionRequest, ActionResponse, AppState,
    HealthResponse, QueueResponse, StatsResponse,
};
pub use sink::receive_webhook;

/// Router for the relay API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/queues/:content_type", get(list_queue))
        .route("/api/stats/:content_type", get(queue_stats))
        .route("/api/actions", post(post_action))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router for the local webhook sink.
pub fn sink_router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook", post(receive_webhook))
        .layer(TraceLayer::new_for_http())
}
