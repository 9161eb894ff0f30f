//! Relay API handlers.
//!
//! The dashboard talks to these endpoints:
//! 1. List the pending cards of a review queue
//! 2. Read the dashboard counters of a review queue
//! 3. Post an operator action, which is normalized and dispatched
//!
//! A failed dispatch is always reported as a failure so the card never flips
//! to a success state.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::dispatch::DispatchClient;
use crate::normalize::normalize;
use crate::payload::{ActionKind, ContentType, Edits, RowItem};
use crate::sheets::{QueueStats, SheetSource};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: DispatchClient,
    pub sheets: SheetSource,
}

impl AppState {
    pub fn new(dispatcher: DispatchClient, sheets: SheetSource) -> Self {
        Self { dispatcher, sheets }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Review Queues
// =============================================================================

/// Pending cards of one review queue.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
    pub count: usize,
    pub items: Vec<RowItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueueResponse {
    fn failed(status: &'static str, error: String) -> Self {
        Self {
            status,
            content_type: None,
            count: 0,
            items: Vec::new(),
            error: Some(error),
        }
    }
}

/// Queue listing endpoint.
pub async fn list_queue(
    State(state): State<AppState>,
    Path(content_type): Path<String>,
) -> (StatusCode, Json<QueueResponse>) {
    let content_type: ContentType = match content_type.parse() {
        Ok(ct) => ct,
        Err(e) => {
            warn!(content_type = %content_type, "queue_unknown_content_type");
            return (
                StatusCode::BAD_REQUEST,
                Json(QueueResponse::failed("invalid_content_type", e.to_string())),
            );
        }
    };

    match state.sheets.fetch_pending(content_type).await {
        Ok(items) => {
            info!(content_type = %content_type, count = items.len(), "queue_listed");
            (
                StatusCode::OK,
                Json(QueueResponse {
                    status: "ok",
                    content_type: Some(content_type),
                    count: items.len(),
                    items,
                    error: None,
                }),
            )
        }
        Err(e) => {
            error!(content_type = %content_type, error = %e, "queue_fetch_failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(QueueResponse::failed("sheet_error", e.to_string())),
            )
        }
    }
}

/// Dashboard counters of one review queue.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<QueueStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatsResponse {
    fn failed(status: &'static str, error: String) -> Self {
        Self {
            status,
            content_type: None,
            stats: None,
            error: Some(error),
        }
    }
}

/// Queue counters endpoint.
pub async fn queue_stats(
    State(state): State<AppState>,
    Path(content_type): Path<String>,
) -> (StatusCode, Json<StatsResponse>) {
    let content_type: ContentType = match content_type.parse() {
        Ok(ct) => ct,
        Err(e) => {
            warn!(content_type = %content_type, "stats_unknown_content_type");
            return (
                StatusCode::BAD_REQUEST,
                Json(StatsResponse::failed("invalid_content_type", e.to_string())),
            );
        }
    };

    match state.sheets.fetch_stats(content_type).await {
        Ok(stats) => (
            StatusCode::OK,
            Json(StatsResponse {
                status: "ok",
                content_type: Some(content_type),
                stats: Some(stats),
                error: None,
            }),
        ),
        Err(e) => {
            error!(content_type = %content_type, error = %e, "stats_fetch_failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(StatsResponse::failed("sheet_error", e.to_string())),
            )
        }
    }
}

// =============================================================================
// Operator Actions
// =============================================================================

/// Operator action posted by the dashboard.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub action: String,
    pub content_type: String,
    #[serde(default)]
    pub item: RowItem,
    #[serde(default)]
    pub edits: Edits,
}

/// Action response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResponse {
    fn failed(status: &'static str, error: String) -> Self {
        Self {
            status,
            http_status: None,
            body: None,
            error: Some(error),
        }
    }
}

/// Action endpoint.
///
/// This endpoint:
/// 1. Parses the action and content type tags
/// 2. Normalizes the item into an action payload (no network on failure)
/// 3. Dispatches the payload and reports the outcome
pub async fn post_action(
    State(state): State<AppState>,
    Json(request): Json<ActionRequest>,
) -> (StatusCode, Json<ActionResponse>) {
    info!(
        action = %request.action,
        content_type = %request.content_type,
        item_fields = request.item.len(),
        "action_received"
    );

    let tags = request
        .action
        .parse::<ActionKind>()
        .and_then(|action| Ok((action, request.content_type.parse::<ContentType>()?)));
    let (action, content_type) = match tags {
        Ok(tags) => tags,
        Err(e) => {
            warn!(error = %e, "action_invalid_tags");
            return (
                StatusCode::BAD_REQUEST,
                Json(ActionResponse::failed("invalid_request", e.to_string())),
            );
        }
    };

    let payload = match normalize(action, content_type, &request.item, &request.edits) {
        Ok(payload) => payload,
        Err(e) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ActionResponse::failed("missing_identifier", e.to_string())),
            );
        }
    };

    match state.dispatcher.dispatch(&payload).await {
        Ok(response) => {
            info!(
                label = %payload.label(),
                status_code = response.status,
                has_edits = payload.has_edits(),
                "action_sent"
            );
            (
                StatusCode::OK,
                Json(ActionResponse {
                    status: "sent",
                    http_status: Some(response.status),
                    body: Some(response.body),
                    error: None,
                }),
            )
        }
        Err(e) => {
            error!(label = %payload.label(), error = %e, "action_dispatch_failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ActionResponse::failed("dispatch_failed", e.to_string())),
            )
        }
    }
}
