//! Sheet source module for the review queues.
//!
//! This module provides:
//! - GViz response parsing and URL building
//! - The per-queue column layout table
//! - Status, publish-marker and duplicate helpers
//! - Dashboard counters per queue
//! - `SheetSource` for fetching pending rows and counters
//!
//! ## Flow
//!
//! ```text
//! GViz JSON → parse_gviz() → CategoryLayout → RowItem → review gate → pending cards
//! ```

pub mod gviz;
pub mod layout;
pub mod source;
pub mod stats;
pub mod status;

pub use gviz::{gviz_url, parse_gviz, GvizTable};
pub use layout::{layout_for, CategoryLayout};
pub use source::{pending_items, SheetIds, SheetSource};
pub use stats::{queue_stats, PendingBreakdown, QueueStats};
pub use status::{normalize_status, UiStatus};

/// Error reading a review queue.
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("invalid GViz payload: no JSON object found")]
    InvalidPayload,
    #[error("invalid GViz JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("sheet request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid sheet URL: {0}")]
    Url(String),
}
