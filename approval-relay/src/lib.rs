//! Approval Relay - content moderation action relay.
//!
//! This library provides shared modules for the two binaries:
//! - `approval-relay`: API the review dashboard calls to list queues and post decisions
//! - `approval-sink`: Local stand-in for the automation webhook
//!
//! ## Architecture
//!
//! ```text
//! Sheets (GViz) → SheetSource → dashboard → normalize() → DispatchClient → automation webhook
//! ```

pub mod config;
pub mod dispatch;
pub mod normalize;
pub mod payload;
pub mod sheets;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use dispatch::{DispatchClient, DispatchError, DispatchResponse, RetryPolicy};
pub use normalize::{normalize, NormalizeError};
pub use payload::{ActionKind, ActionPayload, ContentType, Edits, RowItem};
pub use sheets::SheetSource;
pub use web::AppState;
