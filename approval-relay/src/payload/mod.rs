//! Payload module for operator actions.
//!
//! This module provides:
//! - Routing tags (`ActionKind`, `ContentType`)
//! - The loosely-typed `RowItem` the dashboard hands us
//! - The canonical `ActionPayload` wire object
//!
//! ## Flow
//!
//! ```text
//! Sheet row / dashboard item → RowItem + Edits → normalize() → ActionPayload → DispatchClient
//! ```

pub mod types;

pub use types::{
    ActionKind, ActionPayload, CaptionMode, ContentType, Edits, Lookup, RowItem, TagError,
    ThumbnailChange,
};
