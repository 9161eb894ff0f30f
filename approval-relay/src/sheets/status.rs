//! Status, publish-marker and duplicate-marker helpers for sheet cells.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::payload::RowItem;

/// Status shown on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UiStatus {
    Pending,
    Approved,
    Rejected,
    /// Already posted or otherwise done; hidden from review
    Final,
}

impl UiStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UiStatus::Pending => "Pending",
            UiStatus::Approved => "Approved",
            UiStatus::Rejected => "Rejected",
            UiStatus::Final => "Final",
        }
    }
}

/// Map a free-form status cell to a card status. Unknown values stay pending.
pub fn normalize_status(raw: &str) -> UiStatus {
    match raw.trim().to_lowercase().as_str() {
        "approved" => UiStatus::Approved,
        "rejected" | "failed" | "error" => UiStatus::Rejected,
        "posted" | "done" | "success" | "rss_success" => UiStatus::Final,
        _ => UiStatus::Pending,
    }
}

/// Lowercase and fold runs of spaces, underscores and dashes into one space.
pub fn fold(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Review gate for manual content: the approval column asks for review.
pub fn is_pending_approval(raw: &str) -> bool {
    matches!(
        fold(raw).as_str(),
        "pending approval" | "pending" | "pending review" | "review"
    )
}

/// Review gate for RSS queues: the pipeline marked the row `RSS_Success`.
pub fn is_rss_success(raw: &str) -> bool {
    let collapsed = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    collapsed == "rss_success"
}

/// Card status from a YES/NO approval cell.
pub fn yes_no_status(raw: &str) -> UiStatus {
    match fold(raw).as_str() {
        "yes" => UiStatus::Approved,
        "no" => UiStatus::Rejected,
        _ => UiStatus::Pending,
    }
}

/// Card status from the RSS pipeline state column.
pub fn rss_state_status(raw: &str) -> UiStatus {
    match fold(raw).as_str() {
        "approved" | "posted" => UiStatus::Approved,
        "rejected" => UiStatus::Rejected,
        _ => UiStatus::Pending,
    }
}

static HYPERLINK_FORMULA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)=HYPERLINK\(\s*"([^"]+)""#).expect("valid regex"));

static HREF_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)href="([^"]+)""#).expect("valid regex"));

static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)https?://[^\s"'<>]+"#).expect("valid regex"));

/// Pull a URL out of a `=HYPERLINK("…")` formula, an `href="…"` attribute,
/// or free text.
pub fn extract_url(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    if let Some(caps) = HYPERLINK_FORMULA.captures(raw) {
        return Some(caps[1].to_string());
    }
    if let Some(caps) = HREF_ATTR.captures(raw) {
        return Some(caps[1].to_string());
    }
    BARE_URL.find(raw).map(|m| m.as_str().to_string())
}

/// Normalize a publish/approval cell: the embedded URL if any, else the trimmed text.
pub fn normalize_publish_cell(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    extract_url(trimmed).unwrap_or_else(|| trimmed.to_string())
}

static PUBLISHED_MARKERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^\d{12,22}$",
        r"(?i)^urn:li:(share|activity|ugcpost):\d+$",
        r"(?i)linkedin\.com/.*(share|activity|ugcpost)",
        r"(?i)(facebook\.com|fb\.watch|fb\.me)",
        r"(?i)(twitter\.com|x\.com)/.+/status/\d+",
        r"(?i)^https?://",
        r"(?i)\b(posted|published)\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
    .collect()
});

/// Whether a publish cell shows the post went out (post id, social URL, or "posted").
pub fn is_published(raw: &str) -> bool {
    let cell = normalize_publish_cell(raw);
    if cell.is_empty() {
        return false;
    }

    cell.split(|c: char| c == ',' || c == '|' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .any(|part| PUBLISHED_MARKERS.iter().any(|re| re.is_match(part)))
}

/// Duplicate marker shown on a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DupInfo {
    /// `YES` or `NO`
    pub tag: &'static str,
    /// Matched link/keyword, joined with ` | `
    pub reason: String,
}

/// Duplicate marker from `duplicateLink`/`duplicateKeyword` (camel or snake case).
pub fn dup_info(item: &RowItem) -> DupInfo {
    let link = item
        .first_non_empty(&["duplicateLink", "duplicate_link"])
        .unwrap_or_default();
    let keyword = item
        .first_non_empty(&["duplicateKeyword", "duplicate_keyword"])
        .unwrap_or_default();

    let reason = [link, keyword]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" | ");

    if reason.is_empty() {
        DupInfo {
            tag: "NO",
            reason,
        }
    } else {
        DupInfo {
            tag: "YES",
            reason,
        }
    }
}

/// Caption length budget.
pub const CAPTION_MAX: usize = 2000;
/// Caption length above which the card warns.
pub const CAPTION_WARN_AT: usize = 1800;

/// How close a caption is to the length budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionLevel {
    Ok,
    Warn,
    Over,
}

impl CaptionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptionLevel::Ok => "ok",
            CaptionLevel::Warn => "warn",
            CaptionLevel::Over => "over",
        }
    }
}

/// Caption length in Unicode scalar values.
pub fn caption_len(caption: &str) -> usize {
    caption.chars().count()
}

pub fn caption_level(len: usize) -> CaptionLevel {
    if len > CAPTION_MAX {
        CaptionLevel::Over
    } else if len > CAPTION_WARN_AT {
        CaptionLevel::Warn
    } else {
        CaptionLevel::Ok
    }
}
