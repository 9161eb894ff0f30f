//! Action payload types for the single automation endpoint.
//!
//! This module defines:
//! - The operator decision (`ActionKind`) and review queue (`ContentType`) tags
//! - `RowItem`: a loosely-typed sheet row keyed by semantic field name
//! - `Edits`: operator overrides collected by the edit/reject dialogs
//! - `ActionPayload`: the canonical JSON object posted to n8n

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Routing Tags
// =============================================================================

/// Operator decision carried in every payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Submit,
    Approve,
    Reject,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Submit => "submit",
            ActionKind::Approve => "approve",
            ActionKind::Reject => "reject",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "submit" => Ok(ActionKind::Submit),
            "approve" => Ok(ActionKind::Approve),
            "reject" => Ok(ActionKind::Reject),
            _ => Err(TagError::UnknownAction(s.to_string())),
        }
    }
}

/// Review queue a row belongs to.
///
/// Serialized with the service-side names the automation flow branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentType {
    Content,
    News,
    Rss,
    RssNews,
    RssDentistry,
    Dentistry,
}

impl ContentType {
    /// All review queues, in dashboard tab order.
    pub const ALL: [ContentType; 6] = [
        ContentType::Content,
        ContentType::News,
        ContentType::Rss,
        ContentType::RssNews,
        ContentType::RssDentistry,
        ContentType::Dentistry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Content => "content",
            ContentType::News => "news",
            ContentType::Rss => "rss",
            ContentType::RssNews => "rssNews",
            ContentType::RssDentistry => "rssDentistry",
            ContentType::Dentistry => "dentistry",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = TagError;

    /// Case-insensitive; accepts the dashboard aliases `regenerated` and `rssMedia`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "content" | "regenerated" => Ok(ContentType::Content),
            "news" => Ok(ContentType::News),
            "rss" | "rssmedia" => Ok(ContentType::Rss),
            "rssnews" => Ok(ContentType::RssNews),
            "rssdentistry" => Ok(ContentType::RssDentistry),
            "dentistry" => Ok(ContentType::Dentistry),
            _ => Err(TagError::UnknownContentType(s.to_string())),
        }
    }
}

/// Error parsing an action or content type tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("unknown action: {0:?}")]
    UnknownAction(String),
    #[error("unknown content type: {0:?}")]
    UnknownContentType(String),
}

// =============================================================================
// Row Items
// =============================================================================

/// A sheet row as a map of semantic field name to cell text.
///
/// A missing key means the field is absent, which is distinct from a field
/// that is present but empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, Value>",
    into = "BTreeMap<String, String>"
)]
pub struct RowItem {
    fields: BTreeMap<String, String>,
}

impl RowItem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.fields.insert(key.to_string(), value.into());
    }

    /// Raw field value, `None` when absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Trimmed field value, `None` when absent or blank.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// First non-blank value among `keys`, in the given priority order.
    pub fn first_non_empty(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.non_empty(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<BTreeMap<String, Value>> for RowItem {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        let fields = raw
            .into_iter()
            .filter_map(|(key, value)| {
                let text = match value {
                    Value::Null => return None,
                    Value::String(s) => s,
                    Value::Bool(b) => b.to_string(),
                    Value::Number(n) => n.to_string(),
                    other => other.to_string(),
                };
                Some((key, text))
            })
            .collect();
        Self { fields }
    }
}

impl From<RowItem> for BTreeMap<String, String> {
    fn from(item: RowItem) -> Self {
        item.fields
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RowItem {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// =============================================================================
// Operator Edits
// =============================================================================

/// How the caption should be handled on a reject-with-edits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionMode {
    #[default]
    Keep,
    Gpt,
    User,
}

impl CaptionMode {
    /// Lenient parse of a cell or form value; anything unknown keeps the caption.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "gpt" => CaptionMode::Gpt,
            "user" => CaptionMode::User,
            _ => CaptionMode::Keep,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CaptionMode::Keep => "keep",
            CaptionMode::Gpt => "gpt",
            CaptionMode::User => "user",
        }
    }
}

/// Which parts of the thumbnail the operator asked to change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailChange {
    #[default]
    Keep,
    Headline,
    Image,
    Both,
}

impl ThumbnailChange {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "headline" => ThumbnailChange::Headline,
            "image" => ThumbnailChange::Image,
            "both" => ThumbnailChange::Both,
            _ => ThumbnailChange::Keep,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThumbnailChange::Keep => "keep",
            ThumbnailChange::Headline => "headline",
            ThumbnailChange::Image => "image",
            ThumbnailChange::Both => "both",
        }
    }
}

/// Overrides typed by the operator in the content or RSS dialogs.
///
/// Every field is optional; blank strings are treated as "not typed".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Edits {
    pub caption_mode: Option<CaptionMode>,
    pub thumbnail_change: Option<ThumbnailChange>,
    pub new_headline: Option<String>,
    pub new_image_url: Option<String>,
    pub new_caption: Option<String>,
    pub agency_header: Option<String>,
    pub new_category: Option<String>,
    pub article_title: Option<String>,
    pub article_headline: Option<String>,
    pub feedback: Option<String>,
    pub image_query: Option<String>,
    pub headline_improvements: Option<String>,
    pub caption_improvements: Option<String>,
}

// =============================================================================
// Action Payload (wire format)
// =============================================================================

/// Fallback identifiers used when the row number is not reliable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lookup {
    pub uid: String,
    pub link: String,
    pub title: String,
    pub index: String,
}

impl Lookup {
    /// Whether any lookup key is populated.
    pub fn has_key(&self) -> bool {
        [&self.uid, &self.link, &self.title, &self.index]
            .iter()
            .any(|v| !v.is_empty())
    }
}

/// The JSON object posted to the automation endpoint.
///
/// `action` and `contentType` are always present and are what the flow
/// routes on. Field order is fixed, so equal payloads serialize to equal bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPayload {
    pub action: ActionKind,
    pub content_type: ContentType,
    pub route: String,
    pub sheet: String,
    /// 1-based sheet row (row 1 is the header), `None` when unknown
    pub row: Option<u32>,
    pub lookup: Lookup,
    pub index: i64,
    pub fallback_row: i64,
    pub uid: String,
    pub id: String,
    pub link: String,
    pub title: String,

    // Edit fields
    pub caption_mode: CaptionMode,
    pub thumbnail_change: ThumbnailChange,
    pub agency_header: String,
    pub new_headline: String,
    pub new_image_url: String,
    pub new_caption: String,
    pub new_category: String,
    pub article_title: String,
    pub article_headline: String,

    // Routing flags
    #[serde(rename = "doCaptionGPT")]
    pub do_caption_gpt: bool,
    pub do_caption_save_user: bool,
    pub do_bannerbear: bool,
    #[serde(rename = "doGPTImage")]
    pub do_gpt_image: bool,
    pub is_pure_reject: bool,

    // Resolved values
    pub resolved_headline: String,
    pub resolved_image_url: String,
    pub resolved_agency_header: String,

    // Feedback
    pub feedback: String,
    #[serde(rename = "image_query")]
    pub image_query: String,
    #[serde(rename = "headline_improvements")]
    pub headline_improvements: String,
    #[serde(rename = "caption_improvements")]
    pub caption_improvements: String,
    #[serde(
        rename = "new_image_url",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub feedback_image_url: Option<String>,
}

impl ActionPayload {
    /// Label used in dispatch logs, e.g. `rss:approve`.
    pub fn label(&self) -> String {
        format!("{}:{}", self.content_type, self.action)
    }

    /// Whether the operator supplied at least one override.
    pub fn has_edits(&self) -> bool {
        !self.is_pure_reject
    }
}
