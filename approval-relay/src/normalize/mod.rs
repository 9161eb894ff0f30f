//! Payload normalization.
//!
//! This module turns an operator decision on a loosely-typed row item into
//! one canonical `ActionPayload`.
//!
//! ## Processing Flow
//!
//! ```text
//! RowItem + Edits → apply_edits() → resolve row/lookup/headline → routing flags → ActionPayload
//! ```

pub mod fields;
pub mod routing;

use tracing::{info, warn};

use crate::payload::{
    ActionKind, ActionPayload, CaptionMode, ContentType, Edits, RowItem, ThumbnailChange,
};
use fields::{
    first_or_empty, int_field, resolve_lookup, resolve_row, text, DETECTED_AGENCY_FIELDS,
    EXISTING_HEADLINE_FIELDS, NEW_HEADLINE_FIELDS,
};
use routing::{destination, routing_flags, EditSignals};

pub use routing::{Destination, RoutingFlags};

/// Error raised before anything is sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error(
        "no row or lookup keys (index={index:?}, rowNumber={row_number:?}, actualArrayIndex={actual_array_index:?})"
    )]
    MissingIdentifier {
        index: Option<String>,
        row_number: Option<String>,
        actual_array_index: Option<String>,
    },
}

/// Build the action payload for one operator decision.
///
/// Only a missing identifier is an error; every optional field falls back to
/// an empty value.
pub fn normalize(
    action: ActionKind,
    content_type: ContentType,
    item: &RowItem,
    edits: &Edits,
) -> Result<ActionPayload, NormalizeError> {
    let item = apply_edits(item, edits);
    let dest = destination(content_type);

    let sheet = if dest.sheet_overridable {
        item.non_empty("sheet").unwrap_or(dest.sheet)
    } else {
        dest.sheet
    }
    .to_string();

    let row = resolve_row(&item);
    let lookup = resolve_lookup(&item);

    if row.is_none() && !lookup.has_key() {
        warn!(
            action = %action,
            content_type = %content_type,
            index = ?item.get("index"),
            row_number = ?item.get("rowNumber"),
            actual_array_index = ?item.get("actualArrayIndex"),
            "payload_missing_identifier"
        );
        return Err(NormalizeError::MissingIdentifier {
            index: item.get("index").map(str::to_string),
            row_number: item.get("rowNumber").map(str::to_string),
            actual_array_index: item.get("actualArrayIndex").map(str::to_string),
        });
    }

    let new_headline = first_or_empty(&item, NEW_HEADLINE_FIELDS);
    let existing_headline = first_or_empty(&item, EXISTING_HEADLINE_FIELDS);
    let new_image_url = text(&item, "newImageUrl");
    let new_caption = text(&item, "newCaption");
    let agency_header = text(&item, "agencyHeader").to_uppercase();

    let caption_mode = item
        .get("captionMode")
        .map(CaptionMode::parse)
        .unwrap_or_default();
    let thumbnail_change = item
        .get("thumbnailChange")
        .map(ThumbnailChange::parse)
        .unwrap_or_default();

    let signals = EditSignals {
        caption_mode,
        thumbnail_change,
        has_agency_override: !agency_header.is_empty(),
        has_user_image: !new_image_url.is_empty(),
        has_user_caption: !new_caption.is_empty(),
    };
    let flags = routing_flags(&signals);

    let resolved_headline = if new_headline.is_empty() {
        existing_headline
    } else {
        new_headline.clone()
    };
    let resolved_agency_header = if signals.has_agency_override {
        agency_header.clone()
    } else {
        first_or_empty(&item, DETECTED_AGENCY_FIELDS).to_uppercase()
    };
    let title = if resolved_headline.is_empty() {
        lookup.title.clone()
    } else {
        resolved_headline.clone()
    };

    let feedback = text(&item, "feedback");
    let feedback_image_url = feedback_image_url(&feedback);

    let payload = ActionPayload {
        action,
        content_type,
        route: dest.route.to_string(),
        sheet,
        row,
        index: int_field(&item, "index").unwrap_or(0),
        fallback_row: int_field(&item, "rowNumber").unwrap_or(0),
        uid: lookup.uid.clone(),
        id: text(&item, "id"),
        link: lookup.link.clone(),
        title,
        lookup,

        caption_mode,
        thumbnail_change,
        agency_header,
        new_headline,
        resolved_image_url: new_image_url.clone(),
        new_image_url,
        new_caption,
        new_category: text(&item, "newCategory"),
        article_title: text(&item, "articleTitle"),
        article_headline: text(&item, "articleHeadline"),

        do_caption_gpt: flags.do_caption_gpt,
        do_caption_save_user: flags.do_caption_save_user,
        do_bannerbear: flags.do_bannerbear,
        do_gpt_image: flags.do_gpt_image,
        is_pure_reject: flags.is_pure_reject,

        resolved_headline,
        resolved_agency_header,

        feedback,
        image_query: text(&item, "image_query"),
        headline_improvements: text(&item, "headline_improvements"),
        caption_improvements: text(&item, "caption_improvements"),
        feedback_image_url,
    };

    info!(
        action = %payload.action,
        content_type = %payload.content_type,
        route = %payload.route,
        sheet = %payload.sheet,
        row = ?payload.row,
        has_lookup = payload.lookup.has_key(),
        is_pure_reject = payload.is_pure_reject,
        "payload_normalized"
    );

    Ok(payload)
}

/// Overlay operator edits on a row item.
///
/// Blank overrides are ignored. A typed image URL with the thumbnail left on
/// `keep` is treated as an image change.
pub fn apply_edits(item: &RowItem, edits: &Edits) -> RowItem {
    let mut merged = item.clone();

    let typed = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let new_image_url = typed(&edits.new_image_url);
    let thumbnail_change = match (edits.thumbnail_change, &new_image_url) {
        (None | Some(ThumbnailChange::Keep), Some(_)) => Some(ThumbnailChange::Image),
        (change, _) => change,
    };

    if let Some(mode) = edits.caption_mode {
        merged.insert("captionMode", mode.as_str());
    }
    if let Some(change) = thumbnail_change {
        merged.insert("thumbnailChange", change.as_str());
    }

    let overrides = [
        ("newHeadline", typed(&edits.new_headline)),
        ("newImageUrl", new_image_url.clone()),
        ("newCaption", typed(&edits.new_caption)),
        ("agencyHeader", typed(&edits.agency_header).map(|v| v.to_uppercase())),
        ("newCategory", typed(&edits.new_category)),
        ("articleTitle", typed(&edits.article_title)),
        ("articleHeadline", typed(&edits.article_headline)),
        ("image_query", typed(&edits.image_query)),
    ];
    for (key, value) in overrides {
        if let Some(value) = value {
            merged.insert(key, value);
        }
    }

    let feedback = typed(&edits.feedback).or_else(|| {
        edits
            .caption_mode
            .map(|mode| dialog_summary(mode, thumbnail_change.unwrap_or_default(), &new_image_url))
    });
    if let Some(feedback) = feedback {
        merged.insert("feedback", feedback);
    }

    let headline_improvements = typed(&edits.headline_improvements)
        .or_else(|| typed(&edits.new_headline))
        .or_else(|| typed(&edits.article_headline));
    if let Some(value) = headline_improvements {
        merged.insert("headline_improvements", value);
    }

    let caption_improvements = typed(&edits.caption_improvements)
        .or_else(|| typed(&edits.new_caption))
        .or_else(|| typed(&edits.article_title));
    if let Some(value) = caption_improvements {
        merged.insert("caption_improvements", value);
    }

    merged
}

/// Feedback line summarizing the content dialog choices.
fn dialog_summary(
    caption_mode: CaptionMode,
    thumbnail_change: ThumbnailChange,
    image_url: &Option<String>,
) -> String {
    let mut summary = format!(
        "Caption:{} | Thumb:{}",
        caption_mode.as_str(),
        thumbnail_change.as_str()
    );
    if let Some(url) = image_url {
        summary.push_str(" | ImgURL:");
        summary.push_str(url);
    }
    summary
}

/// Trailing `ImgURL:<url>` in a feedback line.
fn feedback_image_url(feedback: &str) -> Option<String> {
    let (_, tail) = feedback.rsplit_once("ImgURL:")?;
    if tail.is_empty() || tail.chars().any(char::is_whitespace) {
        return None;
    }
    Some(tail.to_string())
}
