//! Static destination table and thumbnail/caption routing flags.

use crate::payload::{CaptionMode, ContentType, ThumbnailChange};

/// Fixed destination for a review queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Destination {
    /// Branch tag the automation flow switches on
    pub route: &'static str,
    /// Default worksheet tab
    pub sheet: &'static str,
    /// Whether a row-supplied `sheet` may replace the default
    pub sheet_overridable: bool,
}

/// Destination for each review queue.
pub fn destination(content_type: ContentType) -> Destination {
    match content_type {
        ContentType::Content => Destination {
            route: "content",
            sheet: "text/image",
            sheet_overridable: true,
        },
        ContentType::News => Destination {
            route: "news",
            sheet: "HEALTH NEWS USA- THUMBNAILS",
            sheet_overridable: true,
        },
        ContentType::Rss => Destination {
            route: "rssMedia",
            sheet: "Thumbnail System",
            sheet_overridable: false,
        },
        ContentType::RssNews => Destination {
            route: "rssNews",
            sheet: "HNN RSS",
            sheet_overridable: true,
        },
        ContentType::RssDentistry => Destination {
            route: "rssDentistry",
            sheet: "Dental RSS",
            sheet_overridable: true,
        },
        ContentType::Dentistry => Destination {
            route: "dentistry",
            sheet: "DENTAL",
            sheet_overridable: true,
        },
    }
}

/// Downstream work the automation flow should perform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoutingFlags {
    pub do_caption_gpt: bool,
    pub do_caption_save_user: bool,
    pub do_bannerbear: bool,
    pub do_gpt_image: bool,
    pub is_pure_reject: bool,
}

/// What the operator actually typed.
#[derive(Debug, Clone, Copy, Default)]
pub struct EditSignals {
    pub caption_mode: CaptionMode,
    pub thumbnail_change: ThumbnailChange,
    pub has_agency_override: bool,
    pub has_user_image: bool,
    pub has_user_caption: bool,
}

/// Compute routing flags from the operator's edit signals.
///
/// Bannerbear re-renders a thumbnail from an existing image; the GPT image
/// path is taken whenever a new image is wanted but none was supplied.
pub fn routing_flags(signals: &EditSignals) -> RoutingFlags {
    let mut flags = RoutingFlags {
        do_caption_gpt: signals.caption_mode == CaptionMode::Gpt,
        do_caption_save_user: signals.caption_mode == CaptionMode::User
            && signals.has_user_caption,
        ..RoutingFlags::default()
    };

    match signals.thumbnail_change {
        ThumbnailChange::Keep => flags.do_bannerbear = signals.has_agency_override,
        ThumbnailChange::Headline => flags.do_bannerbear = true,
        ThumbnailChange::Image | ThumbnailChange::Both => {
            if signals.has_user_image {
                flags.do_bannerbear = true;
            } else {
                flags.do_gpt_image = true;
            }
        }
    }

    flags.is_pure_reject = !has_edit_intent(signals);
    flags
}

/// True when at least one override was requested.
pub fn has_edit_intent(signals: &EditSignals) -> bool {
    signals.caption_mode != CaptionMode::Keep
        || signals.thumbnail_change != ThumbnailChange::Keep
        || signals.has_agency_override
}
