//! Field resolution against a `RowItem`.
//!
//! Each target field has a fixed alias list; the first non-blank alias wins.

use crate::payload::{Lookup, RowItem};

/// Aliases for the lookup uid.
pub const UID_FIELDS: &[&str] = &["uid", "id"];
/// Aliases for the lookup link.
pub const LINK_FIELDS: &[&str] = &["link", "articleLink", "url", "sourceLink", "source"];
/// Aliases for the lookup title.
pub const TITLE_FIELDS: &[&str] = &["title", "headline", "articleTitle"];
/// Aliases for an operator-typed headline (news rewords, RSS article headlines).
pub const NEW_HEADLINE_FIELDS: &[&str] = &["newHeadline", "reword", "articleHeadline"];
/// Aliases for the headline already on the card.
pub const EXISTING_HEADLINE_FIELDS: &[&str] =
    &["thumbHeadline", "headline", "reword", "title", "articleTitle"];
/// Aliases for an agency header detected upstream.
pub const DETECTED_AGENCY_FIELDS: &[&str] =
    &["agency_header", "agencyHeaderDetected", "display_agency"];

/// Row-number candidates, in priority order.
const ROW_FIELDS: &[&str] = &["index", "rowNumber", "row"];

/// First data row; row 1 holds the sheet header.
pub const FIRST_DATA_ROW: i64 = 2;

/// Parse a cell as an integer, truncating fractions.
///
/// Blank and non-numeric text yield `None`.
pub fn to_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(|n| n.trunc() as i64)
}

/// Integer value of `key`, `None` when absent, blank or non-numeric.
pub fn int_field(item: &RowItem, key: &str) -> Option<i64> {
    item.get(key).and_then(to_int)
}

/// Resolve the 1-based sheet row.
///
/// An explicit non-zero `index`/`rowNumber`/`row` wins; otherwise the row is
/// derived from `actualArrayIndex + 2`. Anything below the first data row is
/// treated as unknown.
pub fn resolve_row(item: &RowItem) -> Option<u32> {
    let explicit = ROW_FIELDS
        .iter()
        .filter_map(|key| int_field(item, key))
        .find(|n| *n != 0);

    let row = explicit.or_else(|| {
        int_field(item, "actualArrayIndex").map(|idx| idx.saturating_add(FIRST_DATA_ROW))
    })?;

    if row < FIRST_DATA_ROW {
        return None;
    }
    u32::try_from(row).ok()
}

/// Resolve the fallback lookup keys.
pub fn resolve_lookup(item: &RowItem) -> Lookup {
    Lookup {
        uid: first_or_empty(item, UID_FIELDS),
        link: first_or_empty(item, LINK_FIELDS),
        title: first_or_empty(item, TITLE_FIELDS),
        index: int_field(item, "index")
            .map(|n| n.to_string())
            .unwrap_or_default(),
    }
}

/// First non-blank alias as an owned string, empty when none.
pub fn first_or_empty(item: &RowItem, keys: &[&str]) -> String {
    item.first_non_empty(keys).unwrap_or_default().to_string()
}

/// Trimmed single field, empty when absent.
pub fn text(item: &RowItem, key: &str) -> String {
    item.get(key).map(str::trim).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_int() {
        assert_eq!(to_int("7"), Some(7));
        assert_eq!(to_int(" 12.9 "), Some(12));
        assert_eq!(to_int(""), None);
        assert_eq!(to_int("abc"), None);
        assert_eq!(to_int("NaN"), None);
    }

    #[test]
    fn test_resolve_row_prefers_explicit() {
        let item = RowItem::new()
            .with("rowNumber", "15")
            .with("actualArrayIndex", "3");

        assert_eq!(resolve_row(&item), Some(15));
    }

    #[test]
    fn test_resolve_row_skips_zero_index() {
        let item = RowItem::new().with("index", "0").with("row", "9");

        assert_eq!(resolve_row(&item), Some(9));
    }

    #[test]
    fn test_resolve_row_from_array_index() {
        let item = RowItem::new().with("actualArrayIndex", "0");

        assert_eq!(resolve_row(&item), Some(2));
    }

    #[test]
    fn test_resolve_row_rejects_header_row() {
        assert_eq!(resolve_row(&RowItem::new().with("rowNumber", "1")), None);
        assert_eq!(resolve_row(&RowItem::new().with("row", "-4")), None);
        assert_eq!(resolve_row(&RowItem::new()), None);
    }

    #[test]
    fn test_resolve_lookup_aliases() {
        let item = RowItem::new()
            .with("id", "content-3")
            .with("articleLink", "https://example.com/x")
            .with("source", "https://fallback.example.com")
            .with("articleTitle", "Article");

        let lookup = resolve_lookup(&item);

        assert_eq!(lookup.uid, "content-3");
        assert_eq!(lookup.link, "https://example.com/x");
        assert_eq!(lookup.title, "Article");
        assert_eq!(lookup.index, "");
    }
}
