//! Column layout per review queue.
//!
//! This is the single authoritative mapping from sheet columns to row item
//! fields. Column indices are zero-based (A = 0).

use crate::payload::ContentType;

/// Which spreadsheet document a tab lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spreadsheet {
    /// Manual content and dentistry tabs
    Content,
    /// Health news thumbnails
    News,
    /// RSS pipeline tabs
    Rss,
}

/// Which rows of a tab are waiting for an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewGate {
    /// Field reads "pending approval" (or a lenient variant)
    PendingApproval(&'static str),
    /// Field is neither YES nor NO
    Undecided(&'static str),
    /// Field reads `RSS_Success`
    RssSuccess(&'static str),
}

impl ReviewGate {
    /// Column the gate reads.
    pub fn field(&self) -> &'static str {
        match self {
            ReviewGate::PendingApproval(f)
            | ReviewGate::Undecided(f)
            | ReviewGate::RssSuccess(f) => f,
        }
    }
}

/// How the card status is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusRule {
    /// YES → Approved, NO → Rejected
    YesNo(&'static str),
    /// approved/posted → Approved, rejected → Rejected
    RssState(&'static str),
}

/// Static description of one review queue's sheet tab.
#[derive(Debug, Clone, Copy)]
pub struct CategoryLayout {
    pub content_type: ContentType,
    pub spreadsheet: Spreadsheet,
    /// Worksheet tab name, as passed to GViz
    pub tab: &'static str,
    /// Prefix for local card ids
    pub id_prefix: &'static str,
    /// Field name → column index
    pub columns: &'static [(&'static str, usize)],
    /// Fields whose cells hold publish markers and are normalized on read
    pub publish_cells: &'static [&'static str],
    pub gate: ReviewGate,
    pub status: StatusRule,
    /// A row with all of these blank is skipped
    pub required_any: &'static [&'static str],
    /// Only the most recent rows are shown
    pub recent_limit: Option<usize>,
}

impl CategoryLayout {
    pub fn column(&self, field: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, idx)| *idx)
    }
}

const CONTENT_COLUMNS: &[(&str, usize)] = &[
    ("inputText", 0),
    ("caption", 2),
    ("approval", 3),
    ("feedback", 4),
    ("imageGenerated", 5),
    ("columnHStatus", 7),
    ("imageQuery", 9),
    ("regeneratedImage", 10),
    ("uid", 13),
    ("link", 14),
    ("priority", 15),
    ("truthScore", 16),
    ("category", 17),
    ("keywords", 18),
    ("headline", 20),
    ("duplicateLink", 21),
    ("pubDate", 26),
];

const NEWS_COLUMNS: &[(&str, usize)] = &[
    ("articleTitle", 0),
    ("link", 1),
    ("pubDate", 2),
    ("articleAuthors", 3),
    ("creator", 3),
    ("imageGenerated", 6),
    ("caption", 8),
    ("approval", 9),
    ("source", 11),
    ("keywords", 18),
    ("priority", 19),
    ("category", 20),
    ("truthScore", 21),
    ("duplicateLink", 27),
];

const RSS_COLUMNS: &[(&str, usize)] = &[
    ("uid", 2),
    ("date", 3),
    ("link", 5),
    ("source", 7),
    ("creator", 8),
    ("title", 9),
    ("contentSnippet", 11),
    ("type", 12),
    ("truthScore", 13),
    ("keywords", 16),
    ("duplicateLink", 17),
    ("proceedToProduction", 18),
    ("category", 19),
    ("priority", 20),
];

const DENTISTRY_COLUMNS: &[(&str, usize)] = &[
    ("caption", 2),
    ("imageGenerated", 5),
    ("columnHStatus", 7),
    ("source", 11),
    ("link", 14),
    ("priority", 15),
    ("truthScore", 16),
    ("category", 17),
    ("keywords", 18),
    ("headline", 20),
    ("duplicateLink", 21),
    ("pubDate", 26),
];

const RSS_REQUIRED: &[&str] = &["uid", "title", "link"];

static LAYOUTS: [CategoryLayout; 6] = [
    CategoryLayout {
        content_type: ContentType::Content,
        spreadsheet: Spreadsheet::Content,
        tab: "text/image",
        id_prefix: "content",
        columns: CONTENT_COLUMNS,
        publish_cells: &["columnHStatus"],
        gate: ReviewGate::PendingApproval("columnHStatus"),
        status: StatusRule::YesNo("approval"),
        required_any: &["inputText", "headline", "caption"],
        recent_limit: None,
    },
    CategoryLayout {
        content_type: ContentType::News,
        spreadsheet: Spreadsheet::News,
        tab: "HEALTH NEWS USA- THUMBNAILS",
        id_prefix: "news",
        columns: NEWS_COLUMNS,
        publish_cells: &[],
        gate: ReviewGate::Undecided("approval"),
        status: StatusRule::YesNo("approval"),
        required_any: &["articleTitle", "caption"],
        recent_limit: Some(100),
    },
    CategoryLayout {
        content_type: ContentType::Rss,
        spreadsheet: Spreadsheet::Rss,
        tab: "Thumbnail System",
        id_prefix: "rss",
        columns: RSS_COLUMNS,
        publish_cells: &[],
        gate: ReviewGate::RssSuccess("proceedToProduction"),
        status: StatusRule::RssState("proceedToProduction"),
        required_any: RSS_REQUIRED,
        recent_limit: Some(100),
    },
    CategoryLayout {
        content_type: ContentType::RssNews,
        spreadsheet: Spreadsheet::Rss,
        tab: "HNN RSS",
        id_prefix: "hnn",
        columns: RSS_COLUMNS,
        publish_cells: &[],
        gate: ReviewGate::RssSuccess("proceedToProduction"),
        status: StatusRule::RssState("proceedToProduction"),
        required_any: RSS_REQUIRED,
        recent_limit: Some(100),
    },
    CategoryLayout {
        content_type: ContentType::RssDentistry,
        spreadsheet: Spreadsheet::Rss,
        tab: "Dental RSS",
        id_prefix: "rss-dent",
        columns: RSS_COLUMNS,
        publish_cells: &[],
        gate: ReviewGate::RssSuccess("proceedToProduction"),
        status: StatusRule::RssState("proceedToProduction"),
        required_any: RSS_REQUIRED,
        recent_limit: Some(100),
    },
    CategoryLayout {
        content_type: ContentType::Dentistry,
        spreadsheet: Spreadsheet::Content,
        tab: "DENTAL",
        id_prefix: "dent",
        columns: DENTISTRY_COLUMNS,
        publish_cells: &["columnHStatus"],
        gate: ReviewGate::PendingApproval("columnHStatus"),
        status: StatusRule::YesNo("columnHStatus"),
        required_any: &[
            "headline",
            "caption",
            "link",
            "pubDate",
            "keywords",
            "priority",
            "category",
            "truthScore",
        ],
        recent_limit: None,
    },
];

/// Layout for a review queue.
pub fn layout_for(content_type: ContentType) -> &'static CategoryLayout {
    LAYOUTS
        .iter()
        .find(|layout| layout.content_type == content_type)
        .unwrap_or(&LAYOUTS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_content_type_has_a_layout() {
        for content_type in ContentType::ALL {
            assert_eq!(layout_for(content_type).content_type, content_type);
        }
    }

    #[test]
    fn test_gate_and_status_fields_are_mapped() {
        for layout in &LAYOUTS {
            let gate_field = layout.gate.field();
            let status_field = match layout.status {
                StatusRule::YesNo(f) | StatusRule::RssState(f) => f,
            };

            assert!(layout.column(gate_field).is_some(), "{}", layout.tab);
            assert!(layout.column(status_field).is_some(), "{}", layout.tab);
            for field in layout.required_any {
                assert!(layout.column(field).is_some(), "{} {}", layout.tab, field);
            }
        }
    }

    #[test]
    fn test_rss_status_lives_in_column_s() {
        let layout = layout_for(ContentType::RssNews);

        assert_eq!(layout.column("proceedToProduction"), Some(18));
        assert_eq!(layout.tab, "HNN RSS");
    }
}
