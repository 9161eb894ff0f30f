//! Dashboard counters for a review queue.
//!
//! Every non-blank row of the tab is classified by its review column into
//! exactly one bucket.

use serde::Serialize;

use super::gviz::GvizTable;
use super::layout::CategoryLayout;
use super::source::{awaiting_review, row_item};
use super::status::{fold, is_published, normalize_status, yes_no_status, UiStatus};
use crate::payload::RowItem;

/// Where a row stands, as read from its review column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    Approved,
    Published,
    AwaitingReview,
    /// Rejected and sent back for regeneration
    Rejected,
    Regenerated,
    Empty,
    Other,
}

/// Breakdown of rows that are neither approved nor published.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingBreakdown {
    pub no: usize,
    pub regenerated: usize,
    pub pending_approval: usize,
    pub empty: usize,
}

/// Counters shown on the dashboard and tracking views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    pub total: usize,
    /// Rows waiting for an operator
    pub pending: usize,
    pub approved: usize,
    pub published: usize,
    pub sent_for_regeneration: usize,
    pub pending_breakdown: PendingBreakdown,
}

impl QueueStats {
    fn record(&mut self, outcome: RowOutcome) {
        self.total += 1;
        match outcome {
            RowOutcome::Approved => self.approved += 1,
            RowOutcome::Published => self.published += 1,
            RowOutcome::AwaitingReview => {
                self.pending += 1;
                self.pending_breakdown.pending_approval += 1;
            }
            RowOutcome::Rejected => {
                self.pending_breakdown.no += 1;
                self.sent_for_regeneration += 1;
            }
            RowOutcome::Regenerated => {
                self.pending_breakdown.regenerated += 1;
                self.sent_for_regeneration += 1;
            }
            RowOutcome::Empty => self.pending_breakdown.empty += 1,
            RowOutcome::Other => {}
        }
    }
}

/// Classify one mapped row by the queue's review column.
///
/// Approval wins over a publish marker, and a publish marker wins over the
/// review gate.
pub fn classify(layout: &CategoryLayout, item: &RowItem) -> RowOutcome {
    let cell = item.get(layout.gate.field()).unwrap_or_default();

    if yes_no_status(cell) == UiStatus::Approved || normalize_status(cell) == UiStatus::Approved {
        return RowOutcome::Approved;
    }
    if is_published(cell) {
        return RowOutcome::Published;
    }
    if awaiting_review(layout, item) {
        return RowOutcome::AwaitingReview;
    }

    match fold(cell).as_str() {
        "no" | "rejected" => RowOutcome::Rejected,
        "regenerated" => RowOutcome::Regenerated,
        "" => RowOutcome::Empty,
        _ => RowOutcome::Other,
    }
}

/// Counters over every non-blank row of a table.
pub fn queue_stats(layout: &CategoryLayout, table: &GvizTable) -> QueueStats {
    table
        .rows
        .iter()
        .enumerate()
        .filter_map(|(idx, row)| row_item(layout, idx, row))
        .fold(QueueStats::default(), |mut stats, item| {
            stats.record(classify(layout, &item));
            stats
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::ContentType;
    use crate::sheets::gviz::parse_gviz;
    use crate::sheets::layout::layout_for;

    fn content_row(input: &str, column_h: &str) -> String {
        format!(
            r#"{{"c":[{{"v":"{input}"}},null,{{"v":"Caption"}},null,null,null,null,{{"v":"{column_h}"}}]}}"#
        )
    }

    fn table(rows: &[String]) -> GvizTable {
        parse_gviz(&format!(
            r#"google.visualization.Query.setResponse({{"table":{{"rows":[{}]}}}});"#,
            rows.join(",")
        ))
        .unwrap()
    }

    #[test]
    fn test_content_stats_buckets() {
        let layout = layout_for(ContentType::Content);
        let table = table(&[
            content_row("a", "YES"),
            content_row("b", "1234567890123456"),
            content_row("c", "Pending Approval"),
            content_row("d", "pending approval"),
            content_row("e", "NO"),
            content_row("f", "Regenerated"),
            content_row("g", ""),
            content_row("h", "drafting"),
            r#"{"c":[null,null,null]}"#.to_string(),
        ]);

        let stats = queue_stats(layout, &table);

        assert_eq!(stats.total, 8);
        assert_eq!(stats.approved, 1);
        assert_eq!(stats.published, 1);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.sent_for_regeneration, 2);
        assert_eq!(
            stats.pending_breakdown,
            PendingBreakdown {
                no: 1,
                regenerated: 1,
                pending_approval: 2,
                empty: 1,
            }
        );
    }

    #[test]
    fn test_rss_stats_use_state_column() {
        let layout = layout_for(ContentType::Rss);
        let row = |uid: &str, state: &str| {
            let mut item = RowItem::new().with("uid", uid).with("title", "T");
            item.insert("proceedToProduction", state);
            item
        };

        assert_eq!(classify(layout, &row("a", "RSS_Success")), RowOutcome::AwaitingReview);
        assert_eq!(classify(layout, &row("b", "approved")), RowOutcome::Approved);
        assert_eq!(classify(layout, &row("c", "posted")), RowOutcome::Published);
        assert_eq!(classify(layout, &row("d", "rejected")), RowOutcome::Rejected);
    }

    #[test]
    fn test_news_blank_approval_is_awaiting_review() {
        let layout = layout_for(ContentType::News);
        let item = RowItem::new().with("articleTitle", "Story").with("approval", "");

        assert_eq!(classify(layout, &item), RowOutcome::AwaitingReview);
    }

    #[test]
    fn test_stats_wire_shape() {
        let json = serde_json::to_value(QueueStats::default()).unwrap();

        assert_eq!(json["sentForRegeneration"], 0);
        assert_eq!(json["pendingBreakdown"]["pendingApproval"], 0);
    }
}
