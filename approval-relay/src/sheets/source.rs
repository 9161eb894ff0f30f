//! Fetching review queues from Google Sheets.

use std::time::Duration;

use reqwest::Client;
use tracing::{info, warn};

use super::gviz::{gviz_url, parse_gviz, GvizRow, GvizTable};
use super::layout::{layout_for, CategoryLayout, ReviewGate, Spreadsheet, StatusRule};
use super::stats::{queue_stats, QueueStats};
use super::status::{
    caption_len, caption_level, dup_info, is_pending_approval, is_rss_success,
    normalize_publish_cell, rss_state_status, yes_no_status, UiStatus,
};
use super::SheetError;
use crate::config::Config;
use crate::normalize::fields::FIRST_DATA_ROW;
use crate::payload::{ContentType, RowItem};

/// Spreadsheet document ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetIds {
    pub content: String,
    pub news: String,
    pub rss: String,
}

impl SheetIds {
    fn get(&self, spreadsheet: Spreadsheet) -> &str {
        match spreadsheet {
            Spreadsheet::Content => &self.content,
            Spreadsheet::News => &self.news,
            Spreadsheet::Rss => &self.rss,
        }
    }
}

/// Reads review queues through the GViz endpoint.
#[derive(Clone)]
pub struct SheetSource {
    http: Client,
    base_url: String,
    ids: SheetIds,
    timeout: Duration,
}

impl SheetSource {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        ids: SheetIds,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            ids,
            timeout,
        }
    }

    /// Build a source from configuration, sharing the given HTTP client.
    pub fn from_config(http: Client, config: &Config) -> Self {
        Self::new(
            http,
            config.gviz_base_url.clone(),
            SheetIds {
                content: config.content_sheet_id.clone(),
                news: config.news_sheet_id.clone(),
                rss: config.rss_sheet_id.clone(),
            },
            Duration::from_millis(config.request_timeout_ms),
        )
    }

    /// Fetch and parse the tab behind `layout`.
    pub async fn fetch_table(&self, layout: &CategoryLayout) -> Result<GvizTable, SheetError> {
        let url = gviz_url(&self.base_url, self.ids.get(layout.spreadsheet), layout.tab)?;

        info!(
            content_type = %layout.content_type,
            tab = layout.tab,
            url = %url,
            "sheet_fetch_start"
        );

        let text = self
            .http
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let table = parse_gviz(&text).inspect_err(|e| {
            warn!(
                content_type = %layout.content_type,
                error = %e,
                body_preview = %text.chars().take(200).collect::<String>(),
                "sheet_parse_failed"
            );
        })?;

        info!(
            content_type = %layout.content_type,
            rows = table.rows.len(),
            "sheet_fetch_complete"
        );

        Ok(table)
    }

    /// Rows of a review queue that are waiting for an operator, newest first.
    pub async fn fetch_pending(
        &self,
        content_type: ContentType,
    ) -> Result<Vec<RowItem>, SheetError> {
        let layout = layout_for(content_type);
        let table = self.fetch_table(layout).await?;
        let items = pending_items(layout, &table);

        info!(
            content_type = %content_type,
            pending = items.len(),
            "sheet_pending_filtered"
        );

        Ok(items)
    }

    /// Dashboard counters over every row of a review queue.
    pub async fn fetch_stats(
        &self,
        content_type: ContentType,
    ) -> Result<QueueStats, SheetError> {
        let layout = layout_for(content_type);
        let table = self.fetch_table(layout).await?;
        let stats = queue_stats(layout, &table);

        info!(
            content_type = %content_type,
            total = stats.total,
            pending = stats.pending,
            approved = stats.approved,
            published = stats.published,
            "sheet_stats_computed"
        );

        Ok(stats)
    }
}

/// Map one sheet row to a row item, or `None` for a blank row.
///
/// `idx` is the zero-based position among data rows, so the sheet row is
/// `idx + 2`.
pub fn row_item(layout: &CategoryLayout, idx: usize, row: &GvizRow) -> Option<RowItem> {
    let mut item = RowItem::new();

    for (field, column) in layout.columns {
        let mut value = row.text(*column);
        if layout.publish_cells.contains(field) {
            value = normalize_publish_cell(&value);
        }
        item.insert(field, value);
    }

    if layout
        .required_any
        .iter()
        .all(|field| item.non_empty(field).is_none())
    {
        return None;
    }

    let status = match layout.status {
        StatusRule::YesNo(field) => yes_no_status(item.get(field).unwrap_or_default()),
        StatusRule::RssState(field) => rss_state_status(item.get(field).unwrap_or_default()),
    };
    let dup = dup_info(&item);
    let caption_length = item.get("caption").map(caption_len);

    item.insert("id", format!("{}-{}", layout.id_prefix, idx));
    item.insert("rowNumber", (idx as i64 + FIRST_DATA_ROW).to_string());
    item.insert("actualArrayIndex", idx.to_string());
    item.insert("sheet", layout.tab);
    item.insert("status", status.as_str());
    item.insert("dup", dup.tag);
    item.insert("dupReason", dup.reason);
    if let Some(len) = caption_length {
        item.insert("captionLength", len.to_string());
        item.insert("captionLevel", caption_level(len).as_str());
    }

    Some(item)
}

/// Whether a mapped row passes the queue's review gate.
pub fn awaiting_review(layout: &CategoryLayout, item: &RowItem) -> bool {
    match layout.gate {
        ReviewGate::PendingApproval(field) => {
            is_pending_approval(item.get(field).unwrap_or_default())
        }
        ReviewGate::Undecided(field) => {
            yes_no_status(item.get(field).unwrap_or_default()) == UiStatus::Pending
        }
        ReviewGate::RssSuccess(field) => is_rss_success(item.get(field).unwrap_or_default()),
    }
}

/// All rows of a table awaiting review, newest first.
pub fn pending_items(layout: &CategoryLayout, table: &GvizTable) -> Vec<RowItem> {
    let mut items: Vec<RowItem> = table
        .rows
        .iter()
        .enumerate()
        .filter_map(|(idx, row)| row_item(layout, idx, row))
        .collect();

    if let Some(limit) = layout.recent_limit {
        let skip = items.len().saturating_sub(limit);
        items.drain(..skip);
    }

    items.reverse();
    items.retain(|item| awaiting_review(layout, item));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::gviz::parse_gviz;

    fn rss_row(uid: &str, title: &str, state: &str) -> String {
        let mut cells = vec!["null".to_string(); 21];
        cells[2] = format!(r#"{{"v":"{uid}"}}"#);
        cells[5] = format!(r#"{{"v":"https://example.com/{uid}"}}"#);
        cells[9] = format!(r#"{{"v":"{title}"}}"#);
        cells[18] = format!(r#"{{"v":"{state}"}}"#);
        format!(r#"{{"c":[{}]}}"#, cells.join(","))
    }

    fn table(rows: &[String]) -> GvizTable {
        parse_gviz(&format!(
            r#"google.visualization.Query.setResponse({{"table":{{"rows":[{}]}}}});"#,
            rows.join(",")
        ))
        .unwrap()
    }

    #[test]
    fn test_rss_pending_items_gate_and_order() {
        let layout = layout_for(ContentType::Rss);
        let table = table(&[
            rss_row("a1", "First", "RSS_Success"),
            rss_row("a2", "Second", "approved"),
            rss_row("a3", "Third", "rss_success"),
        ]);

        let items = pending_items(layout, &table);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get("uid"), Some("a3"));
        assert_eq!(items[0].get("rowNumber"), Some("4"));
        assert_eq!(items[0].get("id"), Some("rss-2"));
        assert_eq!(items[0].get("sheet"), Some("Thumbnail System"));
        assert_eq!(items[1].get("uid"), Some("a1"));
        assert_eq!(items[1].get("status"), Some("Pending"));
    }

    #[test]
    fn test_rss_blank_rows_are_skipped() {
        let layout = layout_for(ContentType::RssNews);
        let blank = r#"{"c":[null,null,null]}"#.to_string();
        let table = table(&[blank, rss_row("b1", "Kept", "RSS_Success")]);

        let items = pending_items(layout, &table);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get("actualArrayIndex"), Some("1"));
    }

    #[test]
    fn test_content_gate_reads_column_h() {
        let layout = layout_for(ContentType::Content);
        let table = table(&[
            r#"{"c":[{"v":"Input one"},null,{"v":"Caption"},{"v":""},null,null,null,{"v":"Pending Approval"}]}"#.to_string(),
            r#"{"c":[{"v":"Input two"},null,{"v":"Caption"},{"v":"YES"},null,null,null,{"v":"=HYPERLINK(\"https://x.com/a/status/1\")"}]}"#.to_string(),
        ]);

        let items = pending_items(layout, &table);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get("inputText"), Some("Input one"));
        assert_eq!(items[0].get("rowNumber"), Some("2"));
        assert_eq!(items[0].get("dup"), Some("NO"));
        assert_eq!(items[0].get("dupReason"), Some(""));
        assert_eq!(items[0].get("captionLength"), Some("7"));
        assert_eq!(items[0].get("captionLevel"), Some("ok"));
    }

    #[test]
    fn test_publish_cell_is_normalized() {
        let layout = layout_for(ContentType::Content);
        let table = table(&[
            r#"{"c":[{"v":"Input"},null,null,{"v":"YES"},null,null,null,{"v":"=HYPERLINK(\"https://x.com/a/status/1\")"}]}"#.to_string(),
        ]);

        let item = row_item(layout, 0, &table.rows[0]).unwrap();

        assert_eq!(item.get("columnHStatus"), Some("https://x.com/a/status/1"));
        assert_eq!(item.get("status"), Some("Approved"));
    }

    #[test]
    fn test_card_carries_dup_reason_and_caption_level() {
        let layout = layout_for(ContentType::News);
        let caption = "x".repeat(1900);
        let mut cells = vec!["null".to_string(); 28];
        cells[0] = r#"{"v":"Story"}"#.to_string();
        cells[8] = format!(r#"{{"v":"{caption}"}}"#);
        cells[27] = r#"{"v":"https://news.example.com/old"}"#.to_string();
        let table = table(&[format!(r#"{{"c":[{}]}}"#, cells.join(","))]);

        let item = row_item(layout, 0, &table.rows[0]).unwrap();

        assert_eq!(item.get("dup"), Some("YES"));
        assert_eq!(item.get("dupReason"), Some("https://news.example.com/old"));
        assert_eq!(item.get("captionLength"), Some("1900"));
        assert_eq!(item.get("captionLevel"), Some("warn"));
    }

    #[test]
    fn test_rss_card_has_no_caption_fields() {
        let layout = layout_for(ContentType::Rss);
        let table = table(&[rss_row("a1", "First", "RSS_Success")]);

        let item = row_item(layout, 0, &table.rows[0]).unwrap();

        assert!(!item.contains("captionLength"));
        assert!(!item.contains("captionLevel"));
    }

    #[test]
    fn test_news_recent_limit_and_undecided_gate() {
        let layout = layout_for(ContentType::News);
        let rows: Vec<String> = (0..105)
            .map(|i| {
                let approval = if i == 104 { "NO" } else { "" };
                format!(
                    r#"{{"c":[{{"v":"Story {i}"}},{{"v":"https://news.example.com/{i}"}},null,null,null,null,null,null,{{"v":"Cap"}},{{"v":"{approval}"}}]}}"#
                )
            })
            .collect();

        let items = pending_items(layout, &table(&rows));

        assert_eq!(items.len(), 99);
        assert_eq!(items[0].get("articleTitle"), Some("Story 103"));
        assert_eq!(items[98].get("articleTitle"), Some("Story 5"));
    }
}
