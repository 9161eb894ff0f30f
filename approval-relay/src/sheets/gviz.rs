//! GViz response parsing.
//!
//! The public `gviz/tq?tqx=out:json` endpoint wraps a JSON document in a
//! JavaScript callback, e.g.
//! `/*O_o*/ google.visualization.Query.setResponse({...});`

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::SheetError;

/// Top-level GViz document. Only the table is used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GvizResponse {
    #[serde(default)]
    pub table: Option<GvizTable>,
}

/// Data rows of a sheet tab; the header row is not included.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GvizTable {
    #[serde(default)]
    pub rows: Vec<GvizRow>,
}

/// One row of cells. Empty cells are `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GvizRow {
    #[serde(default)]
    pub c: Vec<Option<GvizCell>>,
}

/// A cell with a raw value `v` and an optional formatted value `f`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GvizCell {
    #[serde(default)]
    pub v: Option<Value>,
    #[serde(default)]
    pub f: Option<String>,
}

impl GvizRow {
    /// Display text of column `idx`: formatted value first, then raw value, trimmed.
    pub fn text(&self, idx: usize) -> String {
        let Some(Some(cell)) = self.c.get(idx) else {
            return String::new();
        };

        if let Some(formatted) = cell.f.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
            return formatted.to_string();
        }

        cell.v
            .as_ref()
            .map(value_text)
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

/// Render a raw cell value as text. Whole numbers lose their `.0`.
fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Extract the table from a raw GViz response body.
pub fn parse_gviz(text: &str) -> Result<GvizTable, SheetError> {
    let start = text.find('{');
    let end = text.rfind('}');

    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => return Err(SheetError::InvalidPayload),
    };

    let response: GvizResponse = serde_json::from_str(json)?;
    Ok(response.table.unwrap_or_default())
}

/// Build the GViz JSON URL for a sheet tab.
pub fn gviz_url(base_url: &str, sheet_id: &str, tab: &str) -> Result<Url, SheetError> {
    let base = format!("{}/{}/gviz/tq", base_url.trim_end_matches('/'), sheet_id);
    Url::parse_with_params(&base, &[("tqx", "out:json"), ("sheet", tab)])
        .map_err(|e| SheetError::Url(e.to_string()))
}
