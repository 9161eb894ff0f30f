//! Local webhook sink.
//!
//! Stands in for the automation endpoint during local runs: validates the
//! routing fields of an action payload and echoes them back.

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::{error, info};

/// Fields every action payload must carry.
pub const REQUIRED_FIELDS: &[&str] = &["action", "contentType", "sheet", "row"];

/// Required fields that are missing, null or empty strings.
pub fn missing_fields(body: &Value) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| match body.get(field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        })
        .collect()
}

fn field_text(body: &Value, field: &str) -> String {
    match body.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Webhook sink endpoint.
pub async fn receive_webhook(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let missing = missing_fields(&body);
    if !missing.is_empty() {
        let message = format!("Missing required: {}", missing.join(", "));
        error!(missing = ?missing, "sink_missing_fields");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "ok": false, "error": message })),
        );
    }

    let action = field_text(&body, "action").to_lowercase();
    let content_type = field_text(&body, "contentType").to_lowercase();
    let sheet = body["sheet"].clone();
    let row = body["row"].clone();

    match action.as_str() {
        "approve" | "reject" | "submit" => {
            info!(
                action = %action,
                content_type = %content_type,
                sheet = %sheet,
                row = %row,
                "sink_received"
            );
        }
        _ => {
            error!(action = %action, "sink_unknown_action");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "ok": false, "error": "Unknown action" })),
            );
        }
    }

    (
        StatusCode::OK,
        Json(json!({
            "ok": true,
            "action": action,
            "contentType": content_type,
            "sheet": sheet,
            "row": row,
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields() {
        let body = json!({ "action": "approve", "contentType": "", "row": null });

        assert_eq!(missing_fields(&body), vec!["contentType", "sheet", "row"]);
    }

    #[test]
    fn test_missing_fields_accepts_numeric_row() {
        let body = json!({
            "action": "approve",
            "contentType": "news",
            "sheet": "HNN RSS",
            "row": 7
        });

        assert!(missing_fields(&body).is_empty());
    }

    #[tokio::test]
    async fn test_receive_webhook_normalizes_tags() {
        let body = json!({
            "action": "APPROVE",
            "contentType": "RssNews",
            "sheet": "HNN RSS",
            "row": 7
        });

        let (status, Json(response)) = receive_webhook(Json(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(response["action"], "approve");
        assert_eq!(response["contentType"], "rssnews");
        assert_eq!(response["row"], 7);
    }

    #[tokio::test]
    async fn test_receive_webhook_unknown_action() {
        let body = json!({
            "action": "publish",
            "contentType": "news",
            "sheet": "HNN RSS",
            "row": 3
        });

        let (status, Json(response)) = receive_webhook(Json(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "Unknown action");
    }
}
