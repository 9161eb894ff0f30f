//! Configuration module for environment variable parsing.
//!
//! Reads all configuration from environment variables, falling back to the
//! production defaults of the dashboard.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;
use url::Url;

use crate::dispatch::RetryPolicy;

const DEFAULT_WEBHOOK_ENDPOINT: &str =
    "https://biohackyourself.app.n8n.cloud/webhook/content-action";
const DEFAULT_GVIZ_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";
const DEFAULT_CONTENT_SHEET_ID: &str = "1C1fnywWU1RMUQ4UmoKBurT7pI7WaffX2pn-6T45wVtY";
const DEFAULT_NEWS_SHEET_ID: &str = "1FNumIx65f0J1OoU8MWX4KwROQwis-TFB_rmwmr3e-WU";
const DEFAULT_RSS_SHEET_ID: &str = "1u6hNIrJM91COY54xzQrBDU6rfzrBIRpk2XhKHQawfsI";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Automation endpoint every action is posted to
    pub webhook_endpoint: String,

    /// Attempts per dispatch, including the first
    pub retry_attempts: u32,

    /// Delay before the first retry in milliseconds (doubles per retry)
    pub retry_base_delay_ms: u64,

    /// Per-attempt HTTP timeout in milliseconds
    pub request_timeout_ms: u64,

    // =========================================================================
    // Sheet Source
    // =========================================================================

    /// Base URL of the spreadsheet GViz API
    pub gviz_base_url: String,

    /// Spreadsheet holding the content and dentistry tabs
    pub content_sheet_id: String,

    /// Spreadsheet holding the health news tab
    pub news_sheet_id: String,

    /// Spreadsheet holding the RSS tabs
    pub rss_sheet_id: String,

    // =========================================================================
    // Web Servers
    // =========================================================================

    /// Port for the relay API
    pub port: u16,

    /// Port for the local webhook sink
    pub sink_port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            webhook_endpoint: parse_url("WEBHOOK_ENDPOINT", DEFAULT_WEBHOOK_ENDPOINT),

            retry_attempts: parse_var("DISPATCH_RETRY_ATTEMPTS", 3u32).max(1),

            retry_base_delay_ms: parse_var("DISPATCH_RETRY_BASE_MS", 1000),

            request_timeout_ms: parse_var("DISPATCH_TIMEOUT_MS", 30_000),

            gviz_base_url: parse_url("GVIZ_BASE_URL", DEFAULT_GVIZ_BASE_URL),

            content_sheet_id: env::var("CONTENT_SHEET_ID")
                .unwrap_or_else(|_| DEFAULT_CONTENT_SHEET_ID.to_string()),

            news_sheet_id: env::var("NEWS_SHEET_ID")
                .unwrap_or_else(|_| DEFAULT_NEWS_SHEET_ID.to_string()),

            rss_sheet_id: env::var("RSS_SHEET_ID")
                .unwrap_or_else(|_| DEFAULT_RSS_SHEET_ID.to_string()),

            port: parse_var("PORT", 8080),

            sink_port: parse_var("SINK_PORT", 3001),
        }
    }

    /// Retry policy for the dispatch client.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retry_attempts,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }
}

/// Parse an environment variable, falling back to `default` when unset or invalid.
fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }
    }
}

/// Parse an absolute http(s) URL, falling back to `default` when unset or invalid.
fn parse_url(name: &str, default: &str) -> String {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default.to_string(),
    };

    match Url::parse(raw.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => raw.trim().to_string(),
        _ => {
            warn!(env_var = name, value = %raw, "Invalid URL, using default");
            default.to_string()
        }
    }
}
