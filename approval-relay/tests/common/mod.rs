#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde_json::Value;
use tokio::net::TcpListener;

use approval::web::{router, AppState};
use approval::{Config, DispatchClient, RetryPolicy, SheetSource};

/// Scripted stand-in for the automation webhook and the GViz endpoint.
pub struct MockServer {
    pub addr: SocketAddr,
    state: Arc<MockState>,
}

struct MockState {
    hits: AtomicUsize,
    statuses: Vec<u16>,
    delay: Duration,
    bodies: Mutex<Vec<Value>>,
    gviz: String,
}

impl MockServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn webhook_url(&self) -> String {
        self.url("/webhook")
    }

    /// Requests received on `/webhook`.
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// JSON bodies received on `/webhook`, in arrival order.
    pub fn bodies(&self) -> Vec<Value> {
        self.state
            .bodies
            .lock()
            .map(|bodies| bodies.clone())
            .unwrap_or_default()
    }
}

/// Builder for a mock server.
pub struct MockBuilder {
    statuses: Vec<u16>,
    delay: Duration,
    gviz: String,
}

impl Default for MockBuilder {
    fn default() -> Self {
        Self {
            statuses: vec![200],
            delay: Duration::ZERO,
            gviz: gviz_response(&[]),
        }
    }
}

impl MockBuilder {
    /// Status per webhook hit; the last entry repeats.
    pub fn statuses(mut self, statuses: &[u16]) -> Self {
        self.statuses = statuses.to_vec();
        self
    }

    /// Delay before every webhook response.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Body served for every GViz request.
    pub fn gviz(mut self, body: String) -> Self {
        self.gviz = body;
        self
    }

    pub async fn spawn(self) -> MockServer {
        let state = Arc::new(MockState {
            hits: AtomicUsize::new(0),
            statuses: self.statuses,
            delay: self.delay,
            bodies: Mutex::new(Vec::new()),
            gviz: self.gviz,
        });

        let app = Router::new()
            .route("/webhook", post(webhook))
            .route("/:sheet_id/gviz/tq", get(gviz))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().expect("mock server address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server failed");
        });

        MockServer { addr, state }
    }
}

pub fn mock() -> MockBuilder {
    MockBuilder::default()
}

async fn webhook(State(state): State<Arc<MockState>>, body: Bytes) -> (StatusCode, String) {
    let hit = state.hits.fetch_add(1, Ordering::SeqCst);

    if let Ok(json) = serde_json::from_slice::<Value>(&body) {
        state.bodies.lock().expect("bodies lock").push(json);
    }

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    let status = state
        .statuses
        .get(hit)
        .or(state.statuses.last())
        .copied()
        .unwrap_or(200);

    (
        StatusCode::from_u16(status).expect("valid status"),
        format!(r#"{{"received":{}}}"#, hit + 1),
    )
}

async fn gviz(State(state): State<Arc<MockState>>, Path(_sheet_id): Path<String>) -> String {
    state.gviz.clone()
}

/// Wrap row JSON fragments in a GViz JSONP response.
pub fn gviz_response(rows: &[String]) -> String {
    format!(
        r#"/*O_o*/
google.visualization.Query.setResponse({{"version":"0.6","status":"ok","table":{{"cols":[],"rows":[{}]}}}});"#,
        rows.join(",")
    )
}

/// A GViz row for the RSS tabs.
pub fn rss_row(uid: &str, title: &str, state: &str) -> String {
    let mut cells = vec!["null".to_string(); 21];
    cells[2] = format!(r#"{{"v":"{uid}"}}"#);
    cells[5] = format!(r#"{{"v":"https://example.com/{uid}"}}"#);
    cells[9] = format!(r#"{{"v":"{title}"}}"#);
    cells[18] = format!(r#"{{"v":"{state}"}}"#);
    format!(r#"{{"c":[{}]}}"#, cells.join(","))
}

/// Retry policy with short delays so tests stay fast.
pub fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        attempts: 3,
        base_delay: Duration::from_millis(50),
        timeout: Duration::from_secs(5),
    }
}

pub fn client(endpoint: String, policy: RetryPolicy) -> DispatchClient {
    DispatchClient::new(endpoint, policy).expect("Failed to create dispatch client")
}

/// Relay API on a random port, backed by `mock` for both sheets and webhook.
pub struct TestRelay {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
}

impl TestRelay {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub async fn spawn_relay(mock: &MockServer) -> TestRelay {
    let config = Config {
        webhook_endpoint: mock.webhook_url(),
        retry_attempts: 3,
        retry_base_delay_ms: 50,
        request_timeout_ms: 5_000,
        gviz_base_url: mock.url(""),
        content_sheet_id: "content-sheet".to_string(),
        news_sheet_id: "news-sheet".to_string(),
        rss_sheet_id: "rss-sheet".to_string(),
        port: 0,
        sink_port: 0,
    };

    let http = reqwest::Client::new();
    let dispatcher =
        DispatchClient::with_http(http.clone(), config.webhook_endpoint.clone(), fast_policy());
    let sheets = SheetSource::from_config(http, &config);

    let app = router(AppState::new(dispatcher, sheets));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind relay");
    let addr = listener.local_addr().expect("relay address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("relay failed");
    });

    TestRelay {
        addr,
        client: reqwest::Client::new(),
    }
}
