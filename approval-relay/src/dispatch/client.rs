//! HTTP dispatch client with retry and in-flight deduplication.
//!
//! A dispatch is identified by its signature (destination + canonical body).
//! While one is in flight, identical dispatches join it instead of issuing
//! another request. Each dispatch runs as its own task, so it completes even
//! if every caller stops waiting, and its map entry is removed when it settles.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tokio::time::sleep;
use tracing::{error, info, warn};

use super::signature::dispatch_signature;
use super::{AttemptError, DispatchError, RetryPolicy};
use crate::payload::ActionPayload;

/// Opaque response from the automation endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResponse {
    /// HTTP status code (always 2xx)
    pub status: u16,
    /// Raw response body; not contractually structured
    pub body: String,
}

type DispatchOutcome = Result<DispatchResponse, DispatchError>;
type InFlight = Shared<BoxFuture<'static, DispatchOutcome>>;

/// Client for the single automation endpoint.
///
/// Cheap to clone; clones share the HTTP pool and the in-flight map.
/// Separate `DispatchClient::new` calls never share state.
#[derive(Clone)]
pub struct DispatchClient {
    inner: Arc<DispatchInner>,
}

struct DispatchInner {
    http: Client,
    endpoint: String,
    policy: RetryPolicy,
    in_flight: Mutex<HashMap<String, InFlight>>,
}

impl DispatchClient {
    /// Create a client with its own connection pool.
    pub fn new(endpoint: impl Into<String>, policy: RetryPolicy) -> reqwest::Result<Self> {
        let http = Client::builder().pool_max_idle_per_host(16).build()?;
        Ok(Self::with_http(http, endpoint, policy))
    }

    /// Create a client on top of an existing HTTP client.
    pub fn with_http(http: Client, endpoint: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            inner: Arc::new(DispatchInner {
                http,
                endpoint: endpoint.into(),
                policy,
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    pub fn policy(&self) -> RetryPolicy {
        self.inner.policy
    }

    /// Number of dispatches currently in flight.
    pub fn in_flight_count(&self) -> usize {
        self.inner.lock_in_flight().len()
    }

    /// Deliver an action payload, labelled `contentType:action` in the logs.
    pub async fn dispatch(&self, payload: &ActionPayload) -> DispatchOutcome {
        let label = payload.label();
        self.dispatch_labeled(payload, &label).await
    }

    /// Deliver an action payload.
    ///
    /// `label` is only used for logging and does not take part in
    /// deduplication.
    pub async fn dispatch_labeled(&self, payload: &ActionPayload, label: &str) -> DispatchOutcome {
        let body =
            serde_json::to_string(payload).map_err(|e| DispatchError::Encode(e.to_string()))?;
        self.dispatch_body(body, label).await
    }

    /// Deliver an already-serialized JSON body.
    pub async fn dispatch_body(&self, body: String, label: &str) -> DispatchOutcome {
        let signature = dispatch_signature(&self.inner.endpoint, &body);

        let pending = {
            let mut in_flight = self.inner.lock_in_flight();

            if let Some(existing) = in_flight.get(&signature) {
                info!(
                    label = label,
                    signature = %signature,
                    "dispatch_duplicate_in_flight"
                );
                existing.clone()
            } else {
                let inner = Arc::clone(&self.inner);
                let guard = InFlightGuard {
                    inner: Arc::clone(&self.inner),
                    signature: signature.clone(),
                };
                let label = label.to_string();

                let task = tokio::spawn(async move {
                    let _guard = guard;
                    inner.send_with_retry(&body, &label).await
                });

                let shared = task
                    .map(|joined| {
                        joined.unwrap_or_else(|e| Err(DispatchError::Aborted(e.to_string())))
                    })
                    .boxed()
                    .shared();

                in_flight.insert(signature, shared.clone());
                shared
            }
        };

        pending.await
    }
}

impl DispatchInner {
    fn lock_in_flight(&self) -> MutexGuard<'_, HashMap<String, InFlight>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Attempt loop: retry every failure until the budget runs out.
    async fn send_with_retry(&self, body: &str, label: &str) -> DispatchOutcome {
        let started = Instant::now();
        let attempts = self.policy.attempts.max(1);

        info!(
            label = label,
            url = %self.endpoint,
            payload = %body,
            max_attempts = attempts,
            "dispatch_start"
        );

        let mut attempt = 1;
        loop {
            match self.send_once(body, label, attempt, started).await {
                Ok(response) => {
                    info!(
                        label = label,
                        attempt = attempt,
                        status_code = response.status,
                        duration_ms = started.elapsed().as_millis() as u64,
                        "dispatch_succeeded"
                    );
                    return Ok(response);
                }
                Err(err) => {
                    warn!(
                        label = label,
                        attempt = attempt,
                        max_attempts = attempts,
                        error = %err,
                        "dispatch_attempt_failed"
                    );

                    if attempt >= attempts {
                        error!(
                            label = label,
                            attempts = attempt,
                            duration_ms = started.elapsed().as_millis() as u64,
                            error = %err,
                            "dispatch_failed"
                        );
                        return Err(DispatchError::Delivery {
                            attempts: attempt,
                            last: err,
                        });
                    }

                    let delay = self.policy.backoff(attempt);
                    info!(
                        label = label,
                        attempt = attempt,
                        delay_ms = delay.as_millis() as u64,
                        "dispatch_retry_scheduled"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// One POST bounded by the per-attempt timeout.
    async fn send_once(
        &self,
        body: &str,
        label: &str,
        attempt: u32,
        started: Instant,
    ) -> Result<DispatchResponse, AttemptError> {
        info!(
            label = label,
            url = %self.endpoint,
            attempt = attempt,
            timeout_ms = self.policy.timeout.as_millis() as u64,
            "dispatch_attempt_start"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .timeout(self.policy.timeout)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        info!(
            label = label,
            attempt = attempt,
            status_code = status.as_u16(),
            duration_ms = started.elapsed().as_millis() as u64,
            response = %text,
            "dispatch_attempt_complete"
        );

        if !status.is_success() {
            return Err(AttemptError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
                body: text,
            });
        }

        Ok(DispatchResponse {
            status: status.as_u16(),
            body: text,
        })
    }

    fn classify(&self, err: reqwest::Error) -> AttemptError {
        if err.is_timeout() {
            AttemptError::Timeout(self.policy.timeout)
        } else {
            AttemptError::Network(err.to_string())
        }
    }
}

/// Removes a dispatch from the in-flight map when its task ends, including
/// on panic.
struct InFlightGuard {
    inner: Arc<DispatchInner>,
    signature: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.inner.lock_in_flight().remove(&self.signature);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client =
            DispatchClient::new("http://127.0.0.1:9/webhook", RetryPolicy::default()).unwrap();

        assert_eq!(client.endpoint(), "http://127.0.0.1:9/webhook");
        assert_eq!(client.in_flight_count(), 0);
        assert!(Arc::strong_count(&client.inner) == 1);
    }
}
