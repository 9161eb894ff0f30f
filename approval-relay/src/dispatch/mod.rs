//! Webhook dispatch module.
//!
//! This module provides:
//! - `DispatchClient`: POSTs action payloads to the automation endpoint
//! - `RetryPolicy`: attempt budget, backoff and per-attempt timeout
//! - Error types separating a single failed attempt from an exhausted dispatch
//!
//! ## Request Lifecycle
//!
//! ```text
//! Idle → Sending → Success
//!           ↓
//!        Retrying → Sending → ... → Failed (after the attempt budget)
//! ```

pub mod client;
pub mod signature;

use std::time::Duration;

pub use client::{DispatchClient, DispatchResponse};
pub use signature::dispatch_signature;

/// Default number of attempts per dispatch.
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Default delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Retry behaviour for a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub attempts: u32,
    /// Delay before the first retry; doubles on each subsequent retry
    pub base_delay: Duration,
    /// Hard cap on a single attempt
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

/// Failure of a single delivery attempt. Always retried while budget remains.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttemptError {
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {status}: {reason}")]
    Status {
        status: u16,
        reason: String,
        body: String,
    },
}

/// Final outcome of a failed dispatch.
///
/// Cloneable so every caller sharing an in-flight dispatch receives the same
/// error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("failed to encode payload: {0}")]
    Encode(String),
    #[error("delivery failed after {attempts} attempts: {last}")]
    Delivery { attempts: u32, last: AttemptError },
    #[error("dispatch task aborted: {0}")]
    Aborted(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backoff_schedule() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.attempts, 3);
        assert_eq!(policy.timeout, Duration::from_secs(30));
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
        assert_eq!(policy.backoff(3), Duration::from_secs(4));
    }

    #[test]
    fn test_backoff_saturates() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.backoff(200), Duration::from_secs(u64::from(u32::MAX)));
    }

    #[test]
    fn test_delivery_error_message() {
        let err = DispatchError::Delivery {
            attempts: 3,
            last: AttemptError::Status {
                status: 502,
                reason: "Bad Gateway".to_string(),
                body: String::new(),
            },
        };

        assert_eq!(
            err.to_string(),
            "delivery failed after 3 attempts: HTTP 502: Bad Gateway"
        );
    }
}
