//! Resilient invocation of mem0 calls.
//!
//! Every call the tool layer makes to the mem0 service goes through
//! [`invoke`], the single place where the retry policy lives. A call either
//! succeeds, fails permanently (4xx or no status signal), or exhausts the
//! retry budget on transient (5xx) failures. All three outcomes resolve to a
//! JSON string - success payload or `{"error": ..., "status": ...}` - so the
//! tool layer never has to handle a raised error.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ErrorClass, ServiceError};

/// Bounded exponential-backoff retry policy.
///
/// Defaults to 3 total attempts with delays of 1s and 2s between them
/// (base 1s, factor 2), retrying only transient failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first (not just retries).
    pub max_attempts: u32,
    /// Backoff before the first retry; doubles each retry after that.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Backoff after the given zero-indexed failed attempt: `base * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// Execute `operation` under the retry policy and serialize the outcome.
///
/// The operation is a zero-argument call to the mem0 service. Failures are
/// classified by their status signal:
///
/// - 5xx: transient, retried after exponential backoff until the attempt
///   budget is exhausted;
/// - 4xx (or any other explicit status): permanent, surfaced immediately;
/// - no status: unknown, treated as permanent so errors of unknown nature
///   fail fast instead of looping.
///
/// The backoff suspends only the current task; concurrent invocations are
/// unaffected.
pub async fn invoke<F, Fut>(policy: &RetryPolicy, operation: F) -> String
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Value, ServiceError>>,
{
    let mut attempt: u32 = 0;

    loop {
        match operation().await {
            Ok(payload) => return to_json_string(payload),
            Err(err) => match err.class() {
                ErrorClass::Transient if attempt + 1 < policy.max_attempts => {
                    let delay = policy.delay_for(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = policy.max_attempts,
                        status = ?err.status,
                        delay_ms = delay.as_millis() as u64,
                        "Transient mem0 failure, retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                ErrorClass::Transient => {
                    warn!(
                        attempts = policy.max_attempts,
                        status = ?err.status,
                        "Retries exhausted, surfacing last failure"
                    );
                    return to_json_string(err.to_payload());
                }
                ErrorClass::Permanent | ErrorClass::Unknown => {
                    debug!(
                        status = ?err.status,
                        "Non-retryable mem0 failure, surfacing immediately"
                    );
                    return to_json_string(err.to_payload());
                }
            },
        }
    }
}

/// Serialize a payload, degrading to an error payload rather than panicking.
fn to_json_string(payload: Value) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|e| {
        format!(r#"{{"error":"failed to serialize response: {}","status":null}}"#, e)
    })
}
