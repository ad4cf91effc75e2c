//! Per-call deadline and retry policy for remote calls.

use serde::{Deserialize, Serialize};
use shared_types::BackendError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Deadline and backoff settings applied to every remote call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Deadline of a single attempt.
    pub call_timeout: Duration,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound on the delay between retries.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(10),
            max_retries: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries.
    pub fn no_retry(call_timeout: Duration) -> Self {
        Self {
            call_timeout,
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Run `attempt` until it succeeds, fails permanently, or retries run out.
    ///
    /// Each attempt is bounded by `call_timeout`; an attempt that overruns
    /// fails with `Timeout`. Only transient errors are retried.
    pub async fn run<T, F, Fut>(&self, method: &str, mut attempt: F) -> Result<T, BackendError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        let mut retries = 0;
        let mut backoff = self.initial_backoff;

        loop {
            let outcome = match tokio::time::timeout(self.call_timeout, attempt()).await {
                Ok(result) => result,
                Err(_) => Err(BackendError::Timeout {
                    method: method.to_string(),
                    after_ms: u64::try_from(self.call_timeout.as_millis()).unwrap_or(u64::MAX),
                }),
            };

            match outcome {
                Err(e) if e.is_transient() && retries < self.max_retries => {
                    retries += 1;
                    warn!(
                        "[fh-backend] {} failed ({}), retry {}/{} in {:?}",
                        method, e, retries, self.max_retries, backoff
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2).min(self.max_backoff);
                }
                other => return other,
            }
        }
    }
}
