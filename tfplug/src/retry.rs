//! Time-bounded retries for remote calls made by resource handlers
//!
//! The operation decides whether a failure is transient by returning
//! [`RetryError::Retryable`]; the policy only owns the time budget and the
//! backoff between attempts.

use std::future::Future;
use std::time::{Duration, Instant};

/// Classification of a failed attempt
#[derive(Debug)]
pub enum RetryError<E> {
    /// Try again after backing off, until the time budget is spent
    Retryable(E),
    /// Give up immediately
    NonRetryable(E),
}

impl<E> RetryError<E> {
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Retryable(e) | RetryError::NonRetryable(e) => e,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total time allowed across all attempts
    pub timeout: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Backoff before attempt `attempt` (1-based for retries):
    /// `min(initial * 2^(attempt-1), max)`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .checked_mul(factor)
            .map_or(self.max_backoff, |b| b.min(self.max_backoff))
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable error,
    /// or the next backoff would exceed the time budget. The last error is
    /// returned unchanged.
    pub async fn run<F, Fut, T, E>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RetryError<E>>>,
        E: std::fmt::Display,
    {
        let started = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(RetryError::NonRetryable(e)) => return Err(e),
                Err(RetryError::Retryable(e)) => {
                    attempt += 1;
                    let backoff = self.backoff(attempt);
                    if started.elapsed() + backoff > self.timeout {
                        tracing::warn!(
                            "giving up after {} attempts in {:?}: {}",
                            attempt,
                            started.elapsed(),
                            e
                        );
                        return Err(e);
                    }
                    tracing::debug!(
                        "retryable error, retrying after {}ms (attempt {}): {}",
                        backoff.as_millis(),
                        attempt,
                        e
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(180),
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(timeout_ms: u64) -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_millis(timeout_ms),
            initial_backoff: Duration::from_millis(5),
            max_backoff: Duration::from_millis(20),
        }
    }

    #[test]
    fn backoff_is_exponential_and_capped() {
        let policy = fast(1000);
        assert_eq!(policy.backoff(1), Duration::from_millis(5));
        assert_eq!(policy.backoff(2), Duration::from_millis(10));
        assert_eq!(policy.backoff(3), Duration::from_millis(20));
        assert_eq!(policy.backoff(10), Duration::from_millis(20));
        assert_eq!(policy.backoff(64), Duration::from_millis(20));
    }

    #[tokio::test]
    async fn retries_until_success() {
        let calls = AtomicU32::new(0);
        let result: Result<&str, String> = fast(1000)
            .run(|| async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(RetryError::Retryable("RequestLimitExceeded".to_string()))
                } else {
                    Ok("ok")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_stops_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = fast(1000)
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(RetryError::NonRetryable("InvalidParameter".to_string()))
            })
            .await;

        assert_eq!(result.unwrap_err(), "InvalidParameter");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn budget_exhaustion_returns_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = fast(30)
            .run(|| async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                Err(RetryError::Retryable(format!("busy {}", n)))
            })
            .await;

        let err = result.unwrap_err();
        assert!(err.starts_with("busy"));
        assert!(calls.load(Ordering::SeqCst) > 1);
    }
}
