//! Retry utilities: exponential backoff for transient HTTP errors, and the
//! configurable per-job retry policy used by the batch executor.
//!
//! The two live at different layers on purpose. The HTTP client retries
//! transient network conditions (429, connection failures) with exponential
//! backoff before a fetch ever reaches the pipeline. The job queue retries
//! whole extraction jobs with its own bounded policy, which defaults to
//! immediate re-attempts to match the original engine but can be configured
//! with a fixed or exponential delay.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Delay schedule between job retry attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Re-attempt with no delay.
    Immediate,
    /// Constant delay between attempts.
    Fixed { delay_ms: u64 },
    /// `base_ms * 2^(attempt-1)` before the n-th retry.
    Exponential { base_ms: u64 },
}

impl Backoff {
    /// Delay before retry number `retry` (1-based).
    #[must_use]
    pub fn delay(&self, retry: u32) -> Duration {
        match self {
            Backoff::Immediate => Duration::ZERO,
            Backoff::Fixed { delay_ms } => Duration::from_millis(*delay_ms),
            Backoff::Exponential { base_ms } => {
                let shift = retry.saturating_sub(1).min(20);
                Duration::from_millis(base_ms.saturating_mul(1 << shift))
            }
        }
    }
}

/// Bounded retry policy for queued extraction jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per job, including the first. A job that fails
    /// `max_attempts` times is marked failed and dropped from processing.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::Immediate,
        }
    }
}

impl RetryPolicy {
    /// Builds a policy from config primitives: `delay_ms == 0` keeps the
    /// original immediate-retry behavior.
    #[must_use]
    pub fn from_config(max_attempts: u32, delay_ms: u64) -> Self {
        let backoff = if delay_ms == 0 {
            Backoff::Immediate
        } else {
            Backoff::Fixed { delay_ms }
        };
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }
}

/// Returns `true` if `err` represents a transient condition that should be
/// retried at the HTTP layer after a backoff delay.
///
/// Everything else (404, unexpected statuses, parse/validation failures,
/// pagination guards) is deterministic and propagates immediately.
fn is_retriable(err: &ScraperError) -> bool {
    matches!(
        err,
        ScraperError::RateLimited { .. } | ScraperError::Http(_)
    )
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// On a retriable error the function sleeps for `backoff_base_secs *
/// 2^attempt` seconds and tries again, up to `max_retries` additional
/// attempts after the first try. Non-retriable errors return immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                err
            }
        };

        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient fetch error — retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn rate_limited() -> ScraperError {
        ScraperError::RateLimited {
            domain: "htreviews.example".to_owned(),
            retry_after_secs: 0,
        }
    }

    #[test]
    fn immediate_backoff_has_zero_delay() {
        assert_eq!(Backoff::Immediate.delay(1), Duration::ZERO);
        assert_eq!(Backoff::Immediate.delay(5), Duration::ZERO);
    }

    #[test]
    fn fixed_backoff_is_constant() {
        let backoff = Backoff::Fixed { delay_ms: 100 };
        assert_eq!(backoff.delay(1), Duration::from_millis(100));
        assert_eq!(backoff.delay(4), Duration::from_millis(100));
    }

    #[test]
    fn exponential_backoff_doubles() {
        let backoff = Backoff::Exponential { base_ms: 50 };
        assert_eq!(backoff.delay(1), Duration::from_millis(50));
        assert_eq!(backoff.delay(2), Duration::from_millis(100));
        assert_eq!(backoff.delay(3), Duration::from_millis(200));
    }

    #[test]
    fn policy_from_config_zero_delay_is_immediate() {
        let policy = RetryPolicy::from_config(3, 0);
        assert_eq!(policy.backoff, Backoff::Immediate);
        assert_eq!(policy.max_attempts, 3);
    }

    #[test]
    fn policy_from_config_clamps_zero_attempts_to_one() {
        let policy = RetryPolicy::from_config(0, 0);
        assert_eq!(policy.max_attempts, 1);
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, ScraperError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_on_rate_limited_then_succeeds() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                let n = cc.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(rate_limited())
                } else {
                    Ok::<u32, ScraperError>(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn propagates_last_error_after_exhausting_retries() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(2, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ScraperError>(rate_limited())
            }
        })
        .await;
        // max_retries=2 → 3 total attempts
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
        assert!(matches!(result, Err(ScraperError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn does_not_retry_not_found() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ScraperError>(ScraperError::NotFound {
                    url: "https://htreviews.example/api/brands".to_owned(),
                })
            }
        })
        .await;
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(ScraperError::NotFound { .. })));
    }

    #[tokio::test]
    async fn does_not_retry_deserialize_error() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                let e = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
                Err::<u32, ScraperError>(ScraperError::Deserialize {
                    context: "test".to_owned(),
                    source: e,
                })
            }
        })
        .await;
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(ScraperError::Deserialize { .. })));
    }
}
