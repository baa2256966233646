//! Retry with exponential backoff for page requests.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::api::{FetchOutcome, HarvestError};
use crate::models::SearchPage;

/// Backoff schedule for retryable fetch outcomes.
///
/// The schedule is a pure function of the retry index so it can be inspected
/// in tests without sleeping.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum retries after the initial attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound for the exponential schedule
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_millis(50_000),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (zero-based): doubles per retry,
    /// bounded by `max_delay`.
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        self.base_delay
            .saturating_mul(1u32 << retry.min(31))
            .min(self.max_delay)
    }

    /// Delay after a 429: the server-provided interval, doubled for margin.
    /// Overrides the exponential schedule to respect server pacing.
    pub fn rate_limit_delay(&self, retry_after: Duration) -> Duration {
        retry_after.saturating_mul(2)
    }
}

/// Run `fetch` until it succeeds, fails fatally, or the retry budget runs out.
///
/// RateLimited and Retryable outcomes are retried after the policy's delay;
/// Unauthorized and Fatal outcomes surface immediately.
pub async fn run_with_retry<F, Fut>(
    policy: &RetryPolicy,
    page_number: u32,
    mut fetch: F,
) -> Result<SearchPage, HarvestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FetchOutcome>,
{
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        let (reason, delay) = match fetch().await {
            FetchOutcome::Success(page) => {
                if attempt > 1 {
                    tracing::info!(page = page_number, attempt, "request succeeded after retrying");
                }
                return Ok(page);
            }
            FetchOutcome::Unauthorized(message) => {
                return Err(HarvestError::Unauthorized(message));
            }
            FetchOutcome::Fatal(message) => {
                return Err(HarvestError::MalformedResponse(message));
            }
            FetchOutcome::RateLimited { retry_after } => (
                format!("rate limited, Retry-After {}s", retry_after.as_secs()),
                policy.rate_limit_delay(retry_after),
            ),
            FetchOutcome::Retryable(message) => (message, policy.backoff_delay(attempt - 1)),
        };

        if attempt > policy.max_retries {
            tracing::error!(
                page = page_number,
                attempts = attempt,
                last = %reason,
                "retries exceeded for page"
            );
            return Err(HarvestError::RetriesExhausted {
                page: page_number,
                attempts: attempt,
                last: reason,
            });
        }

        tracing::warn!(
            page = page_number,
            attempt,
            delay_ms = delay.as_millis() as u64,
            reason = %reason,
            "retrying page request"
        );
        sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn empty_page() -> SearchPage {
        SearchPage {
            total_hits_count: 0,
            page_number: 0,
            page_size: 50,
            results: Vec::new(),
        }
    }

    #[test]
    fn test_backoff_schedule_doubles_from_base() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(0), Duration::from_millis(500));
        assert_eq!(policy.backoff_delay(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff_delay(2), Duration::from_millis(2000));
        assert_eq!(policy.backoff_delay(4), Duration::from_millis(8000));
    }

    #[test]
    fn test_backoff_schedule_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(10), Duration::from_millis(50_000));
        assert_eq!(policy.backoff_delay(31), Duration::from_millis(50_000));
    }

    #[test]
    fn test_rate_limit_delay_doubles_server_interval() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.rate_limit_delay(Duration::from_millis(1000)),
            Duration::from_millis(2000)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt() {
        let calls = AtomicU32::new(0);
        let result = run_with_retry(&RetryPolicy::default(), 0, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { FetchOutcome::Success(empty_page()) }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();
        let result = run_with_retry(&RetryPolicy::default(), 0, || {
            let call = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if call < 2 {
                    FetchOutcome::Retryable("connection reset".to_string())
                } else {
                    FetchOutcome::Success(empty_page())
                }
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 500 ms before the first retry, 1000 ms before the second
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_waits_double_the_server_interval() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();
        let result = run_with_retry(&RetryPolicy::default(), 0, || {
            let call = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if call == 0 {
                    FetchOutcome::RateLimited {
                        retry_after: Duration::from_secs(1),
                    }
                } else {
                    FetchOutcome::Success(empty_page())
                }
            }
        })
        .await;

        assert!(result.is_ok());
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_exhausted_after_six_attempts() {
        let calls = AtomicU32::new(0);
        let result = run_with_retry(&RetryPolicy::default(), 7, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { FetchOutcome::Retryable("connection reset".to_string()) }
        })
        .await;

        match result {
            Err(HarvestError::RetriesExhausted {
                page,
                attempts,
                last,
            }) => {
                assert_eq!(page, 7);
                assert_eq!(attempts, 6);
                assert!(last.contains("connection reset"));
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unauthorized_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result = run_with_retry(&RetryPolicy::default(), 0, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { FetchOutcome::Unauthorized("bad key".to_string()) }
        })
        .await;

        assert!(matches!(result, Err(HarvestError::Unauthorized(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_outcome_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result = run_with_retry(&RetryPolicy::default(), 0, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { FetchOutcome::Fatal("unparsable body".to_string()) }
        })
        .await;

        assert!(matches!(result, Err(HarvestError::MalformedResponse(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
