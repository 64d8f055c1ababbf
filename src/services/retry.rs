use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::services::rate_limiter::RateLimiter;

/// Substrings (lowercase) marking a failure as a transient capacity rejection.
const RETRYABLE_MARKERS: &[&str] = &["rate_limit", "429", "quota"];

/// Exponential backoff policy for rate-limited upstream calls.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry `retry` (1-based): `base_delay * 2^(retry - 1)`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1 << exponent)
    }
}

/// Whether an error description marks a retryable rate-limit failure.
pub fn is_retryable_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    RETRYABLE_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Run `attempt` until it succeeds, retrying rate-limited failures.
///
/// Every attempt is admitted by `limiter` first. Before retry `n` the
/// controller calls `on_backoff(n, delay)` and sleeps for `delay`. Failures
/// that are not rate-limit related return immediately; a rate-limit failure
/// on the last attempt is returned as-is.
pub async fn run_with_retry<T, E, F, Fut, B>(
    policy: &RetryPolicy,
    limiter: &RateLimiter,
    mut on_backoff: B,
    mut attempt: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    B: FnMut(u32, Duration),
{
    let max_attempts = policy.max_attempts.max(1);
    let mut retry = 0;

    loop {
        if retry > 0 {
            let delay = policy.delay_for(retry);
            tracing::warn!(
                retry,
                max_attempts,
                delay_secs = delay.as_secs_f64(),
                "Upstream rate limit hit, backing off before retry"
            );
            on_backoff(retry, delay);
            sleep(delay).await;
        }

        limiter.acquire().await;

        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                let message = e.to_string();
                if !is_retryable_message(&message) {
                    tracing::debug!(error = %message, "Upstream failure is not retryable");
                    return Err(e);
                }
                if retry + 1 >= max_attempts {
                    tracing::error!(
                        error = %message,
                        attempts = retry + 1,
                        "Upstream still rate limited after final attempt"
                    );
                    return Err(e);
                }
                retry += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn limiter() -> RateLimiter {
        RateLimiter::new(20, Duration::from_secs(1))
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(60));
        assert_eq!(policy.delay_for(2), Duration::from_secs(120));
        assert_eq!(policy.delay_for(3), Duration::from_secs(240));
    }

    #[test]
    fn test_retryable_messages() {
        assert!(is_retryable_message("Error code: 429"));
        assert!(is_retryable_message("RATE_LIMIT exceeded"));
        assert!(is_retryable_message("Quota exhausted"));
        assert!(!is_retryable_message("rate limited"));
        assert!(!is_retryable_message("invalid input"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_then_succeeds_with_doubling_waits() {
        let calls = AtomicU32::new(0);
        let mut backoffs = Vec::new();
        let start = Instant::now();

        let result: Result<&str, String> = run_with_retry(
            &RetryPolicy::default(),
            &limiter(),
            |retry, delay| backoffs.push((retry, delay)),
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err("HTTP 429 Too Many Requests".to_string())
                    } else {
                        Ok("done")
                    }
                }
            },
        )
        .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            backoffs,
            vec![(1, Duration::from_secs(60)), (2, Duration::from_secs(120))]
        );
        assert!(start.elapsed() >= Duration::from_secs(180));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_fails_immediately() {
        let calls = AtomicU32::new(0);
        let mut backoffs = 0;

        let result: Result<(), String> = run_with_retry(
            &RetryPolicy::default(),
            &limiter(),
            |_, _| backoffs += 1,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("invalid input".to_string()) }
            },
        )
        .await;

        assert_eq!(result, Err("invalid input".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(backoffs, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = run_with_retry(
            &RetryPolicy::default(),
            &limiter(),
            |_, _| {},
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("quota exceeded".to_string()) }
            },
        )
        .await;

        assert_eq!(result, Err("quota exceeded".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_attempt_is_admitted_by_limiter() {
        let limiter = RateLimiter::new(1, Duration::from_secs(1));
        let policy = RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(10),
        };
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result: Result<(), String> = run_with_retry(&policy, &limiter, |_, _| {}, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("429".to_string()) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        // The retry had to wait for the first admission to leave the window
        assert!(start.elapsed() >= Duration::from_secs(1));
    }
}
