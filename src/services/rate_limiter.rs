use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Interval between admission attempts while waiting for capacity.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Sliding-window limiter for upstream calls.
///
/// Keeps the instants of admitted calls from the last `window`; a new call is
/// admitted only while fewer than `capacity` of them remain. The prune, check
/// and record steps run under one lock so concurrent callers can never both
/// take the last slot.
pub struct RateLimiter {
    capacity: usize,
    window: Duration,
    admitted: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(capacity: usize, window: Duration) -> Self {
        Self {
            capacity,
            window,
            admitted: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Try to admit one call now.
    pub fn admit(&self) -> bool {
        self.admit_at(Instant::now())
    }

    /// Try to admit one call at `now`.
    pub fn admit_at(&self, now: Instant) -> bool {
        let mut admitted = self.admitted.lock();

        while let Some(oldest) = admitted.front() {
            if now.saturating_duration_since(*oldest) >= self.window {
                admitted.pop_front();
            } else {
                break;
            }
        }

        if admitted.len() < self.capacity {
            admitted.push_back(now);
            true
        } else {
            false
        }
    }

    /// Wait until a call is admitted, polling at a fixed interval.
    pub async fn acquire(&self) {
        let mut waited = false;
        while !self.admit() {
            if !waited {
                tracing::debug!(
                    capacity = self.capacity,
                    window_ms = self.window.as_millis() as u64,
                    "Rate limiter full, waiting for capacity"
                );
                waited = true;
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_admits_up_to_capacity() {
        let limiter = RateLimiter::new(20, Duration::from_secs(1));
        let now = Instant::now();

        let admitted = (0..25).filter(|_| limiter.admit_at(now)).count();
        assert_eq!(admitted, 20);
        assert!(!limiter.admit_at(now + Duration::from_millis(999)));
    }

    #[test]
    fn test_capacity_frees_as_timestamps_age_out() {
        let limiter = RateLimiter::new(3, Duration::from_secs(1));
        let start = Instant::now();

        assert!(limiter.admit_at(start));
        assert!(limiter.admit_at(start));
        assert!(limiter.admit_at(start + Duration::from_millis(500)));
        assert!(!limiter.admit_at(start + Duration::from_millis(900)));

        // The two calls at `start` leave the window, the one at +500ms stays
        let later = start + Duration::from_millis(1000);
        assert!(limiter.admit_at(later));
        assert!(limiter.admit_at(later));
        assert!(!limiter.admit_at(later));
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_waits_for_window() {
        let limiter = RateLimiter::new(2, Duration::from_secs(1));
        let start = Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_admission_never_over_admits() {
        let limiter = Arc::new(RateLimiter::new(20, Duration::from_secs(60)));

        let handles: Vec<_> = (0..100)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move { limiter.admit() })
            })
            .collect();

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 20);
    }
}
