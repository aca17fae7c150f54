//! Per-client spacing of outbound requests.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};
use tracing::trace;

/// Minimum gap enforced between consecutive requests by default.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(500);

/// Enforces a minimum interval between requests issued by one client.
///
/// The limiter is owned by a single client instance so independent clients
/// never delay each other.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter with the given spacing.
    #[must_use]
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::const_new(None),
        }
    }

    /// Configured spacing between requests.
    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until a request may be sent, records it as sent, and returns
    /// the recorded send time.
    pub async fn acquire(&self) -> Instant {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + self.min_interval;
            if ready_at > Instant::now() {
                trace!(
                    delay_ms = (ready_at - Instant::now()).as_millis(),
                    "delaying request for rate limit"
                );
                sleep_until(ready_at).await;
            }
        }
        let now = Instant::now();
        *last = Some(now);
        now
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_request_is_not_delayed() {
        let limiter = RateLimiter::new(Duration::from_secs(5));
        let started = Instant::now();
        limiter.acquire().await;
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn consecutive_requests_are_spaced() {
        let interval = Duration::from_millis(40);
        let limiter = RateLimiter::new(interval);
        let mut stamps = Vec::new();
        for _ in 0..3 {
            stamps.push(limiter.acquire().await);
        }
        for pair in stamps.windows(2) {
            if let [earlier, later] = pair {
                assert!(
                    *later - *earlier >= interval,
                    "requests only {:?} apart",
                    *later - *earlier
                );
            }
        }
    }

    #[tokio::test]
    async fn separate_limiters_do_not_interfere() {
        let first = RateLimiter::new(Duration::from_secs(5));
        let second = RateLimiter::new(Duration::from_secs(5));
        first.acquire().await;
        let started = Instant::now();
        second.acquire().await;
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
