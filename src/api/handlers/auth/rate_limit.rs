//! Per-identifier sliding-window rate limiting for the session endpoints.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

/// Counts a request against the identifier's window and decides admission.
///
/// The trait seam lets deployments swap the in-memory limiter for an external
/// store without touching the authenticator.
pub trait RateLimiter: Send + Sync {
    fn check_and_consume(&self, identifier: &str) -> RateLimitDecision;
}

#[derive(Debug)]
struct RateWindow {
    count: u32,
    window_reset_at: Instant,
}

/// In-memory limiter: one fixed window per identifier, reset lazily.
///
/// All requests inside a window count toward the limit; once the reset time
/// has passed the next request starts a fresh window with count 1.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    window: Duration,
    max_requests: u32,
    windows: Mutex<HashMap<String, RateWindow>>,
}

impl SlidingWindowLimiter {
    #[must_use]
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            windows: Mutex::new(HashMap::new()),
        }
    }

    fn lock_windows(&self) -> MutexGuard<'_, HashMap<String, RateWindow>> {
        // A poisoned map only means another thread panicked mid-update; the
        // counters are still usable.
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn tracked_identifiers(&self) -> usize {
        self.lock_windows().len()
    }
}

impl RateLimiter for SlidingWindowLimiter {
    fn check_and_consume(&self, identifier: &str) -> RateLimitDecision {
        let now = Instant::now();
        let mut windows = self.lock_windows();

        match windows.get_mut(identifier) {
            Some(window) if now < window.window_reset_at => {
                window.count += 1;
                if window.count > self.max_requests {
                    RateLimitDecision::Limited
                } else {
                    RateLimitDecision::Allowed
                }
            }
            Some(window) => {
                window.count = 1;
                window.window_reset_at = now + self.window;
                RateLimitDecision::Allowed
            }
            None => {
                // Sweep expired windows before tracking a new identifier so
                // the map stays bounded under identifier churn.
                windows.retain(|_, window| now < window.window_reset_at);
                windows.insert(
                    identifier.to_string(),
                    RateWindow {
                        count: 1,
                        window_reset_at: now + self.window,
                    },
                );
                RateLimitDecision::Allowed
            }
        }
    }
}

/// Limiter that admits everything, for tests and local wiring.
#[derive(Clone, Debug)]
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {
    fn check_and_consume(&self, _identifier: &str) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn allows_up_to_the_threshold() {
        let limiter = SlidingWindowLimiter::new(Duration::from_secs(60), 3);
        for _ in 0..3 {
            assert_eq!(
                limiter.check_and_consume("1.2.3.4"),
                RateLimitDecision::Allowed
            );
        }
        assert_eq!(
            limiter.check_and_consume("1.2.3.4"),
            RateLimitDecision::Limited
        );
    }

    #[test]
    fn identifiers_are_counted_independently() {
        let limiter = SlidingWindowLimiter::new(Duration::from_secs(60), 1);
        assert_eq!(
            limiter.check_and_consume("1.2.3.4"),
            RateLimitDecision::Allowed
        );
        assert_eq!(
            limiter.check_and_consume("1.2.3.4"),
            RateLimitDecision::Limited
        );
        assert_eq!(
            limiter.check_and_consume("5.6.7.8"),
            RateLimitDecision::Allowed
        );
    }

    #[test]
    fn window_resets_after_expiry() {
        let limiter = SlidingWindowLimiter::new(Duration::from_millis(20), 1);
        assert_eq!(
            limiter.check_and_consume("1.2.3.4"),
            RateLimitDecision::Allowed
        );
        assert_eq!(
            limiter.check_and_consume("1.2.3.4"),
            RateLimitDecision::Limited
        );
        sleep(Duration::from_millis(30));
        assert_eq!(
            limiter.check_and_consume("1.2.3.4"),
            RateLimitDecision::Allowed
        );
    }

    #[test]
    fn stale_windows_are_swept_on_insert() {
        let limiter = SlidingWindowLimiter::new(Duration::from_millis(10), 5);
        limiter.check_and_consume("1.2.3.4");
        limiter.check_and_consume("5.6.7.8");
        assert_eq!(limiter.tracked_identifiers(), 2);
        sleep(Duration::from_millis(20));
        limiter.check_and_consume("9.9.9.9");
        assert_eq!(limiter.tracked_identifiers(), 1);
    }

    #[test]
    fn noop_rate_limiter_allows() {
        let limiter = NoopRateLimiter;
        assert_eq!(
            limiter.check_and_consume("1.2.3.4"),
            RateLimitDecision::Allowed
        );
    }
}
