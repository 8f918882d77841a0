//! Fixed-window rate limiting keyed by client origin.
//!
//! Each key gets a counter and a window start. The first request after
//! the window expires opens a new window. Counters live in process memory
//! only; they are best-effort abuse throttling, not correctness state.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::config::RateLimitConfig;
use crate::error::ApiError;

/// Tracked keys above which expired windows are swept on the next check.
const PURGE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started: Instant,
}

/// Per-origin request counter for one endpoint category.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: DashMap<String, Window>,
}

impl RateLimiter {
    /// Creates a limiter enforcing `config`.
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
        }
    }

    /// Records a request from `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RateLimited`] when `key` has used up the current
    /// window. Rejected requests do not count.
    pub fn check(&self, key: &str) -> Result<(), ApiError> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<(), ApiError> {
        if self.windows.len() >= PURGE_THRESHOLD {
            self.purge_expired_at(now);
        }

        let window_len = Duration::from_secs(self.config.window_secs);
        let mut window = self.windows.entry(key.to_string()).or_insert(Window {
            count: 0,
            started: now,
        });

        if now.duration_since(window.started) >= window_len {
            window.count = 0;
            window.started = now;
        }

        if window.count >= self.config.max_requests {
            let remaining = window_len.saturating_sub(now.duration_since(window.started));
            return Err(ApiError::RateLimited {
                retry_after_secs: remaining.as_secs().max(1),
            });
        }

        window.count += 1;
        Ok(())
    }

    /// Drops windows that expired before `now`.
    fn purge_expired_at(&self, now: Instant) {
        let window_len = Duration::from_secs(self.config.window_secs);
        self.windows
            .retain(|_, window| now.duration_since(window.started) < window_len);
    }

    /// Returns the number of tracked keys.
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_limit() {
        let limiter = RateLimiter::new(RateLimitConfig::new(3, 60));
        let now = Instant::now();
        for _ in 0..3 {
            assert!(limiter.check_at("1.2.3.4", now).is_ok());
        }
        let err = limiter.check_at("1.2.3.4", now);
        assert!(matches!(err, Err(ApiError::RateLimited { retry_after_secs: 60 })));
    }

    #[test]
    fn keys_are_independent() {
        let limiter = RateLimiter::new(RateLimitConfig::new(1, 60));
        let now = Instant::now();
        assert!(limiter.check_at("a", now).is_ok());
        assert!(limiter.check_at("b", now).is_ok());
        assert!(limiter.check_at("a", now).is_err());
        assert_eq!(limiter.tracked_keys(), 2);
    }

    #[test]
    fn window_resets_after_expiry() {
        let limiter = RateLimiter::new(RateLimitConfig::new(1, 60));
        let start = Instant::now();
        assert!(limiter.check_at("a", start).is_ok());
        assert!(limiter.check_at("a", start + Duration::from_secs(59)).is_err());
        assert!(limiter.check_at("a", start + Duration::from_secs(60)).is_ok());
    }

    #[test]
    fn purge_drops_only_expired_windows() {
        let limiter = RateLimiter::new(RateLimitConfig::new(5, 60));
        let start = Instant::now();
        assert!(limiter.check_at("old", start).is_ok());
        assert!(limiter.check_at("new", start + Duration::from_secs(30)).is_ok());
        limiter.purge_expired_at(start + Duration::from_secs(61));
        assert_eq!(limiter.tracked_keys(), 1);
        assert!(limiter.check("new").is_ok());
    }
}
