//! Rate limiter for login attempts
//!
//! Failed logins are counted per username inside a sliding window. Once the
//! limit is reached further attempts are refused until old failures age out.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Failed attempts allowed inside one window
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Window length in minutes
pub const DEFAULT_WINDOW_MINUTES: i64 = 15;

/// Login rate limiter
pub struct LoginRateLimiter {
    /// Failure timestamps keyed by the username as submitted
    attempts: RwLock<HashMap<String, Vec<DateTime<Utc>>>>,
    max_attempts: usize,
    window: Duration,
}

impl LoginRateLimiter {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_ATTEMPTS, Duration::minutes(DEFAULT_WINDOW_MINUTES))
    }

    pub fn with_limits(max_attempts: usize, window: Duration) -> Self {
        Self {
            attempts: RwLock::new(HashMap::new()),
            max_attempts,
            window,
        }
    }

    /// Whether `username` has used up its failures for the current window
    pub async fn is_limited(&self, username: &str) -> bool {
        let cutoff = Utc::now() - self.window;
        let mut attempts = self.attempts.write().await;
        match attempts.get_mut(username) {
            Some(times) => {
                times.retain(|t| *t > cutoff);
                times.len() >= self.max_attempts
            }
            None => false,
        }
    }

    pub async fn record_failure(&self, username: &str) {
        let mut attempts = self.attempts.write().await;
        attempts.entry(username.to_string()).or_default().push(Utc::now());
    }

    /// Forget all failures for `username` (after a successful login)
    pub async fn clear(&self, username: &str) {
        self.attempts.write().await.remove(username);
    }

    /// Drop expired entries; returns the number of usernames still tracked
    pub async fn cleanup(&self) -> usize {
        let cutoff = Utc::now() - self.window;
        let mut attempts = self.attempts.write().await;
        attempts.retain(|_, times| {
            times.retain(|t| *t > cutoff);
            !times.is_empty()
        });
        attempts.len()
    }
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
