//! Session model

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-side login session; `id` is the cookie token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Start a new session for `user_id` with a fresh random token
    pub fn start(user_id: i64, lifetime: Duration) -> Result<Self> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(lifetime)
            .context("Session expiry out of range")?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            expires_at,
            created_at: now,
        })
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_generates_unique_tokens() {
        let a = Session::start(1, Duration::days(1)).unwrap();
        let b = Session::start(1, Duration::days(1)).unwrap();
        assert_ne!(a.id, b.id);
        assert!(!a.is_expired());
    }

    #[test]
    fn test_negative_lifetime_is_expired() {
        let session = Session::start(1, Duration::seconds(-1)).unwrap();
        assert!(session.is_expired());
    }

    #[test]
    fn test_overflowing_lifetime_is_an_error() {
        assert!(Session::start(1, Duration::days(1_000_000_000)).is_err());
    }
}
