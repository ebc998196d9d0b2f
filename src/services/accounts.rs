//! Account service
//!
//! Registration, credential checks and server-side login sessions.

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{Gender, Session, User};
use crate::services::password::{hash_password, verify_password};
use anyhow::Context;
use chrono::{Duration, Utc};
use std::sync::Arc;

/// Error types for account operations
#[derive(Debug, thiserror::Error)]
pub enum AccountServiceError {
    /// Username already taken
    #[error("User already exists: {0}")]
    UserExists(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Cleaned registration data, produced by a valid registration form
#[derive(Debug, Clone)]
pub struct RegistrationData {
    pub first_name: String,
    pub surname: String,
    pub email: String,
    pub id_number: String,
    pub gender: Gender,
    pub username: String,
    pub password: String,
}

/// Account service
pub struct AccountService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_lifetime: Duration,
}

impl AccountService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        session_lifetime: Duration,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_lifetime,
        }
    }

    /// Hash the password and store a new account.
    ///
    /// The username check is repeated here so a concurrent registration that
    /// slipped past form validation still ends in `UserExists`.
    pub async fn register(&self, data: RegistrationData) -> Result<User, AccountServiceError> {
        if self
            .user_repo
            .exists_by_username(&data.username)
            .await
            .context("Failed to check username")?
        {
            return Err(AccountServiceError::UserExists(data.username));
        }

        let password_hash = hash_password(&data.password)?;
        let user = User::new(
            data.username,
            password_hash,
            data.email,
            data.first_name,
            data.surname,
            data.id_number,
            data.gender,
        );

        match self.user_repo.create(&user).await {
            Ok(created) => {
                tracing::info!(user_id = created.id, username = %created.username, "Account registered");
                Ok(created)
            }
            Err(e) => {
                // Lost the race against the UNIQUE constraint
                if self
                    .user_repo
                    .exists_by_username(&user.username)
                    .await
                    .unwrap_or(false)
                {
                    Err(AccountServiceError::UserExists(user.username))
                } else {
                    Err(e.context("Failed to create user").into())
                }
            }
        }
    }

    /// The account for `username` if it exists, is active and `password`
    /// matches; `None` otherwise.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AccountServiceError> {
        let user = match self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to look up user")?
        {
            Some(user) => user,
            None => return Ok(None),
        };

        if !user.is_active {
            return Ok(None);
        }

        if verify_password(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Start a session for an authenticated account and stamp `last_login`
    pub async fn login(&self, user: &User) -> Result<Session, AccountServiceError> {
        let session = Session::start(user.id, self.session_lifetime)?;
        self.session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;
        self.user_repo
            .update_last_login(user.id, Utc::now())
            .await
            .context("Failed to record last login")?;

        tracing::info!(user_id = user.id, "User logged in");
        Ok(session)
    }

    pub async fn logout(&self, token: &str) -> Result<(), AccountServiceError> {
        self.session_repo
            .delete(token)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Resolve a session token to its account.
    ///
    /// Expired sessions are removed as soon as they are seen.
    pub async fn user_for_session(&self, token: &str) -> Result<Option<User>, AccountServiceError> {
        let session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to get session")?
        {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            if let Err(e) = self.session_repo.delete(token).await {
                tracing::warn!("Failed to delete expired session: {:#}", e);
            }
            return Ok(None);
        }

        let user = self
            .user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to get user")?;
        Ok(user.filter(|u| u.is_active))
    }

    /// Delete every expired session, returning how many were removed
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, AccountServiceError> {
        let removed = self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to delete expired sessions")?;
        Ok(removed)
    }

    pub async fn username_taken(&self, username: &str) -> Result<bool, AccountServiceError> {
        Ok(self
            .user_repo
            .exists_by_username(username)
            .await
            .context("Failed to check username")?)
    }
}
