//! Login form

use super::{FormErrors, REQUIRED};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// Credentials from a valid login form
#[derive(Debug, Clone)]
pub struct LoginData {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    /// Both fields are required; the password is taken verbatim.
    pub fn clean(&self) -> Result<LoginData, FormErrors> {
        let mut errors = FormErrors::new();
        let username = self.username.trim();
        if username.is_empty() {
            errors.add("username", REQUIRED);
        }
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }

        if errors.is_empty() {
            Ok(LoginData {
                username: username.to_string(),
                password: self.password.clone(),
            })
        } else {
            Err(errors)
        }
    }
}
