//! Account model
//!
//! A registered member of the party. The base account fields (username,
//! password hash, email, first name, activity flag, timestamps) are extended
//! with the profile data collected at registration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    /// Login name (unique)
    pub username: String,
    /// Argon2id PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub first_name: String,
    pub surname: String,
    /// National identification number as entered at registration
    pub id_number: String,
    pub gender: Gender,
    /// Inactive accounts cannot log in
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Build an unsaved account from already-validated registration data.
    ///
    /// `password_hash` must be the output of `services::password::hash_password`.
    pub fn new(
        username: String,
        password_hash: String,
        email: String,
        first_name: String,
        surname: String,
        id_number: String,
        gender: Gender,
    ) -> Self {
        Self {
            id: 0,
            username,
            password_hash,
            email,
            first_name,
            surname,
            id_number,
            gender,
            is_active: true,
            date_joined: Utc::now(),
            last_login: None,
        }
    }
}

/// Gender choice offered on the registration form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
}

impl Gender {
    /// All choices in display order
    pub const CHOICES: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    /// Single-letter code stored in the database and submitted by the form
    pub fn code(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Other => "O",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Gender {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "M" => Ok(Gender::Male),
            "F" => Ok(Gender::Female),
            "O" => Ok(Gender::Other),
            _ => Err(anyhow::anyhow!("Invalid gender code: {}", s)),
        }
    }
}
