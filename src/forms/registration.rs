//! Member registration form

use super::{clean_char_field, FormErrors, REQUIRED};
use crate::models::Gender;
use crate::services::RegistrationData;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const NAME_MAX_LENGTH: usize = 30;
pub const ID_NUMBER_MAX_LENGTH: usize = 20;
pub const USERNAME_MAX_LENGTH: usize = 30;
pub const EMAIL_MAX_LENGTH: usize = 254;
pub const PASSWORD_MIN_LENGTH: usize = 8;

const INVALID_EMAIL: &str = "Enter a valid email address.";
const INVALID_USERNAME: &str = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";
const USERNAME_TAKEN: &str = "A user with that username already exists.";
const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";

static USERNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("USERNAME_REGEX: invalid regex pattern"));

// Dot-atom local part
static EMAIL_USER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-!#$%&'*+/=?^_`{}|~0-9A-Za-z]+(\.[-!#$%&'*+/=?^_`{}|~0-9A-Za-z]+)*$")
        .expect("EMAIL_USER_REGEX: invalid regex pattern")
});

static EMAIL_DOMAIN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$")
        .expect("EMAIL_DOMAIN_REGEX: invalid regex pattern")
});

/// Passwords refused outright, compared case-insensitively
const COMMON_PASSWORDS: &[&str] = &[
    "123456", "123456789", "12345678", "1234567890", "password", "password1", "password123",
    "qwerty", "qwerty123", "qwertyuiop", "abc123", "abcd1234", "111111", "000000", "iloveyou",
    "letmein", "welcome", "welcome1", "admin", "admin123", "monkey", "dragon", "football",
    "baseball", "sunshine", "princess", "trustno1", "starwars", "whatever", "superman",
    "passw0rd", "master", "shadow", "michael", "charlie", "freedom", "changeme", "secret",
];

/// Registration form as submitted.
///
/// Missing fields deserialize as empty strings so they surface as
/// "required" errors instead of a rejected request.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub first_name: String,
    pub surname: String,
    pub email: String,
    pub id_number: String,
    pub gender: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password1: String,
    #[serde(skip_serializing)]
    pub password2: String,
}

impl RegistrationForm {
    /// Validate every field.
    ///
    /// `username_taken` is the result of looking the stripped username up in
    /// the account store; it only matters when the username is otherwise valid.
    pub fn clean(&self, username_taken: bool) -> Result<RegistrationData, FormErrors> {
        let mut errors = FormErrors::new();

        let first_name = clean_char_field(&mut errors, "first_name", &self.first_name, NAME_MAX_LENGTH);
        let surname = clean_char_field(&mut errors, "surname", &self.surname, NAME_MAX_LENGTH);
        let email = clean_email(&mut errors, &self.email);
        let id_number =
            clean_char_field(&mut errors, "id_number", &self.id_number, ID_NUMBER_MAX_LENGTH);
        let gender = clean_gender(&mut errors, &self.gender);
        let username = clean_username(&mut errors, &self.username, username_taken);

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if !self.password1.is_empty() {
            if self.password1 != self.password2 {
                errors.add("password2", PASSWORD_MISMATCH);
            } else {
                let attributes = [
                    ("username", self.username.trim()),
                    ("first name", self.first_name.trim()),
                    ("surname", self.surname.trim()),
                    ("email address", self.email.trim()),
                ];
                for message in password_problems(&self.password2, &attributes) {
                    errors.add("password2", message);
                }
            }
        }

        match (first_name, surname, email, id_number, gender, username) {
            (Some(first_name), Some(surname), Some(email), Some(id_number), Some(gender), Some(username))
                if errors.is_empty() =>
            {
                Ok(RegistrationData {
                    first_name,
                    surname,
                    email,
                    id_number,
                    gender,
                    username,
                    password: self.password2.clone(),
                })
            }
            _ => Err(errors),
        }
    }

    /// Clear both password fields before the form is shown again
    pub fn without_passwords(mut self) -> Self {
        self.password1.clear();
        self.password2.clear();
        self
    }
}

fn clean_email(errors: &mut FormErrors, raw: &str) -> Option<String> {
    let value = clean_char_field(errors, "email", raw, EMAIL_MAX_LENGTH)?;
    if is_valid_email(&value) {
        Some(value)
    } else {
        errors.add("email", INVALID_EMAIL);
        None
    }
}

fn clean_gender(errors: &mut FormErrors, raw: &str) -> Option<Gender> {
    if raw.trim().is_empty() {
        errors.add("gender", REQUIRED);
        return None;
    }
    match raw.trim().parse() {
        Ok(gender) => Some(gender),
        Err(_) => {
            errors.add(
                "gender",
                format!(
                    "Select a valid choice. {} is not one of the available choices.",
                    raw.trim()
                ),
            );
            None
        }
    }
}

fn clean_username(errors: &mut FormErrors, raw: &str, taken: bool) -> Option<String> {
    let value = clean_char_field(errors, "username", raw, USERNAME_MAX_LENGTH)?;
    if !USERNAME_REGEX.is_match(&value) {
        errors.add("username", INVALID_USERNAME);
        return None;
    }
    if taken {
        errors.add("username", USERNAME_TAKEN);
        return None;
    }
    Some(value)
}

pub fn is_valid_email(value: &str) -> bool {
    let Some((user, domain)) = value.rsplit_once('@') else {
        return false;
    };
    EMAIL_USER_REGEX.is_match(user)
        && (domain == "localhost" || EMAIL_DOMAIN_REGEX.is_match(domain))
}

/// Strength problems for a password, in the order they are reported.
///
/// `attributes` pairs a human-readable field name with the user's value for it.
pub fn password_problems(password: &str, attributes: &[(&str, &str)]) -> Vec<String> {
    let mut problems = Vec::new();
    let lowered = password.to_lowercase();

    for (name, value) in attributes {
        let value = value.to_lowercase();
        if value.chars().count() < 3 {
            continue;
        }
        // Emails are also compared by their local part
        let mut parts = vec![value.as_str()];
        if let Some((local, _)) = value.split_once('@') {
            if local.chars().count() >= 3 {
                parts.push(local);
            }
        }
        if parts
            .iter()
            .any(|part| lowered.contains(part) || part.contains(lowered.as_str()))
        {
            problems.push(format!("The password is too similar to the {}.", name));
            break;
        }
    }

    if password.chars().count() < PASSWORD_MIN_LENGTH {
        problems.push(format!(
            "This password is too short. It must contain at least {} characters.",
            PASSWORD_MIN_LENGTH
        ));
    }

    if COMMON_PASSWORDS.contains(&lowered.trim()) {
        problems.push("This password is too common.".to_string());
    }

    if password.chars().all(|c| c.is_ascii_digit()) {
        problems.push("This password is entirely numeric.".to_string());
    }

    problems
}
