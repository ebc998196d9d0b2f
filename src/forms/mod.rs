//! HTML form validation
//!
//! Forms deserialize from `application/x-www-form-urlencoded` bodies and
//! validate into cleaned values or a [`FormErrors`] map keyed by field name.

pub mod login;
pub mod registration;

pub use login::{LoginData, LoginForm};
pub use registration::RegistrationForm;

use serde::Serialize;
use std::collections::BTreeMap;

pub const REQUIRED: &str = "This field is required.";

/// Validation errors, field name to messages in the order they were found
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages for `field`, empty if it validated
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Required text field: stripped, non-empty, at most `max_chars` characters
pub(crate) fn clean_char_field(
    errors: &mut FormErrors,
    field: &str,
    raw: &str,
    max_chars: usize,
) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
        return None;
    }
    let len = value.chars().count();
    if len > max_chars {
        errors.add(
            field,
            format!(
                "Ensure this value has at most {} characters (it has {}).",
                max_chars, len
            ),
        );
        return None;
    }
    Some(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_accumulate_per_field() {
        let mut errors = FormErrors::new();
        assert!(errors.is_empty());

        errors.add("password2", "first");
        errors.add("password2", "second");
        errors.add("email", "bad");

        assert!(!errors.is_empty());
        assert_eq!(errors.get("password2"), ["first", "second"]);
        assert_eq!(errors.get("email"), ["bad"]);
        assert!(errors.get("username").is_empty());
    }

    #[test]
    fn test_errors_serialize_as_map() {
        let mut errors = FormErrors::new();
        errors.add("email", "Enter a valid email address.");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["email"][0], "Enter a valid email address.");
    }

    #[test]
    fn test_clean_char_field() {
        let mut errors = FormErrors::new();
        assert_eq!(
            clean_char_field(&mut errors, "name", "  Ada ", 30),
            Some("Ada".to_string())
        );
        assert!(errors.is_empty());

        assert_eq!(clean_char_field(&mut errors, "name", "   ", 30), None);
        assert_eq!(errors.get("name"), [REQUIRED]);

        assert_eq!(clean_char_field(&mut errors, "long", "abcdef", 5), None);
        assert_eq!(
            errors.get("long"),
            ["Ensure this value has at most 5 characters (it has 6)."]
        );
    }
}
