//! Input validation for patient, appointment and message fields.

use std::fmt;

use chrono::{DateTime, Datelike, Utc};

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid phone number format.
    InvalidPhoneNumber(String),
    /// Invalid language tag.
    InvalidLanguage(String),
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Empty value where one is required.
    Empty(String),
    /// Time outside the range the store can order correctly.
    TimeOutOfRange(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidPhoneNumber(msg) => write!(f, "Invalid phone number: {}", msg),
            ValidationError::InvalidLanguage(msg) => write!(f, "Invalid language: {}", msg),
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
            ValidationError::TimeOutOfRange(msg) => write!(f, "Time out of range: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum allowed length for phone numbers.
pub const MAX_PHONE_LENGTH: usize = 25;

/// Maximum allowed length for patient display names.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum allowed length for language tags.
pub const MAX_LANGUAGE_LENGTH: usize = 10;

/// Maximum allowed length for message senders.
pub const MAX_SENDER_LENGTH: usize = 50;

/// Maximum allowed length for session identifiers.
pub const MAX_SESSION_ID_LENGTH: usize = 100;

/// Years that format as exactly four digits.
pub const MIN_YEAR: i32 = 0;
pub const MAX_YEAR: i32 = 9999;

fn check_length(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
            actual,
        });
    }
    Ok(())
}

fn check_required(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }
    check_length(field, value, max)
}

/// Validate a phone number.
///
/// Accepts an optional leading `+` followed by digits only, e.g. `+254712345678`.
/// Callers holding a raw webhook number should run it through
/// [`crate::patient::normalize_phone_number`] first.
pub fn validate_phone_number(phone: &str) -> Result<(), ValidationError> {
    check_required("phone number", phone, MAX_PHONE_LENGTH)?;

    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.is_empty() {
        return Err(ValidationError::InvalidPhoneNumber(
            "must contain at least one digit".to_string(),
        ));
    }

    if let Some(c) = digits.chars().find(|c| !c.is_ascii_digit()) {
        return Err(ValidationError::InvalidPhoneNumber(format!(
            "invalid character '{}'",
            c
        )));
    }

    Ok(())
}

/// Validate a language tag such as `en`, `sw` or `pt-BR`.
pub fn validate_language(language: &str) -> Result<(), ValidationError> {
    check_required("language", language, MAX_LANGUAGE_LENGTH)?;

    if !language
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ValidationError::InvalidLanguage(format!(
            "'{}' must be alphanumeric with optional hyphens",
            language
        )));
    }

    Ok(())
}

/// Validate an optional patient display name.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    check_length("name", name, MAX_NAME_LENGTH)
}

/// Validate a message sender label.
pub fn validate_sender(sender: &str) -> Result<(), ValidationError> {
    check_required("sender", sender, MAX_SENDER_LENGTH)
}

/// Validate a conversation session identifier.
pub fn validate_session_id(session_id: &str) -> Result<(), ValidationError> {
    check_required("session id", session_id, MAX_SESSION_ID_LENGTH)
}

/// Validate message content.
pub fn validate_content(content: &str) -> Result<(), ValidationError> {
    if content.is_empty() {
        return Err(ValidationError::Empty("content".to_string()));
    }
    Ok(())
}

/// Validate an appointment time.
///
/// Stored times sort as text, so the year must fit in four digits.
pub fn validate_appointment_time(time: &DateTime<Utc>) -> Result<(), ValidationError> {
    let year = time.year();
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(ValidationError::TimeOutOfRange(format!(
            "year {} is outside {}..={}",
            year, MIN_YEAR, MAX_YEAR
        )));
    }
    Ok(())
}
