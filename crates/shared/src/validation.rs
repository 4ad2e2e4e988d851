//! Common validation utilities.

use chrono::NaiveDate;
use validator::ValidationError;

lazy_static::lazy_static! {
    /// Optional leading `+`, then 7 to 15 digits (E.164 length bounds).
    pub static ref PHONE_REGEX: regex::Regex = regex::Regex::new(r"^\+?[0-9]{7,15}$").unwrap();
}

/// Validates a phone number in compact international form.
pub fn validate_phone_number(phone: &str) -> Result<(), ValidationError> {
    if PHONE_REGEX.is_match(phone) {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone_format");
        err.message = Some("Phone number must contain 7 to 15 digits, optionally prefixed with +".into());
        Err(err)
    }
}

/// Validates that a date range is not inverted.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if end >= start {
        Ok(())
    } else {
        let mut err = ValidationError::new("date_range");
        err.message = Some("End date must not be before start date".into());
        Err(err)
    }
}

/// Validates that a string is not only whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}
