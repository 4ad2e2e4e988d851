//! Domain error types.

use thiserror::Error;

/// Errors raised by domain services and repository implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn not_found(what: &str) -> Self {
        DomainError::NotFound(format!("{} not found", what))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        DomainError::Conflict(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |err| match &err.message {
                    Some(message) => format!("{}: {}", field, message),
                    None => format!("{}: {}", field, err.code),
                })
            })
            .collect();
        DomainError::Validation(messages.join(", "))
    }
}

impl From<shared::pagination::PaginationError> for DomainError {
    fn from(err: shared::pagination::PaginationError) -> Self {
        DomainError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        assert_eq!(
            DomainError::not_found("Event").to_string(),
            "Not found: Event not found"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            DomainError::CapacityExceeded("full".into()).to_string(),
            "Capacity exceeded: full"
        );
        assert_eq!(DomainError::conflict("dup").to_string(), "Conflict: dup");
    }

    #[test]
    fn test_from_validation_errors() {
        let mut errors = validator::ValidationErrors::new();
        let mut err = validator::ValidationError::new("length");
        err.message = Some("Name must be 1-255 characters".into());
        errors.add("name", err);

        let domain: DomainError = errors.into();
        assert_eq!(
            domain,
            DomainError::Validation("name: Name must be 1-255 characters".into())
        );
    }
}
