//! Shared primitives for all Rust crates in obsq.

#![forbid(unsafe_code)]

/// Injection-safe quoting for the backend's SQL dialect.
pub mod sql;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use sql::{escape_literal, quote_identifier};

/// Result type used across obsq crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Creates a validated non-empty string, naming the offending field on failure.
    pub fn for_field(field: &str, value: impl Into<String>) -> AppResult<Self> {
        Self::new(value)
            .map_err(|_| AppError::Validation(format!("{field} must not be empty or whitespace")))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant, detected before any backend call.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist in the backend.
    #[error("not found: {0}")]
    NotFound(String),

    /// Backend answered with a non-success HTTP status.
    #[error("backend returned status {0}")]
    BackendStatus(u16),

    /// Backend could not be reached or returned an undecodable response.
    #[error("backend error: {0}")]
    Backend(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns whether the error was caused by the caller's input rather than the backend.
    #[must_use]
    pub fn is_caller_fault(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, NonEmptyString};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn for_field_names_the_field() {
        let result = NonEmptyString::for_field("namespace", "\t");
        assert!(
            matches!(result, Err(AppError::Validation(message)) if message.starts_with("namespace"))
        );
    }

    #[test]
    fn backend_status_does_not_carry_body() {
        let error = AppError::BackendStatus(502);
        assert_eq!(error.to_string(), "backend returned status 502");
        assert!(!error.is_caller_fault());
    }
}
