//! Shared primitives for all Rust crates in Kinboard.

#![forbid(unsafe_code)]

/// Authentication primitives shared across services.
pub mod auth;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::UserIdentity;

/// Result type used across Kinboard crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string. Surrounding whitespace is trimmed.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
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
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// User is not authenticated or not allowed to access a resource.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Signed token failed signature, format, issuer or audience checks.
    #[error("invalid token: {0}")]
    TokenInvalid(String),

    /// Signed token was well formed but its lifetime has passed.
    #[error("token expired")]
    TokenExpired,

    /// Signed token verified but lacks a required claim.
    #[error("missing token claims: {0}")]
    MissingClaims(String),

    /// Outbound mail could not be delivered.
    #[error("delivery error: {0}")]
    Delivery(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns `true` for errors produced while decoding a signed token.
    #[must_use]
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            Self::TokenInvalid(_) | Self::TokenExpired | Self::MissingClaims(_)
        )
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
    fn non_empty_string_trims_surrounding_whitespace() {
        let value = NonEmptyString::new("  Sunday dinner ");
        assert_eq!(
            value.map(String::from).ok().as_deref(),
            Some("Sunday dinner")
        );
    }

    #[test]
    fn token_errors_are_classified() {
        assert!(AppError::TokenExpired.is_token_error());
        assert!(AppError::MissingClaims("inviteId".to_owned()).is_token_error());
        assert!(!AppError::NotFound("invite".to_owned()).is_token_error());
    }
}
