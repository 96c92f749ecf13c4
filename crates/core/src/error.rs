//! Client-side domain error model.

use thiserror::Error;

/// Result type used across the core crate.
pub type DomainResult<T> = Result<T, DomainError>;

/// Failure detected before (or instead of) talking to the remote API.
///
/// The `Display` output is the user-facing message; presenters show it as-is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// User input failed a client-side check (ratings, seat counts, ...).
    #[error("{0}")]
    Validation(String),

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A record the view needed was missing (ride, driver, ...).
    #[error("{0}")]
    NotFound(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}
