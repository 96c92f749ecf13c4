//! Error types of the request layer and the view controllers.

use carpool_core::DomainError;
use serde_json::Value;
use thiserror::Error;

/// A failed exchange with the remote API.
///
/// `Display` is exactly the human-readable message, so presenters can show
/// the error as-is. Network-level failures use the same type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The request never produced a response (connect, DNS, body read, ...).
    #[error("{0}")]
    Transport(String),

    /// A 2xx response whose body was not the expected JSON.
    #[error("{0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

/// Human-readable message of a failed response body.
///
/// `detail` wins over `error`; a body with neither is serialized whole.
pub fn error_message(body: &Value) -> String {
    for key in ["detail", "error"] {
        match body.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return s.clone(),
            Some(Value::Null) | Some(Value::Bool(false)) | Some(Value::String(_)) | None => {}
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => {}
            Some(other) => return other.to_string(),
        }
    }
    body.to_string()
}

/// Everything a view controller can trip over while handling one action.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("session storage: {0}")]
    Session(#[from] std::io::Error),

    #[error("Please log in first.")]
    Unauthenticated,
}
