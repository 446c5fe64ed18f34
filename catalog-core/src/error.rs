use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTTP status the backend uses for field-level validation failures.
pub const UNPROCESSABLE_ENTITY: u16 = 422;

/// One rejected field as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Failure reported by a catalog service call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Structured rejection naming the offending fields.
    #[error("validation failed with status {status}")]
    Validation {
        status: u16,
        message: Option<String>,
        errors: Vec<FieldViolation>,
    },
    /// Any other non-success response.
    #[error("request failed with status {status}")]
    Status {
        status: u16,
        message: Option<String>,
        error: Option<String>,
    },
    /// Connection, timeout or decode failure; no server message available.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ApiError {
    /// Human-facing text the server attached, `message` first.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Validation { message, .. } => non_blank(message),
            ApiError::Status { message, error, .. } => non_blank(message).or(non_blank(error)),
            ApiError::Transport(_) => None,
        }
    }

    /// Load screens prefer the short `error` label over `message`.
    pub fn load_message(&self) -> Option<&str> {
        match self {
            ApiError::Validation { message, .. } => non_blank(message),
            ApiError::Status { message, error, .. } => non_blank(error).or(non_blank(message)),
            ApiError::Transport(_) => None,
        }
    }
}

fn non_blank(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.trim().is_empty())
}
