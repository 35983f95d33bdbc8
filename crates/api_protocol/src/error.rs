//! API error envelope.

use serde::{Deserialize, Serialize};

/// Machine-readable error codes carried in [`ErrorDetail::code`].
pub mod error_codes {
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    pub const AUTHENTICATION_REQUIRED: &str = "AUTHENTICATION_REQUIRED";
    pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
    pub const RESOURCE_NOT_FOUND: &str = "RESOURCE_NOT_FOUND";
    pub const CONFLICT: &str = "CONFLICT";
    pub const NOT_IMPLEMENTED: &str = "NOT_IMPLEMENTED";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Body of every error response: `{"error": {"code", "message"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Error details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// One of [`error_codes`].
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Number of shows still referencing a band or venue that could not be
    /// deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shows_count: Option<u64>,
}

impl ErrorBody {
    /// Creates an error body.
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.to_string(),
                message: message.into(),
                shows_count: None,
            },
        }
    }

    /// Attaches a referencing show count.
    pub fn with_shows_count(mut self, shows_count: u64) -> Self {
        self.error.shows_count = Some(shows_count);
        self
    }
}

impl std::fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.error.code, self.error.message)
    }
}

impl std::error::Error for ErrorBody {}
