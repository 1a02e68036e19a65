//! Fetch errors and their user-facing messages

use serde_json::Value;
use thiserror::Error;

/// Failure of a single GET against the API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No HTTP status could be obtained (offline, DNS, refused connection)
    #[error("network unreachable: {0}")]
    Network(String),
    /// The server answered with a 5xx status
    #[error("server error: HTTP {status}")]
    Server { status: u16 },
    /// Any other non-success status, with the backend message if one was sent
    #[error("request failed: HTTP {status}")]
    Status {
        status: u16,
        message: Option<String>,
    },
    /// A success response whose body does not match the expected shape
    #[error("malformed response: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn network(error: impl std::fmt::Display) -> Self {
        Self::Network(error.to_string())
    }

    pub fn decode(error: impl std::fmt::Display) -> Self {
        Self::Decode(error.to_string())
    }

    /// Classify a non-success response from its status and raw body
    pub fn from_status(status: u16, body: &str) -> Self {
        if status >= 500 {
            return Self::Server { status };
        }

        Self::Status {
            status,
            message: backend_message(body),
        }
    }

    /// HTTP status, when one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Network(_) | Self::Decode(_) => None,
            Self::Server { status } | Self::Status { status, .. } => Some(*status),
        }
    }
}

/// Pull the human-readable message out of an error body.
/// SWAPI sends `{"detail": "..."}`; other backends use `message`.
fn backend_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "detail"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Format a fetch error for display
pub fn format_error(error: &FetchError) -> String {
    match error {
        FetchError::Network(_) => "Network error! Are you online?".to_string(),
        FetchError::Server { .. } => "Server error. Please try again later.".to_string(),
        FetchError::Status { status, message } => format!(
            "Error {}: {}",
            status,
            message.as_deref().unwrap_or("Unknown error")
        ),
        FetchError::Decode(_) => "Unexpected response format.".to_string(),
    }
}
