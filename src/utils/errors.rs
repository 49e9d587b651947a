use serde_json::Value;
use thiserror::Error;

use crate::constants::{NETWORK_ERROR_MSG, REQUEST_FAILED_DEFAULT};

/// Failure to read the claims out of a bearer token
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token must have three non-empty segments, found {0}")]
    Segments(usize),

    #[error("token payload is not valid base64: {0}")]
    Encoding(String),

    #[error("token payload is not valid JSON: {0}")]
    Payload(String),

    #[error("token payload has no numeric exp claim")]
    MissingExpiry,
}

/// Persisted session storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage format error: {0}")]
    Format(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors reported by an authentication backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// The server answered but refused the credentials
    #[error("{}", .message.as_deref().unwrap_or("authentication rejected"))]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    /// No response was received
    #[error("Network error: {0}")]
    Network(String),
}

/// Errors surfaced by session operations (login, register)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Credentials(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Could not persist session: {0}")]
    Storage(String),
}

impl SessionError {
    /// Message suitable for showing inline on a form
    pub fn message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::Credentials(msg) => msg.clone(),
            Self::Network(_) => NETWORK_ERROR_MSG.to_string(),
            Self::Storage(msg) => format!("Could not persist session: {}", msg),
        }
    }
}

/// Errors surfaced by the authorized request gateway
#[derive(Error, Debug)]
pub enum ApiError {
    /// The server rejected the bearer token; the session has been cleared
    #[error("Session expired")]
    SessionExpired,

    /// Non-success response, payload passed through untouched
    #[error("Server error ({status}): {}", server_message(.payload))]
    Server { status: u16, payload: Value },

    /// No response received
    #[error("Network error: {0}")]
    Network(String),

    /// Rejected locally before any request was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// Response arrived but its body did not match the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// The HTTP client could not be built
    #[error("Client error: {0}")]
    Client(String),
}

impl ApiError {
    /// Human-readable message, preferring what the server said
    pub fn message(&self) -> String {
        match self {
            Self::SessionExpired => crate::constants::SESSION_EXPIRED_NOTICE.to_string(),
            Self::Server { payload, .. } => server_message(payload),
            Self::Network(_) => NETWORK_ERROR_MSG.to_string(),
            Self::Validation(msg) | Self::Decode(msg) | Self::Client(msg) => msg.clone(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Pull the first human-readable field out of a server error payload
pub fn server_message(payload: &Value) -> String {
    payload_message(payload).unwrap_or_else(|| REQUEST_FAILED_DEFAULT.to_string())
}

pub(crate) fn payload_message(payload: &Value) -> Option<String> {
    ["error", "msg", "message"]
        .iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_server_message_field_priority() {
        assert_eq!(server_message(&json!({"error": "a", "msg": "b"})), "a");
        assert_eq!(server_message(&json!({"msg": "b"})), "b");
        assert_eq!(server_message(&json!({"message": "c"})), "c");
        assert_eq!(server_message(&json!({"errors": ["x"]})), REQUEST_FAILED_DEFAULT);
        assert_eq!(server_message(&json!("plain")), REQUEST_FAILED_DEFAULT);
    }

    #[test]
    fn test_api_error_helpers() {
        let not_found = ApiError::Server {
            status: 404,
            payload: json!({"error": "Event not found"}),
        };
        assert!(not_found.is_not_found());
        assert_eq!(not_found.message(), "Event not found");

        let network = ApiError::Network("connection refused".into());
        assert!(network.is_network());
        assert_eq!(network.status(), None);
        assert_eq!(network.message(), NETWORK_ERROR_MSG);
    }
}
