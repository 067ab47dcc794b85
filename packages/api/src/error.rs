//! Error taxonomy shared by every client operation.
//!
//! [`ApiError::from_response`] is the single place where an HTTP status and
//! body become a typed error. Callers branch on the variant; they never look
//! at status codes themselves.

use serde::Deserialize;
use thiserror::Error;

/// A failed client operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Missing, invalid or expired credential.
    #[error("Authentication required: {message}")]
    Auth { message: String },

    /// The payload was rejected, locally or by the server.
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// The target resource does not exist.
    #[error("Not found")]
    NotFound,

    /// No response from the server (DNS, refused connection, timeout).
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Any other status, or a success response that could not be decoded.
    #[error("Unexpected response (HTTP {status}): {message}")]
    Unexpected { status: u16, message: String },
}

/// Result alias for client operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error body returned by the server: `{"message": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl ApiError {
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn unexpected(status: u16, message: impl Into<String>) -> Self {
        Self::Unexpected {
            status,
            message: message.into(),
        }
    }

    /// Classify a non-success response.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let structured = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .map(|b| b.message);

        match status {
            401 | 403 => Self::auth(structured.unwrap_or_else(|| "credential rejected".to_string())),
            404 => Self::NotFound,
            400 | 422 => match structured {
                Some(message) => Self::validation(message),
                None => Self::unexpected(status, String::from_utf8_lossy(body)),
            },
            _ => Self::unexpected(
                status,
                structured.unwrap_or_else(|| String::from_utf8_lossy(body).into_owned()),
            ),
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Only a missing response is worth offering a retry for.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// HTTP status when the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unexpected { status, .. } => Some(*status),
            Self::NotFound => Some(404),
            _ => None,
        }
    }

    /// Message suitable for showing next to a form or in a banner.
    pub fn message(&self) -> &str {
        match self {
            Self::Auth { message }
            | Self::Validation { message }
            | Self::Transport { message }
            | Self::Unexpected { message, .. } => message,
            Self::NotFound => "not found",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(ApiError::from_response(401, b"").is_auth());
        assert!(ApiError::from_response(403, br#"{"message":"not yours"}"#).is_auth());
        assert_eq!(ApiError::from_response(404, b"whatever"), ApiError::NotFound);
        assert_eq!(
            ApiError::from_response(400, br#"{"message":"title is required"}"#),
            ApiError::validation("title is required")
        );
        assert_eq!(
            ApiError::from_response(422, br#"{"message":"too long"}"#),
            ApiError::validation("too long")
        );
        assert_eq!(
            ApiError::from_response(500, b"boom"),
            ApiError::unexpected(500, "boom")
        );
    }

    #[test]
    fn test_unstructured_bad_request_is_unexpected() {
        let err = ApiError::from_response(400, b"<html>bad</html>");
        assert_eq!(err.status(), Some(400));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_auth_keeps_server_message() {
        let err = ApiError::from_response(401, br#"{"message":"token expired"}"#);
        assert_eq!(err.message(), "token expired");
    }

    #[test]
    fn test_only_transport_is_retryable() {
        assert!(ApiError::transport("connection refused").is_retryable());
        assert!(!ApiError::auth("no").is_retryable());
        assert!(!ApiError::NotFound.is_retryable());
        assert!(!ApiError::unexpected(503, "busy").is_retryable());
    }
}
