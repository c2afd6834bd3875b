//! Failures surfaced by the API gateway.

use serde::Deserialize;
use thiserror::Error;

/// Coarse classification call sites branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ValidationRejected,
    Unauthenticated,
    Unauthorized,
    Unreachable,
    RequestSetup,
    Unexpected,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The server declined the payload (400, 409, 422).
    #[error("request rejected ({status}): {}", message.as_deref().unwrap_or("no details"))]
    ValidationRejected { status: u16, message: Option<String> },
    /// 401. The session has already been reset when a caller sees this.
    #[error("session expired")]
    Unauthenticated,
    #[error("forbidden: {}", message.as_deref().unwrap_or("no details"))]
    Unauthorized { message: Option<String> },
    #[error("no response from server: {0}")]
    Unreachable(String),
    #[error("could not build request: {0}")]
    RequestSetup(String),
    #[error("unexpected response{}: {message}", status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Unexpected {
        status: Option<u16>,
        message: String,
        server_message: Option<String>,
    },
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Shape of error bodies the backend sends.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ValidationRejected { .. } => ErrorKind::ValidationRejected,
            Self::Unauthenticated => ErrorKind::Unauthenticated,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Unreachable(_) => ErrorKind::Unreachable,
            Self::RequestSetup(_) => ErrorKind::RequestSetup,
            Self::Unexpected { .. } => ErrorKind::Unexpected,
        }
    }

    /// Build the error for a non-success status and its (possibly absent) message.
    pub(crate) fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            401 => Self::Unauthenticated,
            403 => Self::Unauthorized { message },
            400 | 409 | 422 => Self::ValidationRejected { status, message },
            _ => Self::Unexpected {
                status: Some(status),
                message: message.clone().unwrap_or_else(|| format!("HTTP {status}")),
                server_message: message,
            },
        }
    }

    /// The `message` field of the server's error body, when it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::ValidationRejected { message, .. } | Self::Unauthorized { message } => {
                message.as_deref()
            }
            Self::Unexpected { server_message, .. } => server_message.as_deref(),
            _ => None,
        }
    }

    /// Text suitable for a notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unreachable(_) => "No response from server".to_string(),
            Self::RequestSetup(_) => "Error setting up request".to_string(),
            other => other
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| "An error occurred".to_string()),
        }
    }

    /// Server message, or `fallback` when the server gave none.
    pub fn message_or(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_to_kinds() {
        assert_eq!(ApiError::from_status(401, None).kind(), ErrorKind::Unauthenticated);
        assert_eq!(ApiError::from_status(403, None).kind(), ErrorKind::Unauthorized);
        for status in [400, 409, 422] {
            assert_eq!(
                ApiError::from_status(status, None).kind(),
                ErrorKind::ValidationRejected
            );
        }
        assert_eq!(ApiError::from_status(500, None).kind(), ErrorKind::Unexpected);
        assert_eq!(ApiError::from_status(404, None).kind(), ErrorKind::Unexpected);
    }

    #[test]
    fn user_message_prefers_the_server_text() {
        let dup = ApiError::from_status(409, Some("Badge number already exists".into()));
        assert_eq!(dup.user_message(), "Badge number already exists");
        assert_eq!(ApiError::from_status(500, None).user_message(), "An error occurred");
        assert_eq!(
            ApiError::from_status(500, Some("db down".into())).user_message(),
            "db down"
        );
        assert_eq!(ApiError::Unreachable("refused".into()).user_message(), "No response from server");
        assert_eq!(ApiError::RequestSetup("bad url".into()).user_message(), "Error setting up request");
    }

    #[test]
    fn message_or_falls_back() {
        assert_eq!(ApiError::Unauthenticated.message_or("Login failed"), "Login failed");
        assert_eq!(
            ApiError::from_status(400, Some("Invalid credentials".into())).message_or("Login failed"),
            "Invalid credentials"
        );
    }
}
