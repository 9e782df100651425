//! Error handling for the Taskboard API client

use http::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Unified error type for calls made through the API client
#[derive(Error, Debug)]
pub enum ApiError {
    /// Network or transport errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing errors
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// JSON serialization or deserialization errors
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Missing, expired or rejected credentials (401/403)
    #[error("Unauthorized: {} (Status: {status})", .detail.as_deref().unwrap_or("missing or invalid token"))]
    Unauthorized {
        status: StatusCode,
        detail: Option<String>,
    },

    /// The requested entity does not exist (404)
    #[error("Not found: {}", .detail.as_deref().unwrap_or("resource not found"))]
    NotFound { detail: Option<String> },

    /// The server rejected the payload (400/422)
    #[error("Validation error: {} (Status: {status})", .detail.as_deref().unwrap_or("invalid request"))]
    Validation {
        status: StatusCode,
        detail: Option<String>,
    },

    /// Any other non-success status
    #[error("API error: {} (Status: {status})", .detail.as_deref().unwrap_or("request failed"))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },

    /// Token storage could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Error body returned by the API server
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<Value>,
}

impl ApiError {
    /// Build an error from a non-success status and the raw response body
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let detail = parse_detail(body);

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ApiError::Unauthorized { status, detail }
            }
            StatusCode::NOT_FOUND => ApiError::NotFound { detail },
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ApiError::Validation { status, detail }
            }
            _ => ApiError::Status { status, detail },
        }
    }

    /// Create a new storage error
    pub fn storage<T: std::fmt::Display>(msg: T) -> Self {
        ApiError::Storage(msg.to_string())
    }

    /// The server supplied failure detail, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { detail, .. }
            | ApiError::NotFound { detail }
            | ApiError::Validation { detail, .. }
            | ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// The HTTP status the server answered with, if the request got that far
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            ApiError::Unauthorized { status, .. }
            | ApiError::Validation { status, .. }
            | ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(err) => err.status(),
            _ => None,
        }
    }

    /// Whether the failure means the bearer token is missing or no longer accepted
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// Whether the failure is a not-found answer
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

/// Extract a human readable `detail` from an error body.
///
/// The server answers either `{"detail": "..."}` or, for schema failures,
/// `{"detail": [{"loc": [...], "msg": "..."}]}`.
fn parse_detail(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<ErrorBody>(body).ok()?;

    match parsed.detail? {
        Value::String(message) => Some(message),
        Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .map(str::to_string)
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_detail() {
        let err = ApiError::from_response(
            StatusCode::BAD_REQUEST,
            r#"{"detail": "The user with this email already exists in the system."}"#,
        );

        assert!(matches!(err, ApiError::Validation { .. }));
        assert_eq!(
            err.detail(),
            Some("The user with this email already exists in the system.")
        );
    }

    #[test]
    fn test_list_detail_is_joined() {
        let err = ApiError::from_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail": [{"loc": ["body", "email"], "msg": "field required"}, {"loc": ["body", "password"], "msg": "field required"}]}"#,
        );

        assert_eq!(err.detail(), Some("field required; field required"));
    }

    #[test]
    fn test_status_classification() {
        assert!(ApiError::from_response(StatusCode::UNAUTHORIZED, "").is_unauthorized());
        assert!(ApiError::from_response(StatusCode::FORBIDDEN, "{}").is_unauthorized());
        assert!(ApiError::from_response(StatusCode::NOT_FOUND, r#"{"detail":"Task not found"}"#)
            .is_not_found());

        let err = ApiError::from_response(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(matches!(err, ApiError::Status { .. }));
        assert_eq!(err.detail(), None);
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn test_forbidden_keeps_its_status() {
        let err = ApiError::from_response(
            StatusCode::FORBIDDEN,
            r#"{"detail": "Not enough permissions"}"#,
        );

        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(err.detail(), Some("Not enough permissions"));

        let err = ApiError::from_response(StatusCode::UNAUTHORIZED, "");
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn test_display_falls_back_without_detail() {
        let err = ApiError::from_response(StatusCode::NOT_FOUND, "");
        assert_eq!(err.to_string(), "Not found: resource not found");
    }
}
