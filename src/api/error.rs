//! API error types for the Microprediction REST API client.

use thiserror::Error;

use crate::shared::DecodeError;

/// API-specific error type for the Microprediction REST API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP/network error from reqwest, with the request URL stripped
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// Invalid request parameters (400)
    #[error("Bad request: {0}")]
    BadRequest(ErrorResponse),

    /// Write key rejected (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(ErrorResponse),

    /// Permission denied (403)
    #[error("Permission denied: {0}")]
    Forbidden(ErrorResponse),

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(ErrorResponse),

    /// Conflicting state (409)
    #[error("Conflict: {0}")]
    Conflict(ErrorResponse),

    /// Too many requests (429)
    #[error("Rate limited: {0}")]
    RateLimited(ErrorResponse),

    /// Server-side error (5xx)
    #[error("Server error: {0}")]
    ServerError(ErrorResponse),

    /// Unexpected HTTP status code
    #[error("Unexpected status {0}: {1}")]
    UnexpectedStatus(u16, ErrorResponse),

    /// Lagged payload did not have the `[[t, v], ...]` shape
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// JSON deserialization error
    #[error("Deserialization error: {0}")]
    Deserialize(String),

    /// Invalid parameter provided
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Endpoint needs a write key but the client was built without one
    #[error("A write key is required for this endpoint")]
    MissingWriteKey,
}

impl ApiError {
    /// HTTP status code for remote errors, `None` for local ones.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::BadRequest(_) => Some(400),
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::Conflict(_) => Some(409),
            Self::RateLimited(_) => Some(429),
            Self::ServerError(resp) => Some(resp.status_hint.unwrap_or(500)),
            Self::UnexpectedStatus(code, _) => Some(*code),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The parsed error body, for remote errors.
    pub fn error_response(&self) -> Option<&ErrorResponse> {
        match self {
            Self::BadRequest(resp)
            | Self::Unauthorized(resp)
            | Self::Forbidden(resp)
            | Self::NotFound(resp)
            | Self::Conflict(resp)
            | Self::RateLimited(resp)
            | Self::ServerError(resp)
            | Self::UnexpectedStatus(_, resp) => Some(resp),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    /// Strips the request URL, which may carry a write key.
    fn from(err: reqwest::Error) -> Self {
        ApiError::Http(err.without_url())
    }
}

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error response format from the API.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ErrorResponse {
    /// Error status, when the server sends one
    #[serde(default)]
    pub status: Option<String>,
    /// Human-readable error message
    #[serde(default, alias = "error")]
    pub message: Option<String>,
    /// Additional error details
    #[serde(default)]
    pub details: Option<String>,
    /// Exact 5xx status, filled in by the client
    #[serde(skip)]
    pub status_hint: Option<u16>,
}

impl ErrorResponse {
    /// Wrap a raw (non-JSON) error body.
    pub fn from_text(text: String) -> Self {
        Self {
            message: Some(text),
            ..Default::default()
        }
    }

    /// Get the error message, preferring `message` over `details`.
    pub fn get_message(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.details.clone())
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.message, &self.details) {
            (Some(message), Some(details)) => write!(f, "{}: {}", message, details),
            _ => write!(f, "{}", self.get_message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_display() {
        let resp = ErrorResponse {
            message: Some("Stream not found".to_string()),
            details: Some("no stream named cop.json".to_string()),
            ..Default::default()
        };
        assert_eq!(resp.to_string(), "Stream not found: no stream named cop.json");

        let resp = ErrorResponse {
            details: Some("only details".to_string()),
            ..Default::default()
        };
        assert_eq!(resp.to_string(), "only details");

        assert_eq!(ErrorResponse::default().to_string(), "Unknown error");
    }

    #[test]
    fn test_error_response_aliases() {
        let resp: ErrorResponse = serde_json::from_str(r#"{"error": "bad key"}"#).unwrap();
        assert_eq!(resp.get_message(), "bad key");

        let resp: ErrorResponse = serde_json::from_str(r#"{"status": "error"}"#).unwrap();
        assert_eq!(resp.status.as_deref(), Some("error"));
        assert_eq!(resp.get_message(), "Unknown error");
    }

    #[test]
    fn test_server_error_keeps_exact_status() {
        let resp = ErrorResponse {
            status_hint: Some(503),
            ..ErrorResponse::from_text("maintenance".to_string())
        };
        assert_eq!(ApiError::ServerError(resp).status_code(), Some(503));
        assert_eq!(
            ApiError::ServerError(ErrorResponse::from_text("x".into())).status_code(),
            Some(500)
        );
    }
}
