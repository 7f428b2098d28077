// ABOUTME: Error types for platform API calls.
// ABOUTME: Keeps the HTTP status so callers can tolerate 403/404/409 selectively.

use reqwest::StatusCode;

/// Errors from the platform REST API.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The API answered with a non-success status.
    #[error("{method} {path} returned {status}: {body}")]
    Http {
        method: &'static str,
        path: String,
        status: StatusCode,
        body: String,
    },

    /// The request never produced a response.
    #[error("request to {path} failed: {message}")]
    Transport { path: String, message: String },

    /// The response body could not be interpreted.
    #[error("unexpected response from {path}: {message}")]
    Decode { path: String, message: String },

    /// Token acquisition failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Client construction failed.
    #[error("invalid client configuration: {0}")]
    Client(String),
}

impl PlatformError {
    /// HTTP status of the failed call, when the API answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            PlatformError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(StatusCode::CONFLICT)
    }

    /// Build an HTTP error for `method path` with the given status.
    pub fn http(method: &'static str, path: impl Into<String>, status: StatusCode) -> Self {
        PlatformError::Http {
            method,
            path: path.into(),
            status,
            body: String::new(),
        }
    }
}
