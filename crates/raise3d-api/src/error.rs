//! API error types

use thiserror::Error;

/// Errors from talking to the printer
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP status {status} from {endpoint}")]
    HttpStatus {
        status: reqwest::StatusCode,
        endpoint: String,
    },

    #[error("printer error {code}: {message}")]
    Printer { code: i64, message: String },

    #[error("malformed printer response: {0}")]
    Protocol(String),

    #[error("authentication token required for this call")]
    AuthRequired,
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// The HTTP-style status code carried by this error, if any.
    ///
    /// The printer reports failures both as plain HTTP statuses and as
    /// HTTP-like codes inside the response envelope; callers that map
    /// failures (401 reauth, 403 bad password, 404 unsupported endpoint)
    /// treat the two the same way.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(status.as_u16()),
            ApiError::Printer { code, .. } => u16::try_from(*code).ok(),
            ApiError::Request(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(401)
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    /// True for failures worth a single delayed retry: connection aborts,
    /// resets, and the printer's 429 throttling response.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Request(err) => err.is_connect() || err.is_timeout(),
            other => other.status_code() == Some(429),
        }
    }
}
