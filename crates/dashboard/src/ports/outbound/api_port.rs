//! Transport-level error for REST calls

/// Errors produced by the HTTP boundary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, reset, ...
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Server answered with a non-2xx status
    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    /// Transport timeout elapsed
    #[error("Request timed out")]
    Timeout,

    /// Response body did not match the expected shape
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Request body could not be encoded
    #[error("Failed to serialize request: {0}")]
    SerializeError(String),

    /// URL could not be built from the configured base
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::HttpError {
            status,
            message: message.into(),
        }
    }

    /// HTTP status, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether a read may succeed if simply tried again
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::RequestFailed(_) | ApiError::Timeout => true,
            ApiError::HttpError { status, .. } => *status >= 500 || *status == 429,
            ApiError::ParseError(_) | ApiError::SerializeError(_) | ApiError::InvalidUrl(_) => {
                false
            }
        }
    }
}
