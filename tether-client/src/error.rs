//! Error types for the Tether provider clients

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to a provider
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The provider cannot perform this operation
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Writing a downloaded file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// HTTP status code, if the provider answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            Self::RequestFailed(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(status) if (400..500).contains(&status))
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(status) if status >= 500)
    }

    /// Connection-level failure: no answer was obtained from the provider
    ///
    /// These are the only failures worth an immediate resend of a submission.
    pub fn is_network(&self) -> bool {
        match self {
            Self::RequestFailed(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    /// Failure that may clear up on its own while waiting for a job
    ///
    /// Network failures, rate limiting and server errors.
    pub fn is_transient(&self) -> bool {
        self.is_network() || self.status() == Some(429) || self.is_server_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let unauthorized = ClientError::api_error(401, "bad key");
        assert!(unauthorized.is_client_error());
        assert!(!unauthorized.is_transient());

        let missing = ClientError::api_error(404, "no such response");
        assert!(missing.is_not_found());
        assert!(!missing.is_transient());

        let throttled = ClientError::api_error(429, "slow down");
        assert!(throttled.is_transient());
        assert!(!throttled.is_network());

        let unavailable = ClientError::api_error(503, "maintenance");
        assert!(unavailable.is_server_error());
        assert!(unavailable.is_transient());
    }

    #[test]
    fn test_non_http_errors_are_not_transient() {
        assert!(!ClientError::ParseError("garbage".into()).is_transient());
        assert!(!ClientError::Unsupported("poll".into()).is_transient());
    }
}
