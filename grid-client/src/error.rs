//! Error types for the Microgrid client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the Microgrid site
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Site returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// The session token was rejected
    #[error("session token rejected by the site")]
    WrongToken,

    /// The response body did not have the expected shape
    #[error("incorrect response body: {0}")]
    IncorrectBody(String),

    /// The site refused a result for this protocol version
    #[error("result rejected: wrong protocol version")]
    WrongVersion,

    /// An authenticated call was made without a session
    #[error("no session configured")]
    MissingSession,

    /// Session id or token could not be obtained
    #[error("session handshake failed: {0}")]
    HandshakeFailed(String),

    /// Response had an unexpected content type
    #[error("unexpected content type: expected {expected}, got {actual}")]
    UnexpectedContent {
        expected: &'static str,
        actual: String,
    },

    /// A request field could not be encoded
    #[error("could not encode request: {0}")]
    Encode(#[from] serde_json::Error),

    /// Session file could not be read or written
    #[error("session file error: {0}")]
    SessionFile(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if this error means the session is no longer usable
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::WrongToken | Self::MissingSession)
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }

    /// Check if retrying the same call may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RequestFailed(_)) || self.is_server_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(ClientError::api_error(503, "busy").is_server_error());
        assert!(ClientError::api_error(503, "busy").is_transient());
        assert!(ClientError::api_error(404, "gone").is_client_error());
        assert!(!ClientError::api_error(404, "gone").is_transient());
    }

    #[test]
    fn test_auth_classification() {
        assert!(ClientError::WrongToken.is_auth_error());
        assert!(ClientError::MissingSession.is_auth_error());
        assert!(!ClientError::WrongVersion.is_auth_error());
        assert!(!ClientError::WrongToken.is_transient());
    }
}
