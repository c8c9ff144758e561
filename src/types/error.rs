//! Error types for docport
//!
//! Every failure is caught at the operation boundary and rendered as a
//! `{success: false, message, error}` body; the variant decides the status.

use hyper::StatusCode;

use crate::db::DriverError;

/// Main error type for registry and inspector operations
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Malformed target, authentication failure, timeout, unreachable host
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Unknown or already-closed session identifier
    #[error("Connection not found: {0}")]
    SessionNotFound(String),

    /// Listing or fetching failed against an otherwise valid session
    #[error("Query failed: {0}")]
    Query(String),

    /// Closing the underlying handle failed
    #[error("Close failed: {0}")]
    Close(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Connect(_) => StatusCode::BAD_REQUEST,
            Self::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Self::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Close(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The underlying failure message, without the variant prefix
    pub fn detail(&self) -> &str {
        match self {
            Self::Connect(msg)
            | Self::SessionNotFound(msg)
            | Self::Query(msg)
            | Self::Close(msg)
            | Self::Internal(msg) => msg,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SessionNotFound(_))
    }

    pub(crate) fn connect(err: DriverError) -> Self {
        Self::Connect(err.into_message())
    }

    pub(crate) fn query(err: DriverError) -> Self {
        Self::Query(err.into_message())
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Result type alias for docport operations
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            GatewayError::Connect("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::SessionNotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatewayError::Query("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            GatewayError::Close("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_detail_is_verbatim() {
        let err = GatewayError::connect(DriverError::new("Server selection timeout"));
        assert_eq!(err.detail(), "Server selection timeout");
        assert_eq!(err.to_string(), "Connection failed: Server selection timeout");
        assert!(!err.is_not_found());
        assert!(GatewayError::SessionNotFound("abc".into()).is_not_found());
    }
}
