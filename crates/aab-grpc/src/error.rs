// ABOUTME: Error types for the aab-grpc crate.
// ABOUTME: Distinguishes readiness timeouts from refused connections and exhausted retries.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while establishing or using the gRPC transport.
#[derive(Error, Debug)]
pub enum GrpcClientError {
    /// Invalid server address format.
    #[error("invalid server address: {0}")]
    InvalidAddress(String),

    /// Failed to connect to the server.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Channel did not become ready within the readiness timeout.
    #[error("channel not ready after {0:?}")]
    ReadyTimeout(Duration),

    /// All connection attempts failed.
    #[error("max connection attempts ({attempts}) exceeded for '{address}'")]
    MaxConnectAttempts { attempts: usize, address: String },
}

impl GrpcClientError {
    /// Whether this error came from the readiness wait rather than a refusal.
    pub fn is_timeout(&self) -> bool {
        matches!(self, GrpcClientError::ReadyTimeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GrpcClientError::InvalidAddress("not a url".to_string());
        assert_eq!(err.to_string(), "invalid server address: not a url");

        let err = GrpcClientError::MaxConnectAttempts {
            attempts: 5,
            address: "http://localhost:5006".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "max connection attempts (5) exceeded for 'http://localhost:5006'"
        );
    }

    #[test]
    fn test_ready_timeout_is_distinct_from_refusal() {
        let timeout = GrpcClientError::ReadyTimeout(Duration::from_secs(15));
        assert!(timeout.is_timeout());
        assert!(timeout.to_string().contains("15s"));

        let refused = GrpcClientError::ConnectionFailed("refused".to_string());
        assert!(!refused.is_timeout());
    }
}
