// ABOUTME: Error types for aab-client
// ABOUTME: Connection, protocol, transfer, and validation failures carrying transport detail

use aab_grpc::GrpcClientError;
use thiserror::Error;

/// Errors surfaced by client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport refused, readiness timed out, or retries were exhausted.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Liveness handshake failed or returned an empty acknowledgement.
    #[error("Backend not ready: {0}")]
    BackendNotReady(String),

    /// A response did not have the expected shape.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// In-band error marker or transport failure during upload/download.
    #[error("Transfer failed: {0}")]
    Transfer(String),

    /// A local path or model folder failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A unary call failed.
    #[error("{method} failed: {detail}")]
    Rpc { method: &'static str, detail: String },

    /// A streaming call failed after it started.
    #[error("Stream error: {0}")]
    Stream(String),
}

impl ClientError {
    /// Build a mapper from a failed unary call to [`ClientError::Rpc`].
    pub fn rpc(method: &'static str) -> impl FnOnce(tonic::Status) -> Self {
        move |status| ClientError::Rpc {
            method,
            detail: status.message().to_string(),
        }
    }

    /// Build a [`ClientError::Transfer`] from a transport failure.
    pub fn transfer(status: tonic::Status) -> Self {
        ClientError::Transfer(status.message().to_string())
    }
}

impl From<GrpcClientError> for ClientError {
    fn from(err: GrpcClientError) -> Self {
        ClientError::Connection(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Protocol(err.to_string())
    }
}
