// ABOUTME: Transport connector producing a ready channel plus SuperBuilder stub.
// ABOUTME: Converts every transport failure into an absent connection instead of an error.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use aab_proto::client::SuperBuilderClient;
use tonic::transport::Channel;

use crate::channel::{create_channel, ChannelConfig};
use crate::error::GrpcClientError;

/// Typed stub over a ready channel to the middleware.
///
/// Owned by a single controller. Dropping it closes the channel.
#[derive(Debug, Clone)]
pub struct Connection {
    client: SuperBuilderClient<Channel>,
}

impl Connection {
    /// Wrap a ready channel.
    pub fn new(channel: Channel) -> Self {
        Self {
            client: SuperBuilderClient::new(channel),
        }
    }

    /// Stub handle for issuing calls. Cloning is cheap and shares the channel.
    pub fn client(&self) -> SuperBuilderClient<Channel> {
        self.client.clone()
    }
}

/// Wait for a readiness future, bounded by `timeout`.
///
/// A timeout maps to [`GrpcClientError::ReadyTimeout`], any transport error
/// to [`GrpcClientError::ConnectionFailed`].
pub async fn await_ready<T, E, F>(ready: F, timeout: Duration) -> Result<T, GrpcClientError>
where
    E: Display,
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(timeout, ready).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(GrpcClientError::ConnectionFailed(e.to_string())),
        Err(_) => Err(GrpcClientError::ReadyTimeout(timeout)),
    }
}

/// Open a connection, surfacing the failure reason.
///
/// The stub is only built once the channel is ready.
pub async fn try_connect(config: &ChannelConfig) -> Result<Connection, GrpcClientError> {
    let channel = create_channel(config).await?;
    Ok(Connection::new(channel))
}

/// Open a connection to the configured target.
///
/// Never fails: readiness timeouts, refusals and invalid addresses are logged
/// and yield `None`.
pub async fn connect(config: &ChannelConfig) -> Option<Connection> {
    match try_connect(config).await {
        Ok(connection) => Some(connection),
        Err(GrpcClientError::ReadyTimeout(t)) => {
            tracing::warn!(address = %config.address, timeout = ?t, "gRPC channel connection busy or missing");
            None
        }
        Err(e) => {
            tracing::warn!(address = %config.address, error = %e, "gRPC channel failed");
            None
        }
    }
}
