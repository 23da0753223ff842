// ABOUTME: Lifecycle controller: connect with retry, verify liveness, warm up, run, tear down.
// ABOUTME: Owns the single connection and issues the disconnect call exactly once.

use std::fmt;
use std::future::Future;

use aab_grpc::{ChannelConfig, Connection, RetryPolicy};
use aab_proto::SayHelloRequest;
use async_trait::async_trait;
use futures::future::LocalBoxFuture;

use crate::backend::Middleware;
use crate::error::ClientError;

/// Controller states, in the order a healthy run passes through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Disconnected,
    Connecting,
    Connected,
    BackendVerified,
    Ready,
    ShuttingDown,
    Terminated,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecycleState::Disconnected => "disconnected",
            LifecycleState::Connecting => "connecting",
            LifecycleState::Connected => "connected",
            LifecycleState::BackendVerified => "backend verified",
            LifecycleState::Ready => "ready",
            LifecycleState::ShuttingDown => "shutting down",
            LifecycleState::Terminated => "terminated",
        };
        f.write_str(s)
    }
}

/// Produces a backend handle, or `None` when the transport is not available.
#[async_trait]
pub trait Connector: Send + Sync {
    type Backend: Middleware;

    /// Target description for diagnostics.
    fn target(&self) -> &str;

    async fn connect(&self) -> Option<Self::Backend>;
}

/// Connector over a real gRPC channel.
#[derive(Debug, Clone)]
pub struct GrpcConnector {
    config: ChannelConfig,
}

impl GrpcConnector {
    pub fn new(config: ChannelConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for GrpcConnector {
    type Backend = Connection;

    fn target(&self) -> &str {
        &self.config.address
    }

    async fn connect(&self) -> Option<Connection> {
        aab_grpc::connect(&self.config).await
    }
}

/// Liveness handshake. An empty acknowledgement counts as failure.
pub async fn check_backend<M>(backend: &M, client_name: &str) -> bool
where
    M: Middleware + ?Sized,
{
    let request = SayHelloRequest {
        name: client_name.to_string(),
    };
    match backend.say_hello(request).await {
        Ok(reply) if !reply.message.is_empty() => {
            tracing::info!(reply = %reply.message, "backend replied");
            true
        }
        Ok(_) => {
            tracing::warn!("backend replied with an empty acknowledgement");
            false
        }
        Err(status) => {
            tracing::warn!(error = %status.message(), "liveness handshake failed");
            false
        }
    }
}

/// Best-effort model preload. Failures are logged, never returned.
pub async fn warmup<M>(backend: &M)
where
    M: Middleware + ?Sized,
{
    tracing::info!("warming up LLM models");
    if let Err(status) = backend.load_models().await {
        tracing::warn!(error = %status.message(), "warmup failed");
    }
}

/// How the session body ended.
#[derive(Debug)]
pub enum SessionExit<T> {
    /// Body returned normally.
    Completed(T),
    /// Body returned an error.
    Failed(ClientError),
    /// The termination signal fired first.
    Interrupted,
}

/// Owns the connection for the lifetime of a run.
pub struct Lifecycle<K: Connector> {
    connector: K,
    retry: RetryPolicy,
    client_name: String,
    state: LifecycleState,
    backend: Option<K::Backend>,
    disconnect_issued: bool,
}

impl<K: Connector> Lifecycle<K> {
    pub fn new(connector: K, retry: RetryPolicy, client_name: impl Into<String>) -> Self {
        Self {
            connector,
            retry,
            client_name: client_name.into(),
            state: LifecycleState::Disconnected,
            backend: None,
            disconnect_issued: false,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// The live backend, once connected and until shutdown.
    pub fn backend(&self) -> Option<&K::Backend> {
        self.backend.as_ref()
    }

    fn transition(&mut self, next: LifecycleState) {
        tracing::debug!(from = %self.state, to = %next, "lifecycle transition");
        self.state = next;
    }

    /// Connect, verify the backend, and warm it up.
    ///
    /// If no connection could be made the controller ends in `Terminated`.
    /// If the backend fails the liveness check the connection is kept and the
    /// caller must still call [`Lifecycle::shutdown`].
    pub async fn start(&mut self) -> Result<(), ClientError> {
        self.transition(LifecycleState::Connecting);
        let connector = &self.connector;
        let connected = self
            .retry
            .run(connector.target(), |attempt| {
                tracing::debug!(attempt, "connecting");
                connector.connect()
            })
            .await;

        let backend = match connected {
            Ok(backend) => backend,
            Err(e) => {
                self.transition(LifecycleState::Terminated);
                return Err(e.into());
            }
        };
        self.backend = Some(backend);
        self.transition(LifecycleState::Connected);

        let verified = match &self.backend {
            Some(backend) => check_backend(backend, &self.client_name).await,
            None => false,
        };
        if !verified {
            return Err(ClientError::BackendNotReady(
                "LLM backend is not ready".to_string(),
            ));
        }
        self.transition(LifecycleState::BackendVerified);

        if let Some(backend) = &self.backend {
            warmup(backend).await;
        }
        self.transition(LifecycleState::Ready);
        Ok(())
    }

    /// Disconnect and close the channel. Safe to call any number of times;
    /// only the first call after a connection issues the disconnect.
    pub async fn shutdown(&mut self) {
        if self.disconnect_issued || self.state == LifecycleState::Terminated {
            return;
        }
        self.disconnect_issued = true;
        self.transition(LifecycleState::ShuttingDown);

        if let Some(backend) = self.backend.take() {
            tracing::info!("disconnecting from backend");
            if let Err(status) = backend.client_disconnected().await {
                tracing::warn!(error = %status.message(), "disconnect call failed");
            }
            drop(backend);
        }
        self.transition(LifecycleState::Terminated);
    }

    /// Start, run `body` against the backend until it finishes or `signal`
    /// fires, then shut down.
    ///
    /// Whatever the exit path, the disconnect call happens exactly once.
    /// Errors are returned only when startup fails.
    pub async fn run<T, F, S>(&mut self, signal: S, body: F) -> Result<SessionExit<T>, ClientError>
    where
        F: for<'a> FnOnce(&'a K::Backend) -> LocalBoxFuture<'a, Result<T, ClientError>>,
        S: Future<Output = ()>,
    {
        tokio::pin!(signal);

        let exit = tokio::select! {
            started = self.start() => started.err().map(Err),
            _ = &mut signal => Some(Ok(SessionExit::Interrupted)),
        };
        // Startup errors win over a late signal; the teardown runs outside the race.
        let exit = match exit {
            Some(Err(e)) => {
                self.shutdown().await;
                return Err(e);
            }
            Some(Ok(exit)) => Some(exit),
            None => None,
        };

        let exit = match (exit, self.backend.as_ref()) {
            (Some(exit), _) => exit,
            (None, Some(backend)) => {
                tokio::select! {
                    result = body(backend) => match result {
                        Ok(value) => SessionExit::Completed(value),
                        Err(e) => SessionExit::Failed(e),
                    },
                    _ = &mut signal => SessionExit::Interrupted,
                }
            }
            (None, None) => SessionExit::Failed(ClientError::Connection(
                "connection lost before use".to_string(),
            )),
        };

        match &exit {
            SessionExit::Completed(_) => tracing::info!("session completed"),
            SessionExit::Failed(e) => tracing::warn!(error = %e, "session failed"),
            SessionExit::Interrupted => tracing::info!("termination signal received"),
        }
        self.shutdown().await;
        Ok(exit)
    }
}

impl<K: Connector> Drop for Lifecycle<K> {
    fn drop(&mut self) {
        if self.backend.is_some() && !self.disconnect_issued {
            tracing::warn!("lifecycle dropped without shutdown; disconnect not sent");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(LifecycleState::BackendVerified.to_string(), "backend verified");
        assert_eq!(LifecycleState::Terminated.to_string(), "terminated");
    }

    #[test]
    fn test_grpc_connector_target() {
        let connector = GrpcConnector::new(ChannelConfig::new("localhost:5006"));
        assert_eq!(connector.target(), "http://localhost:5006");
    }
}
