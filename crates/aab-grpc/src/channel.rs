// ABOUTME: gRPC channel configuration and creation for the AAB middleware.
// ABOUTME: Bounds channel readiness by a timeout and keeps proxy variables away from the transport.

use std::time::Duration;

use tonic::transport::{Channel, ClientTlsConfig, Endpoint};

use crate::connector::await_ready;
use crate::error::GrpcClientError;

/// Default middleware address.
pub const DEFAULT_SERVER: &str = "http://localhost:5006";

/// How long to wait for the channel to become ready.
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(15);

/// Proxy variables that must not influence the transport.
pub const PROXY_ENV_VARS: &[&str] = &[
    "http_proxy",
    "https_proxy",
    "HTTP_PROXY",
    "HTTPS_PROXY",
    "all_proxy",
    "ALL_PROXY",
    "grpc_proxy",
];

/// Remove proxy variables from the process environment.
///
/// Must run before the async runtime starts: mutating the environment while
/// other threads read it is not sound on every platform.
pub fn scrub_proxy_env() -> Vec<&'static str> {
    let mut removed = Vec::new();
    for var in PROXY_ENV_VARS {
        if std::env::var_os(var).is_some() {
            std::env::remove_var(var);
            removed.push(*var);
        }
    }
    if !removed.is_empty() {
        tracing::debug!(vars = ?removed, "cleared proxy environment");
    }
    removed
}

/// Configuration for gRPC channel keep-alive behavior.
#[derive(Debug, Clone)]
pub struct KeepAliveConfig {
    /// Interval between keep-alive pings when the connection is idle.
    pub interval: Duration,
    /// Timeout waiting for keep-alive response before considering connection dead.
    pub timeout: Duration,
    /// Whether to send keep-alive pings even when no streams are active.
    pub while_idle: bool,
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(20),
            while_idle: true,
        }
    }
}

/// Configuration for creating a gRPC channel.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Server address to connect to (e.g., "http://localhost:5006").
    pub address: String,
    /// Keep-alive configuration. If None, keep-alive is disabled.
    pub keep_alive: Option<KeepAliveConfig>,
    /// Upper bound on the readiness wait.
    pub ready_timeout: Duration,
    /// Enable TLS for the connection.
    pub use_tls: bool,
}

impl ChannelConfig {
    /// Create a channel config with default settings.
    /// Bare `host:port` targets get an `http://` scheme; `https://` enables TLS.
    pub fn new(address: impl Into<String>) -> Self {
        let addr = Self::with_scheme(address.into().trim());
        let use_tls = Self::detect_tls(&addr);
        Self {
            address: addr,
            keep_alive: Some(KeepAliveConfig::default()),
            ready_timeout: DEFAULT_READY_TIMEOUT,
            use_tls,
        }
    }

    fn with_scheme(addr: &str) -> String {
        if addr.is_empty() || addr.contains("://") {
            addr.to_string()
        } else {
            format!("http://{addr}")
        }
    }

    /// Detect TLS from URL scheme (case-insensitive).
    fn detect_tls(addr: &str) -> bool {
        addr.to_lowercase().starts_with("https://")
    }

    /// Set the readiness timeout.
    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    /// Build the tonic endpoint without connecting.
    pub fn endpoint(&self) -> Result<Endpoint, GrpcClientError> {
        let mut endpoint = Endpoint::from_shared(self.address.clone())
            .map_err(|e| GrpcClientError::InvalidAddress(e.to_string()))?;

        if self.use_tls {
            endpoint = endpoint
                .tls_config(ClientTlsConfig::new())
                .map_err(|e| GrpcClientError::ConnectionFailed(format!("TLS config error: {e}")))?;
        }

        if let Some(ka) = &self.keep_alive {
            endpoint = endpoint
                .http2_keep_alive_interval(ka.interval)
                .keep_alive_timeout(ka.timeout)
                .keep_alive_while_idle(ka.while_idle);
        }

        Ok(endpoint.connect_timeout(self.ready_timeout))
    }
}

/// Create a gRPC channel and wait for it to become ready.
///
/// A readiness wait that outlives `ready_timeout` yields
/// [`GrpcClientError::ReadyTimeout`]; a refused connection yields
/// [`GrpcClientError::ConnectionFailed`].
pub async fn create_channel(config: &ChannelConfig) -> Result<Channel, GrpcClientError> {
    let endpoint = config.endpoint()?;
    let channel = await_ready(endpoint.connect(), config.ready_timeout).await?;

    tracing::debug!(
        address = %config.address,
        keep_alive = config.keep_alive.is_some(),
        use_tls = config.use_tls,
        "gRPC channel ready"
    );

    Ok(channel)
}
