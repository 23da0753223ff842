// ABOUTME: Shared gRPC transport utilities for the AAB client.
// ABOUTME: Provides channel creation, readiness-bounded connect, retry policy, and stream aliases.

pub mod channel;
pub mod connector;
pub mod error;
pub mod retry;
pub mod stream;

// Channel creation
pub use channel::{
    create_channel, scrub_proxy_env, ChannelConfig, KeepAliveConfig, DEFAULT_READY_TIMEOUT,
    DEFAULT_SERVER, PROXY_ENV_VARS,
};

// Connection establishment
pub use connector::{await_ready, connect, try_connect, Connection};

// Error types
pub use error::GrpcClientError;

// Retry
pub use retry::{RetryPolicy, DEFAULT_RETRY_DELAY, MAX_CONNECT_ATTEMPTS};

// Streams
pub use stream::{from_stream, into_response_stream, ResponseStream};

// Re-export proto types for convenience
pub use aab_proto;
