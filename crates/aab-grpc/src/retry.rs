// ABOUTME: Bounded connect retry with a fixed delay between attempts.
// ABOUTME: First success short-circuits; exhaustion is reported as a fatal error.

use std::future::Future;
use std::time::Duration;

use crate::error::GrpcClientError;

/// Maximum number of connection attempts before giving up.
pub const MAX_CONNECT_ATTEMPTS: usize = 5;

/// Sleep between failed connection attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Fixed-delay retry policy for connection establishment.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: usize,
    /// Delay between consecutive attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_CONNECT_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Set maximum attempts. Zero is treated as one.
    pub fn with_max_attempts(mut self, max: usize) -> Self {
        self.max_attempts = max.max(1);
        self
    }

    /// Set the delay between attempts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Run `attempt` until it yields a value or attempts run out.
    ///
    /// `attempt` receives the 1-based attempt number. `target` is only used
    /// for the exhaustion error.
    pub async fn run<T, F, Fut>(&self, target: &str, mut attempt: F) -> Result<T, GrpcClientError>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        for n in 1..=self.max_attempts {
            if let Some(value) = attempt(n).await {
                tracing::info!(attempt = n, address = target, "connected");
                return Ok(value);
            }
            if n < self.max_attempts {
                tracing::info!(
                    attempt = n,
                    max_attempts = self.max_attempts,
                    delay = ?self.delay,
                    "connection attempt failed, retrying"
                );
                tokio::time::sleep(self.delay).await;
            }
        }

        Err(GrpcClientError::MaxConnectAttempts {
            attempts: self.max_attempts,
            address: target.to_string(),
        })
    }
}
