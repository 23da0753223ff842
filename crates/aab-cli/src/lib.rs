// ABOUTME: CLI library components for the aab client.
// ABOUTME: Config loading, example scenarios, and the shutdown signal shared by every subcommand.

//! # aab-cli
//!
//! Command-line client for the AI Assistant Builder middleware.
//!
//! ```text
//! aab
//! ├── menu                          # Interactive example menu (default)
//! ├── chat <prompt>                 # One streamed chat turn
//! ├── sessions                      # List chat sessions
//! ├── upload <files>...             # Add files to the knowledge base
//! ├── remove <files>...             # Remove files from the knowledge base
//! ├── files                         # List knowledge-base files
//! ├── download <url> <dir>          # Download a model file
//! ├── show-config                   # Print the backend client config
//! ├── switch-model [index]          # List or switch chat models
//! ├── params                        # Push [parameters] from the config file
//! ├── assistant <name>              # Set the active assistant
//! └── init                          # Write a default config file
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Run the example menu against a local middleware
//! aab
//!
//! # One question against a remote middleware
//! aab --server 10.0.0.2:5006 chat "Who are you"
//! ```

pub mod config;
pub mod scenarios;

/// Version of the aab CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Resolves on Ctrl+C or SIGTERM.
///
/// If a handler cannot be installed that source never fires.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install ctrl+c handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C"),
        _ = terminate => tracing::info!("received terminate signal"),
    }
}
