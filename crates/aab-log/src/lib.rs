// ABOUTME: Shared logging setup for aab binaries
// ABOUTME: init() logs to stderr, init_file() keeps logs out of streamed chat output

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

/// Standard logging to stderr. Default: INFO level, RUST_LOG override.
/// Used for one-shot subcommands.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();
}

/// File-based logging for the interactive menu. Default: INFO level, RUST_LOG override.
/// Logs to ~/.config/aab/{app_name}/{app_name}.log so that tracing output does not
/// interleave with incrementally printed replies and progress bars.
/// If setup fails, prints a warning to stderr and continues without logging.
pub fn init_file(app_name: &str) {
    if let Err(e) = init_file_inner(app_name) {
        eprintln!("Warning: failed to set up file logging: {e}");
    }
}

/// Directory holding the log file for `app_name`.
pub fn log_dir(app_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("aab").join(app_name))
}

fn init_file_inner(app_name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = log_dir(app_name).ok_or("could not determine config directory")?;
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(format!("{app_name}.log")))?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_ansi(false)
        .try_init()
        .map_err(|e| e.to_string())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn exports_init() {
        let _ = super::init as fn();
    }

    #[test]
    fn exports_init_file() {
        let _ = super::init_file as fn(&str);
    }

    #[test]
    fn log_dir_is_namespaced_per_app() {
        if let Some(dir) = super::log_dir("aab") {
            assert!(dir.ends_with("aab/aab"));
        }
    }
}
