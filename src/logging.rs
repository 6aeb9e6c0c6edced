//! Tracing subscriber setup.
//!
//! Diagnostics go to stderr at WARN unless `RUST_LOG` says otherwise. A
//! debug log file captures everything at DEBUG and above.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Filter used for the session: `RUST_LOG` plus a floor of `level`.
pub fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::from_default_env().add_directive(level.into())
}

/// Install the global subscriber.
///
/// # Errors
/// Fails if the debug log cannot be created or a subscriber is already set.
pub fn init(debug_log: Option<&Path>) -> Result<()> {
    let installed = if let Some(path) = debug_log {
        let file = File::create(path)
            .with_context(|| format!("Failed to create debug log {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(env_filter(Level::DEBUG))
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter(Level::WARN))
            .with_writer(std::io::stderr)
            .try_init()
    };
    installed.map_err(|err| anyhow::anyhow!(err).context("Failed to install tracing subscriber"))?;

    if let Some(path) = debug_log {
        tracing::info!(path = %path.display(), "linebreak debug log start");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_includes_floor_directive() {
        let filter = env_filter(Level::DEBUG).to_string();
        assert!(filter.to_lowercase().contains("debug"), "filter was {filter}");
    }

    #[test]
    fn test_init_with_debug_log_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.log");
        // Only one test may own the global subscriber; tolerate a prior one.
        if init(Some(&path)).is_ok() {
            tracing::debug!("hello from test");
            let content = std::fs::read_to_string(&path).unwrap();
            assert!(content.contains("linebreak debug log start"));
            assert!(content.contains("hello from test"));
        }
        assert!(path.exists());
    }
}
