//! Subscriber setup shared by the binaries. The library itself only emits
//! events.

use std::fs::OpenOptions;
use std::path::Path;

use tracing_subscriber::EnvFilter;

use crate::error::Result;

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Logs to stderr, `RUST_LOG` overrides the `warn` default.
pub fn init_stderr() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(env_filter("warn"))
        .init();
}

/// Appends plain-text logs to `path`, `RUST_LOG` overrides the `info` default.
pub fn init_file(path: impl AsRef<Path>) -> Result<()> {
    let log_file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_env_filter(env_filter("info"))
        .init();
    Ok(())
}
