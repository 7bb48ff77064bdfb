//! Tracing subscriber setup
//!
//! The TUI owns the terminal, so it logs to a file. The snapshot binary logs
//! to stderr and keeps stdout for its report.

use std::{fs::File, io, path::Path, sync::Mutex};

use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log to stderr, filtered by `RUST_LOG` (default: info)
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .init();
}

/// Log to `path` without ANSI colours, filtered by `RUST_LOG` (default: info)
pub fn init_file_logging(path: impl AsRef<Path>) -> io::Result<()> {
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
