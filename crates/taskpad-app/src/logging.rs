//! File-backed tracing setup.
//!
//! The TUI owns the terminal, so diagnostics go to a log file instead of
//! stderr. The filter comes from settings and can be overridden with
//! `TASKPAD_LOG`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber writing to `path`.
pub fn init(path: &Path, level: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_parent_directories() {
        // Only one global subscriber per process; this test asserts file
        // creation and accepts that a second init call is a no-op error.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("taskpad.log");
        let _ = init(&path, "info");
        assert!(path.exists());
    }
}
