//! Settings types with compiled defaults.
//!
//! The JSON file uses `camelCase` keys; every field has a default so a
//! partial file (or none at all) always yields a complete value.

use serde::{Deserialize, Serialize};

/// Root settings object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskpadSettings {
    /// Remote backend connection.
    pub backend: BackendSettings,
    /// Diagnostic logging.
    pub logging: LoggingSettings,
}

impl Default for TaskpadSettings {
    fn default() -> Self {
        Self {
            backend: BackendSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Connection settings for the hosted table/auth backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendSettings {
    /// Base URL of the backend project (no trailing slash).
    pub url: String,
    /// Publishable anon key, sent as `apikey` on every request.
    pub anon_key: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            anon_key: String::new(),
            timeout_ms: 15_000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Filter directive for `tracing` (e.g. `info`, `taskpad_backend=debug`).
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
