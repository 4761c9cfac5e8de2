//! # taskpad-settings
//!
//! Configuration management with layered sources for taskpad.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`TaskpadSettings::default()`]
//! 2. **User file** — `~/.taskpad/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — `TASKPAD_*` overrides (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use taskpad_settings::get_settings;
//!
//! let settings = get_settings();
//! println!("backend: {}", settings.backend.url);
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

use std::sync::{Arc, RwLock};

/// Global settings singleton.
///
/// Reads are cheap (shared lock + `Arc::clone`); the only write is the
/// first-access initialization or an explicit [`init_settings`] call.
static SETTINGS: RwLock<Option<Arc<TaskpadSettings>>> = RwLock::new(None);

/// Get the global settings instance.
///
/// On first call, loads settings from `~/.taskpad/settings.json` with env
/// var overrides. On subsequent calls, returns the cached value. If loading
/// fails, returns compiled defaults.
///
/// Returns an `Arc` so callers hold a consistent snapshot even if another
/// thread replaces the cached value concurrently.
pub fn get_settings() -> Arc<TaskpadSettings> {
    // Fast path: read lock
    {
        let guard = SETTINGS.read().expect("settings lock poisoned");
        if let Some(ref s) = *guard {
            return Arc::clone(s);
        }
    }

    // Slow path: first access, take write lock
    let mut guard = SETTINGS.write().expect("settings lock poisoned");
    // Double-check after acquiring write lock (another thread may have initialized)
    if let Some(ref s) = *guard {
        return Arc::clone(s);
    }

    let settings = Arc::new(match load_settings() {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "failed to load settings, using defaults");
            TaskpadSettings::default()
        }
    });
    *guard = Some(Arc::clone(&settings));
    settings
}

/// Initialize the global settings with a specific value.
///
/// Replaces any previously cached settings. Useful for tests and startup
/// paths where the settings file has already been resolved (e.g. a
/// `--settings` flag).
pub fn init_settings(settings: TaskpadSettings) {
    let mut guard = SETTINGS.write().expect("settings lock poisoned");
    *guard = Some(Arc::new(settings));
}

/// Reset the global settings cache (test-only).
///
/// Clears the cached value so the next [`get_settings`] call re-loads from
/// disk. Needed because tests share a process and the global is `static`.
#[cfg(test)]
pub(crate) fn reset_settings() {
    let mut guard = SETTINGS.write().expect("settings lock poisoned");
    *guard = None;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
