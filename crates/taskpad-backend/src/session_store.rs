//! Session persistence.
//!
//! Saves the active session to `~/.taskpad/session.json` with 0o600
//! permissions so a restart keeps the user signed in. An expired session on
//! disk is ignored at load time.

use std::path::{Path, PathBuf};

use crate::auth::Session;
use crate::errors::{BackendError, Result};

/// Default session file name.
const SESSION_FILE_NAME: &str = "session.json";

/// Get the session file path under the given data directory.
pub fn session_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SESSION_FILE_NAME)
}

/// Load a persisted session.
///
/// Returns `None` if the file doesn't exist, is invalid, or the session
/// has expired.
pub fn load_session(path: &Path) -> Option<Session> {
    let data = match std::fs::read_to_string(path) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!("failed to read session file: {e}");
            return None;
        }
    };

    match serde_json::from_str::<Session>(&data) {
        Ok(session) if session.is_expired() => {
            tracing::info!("persisted session expired, ignoring");
            None
        }
        Ok(session) => Some(session),
        Err(e) => {
            tracing::warn!("failed to parse session file: {e}");
            None
        }
    }
}

/// Save the session to file.
///
/// Creates parent directories if needed. Sets file permissions to 0o600.
pub fn save_session(path: &Path, session: &Session) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(session)?;
    std::fs::write(path, &json)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        let _ = std::fs::set_permissions(path, perms);
    }

    Ok(())
}

/// Delete the session file.
pub fn clear_session(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BackendError::Io(e)),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
