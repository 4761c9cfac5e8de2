//! Backend error types.

/// Errors that can occur talking to the remote backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// HTTP transport failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O error (session persistence).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The table API answered with a non-success status.
    #[error("store error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        message: String,
    },

    /// The auth API rejected a sign-up/sign-in/sign-out request.
    #[error("auth error ({status}): {message}")]
    Auth {
        /// HTTP status code.
        status: u16,
        /// Error description from the response body.
        message: String,
    },

    /// The requested row does not exist (or no longer exists).
    #[error("not found")]
    NotFound,

    /// A task operation was invoked without a signed-in principal.
    #[error("no active session")]
    NoSession,
}

/// Result alias for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = BackendError::Api {
            status: 500,
            message: "internal error".to_string(),
        };
        assert_eq!(err.to_string(), "store error (500): internal error");
    }

    #[test]
    fn auth_error_display() {
        let err = BackendError::Auth {
            status: 400,
            message: "Invalid login credentials".to_string(),
        };
        assert_eq!(err.to_string(), "auth error (400): Invalid login credentials");
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = BackendError::from(io_err);
        assert!(err.to_string().contains("gone"));
    }
}
