//! Domain error types.

/// Errors raised by draft validation, before any remote call is made.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Title is missing or whitespace-only.
    #[error("title is required")]
    EmptyTitle,

    /// Description is missing or whitespace-only.
    #[error("description is required")]
    EmptyDescription,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
