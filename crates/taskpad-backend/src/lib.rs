//! # taskpad-backend
//!
//! Async clients for the hosted backend: the `tasks` table and the auth
//! endpoints. This crate is the application's entire access layer — all
//! persistence, authentication, and query logic lives on the remote side,
//! and everything here is a thin, typed wrapper around one HTTP round-trip
//! per operation.
//!
//! - **Tasks**: [`tasks::TaskStore`] — list / get / create / update-status /
//!   delete against the `tasks` relation
//! - **Auth**: [`auth::AuthClient`] — sign-up, sign-in, sign-out, and a
//!   `watch`-based session-change subscription
//! - **Persistence**: [`session_store`] — keep the session across restarts
//! - **Errors**: [`errors::BackendError`] via `thiserror`
//!
//! Error policy: every operation returns `Result` and propagates failures.
//! Degrading a failure into a benign empty/absent/false value is the view
//! layer's job, in exactly one place.

#![deny(unsafe_code)]

pub mod auth;
pub mod errors;
pub mod session_store;
pub mod tasks;

pub use auth::{AuthClient, AuthUser, Session};
pub use errors::{BackendError, Result};
pub use session_store::{clear_session, load_session, save_session, session_file_path};
pub use tasks::TaskStore;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_exports_work() {
        let auth = AuthClient::new(reqwest::Client::new(), "http://localhost", "anon");
        let _store = TaskStore::new(
            reqwest::Client::new(),
            "http://localhost",
            "anon",
            auth.subscribe(),
        );
    }
}
