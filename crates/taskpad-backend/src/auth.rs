//! Auth client: sign-up, sign-in, sign-out, session-change notifications.
//!
//! Wraps the backend's auth endpoints (`/auth/v1/*`). The current session is
//! held in a `tokio::sync::watch` channel; every sign-in/out is published to
//! subscribers, which is how the view layer learns about principal changes.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::errors::{BackendError, Result};

/// The authenticated identity owning a subset of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Opaque principal id assigned by the auth service.
    pub id: String,
    /// Sign-in email, when the service reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token sent on every table request.
    pub access_token: String,
    /// Refresh token, when issued. Kept only for persistence; this client
    /// does not refresh — an expired restored session is discarded instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiry as milliseconds since the epoch.
    pub expires_at: i64,
    /// The signed-in principal.
    pub user: AuthUser,
}

impl Session {
    /// Whether the session's token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= now_ms()
    }
}

/// Milliseconds since the epoch.
#[must_use]
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Token endpoint response.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: now_ms() + self.expires_in * 1000,
            user: self.user,
        }
    }
}

/// Client for the backend's auth endpoints.
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    sessions: watch::Sender<Option<Session>>,
}

impl AuthClient {
    /// Create an auth client with no active session.
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let (sessions, _) = watch::channel(None);
        Self {
            http,
            base_url: base_url.into(),
            anon_key: anon_key.into(),
            sessions,
        }
    }

    /// Subscribe to session changes. The receiver yields the current
    /// principal or its absence on every sign-in and sign-out.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sessions.subscribe()
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn current_session(&self) -> Option<Session> {
        self.sessions.borrow().clone()
    }

    /// Adopt a previously persisted session. An expired session is
    /// discarded; returns whether the session was adopted.
    pub fn restore(&self, session: Session) -> bool {
        if session.is_expired() {
            info!(user = %session.user.id, "discarding expired persisted session");
            return false;
        }
        let _ = self.sessions.send_replace(Some(session));
        true
    }

    /// Register a new account. A successful response carries a token, so
    /// the new principal is signed in immediately.
    #[instrument(skip_all)]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session> {
        let url = format!("{}/auth/v1/signup", self.base_url);
        self.token_request(&url, email, password).await
    }

    /// Sign in with email and password.
    #[instrument(skip_all)]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        self.token_request(&url, email, password).await
    }

    /// Sign out.
    ///
    /// The local session is cleared even when the remote revocation fails;
    /// the token will lapse on its own and the gate must not stay open on a
    /// network error.
    #[instrument(skip_all)]
    pub async fn sign_out(&self) -> Result<()> {
        let session = self.sessions.send_replace(None);

        let Some(session) = session else {
            return Ok(());
        };

        let url = format!("{}/auth/v1/logout", self.base_url);
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await;

        match resp {
            Ok(resp) if resp.status().is_success() => Ok(()),
            Ok(resp) => {
                let status = resp.status().as_u16();
                let message = auth_error_message(resp.text().await.unwrap_or_default());
                warn!(status, %message, "remote sign-out failed; local session cleared");
                Err(BackendError::Auth { status, message })
            }
            Err(e) => {
                warn!(error = %e, "remote sign-out unreachable; local session cleared");
                Err(BackendError::Http(e))
            }
        }
    }

    /// POST credentials to a token-issuing endpoint and publish the session.
    async fn token_request(&self, url: &str, email: &str, password: &str) -> Result<Session> {
        let body = serde_json::json!({ "email": email, "password": password });

        let resp = self
            .http
            .post(url)
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let message = auth_error_message(resp.text().await.unwrap_or_default());
            return Err(BackendError::Auth { status, message });
        }

        let session = resp.json::<TokenResponse>().await?.into_session();
        info!(user = %session.user.id, "session established");
        let _ = self.sessions.send_replace(Some(session.clone()));
        Ok(session)
    }
}

/// Extract a human-readable message from an auth error body.
///
/// The service answers with `{"error_description": …}` or `{"msg": …}`
/// depending on the endpoint; fall back to the raw body.
fn auth_error_message(body: String) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
        for key in ["error_description", "msg", "message"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    body
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token_body(token: &str, uid: &str) -> serde_json::Value {
        serde_json::json!({
            "access_token": token,
            "refresh_token": "rt-1",
            "expires_in": 3600,
            "user": { "id": uid, "email": "a@example.dev" }
        })
    }

    fn session(uid: &str, expires_at: i64) -> Session {
        Session {
            access_token: "tok".to_string(),
            refresh_token: None,
            expires_at,
            user: AuthUser {
                id: uid.to_string(),
                email: None,
            },
        }
    }

    #[tokio::test]
    async fn sign_in_establishes_session_and_notifies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-a", "uid-a")))
            .mount(&server)
            .await;

        let auth = AuthClient::new(reqwest::Client::new(), server.uri(), "anon");
        let mut rx = auth.subscribe();

        let session = auth.sign_in("a@example.dev", "pw").await.unwrap();
        assert_eq!(session.access_token, "tok-a");
        assert_eq!(session.user.id, "uid-a");
        assert!(!session.is_expired());

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().as_ref().unwrap().user.id, "uid-a");
        assert_eq!(auth.current_session().unwrap().user.id, "uid-a");
    }

    #[tokio::test]
    async fn sign_up_establishes_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-new", "uid-new")))
            .mount(&server)
            .await;

        let auth = AuthClient::new(reqwest::Client::new(), server.uri(), "anon");
        let session = auth.sign_up("new@example.dev", "pw").await.unwrap();
        assert_eq!(session.user.id, "uid-new");
        assert!(auth.current_session().is_some());
    }

    #[tokio::test]
    async fn sign_in_failure_reports_description_and_keeps_no_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })))
            .mount(&server)
            .await;

        let auth = AuthClient::new(reqwest::Client::new(), server.uri(), "anon");
        let err = auth.sign_in("a@example.dev", "wrong").await.unwrap_err();
        match err {
            BackendError::Auth { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid login credentials");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(auth.current_session().is_none());
    }

    #[tokio::test]
    async fn sign_out_clears_session_even_when_remote_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok", "uid-a")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .respond_with(ResponseTemplate::new(401).set_body_string("token revoked"))
            .mount(&server)
            .await;

        let auth = AuthClient::new(reqwest::Client::new(), server.uri(), "anon");
        let _ = auth.sign_in("a@example.dev", "pw").await.unwrap();

        let result = auth.sign_out().await;
        assert!(result.is_err());
        assert!(auth.current_session().is_none(), "local session must clear");
    }

    #[tokio::test]
    async fn sign_out_without_session_is_a_no_op() {
        let auth = AuthClient::new(reqwest::Client::new(), "http://127.0.0.1:1", "anon");
        // No request is attempted — the unreachable URL would fail otherwise.
        auth.sign_out().await.unwrap();
    }

    #[tokio::test]
    async fn subscribers_observe_sign_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok", "uid-a")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let auth = AuthClient::new(reqwest::Client::new(), server.uri(), "anon");
        let mut rx = auth.subscribe();

        let _ = auth.sign_in("a@example.dev", "pw").await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_some());

        auth.sign_out().await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
    }

    #[test]
    fn restore_adopts_fresh_session() {
        let auth = AuthClient::new(reqwest::Client::new(), "http://localhost", "anon");
        assert!(auth.restore(session("uid-a", now_ms() + 60_000)));
        assert_eq!(auth.current_session().unwrap().user.id, "uid-a");
    }

    #[test]
    fn restore_discards_expired_session() {
        let auth = AuthClient::new(reqwest::Client::new(), "http://localhost", "anon");
        assert!(!auth.restore(session("uid-a", now_ms() - 1)));
        assert!(auth.current_session().is_none());
    }

    #[test]
    fn auth_error_message_fallbacks() {
        assert_eq!(
            auth_error_message(r#"{"error_description": "bad creds"}"#.to_string()),
            "bad creds"
        );
        assert_eq!(
            auth_error_message(r#"{"msg": "signup disabled"}"#.to_string()),
            "signup disabled"
        );
        assert_eq!(auth_error_message("plain text".to_string()), "plain text");
    }
}
