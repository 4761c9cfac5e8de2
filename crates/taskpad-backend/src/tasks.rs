//! Task store: the five CRUD operations against the hosted `tasks` table.
//!
//! Requests use the table API's REST dialect: equality filters as
//! `column=eq.value` query parameters, ordering as `order=column.desc`,
//! `Prefer: return=representation` on writes so mutations answer with the
//! stored row. Every call carries the publishable `apikey` plus the current
//! session's bearer token, observed through the session watch channel.
//!
//! Every operation returns `Result`; failures propagate to the caller. The
//! view layer is the single place that degrades errors into benign values.

use serde_json::json;
use tokio::sync::watch;
use tracing::instrument;

use taskpad_core::task::{Task, TaskDraft, TaskStatus};

use crate::auth::Session;
use crate::errors::{BackendError, Result};

/// `Accept` value asking the table API for exactly one object.
///
/// With zero matching rows the API answers 406, which maps to
/// [`BackendError::NotFound`].
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Client for the remote `tasks` table.
pub struct TaskStore {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: watch::Receiver<Option<Session>>,
}

impl TaskStore {
    /// Create a task store reading its bearer token from `session`.
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
        session: watch::Receiver<Option<Session>>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            anon_key: anon_key.into(),
            session,
        }
    }

    /// List tasks, newest first, optionally restricted to one owner.
    #[instrument(skip(self))]
    pub async fn list(&self, owner: Option<&str>) -> Result<Vec<Task>> {
        let mut query = vec![
            ("select".to_string(), "*".to_string()),
            ("order".to_string(), "created_at.desc".to_string()),
        ];
        if let Some(owner) = owner {
            query.push(("user_id".to_string(), format!("eq.{owner}")));
        }

        let resp = self
            .request(reqwest::Method::GET)?
            .query(&query)
            .send()
            .await?;
        let resp = check(resp).await?;
        Ok(resp.json::<Vec<Task>>().await?)
    }

    /// Fetch a single task by id.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> Result<Task> {
        let resp = self
            .request(reqwest::Method::GET)?
            .query(&[("select", "*"), ("id", &format!("eq.{id}"))])
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT)
            .send()
            .await?;
        let resp = check(resp).await?;
        Ok(resp.json::<Task>().await?)
    }

    /// Insert a task for `owner`, returning the stored row with its
    /// server-assigned id and timestamp.
    ///
    /// The draft must already be validated; this method does not re-check.
    #[instrument(skip(self, draft))]
    pub async fn create(&self, draft: &TaskDraft, owner: &str) -> Result<Task> {
        let mut body = serde_json::to_value(draft)?;
        if let Some(map) = body.as_object_mut() {
            let _ = map.insert("user_id".to_string(), json!(owner));
        }

        let resp = self
            .request(reqwest::Method::POST)?
            .header("Prefer", "return=representation")
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT)
            .json(&body)
            .send()
            .await?;
        let resp = check(resp).await?;
        Ok(resp.json::<Task>().await?)
    }

    /// Set the status column of one task, returning the updated row.
    #[instrument(skip(self))]
    pub async fn update_status(&self, id: i64, status: TaskStatus) -> Result<Task> {
        let resp = self
            .request(reqwest::Method::PATCH)?
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT)
            .json(&json!({ "status": status }))
            .send()
            .await?;
        let resp = check(resp).await?;
        Ok(resp.json::<Task>().await?)
    }

    /// Delete a task by id. Returns whether a row was actually removed.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let resp = self
            .request(reqwest::Method::DELETE)?
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let resp = check(resp).await?;
        let removed = resp.json::<Vec<Task>>().await?;
        Ok(!removed.is_empty())
    }

    /// Start an authenticated request against the tasks table.
    ///
    /// Fails with [`BackendError::NoSession`] before any network I/O when no
    /// principal is signed in — task operations are gated on identity.
    fn request(&self, method: reqwest::Method) -> Result<reqwest::RequestBuilder> {
        let token = self
            .session
            .borrow()
            .as_ref()
            .map(|s| s.access_token.clone())
            .ok_or(BackendError::NoSession)?;

        let url = format!("{}/rest/v1/tasks", self.base_url);
        Ok(self
            .http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token))
    }
}

/// Map non-success responses to typed errors.
async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    // 406 is the single-object Accept answering "zero rows matched".
    if status == reqwest::StatusCode::NOT_ACCEPTABLE {
        return Err(BackendError::NotFound);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(BackendError::Api {
        status: status.as_u16(),
        message,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    use crate::auth::AuthUser;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session_channel(uid: &str) -> watch::Receiver<Option<Session>> {
        let session = Session {
            access_token: format!("tok-{uid}"),
            refresh_token: None,
            expires_at: i64::MAX,
            user: AuthUser {
                id: uid.to_string(),
                email: None,
            },
        };
        // The receiver keeps the last value readable after the sender drops.
        let (_tx, rx) = watch::channel(Some(session));
        rx
    }

    fn store(server: &MockServer, uid: &str) -> TaskStore {
        TaskStore::new(
            reqwest::Client::new(),
            server.uri(),
            "anon-key",
            session_channel(uid),
        )
    }

    fn row(id: i64, uid: &str, status: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "title": format!("task {id}"),
            "description": "…",
            "deadline": "2026-08-14",
            "difficulty": "medium",
            "status": status,
            "user_id": uid,
            "created_at": "2026-08-07T09:00:00+00:00"
        })
    }

    #[tokio::test]
    async fn list_queries_owner_scoped_and_ordered() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/tasks"))
            .and(query_param("select", "*"))
            .and(query_param("order", "created_at.desc"))
            .and(query_param("user_id", "eq.uid-a"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer tok-uid-a"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                row(9, "uid-a", "pending"),
                row(3, "uid-a", "completed"),
            ])))
            .mount(&server)
            .await;

        let tasks = store(&server, "uid-a").list(Some("uid-a")).await.unwrap();
        assert_eq!(tasks.len(), 2);
        // Server order (newest first) is preserved.
        assert_eq!(tasks[0].id, 9);
        assert_eq!(tasks[1].id, 3);
    }

    #[tokio::test]
    async fn list_without_owner_omits_the_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/tasks"))
            .and(query_param("select", "*"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let tasks = store(&server, "uid-a").list(None).await.unwrap();
        assert!(tasks.is_empty());

        // The single received request must not carry a user_id filter.
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].url.query().unwrap_or("").contains("user_id"));
    }

    #[tokio::test]
    async fn list_on_empty_relation_yields_empty_sequence() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let tasks = store(&server, "uid-a").list(Some("uid-a")).await.unwrap();
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn list_scopes_to_the_requested_owner_only() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/tasks"))
            .and(query_param("user_id", "eq.uid-a"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([row(1, "uid-a", "pending")])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/tasks"))
            .and(query_param("user_id", "eq.uid-b"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([row(2, "uid-b", "pending")])))
            .mount(&server)
            .await;

        let store = store(&server, "uid-a");
        let a_tasks = store.list(Some("uid-a")).await.unwrap();
        let b_tasks = store.list(Some("uid-b")).await.unwrap();

        assert!(a_tasks.iter().all(|t| t.user_id == "uid-a"));
        assert!(b_tasks.iter().all(|t| t.user_id == "uid-b"));
        assert_ne!(a_tasks[0].id, b_tasks[0].id);
    }

    #[tokio::test]
    async fn get_by_id_requests_single_object() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/tasks"))
            .and(query_param("id", "eq.7"))
            .and(header("accept", SINGLE_OBJECT))
            .respond_with(ResponseTemplate::new(200).set_body_json(row(7, "uid-a", "pending")))
            .mount(&server)
            .await;

        let task = store(&server, "uid-a").get_by_id(7).await.unwrap();
        assert_eq!(task.id, 7);
    }

    #[tokio::test]
    async fn get_by_id_missing_row_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/tasks"))
            .respond_with(ResponseTemplate::new(406).set_body_string("JSON object requested"))
            .mount(&server)
            .await;

        let err = store(&server, "uid-a").get_by_id(404).await.unwrap_err();
        assert!(matches!(err, BackendError::NotFound));
    }

    #[tokio::test]
    async fn create_posts_draft_with_owner_and_returns_stored_row() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/tasks"))
            .and(header("prefer", "return=representation"))
            .and(body_partial_json(serde_json::json!({
                "title": "Revise notes",
                "description": "Chapters 3 and 4",
                "deadline": "2026-08-14",
                "difficulty": "medium",
                "status": "pending",
                "user_id": "uid-a"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(row(42, "uid-a", "pending")))
            .mount(&server)
            .await;

        let draft = TaskDraft::new("Revise notes", "Chapters 3 and 4", "2026-08-14".parse().unwrap());
        let task = store(&server, "uid-a").create(&draft, "uid-a").await.unwrap();
        assert_eq!(task.id, 42);
        assert_eq!(task.user_id, "uid-a");
    }

    #[tokio::test]
    async fn update_status_patches_only_the_status_column() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/tasks"))
            .and(query_param("id", "eq.7"))
            .and(body_partial_json(serde_json::json!({ "status": "completed" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(row(7, "uid-a", "completed")))
            .mount(&server)
            .await;

        let task = store(&server, "uid-a")
            .update_status(7, TaskStatus::Completed)
            .await
            .unwrap();
        assert_eq!(task.status, TaskStatus::Completed);

        // The patch body is exactly the status column.
        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body, serde_json::json!({ "status": "completed" }));
    }

    #[tokio::test]
    async fn update_status_is_idempotent_at_the_request_level() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/tasks"))
            .and(query_param("id", "eq.7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(row(7, "uid-a", "completed")))
            .expect(2)
            .mount(&server)
            .await;

        let store = store(&server, "uid-a");
        let first = store.update_status(7, TaskStatus::Completed).await.unwrap();
        let second = store.update_status(7, TaskStatus::Completed).await.unwrap();
        assert_eq!(first.status, second.status);
    }

    #[tokio::test]
    async fn update_status_missing_row_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/tasks"))
            .respond_with(ResponseTemplate::new(406))
            .mount(&server)
            .await;

        let err = store(&server, "uid-a")
            .update_status(404, TaskStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::NotFound));
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/tasks"))
            .and(query_param("id", "eq.7"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!([row(7, "uid-a", "pending")])),
            )
            .mount(&server)
            .await;

        assert!(store(&server, "uid-a").delete(7).await.unwrap());
    }

    #[tokio::test]
    async fn delete_of_absent_row_returns_false() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        assert!(!store(&server, "uid-a").delete(404).await.unwrap());
    }

    #[tokio::test]
    async fn server_error_propagates_with_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/tasks"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = store(&server, "uid-a").list(Some("uid-a")).await.unwrap_err();
        match err {
            BackendError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn operations_without_session_fail_before_any_request() {
        let (_tx, rx) = watch::channel(None);
        // Unroutable address: a request attempt would error differently.
        let store = TaskStore::new(reqwest::Client::new(), "http://127.0.0.1:1", "anon", rx);

        let err = store.list(Some("uid-a")).await.unwrap_err();
        assert!(matches!(err, BackendError::NoSession));
        let err = store.delete(1).await.unwrap_err();
        assert!(matches!(err, BackendError::NoSession));
    }
}
