//! Application state and controller.
//!
//! [`App`] owns the single in-memory task list and is its sole writer. Key
//! handling is split in two: [`App::on_key`] performs the synchronous state
//! transition (navigation, form editing) and may yield an [`Action`];
//! [`App::perform`] executes the action's remote round-trip. The event loop
//! draws a loading frame between the two, so each access-layer call is one
//! suspend point and mutations can never interleave.
//!
//! Reload policy: the full list is re-fetched after create, after a status
//! toggle, after delete, and on principal change. The reload is a full
//! replace of the in-memory list, never a merge.
//!
//! Error policy: the backend propagates typed errors; this controller is the
//! single place that degrades them — every failure is logged and collapsed
//! into a short status message plus a benign value, keeping the UI
//! renderable.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{error, warn};

use taskpad_backend::{AuthClient, BackendError, Session, TaskStore};
use taskpad_core::stats::{summarize, TaskStats};
use taskpad_core::task::{Difficulty, Task, TaskDraft, TaskStatus};

/// The page currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Sign-in / sign-up landing page.
    Auth,
    /// Task list with pending/completed counters.
    Home,
    /// Add-task form.
    AddTask,
    /// Single task with delete confirmation.
    TaskDetail,
    /// Difficulty groupings.
    Categories,
    /// Tasks of one difficulty.
    CategoryDetail,
    /// Completion statistics.
    Statistics,
    /// Account info and sign-out.
    Profile,
}

/// A deferred remote operation produced by key handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Re-fetch the task list for the current principal.
    Reload,
    /// Validate and submit the add-task form.
    SubmitDraft,
    /// Flip a task between pending and completed.
    Toggle(i64),
    /// Fetch one task and open its detail page.
    OpenTask(i64),
    /// Delete a task (already confirmed).
    DeleteTask(i64),
    /// Submit the auth form as a sign-in.
    SignIn,
    /// Submit the auth form as a sign-up.
    SignUp,
    /// Sign out and return to the landing page.
    SignOut,
}

/// Which auth operation the landing form submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Existing account.
    SignIn,
    /// New account.
    SignUp,
}

/// Active field on the auth form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    /// Email input.
    Email,
    /// Password input.
    Password,
}

/// State of the sign-in / sign-up form.
#[derive(Debug)]
pub struct AuthForm {
    /// Email input buffer.
    pub email: String,
    /// Password input buffer.
    pub password: String,
    /// Field receiving keystrokes.
    pub field: AuthField,
    /// Sign-in or sign-up.
    pub mode: AuthMode,
    /// Inline error message.
    pub error: Option<String>,
}

impl Default for AuthForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            field: AuthField::Email,
            mode: AuthMode::SignIn,
            error: None,
        }
    }
}

/// Active field on the add-task form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    /// Title input.
    Title,
    /// Description input.
    Description,
    /// Deadline input (`YYYY-MM-DD`).
    Deadline,
    /// Difficulty selector.
    Difficulty,
}

/// State of the add-task form.
#[derive(Debug)]
pub struct DraftForm {
    /// Title input buffer.
    pub title: String,
    /// Description input buffer.
    pub description: String,
    /// Deadline input buffer.
    pub deadline: String,
    /// Selected difficulty.
    pub difficulty: Difficulty,
    /// Field receiving keystrokes.
    pub field: DraftField,
    /// Inline error message.
    pub error: Option<String>,
}

impl Default for DraftForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            deadline: String::new(),
            difficulty: Difficulty::default(),
            field: DraftField::Title,
            error: None,
        }
    }
}

/// Application state. Sole owner and writer of the in-memory task list.
pub struct App {
    store: TaskStore,
    auth: AuthClient,
    session_file: PathBuf,

    /// Current principal, mirrored from the auth client.
    pub session: Option<Session>,
    /// The in-memory task list (full replace on every reload).
    pub tasks: Vec<Task>,
    /// Aggregation over `tasks`, recomputed on every reload.
    pub stats: TaskStats,
    /// Page on screen.
    pub page: Page,
    /// List selection index for the current page.
    pub selected: usize,
    /// Task shown on the detail page.
    pub selected_task: Option<Task>,
    /// Difficulty shown on the category detail page.
    pub selected_category: Option<Difficulty>,
    /// A remote call is in flight.
    pub loading: bool,
    /// Short human-readable status message.
    pub status_line: Option<String>,
    /// Sign-in / sign-up form.
    pub auth_form: AuthForm,
    /// Add-task form.
    pub draft_form: DraftForm,
    /// Delete confirmation armed on the detail page.
    pub confirm_delete: bool,
    /// Event loop exit flag.
    pub should_quit: bool,
}

impl App {
    /// Create the app. A session already restored into `auth` (from the
    /// session file) skips the landing page.
    #[must_use]
    pub fn new(store: TaskStore, auth: AuthClient, session_file: PathBuf) -> Self {
        let session = auth.current_session();
        let page = if session.is_some() { Page::Home } else { Page::Auth };
        Self {
            store,
            auth,
            session_file,
            session,
            tasks: Vec::new(),
            stats: TaskStats::empty(),
            page,
            selected: 0,
            selected_task: None,
            selected_category: None,
            loading: false,
            status_line: None,
            auth_form: AuthForm::default(),
            draft_form: DraftForm::default(),
            confirm_delete: false,
            should_quit: false,
        }
    }

    /// Tasks of the currently open category, in list order.
    #[must_use]
    pub fn category_tasks(&self) -> Vec<&Task> {
        match self.selected_category {
            Some(difficulty) => taskpad_core::stats::tasks_with_difficulty(&self.tasks, difficulty),
            None => Vec::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Key handling (synchronous state transitions)
    // ─────────────────────────────────────────────────────────────────────

    /// Apply a key press. Returns the remote action to perform, if any.
    pub fn on_key(&mut self, key: KeyEvent) -> Option<Action> {
        // A status message lives until the next key press.
        self.status_line = None;
        match self.page {
            Page::Auth => self.on_key_auth(key),
            Page::Home => self.on_key_home(key),
            Page::AddTask => self.on_key_add_task(key),
            Page::TaskDetail => self.on_key_task_detail(key),
            Page::Categories => self.on_key_categories(key),
            Page::CategoryDetail => self.on_key_category_detail(key),
            Page::Statistics | Page::Profile => self.on_key_summary_pages(key),
        }
    }

    fn on_key_auth(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
                None
            }
            KeyCode::Tab => {
                self.auth_form.field = match self.auth_form.field {
                    AuthField::Email => AuthField::Password,
                    AuthField::Password => AuthField::Email,
                };
                None
            }
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.auth_form.mode = match self.auth_form.mode {
                    AuthMode::SignIn => AuthMode::SignUp,
                    AuthMode::SignUp => AuthMode::SignIn,
                };
                self.auth_form.error = None;
                None
            }
            KeyCode::Enter => {
                if self.auth_form.email.trim().is_empty() || self.auth_form.password.is_empty() {
                    self.auth_form.error = Some("email and password are required".to_string());
                    return None;
                }
                self.auth_form.error = None;
                Some(match self.auth_form.mode {
                    AuthMode::SignIn => Action::SignIn,
                    AuthMode::SignUp => Action::SignUp,
                })
            }
            KeyCode::Backspace => {
                let field = self.active_auth_field();
                let _ = field.pop();
                None
            }
            KeyCode::Char(c) => {
                self.active_auth_field().push(c);
                None
            }
            _ => None,
        }
    }

    fn active_auth_field(&mut self) -> &mut String {
        match self.auth_form.field {
            AuthField::Email => &mut self.auth_form.email,
            AuthField::Password => &mut self.auth_form.password,
        }
    }

    fn on_key_home(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                None
            }
            KeyCode::Char('a') => {
                self.draft_form = DraftForm::default();
                self.goto(Page::AddTask);
                None
            }
            KeyCode::Char('c') => {
                self.goto(Page::Categories);
                None
            }
            KeyCode::Char('s') => {
                self.goto(Page::Statistics);
                None
            }
            KeyCode::Char('p') => {
                self.goto(Page::Profile);
                None
            }
            KeyCode::Char('r') => Some(Action::Reload),
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down => {
                if self.selected + 1 < self.tasks.len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Enter => self.tasks.get(self.selected).map(|t| Action::OpenTask(t.id)),
            KeyCode::Char(' ') => self.tasks.get(self.selected).map(|t| Action::Toggle(t.id)),
            _ => None,
        }
    }

    fn on_key_add_task(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => {
                self.goto(Page::Home);
                None
            }
            KeyCode::Tab => {
                self.draft_form.field = match self.draft_form.field {
                    DraftField::Title => DraftField::Description,
                    DraftField::Description => DraftField::Deadline,
                    DraftField::Deadline => DraftField::Difficulty,
                    DraftField::Difficulty => DraftField::Title,
                };
                None
            }
            KeyCode::Left | KeyCode::Right if self.draft_form.field == DraftField::Difficulty => {
                self.draft_form.difficulty = cycle_difficulty(
                    self.draft_form.difficulty,
                    key.code == KeyCode::Right,
                );
                None
            }
            KeyCode::Enter => Some(Action::SubmitDraft),
            KeyCode::Backspace => {
                if let Some(field) = self.active_draft_field() {
                    let _ = field.pop();
                }
                None
            }
            KeyCode::Char(c) => {
                if let Some(field) = self.active_draft_field() {
                    field.push(c);
                }
                None
            }
            _ => None,
        }
    }

    fn active_draft_field(&mut self) -> Option<&mut String> {
        match self.draft_form.field {
            DraftField::Title => Some(&mut self.draft_form.title),
            DraftField::Description => Some(&mut self.draft_form.description),
            DraftField::Deadline => Some(&mut self.draft_form.deadline),
            DraftField::Difficulty => None,
        }
    }

    fn on_key_task_detail(&mut self, key: KeyEvent) -> Option<Action> {
        let task_id = self.selected_task.as_ref().map(|t| t.id);

        if self.confirm_delete {
            match key.code {
                KeyCode::Char('y') => {
                    self.confirm_delete = false;
                    return task_id.map(Action::DeleteTask);
                }
                KeyCode::Char('n') | KeyCode::Esc => {
                    self.confirm_delete = false;
                }
                _ => {}
            }
            return None;
        }

        match key.code {
            KeyCode::Esc => {
                self.selected_task = None;
                self.goto(Page::Home);
                None
            }
            KeyCode::Char('d') => {
                self.confirm_delete = true;
                None
            }
            KeyCode::Char(' ') => task_id.map(Action::Toggle),
            _ => None,
        }
    }

    fn on_key_categories(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                None
            }
            KeyCode::Esc | KeyCode::Char('h') => {
                self.goto(Page::Home);
                None
            }
            KeyCode::Char('s') => {
                self.goto(Page::Statistics);
                None
            }
            KeyCode::Char('p') => {
                self.goto(Page::Profile);
                None
            }
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down => {
                if self.selected + 1 < self.stats.buckets.len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Enter => {
                if let Some(bucket) = self.stats.buckets.get(self.selected) {
                    self.selected_category = Some(bucket.difficulty);
                    self.goto(Page::CategoryDetail);
                }
                None
            }
            _ => None,
        }
    }

    fn on_key_category_detail(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => {
                self.selected_category = None;
                self.goto(Page::Categories);
                None
            }
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down => {
                if self.selected + 1 < self.category_tasks().len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Enter => self
                .category_tasks()
                .get(self.selected)
                .map(|t| Action::OpenTask(t.id)),
            _ => None,
        }
    }

    fn on_key_summary_pages(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                None
            }
            KeyCode::Esc | KeyCode::Char('h') => {
                self.goto(Page::Home);
                None
            }
            KeyCode::Char('c') => {
                self.goto(Page::Categories);
                None
            }
            KeyCode::Char('s') => {
                self.goto(Page::Statistics);
                None
            }
            KeyCode::Char('l') if self.page == Page::Profile => Some(Action::SignOut),
            KeyCode::Char('p') => {
                self.goto(Page::Profile);
                None
            }
            _ => None,
        }
    }

    fn goto(&mut self, page: Page) {
        self.page = page;
        self.selected = 0;
        self.confirm_delete = false;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Actions (remote round-trips)
    // ─────────────────────────────────────────────────────────────────────

    /// Execute a remote action. Each call is one suspend point; the event
    /// loop issues them one at a time.
    pub async fn perform(&mut self, action: Action) {
        match action {
            Action::Reload => self.reload().await,
            Action::SubmitDraft => self.submit_draft().await,
            Action::Toggle(id) => self.toggle(id).await,
            Action::OpenTask(id) => self.open_task(id).await,
            Action::DeleteTask(id) => self.delete_task(id).await,
            Action::SignIn => self.sign_in(AuthMode::SignIn).await,
            Action::SignUp => self.sign_in(AuthMode::SignUp).await,
            Action::SignOut => self.sign_out().await,
        }
    }

    /// Re-fetch the full task list for the current principal and recompute
    /// the aggregation. Full replace; a failure leaves an empty list and a
    /// status message instead of stale data.
    async fn reload(&mut self) {
        let Some(owner) = self.session.as_ref().map(|s| s.user.id.clone()) else {
            self.tasks.clear();
            self.stats = TaskStats::empty();
            return;
        };

        match self.store.list(Some(&owner)).await {
            Ok(tasks) => {
                self.stats = summarize(&tasks);
                self.tasks = tasks;
                if self.selected >= self.tasks.len() {
                    self.selected = self.tasks.len().saturating_sub(1);
                }
            }
            Err(e) => {
                warn!(error = %e, "task list reload failed");
                self.tasks.clear();
                self.stats = TaskStats::empty();
                self.selected = 0;
                self.status_line = Some("Could not load tasks".to_string());
            }
        }
    }

    /// Validate the add-task form and create the task. Validation failures
    /// never reach the network.
    async fn submit_draft(&mut self) {
        let Some(owner) = self.session.as_ref().map(|s| s.user.id.clone()) else {
            return;
        };

        let deadline = match self.draft_form.deadline.trim().parse::<chrono::NaiveDate>() {
            Ok(d) => d,
            Err(_) => {
                self.draft_form.error = Some("deadline must be a date (YYYY-MM-DD)".to_string());
                return;
            }
        };

        let draft = TaskDraft {
            title: self.draft_form.title.clone(),
            description: self.draft_form.description.clone(),
            deadline,
            difficulty: self.draft_form.difficulty,
            status: TaskStatus::Pending,
        };

        if let Err(e) = draft.validate() {
            self.draft_form.error = Some(e.to_string());
            return;
        }

        match self.store.create(&draft, &owner).await {
            Ok(task) => {
                self.status_line = Some(format!("Added \"{}\"", task.title));
                self.draft_form = DraftForm::default();
                self.goto(Page::Home);
                self.reload().await;
            }
            Err(e) => {
                error!(error = %e, "task create failed");
                self.draft_form.error = Some("Could not save the task".to_string());
            }
        }
    }

    /// Flip a task's status, then reload. The reload runs even when the
    /// update failed so the list reflects the store's actual state.
    async fn toggle(&mut self, id: i64) {
        let Some(current) = self.tasks.iter().find(|t| t.id == id).map(|t| t.status) else {
            return;
        };

        match self.store.update_status(id, current.toggled()).await {
            Ok(task) => {
                if let Some(open) = self.selected_task.as_mut() {
                    if open.id == id {
                        *open = task;
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, task_id = id, "status toggle failed");
                self.status_line = Some("Could not update the task".to_string());
            }
        }
        self.reload().await;
    }

    /// Fetch one task and open its detail page. An absent task leaves the
    /// current page unchanged.
    async fn open_task(&mut self, id: i64) {
        match self.store.get_by_id(id).await {
            Ok(task) => {
                self.selected_task = Some(task);
                self.goto(Page::TaskDetail);
            }
            Err(BackendError::NotFound) => {
                self.status_line = Some("That task no longer exists".to_string());
            }
            Err(e) => {
                warn!(error = %e, task_id = id, "task fetch failed");
                self.status_line = Some("Could not open the task".to_string());
            }
        }
    }

    /// Delete a task after confirmation. A `false` result means nothing was
    /// removed and is reported, not assumed.
    async fn delete_task(&mut self, id: i64) {
        match self.store.delete(id).await {
            Ok(true) => {
                self.status_line = Some("Task deleted".to_string());
                self.selected_task = None;
                self.goto(Page::Home);
                self.reload().await;
            }
            Ok(false) => {
                self.status_line = Some("Could not delete the task".to_string());
            }
            Err(e) => {
                error!(error = %e, task_id = id, "task delete failed");
                self.status_line = Some("Could not delete the task".to_string());
            }
        }
    }

    /// Submit the auth form. On success the session is persisted and the
    /// task list is loaded for the new principal.
    async fn sign_in(&mut self, mode: AuthMode) {
        let email = self.auth_form.email.trim().to_string();
        let password = self.auth_form.password.clone();

        let result = match mode {
            AuthMode::SignIn => self.auth.sign_in(&email, &password).await,
            AuthMode::SignUp => self.auth.sign_up(&email, &password).await,
        };

        match result {
            Ok(session) => {
                if let Err(e) = taskpad_backend::save_session(&self.session_file, &session) {
                    warn!(error = %e, "could not persist session");
                }
                self.session = Some(session);
                self.auth_form = AuthForm::default();
                self.goto(Page::Home);
                self.reload().await;
            }
            Err(e) => {
                warn!(error = %e, "authentication failed");
                self.auth_form.error = Some(match mode {
                    AuthMode::SignIn => "Sign-in failed — check your credentials".to_string(),
                    AuthMode::SignUp => "Sign-up failed — try a different email".to_string(),
                });
            }
        }
    }

    /// Sign out: clear the remote session (best effort), the persisted
    /// session file, and all in-memory state, then return to the landing
    /// page.
    async fn sign_out(&mut self) {
        if let Err(e) = self.auth.sign_out().await {
            warn!(error = %e, "remote sign-out failed");
        }
        if let Err(e) = taskpad_backend::clear_session(&self.session_file) {
            warn!(error = %e, "could not remove session file");
        }
        self.session = None;
        self.tasks.clear();
        self.stats = TaskStats::empty();
        self.selected_task = None;
        self.selected_category = None;
        self.status_line = None;
        self.auth_form = AuthForm::default();
        self.goto(Page::Auth);
    }
}

/// Step a difficulty selector left or right, saturating at the ends.
fn cycle_difficulty(current: Difficulty, forward: bool) -> Difficulty {
    let all = Difficulty::ALL;
    let idx = all.iter().position(|d| *d == current).unwrap_or(1);
    let next = if forward {
        (idx + 1).min(all.len() - 1)
    } else {
        idx.saturating_sub(1)
    };
    all[next]
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
