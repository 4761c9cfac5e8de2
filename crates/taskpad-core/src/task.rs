//! Core task types.
//!
//! All serializable types use `snake_case` field names matching the remote
//! table's columns; enums serialize as lowercase strings so rows decode
//! without any translation layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

// ─────────────────────────────────────────────────────────────────────────────
// Enums
// ─────────────────────────────────────────────────────────────────────────────

/// Effort classification of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Light work.
    Low,
    /// Default classification.
    Medium,
    /// Heavy work.
    High,
}

impl Difficulty {
    /// Wire string representation (matches the table's CHECK values).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// All values in display order.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Medium
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completion state of a task. Only ever toggled between the two values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Not done yet.
    Pending,
    /// Done.
    Completed,
}

impl TaskStatus {
    /// Wire string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    /// The other status — toggling is the only legal mutation.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Pending => Self::Completed,
            Self::Completed => Self::Pending,
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Domain types
// ─────────────────────────────────────────────────────────────────────────────

/// One row of the remote `tasks` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Server-assigned identity; unique, never reused, immutable.
    pub id: i64,
    /// Short description.
    pub title: String,
    /// Longer free text.
    pub description: String,
    /// Calendar date the task is due.
    pub deadline: NaiveDate,
    /// Effort classification.
    pub difficulty: Difficulty,
    /// Completion state.
    pub status: TaskStatus,
    /// Owning principal (opaque id assigned by the auth service).
    pub user_id: String,
    /// Server-assigned creation timestamp; drives newest-first ordering.
    pub created_at: String,
}

impl Task {
    /// Whether the task is marked completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// Creation parameters for a task, as captured by the add-task form.
///
/// `difficulty` and `status` carry their creation defaults when the form
/// leaves them untouched; the server assigns `id` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDraft {
    /// Short description (required non-empty).
    pub title: String,
    /// Longer free text (required non-empty).
    pub description: String,
    /// Calendar date the task is due (required).
    pub deadline: NaiveDate,
    /// Effort classification; defaults to [`Difficulty::Medium`].
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Completion state; defaults to [`TaskStatus::Pending`].
    #[serde(default)]
    pub status: TaskStatus,
}

impl TaskDraft {
    /// Create a draft with default difficulty and status.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>, deadline: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            deadline,
            difficulty: Difficulty::default(),
            status: TaskStatus::default(),
        }
    }

    /// Reject blank required fields. Runs before any remote call; a failed
    /// draft never reaches the network.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
