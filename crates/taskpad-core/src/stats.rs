//! Aggregation over an in-memory task list.
//!
//! Everything here is pure and synchronous: the same input list always
//! yields the same [`TaskStats`], and no remote calls are made. The list is
//! small (it is re-fetched in full after every mutation), so the grouping is
//! recomputed from scratch on each load rather than maintained
//! incrementally.

use crate::task::{Difficulty, Task, TaskStatus};

/// Display color for a difficulty bucket.
#[must_use]
pub fn bucket_color(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::High => "#ef4444",
        Difficulty::Medium => "#f59e0b",
        Difficulty::Low => "#3b82f6",
    }
}

/// A transient difficulty grouping; recomputed on every load, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifficultyBucket {
    /// The difficulty this bucket counts.
    pub difficulty: Difficulty,
    /// Number of tasks with that difficulty.
    pub count: usize,
    /// Fixed display color for the bucket.
    pub color: &'static str,
}

/// Aggregate statistics derived from the full task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStats {
    /// Total number of tasks.
    pub total: usize,
    /// Tasks still pending.
    pub pending: usize,
    /// Tasks marked completed.
    pub completed: usize,
    /// `round(completed / total × 100)`; `0` when the list is empty.
    pub percent: u8,
    /// Difficulty buckets in first-encounter order.
    pub buckets: Vec<DifficultyBucket>,
}

impl TaskStats {
    /// Stats for an empty list: zero counts, zero percent, no buckets.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            total: 0,
            pending: 0,
            completed: 0,
            percent: 0,
            buckets: Vec::new(),
        }
    }
}

/// Derive difficulty buckets and completion counts from the task list.
///
/// Buckets appear in the order their difficulty is first encountered while
/// scanning the list top to bottom; every task lands in exactly one bucket.
#[must_use]
pub fn summarize(tasks: &[Task]) -> TaskStats {
    let mut buckets: Vec<DifficultyBucket> = Vec::new();
    let mut completed = 0usize;

    for task in tasks {
        if task.status == TaskStatus::Completed {
            completed += 1;
        }
        match buckets.iter_mut().find(|b| b.difficulty == task.difficulty) {
            Some(bucket) => bucket.count += 1,
            None => buckets.push(DifficultyBucket {
                difficulty: task.difficulty,
                count: 1,
                color: bucket_color(task.difficulty),
            }),
        }
    }

    let total = tasks.len();
    let percent = completion_percent(completed, total);

    TaskStats {
        total,
        pending: total - completed,
        completed,
        percent,
        buckets,
    }
}

/// Tasks carrying the given difficulty, in list order.
#[must_use]
pub fn tasks_with_difficulty(tasks: &[Task], difficulty: Difficulty) -> Vec<&Task> {
    tasks.iter().filter(|t| t.difficulty == difficulty).collect()
}

/// `round(completed / total × 100)`, guarded against the empty list.
fn completion_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percent = ((completed as f64 / total as f64) * 100.0).round() as u8;
    percent
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
