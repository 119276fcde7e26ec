//! Core types for the task board.

use serde::{Deserialize, Serialize};

/// Task identifier as assigned by the store.
pub type TaskId = i64;

/// Maximum number of pending tasks returned by the list operation.
pub const RECENT_TASK_LIMIT: usize = 5;

/// A task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    /// `false` = pending, `true` = completed.
    pub status: bool,
    /// Creation time in milliseconds since the Unix epoch.
    pub created_at: i64,
}

impl Task {
    pub fn is_pending(&self) -> bool {
        !self.status
    }
}

/// Input for creating a task, as received from a client.
///
/// Both fields are optional on the wire so that a missing field is reported
/// as a validation failure rather than a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
        }
    }
}

/// Response body for a successful completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedTask {
    pub id: TaskId,
    pub status: bool,
}
