//! Task service: validation and listing policy on top of the store.

use crate::db::Database;
use crate::error::{TaskError, TaskResult};
use crate::types::{NewTask, RECENT_TASK_LIMIT, Task, TaskId};
use tracing::{error, info, warn};

/// Title and description after trimming and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTask {
    pub title: String,
    pub description: String,
}

/// Check a create request.
///
/// Both fields are required and must be non-empty after trimming; a missing
/// field counts as empty. Title is checked first.
pub fn validate(input: &NewTask) -> TaskResult<ValidTask> {
    let title = input.title.as_deref().unwrap_or("").trim();
    if title.is_empty() {
        return Err(TaskError::missing_field("title"));
    }
    let description = input.description.as_deref().unwrap_or("").trim();
    if description.is_empty() {
        return Err(TaskError::missing_field("description"));
    }
    Ok(ValidTask {
        title: title.to_string(),
        description: description.to_string(),
    })
}

/// Mediates between the HTTP layer and the store.
#[derive(Clone)]
pub struct TaskService {
    db: Database,
}

impl TaskService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Validate and store a new pending task.
    pub fn create_task(&self, input: &NewTask) -> TaskResult<Task> {
        let valid = validate(input).inspect_err(|e| warn!(error = %e, "Rejected task"))?;
        let task = self
            .db
            .insert_task(&valid.title, &valid.description)
            .inspect_err(|e| error!(error = %e, "Failed to insert task"))?;
        info!(task_id = task.id, "Task created");
        Ok(task)
    }

    /// The newest pending tasks, capped at [`RECENT_TASK_LIMIT`].
    pub fn list_recent_pending(&self) -> TaskResult<Vec<Task>> {
        let tasks = self
            .db
            .list_pending(RECENT_TASK_LIMIT)
            .inspect_err(|e| error!(error = %e, "Failed to list tasks"))?;
        Ok(tasks)
    }

    /// Mark a task completed. Completing a completed task succeeds.
    pub fn complete_task(&self, id: TaskId) -> TaskResult<()> {
        let existed = self
            .db
            .mark_done(id)
            .inspect_err(|e| error!(task_id = id, error = %e, "Failed to complete task"))?;
        if !existed {
            warn!(task_id = id, "Complete requested for unknown task");
            return Err(TaskError::not_found(id));
        }
        info!(task_id = id, "Task completed");
        Ok(())
    }
}
