//! Task CRUD primitives.

use super::{Database, now_ms};
use crate::error::StorageResult;
use crate::types::{Task, TaskId};
use rusqlite::{OptionalExtension, Row, params};

const TASK_COLUMNS: &str = "id, title, description, status, created_at";

pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: row.get("status")?,
        created_at: row.get("created_at")?,
    })
}

impl Database {
    /// Insert a pending task stamped with the current time.
    pub fn insert_task(&self, title: &str, description: &str) -> StorageResult<Task> {
        self.insert_task_at(title, description, now_ms())
    }

    /// Insert a pending task with an explicit creation timestamp.
    pub fn insert_task_at(
        &self,
        title: &str,
        description: &str,
        created_at: i64,
    ) -> StorageResult<Task> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO task (title, description, status, created_at)
                 VALUES (?1, ?2, 0, ?3)",
                params![title, description, created_at],
            )?;

            Ok(Task {
                id: conn.last_insert_rowid(),
                title: title.to_string(),
                description: description.to_string(),
                status: false,
                created_at,
            })
        })
    }

    /// Pending tasks, newest first, at most `limit` of them.
    ///
    /// Ties on `created_at` fall back to id so insertion order decides.
    pub fn list_pending(&self, limit: usize) -> StorageResult<Vec<Task>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {TASK_COLUMNS} FROM task
                 WHERE status = 0
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?1"
            );
            let mut stmt = conn.prepare(&sql)?;
            let tasks = stmt
                .query_map(params![limit as i64], parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    /// Set `status = true`. Returns whether a row with `id` exists.
    ///
    /// A task that is already done still matches, so repeat calls succeed.
    pub fn mark_done(&self, id: TaskId) -> StorageResult<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("UPDATE task SET status = 1 WHERE id = ?1", params![id])?;
            Ok(changed > 0)
        })
    }

    /// Fetch a single task by id.
    pub fn get_task(&self, id: TaskId) -> StorageResult<Option<Task>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {TASK_COLUMNS} FROM task WHERE id = ?1");
            let task = conn
                .query_row(&sql, params![id], parse_task_row)
                .optional()?;
            Ok(task)
        })
    }

    /// Number of tasks not yet completed.
    pub fn pending_count(&self) -> StorageResult<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM task WHERE status = 0", [], |row| {
                row.get(0)
            })?;
            Ok(count)
        })
    }

    /// Delete every task. Test support only; ids keep increasing afterwards.
    pub fn reset(&self) -> StorageResult<usize> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM task", [])?))
    }
}
