//! Client-side state container that keeps the displayed task list in sync
//! with the server.
//!
//! Every mutation is followed by a full re-fetch of the list; nothing is
//! inserted optimistically. Each refresh takes a generation number and only
//! the most recently started refresh may publish its result, so a slow
//! response can't overwrite a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::api::{ClientError, ClientResult, TaskApi};
use crate::service::validate;
use crate::types::{NewTask, Task, TaskId};

/// What the task list area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    /// Fetched successfully; may be empty.
    Ready(Vec<Task>),
    /// The last fetch failed.
    Failed(String),
}

impl ViewState {
    pub fn tasks(&self) -> &[Task] {
        match self {
            ViewState::Ready(tasks) => tasks,
            _ => &[],
        }
    }
}

/// Contents of the add-task form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.description.is_empty()
    }
}

/// Everything a view needs to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerState {
    pub view: ViewState,
    pub draft: TaskDraft,
    /// Error from the last create/complete attempt, shown next to the form.
    pub notice: Option<String>,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            view: ViewState::Loading,
            draft: TaskDraft::default(),
            notice: None,
        }
    }
}

pub struct SyncController<A> {
    api: A,
    state: watch::Sender<ControllerState>,
    generation: AtomicU64,
}

impl<A: TaskApi> SyncController<A> {
    pub fn new(api: A) -> Self {
        let (state, _) = watch::channel(ControllerState::default());
        Self {
            api,
            state,
            generation: AtomicU64::new(0),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ControllerState {
        self.state.borrow().clone()
    }

    /// Replace the form contents.
    pub fn set_draft(&self, draft: TaskDraft) {
        self.state.send_modify(|s| s.draft = draft);
    }

    /// Initial load: show the loading state, then fetch.
    pub async fn mount(&self) {
        self.state.send_modify(|s| s.view = ViewState::Loading);
        self.refresh().await;
    }

    /// Re-fetch the list. Returns `false` when a newer refresh superseded
    /// this one and its result was dropped.
    pub async fn refresh(&self) -> bool {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.api.list().await;

        let applied = self.state.send_if_modified(|s| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            s.view = match &result {
                Ok(tasks) => ViewState::Ready(tasks.clone()),
                Err(e) => ViewState::Failed(e.to_string()),
            };
            true
        });

        match (&result, applied) {
            (_, false) => debug!(generation, "Dropped stale task list"),
            (Err(e), true) => warn!(error = %e, "Failed to fetch tasks"),
            (Ok(tasks), true) => debug!(count = tasks.len(), "Task list refreshed"),
        }
        applied
    }

    /// Submit the current draft.
    ///
    /// Invalid drafts never reach the network. On success the form is
    /// cleared and the list re-fetched; on failure the draft is kept and a
    /// notice is shown.
    pub async fn create(&self) -> ClientResult<Task> {
        let draft = self.state.borrow().draft.clone();
        let input = NewTask::new(draft.title, draft.description);

        if let Err(e) = validate(&input) {
            let err = ClientError::Validation(e.to_string());
            self.state.send_modify(|s| s.notice = Some(err.to_string()));
            return Err(err);
        }

        match self.api.create(&input).await {
            Ok(task) => {
                self.state.send_modify(|s| {
                    s.draft = TaskDraft::default();
                    s.notice = None;
                });
                self.refresh().await;
                Ok(task)
            }
            Err(e) => {
                warn!(error = %e, "Failed to create task");
                self.state.send_modify(|s| s.notice = Some(e.to_string()));
                Err(e)
            }
        }
    }

    /// Mark a task done, then re-fetch so it drops out of the list.
    pub async fn complete(&self, id: TaskId) -> ClientResult<()> {
        match self.api.complete(id).await {
            Ok(()) => {
                self.state.send_modify(|s| s.notice = None);
                self.refresh().await;
                Ok(())
            }
            Err(e) => {
                warn!(task_id = id, error = %e, "Failed to complete task");
                self.state.send_modify(|s| s.notice = Some(e.to_string()));
                Err(e)
            }
        }
    }
}
