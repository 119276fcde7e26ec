//! Client side of the task board: an HTTP API client and the sync
//! controller that owns the displayed task list.

pub mod api;
pub mod controller;

pub use api::{ClientError, ClientResult, HttpTaskApi, TaskApi};
pub use controller::{ControllerState, SyncController, TaskDraft, ViewState};
