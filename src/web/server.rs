//! HTTP server implementation.
//!
//! This module provides the axum-based HTTP server exposing the task API and
//! the embedded front end page.

use axum::{
    Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, put},
};
use std::net::SocketAddr;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::templates;
use crate::error::{ApiError, ErrorCode, StorageError, TaskError, TaskResult};
use crate::service::TaskService;
use crate::types::{CompletedTask, NewTask, TaskId};

/// Server state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    service: TaskService,
}

impl AppState {
    pub fn new(service: TaskService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &TaskService {
        &self.service
    }
}

/// Run a service call on the blocking pool.
///
/// Store calls check out a pooled SQLite connection and may wait for one, so
/// they stay off the async workers.
async fn run_blocking<T, F>(state: &AppState, f: F) -> TaskResult<T>
where
    F: FnOnce(&TaskService) -> TaskResult<T> + Send + 'static,
    T: Send + 'static,
{
    let service = state.service.clone();
    tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(StorageError::from)?
}

/// Health check response.
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Root endpoint - serves the task board page.
async fn root() -> Html<&'static str> {
    Html(templates::INDEX_TEMPLATE)
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /tasks` - newest pending tasks.
async fn list_tasks(State(state): State<AppState>) -> Response {
    match run_blocking(&state, |service| service.list_recent_pending()).await {
        Ok(tasks) => Json(tasks).into_response(),
        Err(e) => e.into_response(),
    }
}

/// `POST /tasks` - create a task.
async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<NewTask>, JsonRejection>,
) -> Response {
    let Json(input) = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Unreadable create request");
            let body = ApiError::new(ErrorCode::InvalidRequestBody, "Request body must be JSON");
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    match run_blocking(&state, move |service| service.create_task(&input)).await {
        Ok(task) => (StatusCode::CREATED, Json(task)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// `PUT /tasks/{id}/done` - mark a task completed.
///
/// An id that does not parse, including a segment that does not decode to
/// UTF-8, is reported the same way as a missing task.
async fn complete_task(
    State(state): State<AppState>,
    uri: Uri,
    path: Result<Path<String>, PathRejection>,
) -> Response {
    let raw_id = match path {
        Ok(Path(raw_id)) => raw_id,
        Err(rejection) => {
            let raw = raw_id_segment(&uri);
            warn!(id = %raw, error = %rejection.body_text(), "Complete requested with undecodable id");
            return TaskError::not_found_raw(raw).into_response();
        }
    };
    let Ok(id) = raw_id.parse::<TaskId>() else {
        warn!(id = %raw_id, "Complete requested with unparseable id");
        return TaskError::not_found_raw(&raw_id).into_response();
    };

    match run_blocking(&state, move |service| service.complete_task(id)).await {
        Ok(()) => Json(CompletedTask { id, status: true }).into_response(),
        Err(e) => e.into_response(),
    }
}

/// The still-encoded id segment of a `/tasks/{id}/done` request.
fn raw_id_segment(uri: &Uri) -> &str {
    let path = uri.path();
    let path = path.strip_prefix("/tasks/").unwrap_or(path);
    path.strip_suffix("/done").unwrap_or(path)
}

/// Build the router with all routes.
pub fn build_router(state: AppState) -> Router {
    // Browser front ends may be served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}/done", put(complete_task))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle to a running task board server.
pub struct ServerHandle {
    /// Channel to signal shutdown.
    shutdown_tx: Option<oneshot::Sender<()>>,
    /// Address the listener is bound to.
    addr: SocketAddr,
    /// The serving task; finishes once in-flight requests drain.
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// The actual address the server is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Signal shutdown and wait for the server to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.task.await {
            tracing::error!("Server task failed: {}", e);
        }
    }
}

/// Start the HTTP server on `addr`.
///
/// Returns a handle carrying the bound address; dropping the handle without
/// calling [`ServerHandle::shutdown`] also stops the server.
pub async fn start_server(service: TaskService, addr: SocketAddr) -> anyhow::Result<ServerHandle> {
    let app = build_router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("Task board listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Task board shutting down");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok(ServerHandle {
        shutdown_tx: Some(shutdown_tx),
        addr: bound_addr,
        task,
    })
}
