//! HTTP client for the task API.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::types::{CompletedTask, NewTask, Task, TaskId};

/// Failure of a client call, classified by the server's answer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid task: {0}")]
    Validation(String),

    #[error("task not found: {0}")]
    NotFound(TaskId),

    #[error("server error (status {0})")]
    Server(u16),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// The three task operations as seen from a client.
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list(&self) -> ClientResult<Vec<Task>>;

    async fn create(&self, input: &NewTask) -> ClientResult<Task>;

    async fn complete(&self, id: TaskId) -> ClientResult<()>;
}

/// [`TaskApi`] over HTTP with `reqwest`.
#[derive(Clone)]
pub struct HttpTaskApi {
    client: Client,
    base_url: String,
}

impl HttpTaskApi {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Read the error message field from a 400 body, if any.
async fn validation_message(response: Response) -> String {
    response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| body.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| "rejected by server".to_string())
}

async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json().await?)
    } else {
        Err(ClientError::Server(status.as_u16()))
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn list(&self) -> ClientResult<Vec<Task>> {
        let response = self.client.get(self.url("/tasks")).send().await?;
        decode(response).await
    }

    async fn create(&self, input: &NewTask) -> ClientResult<Task> {
        let response = self
            .client
            .post(self.url("/tasks"))
            .json(input)
            .send()
            .await?;
        if response.status() == StatusCode::BAD_REQUEST {
            return Err(ClientError::Validation(validation_message(response).await));
        }
        decode(response).await
    }

    async fn complete(&self, id: TaskId) -> ClientResult<()> {
        let response = self
            .client
            .put(self.url(&format!("/tasks/{id}/done")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(id));
        }
        decode::<CompletedTask>(response).await.map(|_| ())
    }
}
