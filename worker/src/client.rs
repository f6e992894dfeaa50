use std::time::Duration;

use common::{TaskAssignmentRequest, TaskAssignmentResponse, TaskCompleteRequest, TaskCompleteResponse};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum RpcError {
    /// No se pudo hablar con el coordinator (caído, puerto cerrado, timeout)
    #[error("coordinator inalcanzable: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("coordinator respondió {0}")]
    Status(StatusCode),

    #[error("respuesta inválida del coordinator: {0}")]
    Decode(#[source] reqwest::Error),
}

impl RpcError {
    pub fn is_transport(&self) -> bool {
        matches!(self, RpcError::Transport(_))
    }
}

/// Cliente HTTP de las dos llamadas RPC del coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorClient {
    http: Client,
    base_url: String,
}

impl CoordinatorClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn assign(&self, worker_id: &str) -> Result<TaskAssignmentResponse, RpcError> {
        self.post(
            "/api/v1/tasks/next",
            &TaskAssignmentRequest {
                worker_id: worker_id.to_string(),
            },
        )
        .await
    }

    pub async fn complete(&self, req: &TaskCompleteRequest) -> Result<TaskCompleteResponse, RpcError> {
        self.post("/api/v1/tasks/complete", req).await
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, RpcError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(RpcError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RpcError::Status(status));
        }

        resp.json::<R>().await.map_err(RpcError::Decode)
    }
}
