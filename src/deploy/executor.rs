//! Executor port: the external system that performs generation and
//! deployment. The orchestrator only mirrors what it reports.

use crate::config::Config;
use crate::deploy::job::{DeployOptions, ExecutorReport};
use crate::error::CoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Executor acknowledgment of a new (or retried) attempt.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutorStart {
    pub job_id: String,
    #[serde(default)]
    pub destination: Option<String>,
}

#[async_trait]
pub trait DeployExecutor: Send + Sync {
    /// Kick off generation + deployment. Returns immediately with the
    /// executor-side job handle.
    async fn start(&self, config: &Config, options: &DeployOptions) -> Result<ExecutorStart, CoreError>;

    /// One status poll. Reports are cumulative (full log so far).
    async fn status(&self, executor_job_id: &str) -> Result<ExecutorReport, CoreError>;

    /// Best-effort cancellation request; the job stays in its current status
    /// until the executor confirms.
    async fn request_cancel(&self, executor_job_id: &str) -> Result<(), CoreError>;

    /// Re-run a failed attempt executor-side. Returns the new handle.
    async fn retry(&self, executor_job_id: &str) -> Result<ExecutorStart, CoreError>;
}

/// JSON-over-HTTP executor binding.
pub struct HttpExecutor {
    base_url: String,
    client: reqwest::Client,
}

impl HttpExecutor {
    pub fn new(base_url: &str) -> Self {
        HttpExecutor {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Transport and decode failures become `Executor` errors; HTTP error
/// responses surface the executor's own code and message verbatim.
async fn read_json<T: for<'de> Deserialize<'de>>(resp: reqwest::Response) -> Result<T, CoreError> {
    let status = resp.status();
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        return Err(CoreError::Executor {
            code: status.as_u16().to_string(),
            message,
        });
    }
    resp.json::<T>().await.map_err(|e| CoreError::Executor {
        code: "malformed_response".into(),
        message: e.to_string(),
    })
}

fn transport(e: reqwest::Error) -> CoreError {
    CoreError::Executor {
        code: "transport".into(),
        message: e.to_string(),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StartBody<'a> {
    config: &'a Config,
    options: &'a DeployOptions,
}

#[async_trait]
impl DeployExecutor for HttpExecutor {
    async fn start(&self, config: &Config, options: &DeployOptions) -> Result<ExecutorStart, CoreError> {
        tracing::debug!(module = %config.module_name, "executor start");
        let resp = self
            .client
            .post(self.url("/deployments"))
            .json(&StartBody { config, options })
            .send()
            .await
            .map_err(transport)?;
        read_json(resp).await
    }

    async fn status(&self, executor_job_id: &str) -> Result<ExecutorReport, CoreError> {
        let resp = self
            .client
            .get(self.url(&format!("/deployments/{}", executor_job_id)))
            .send()
            .await
            .map_err(transport)?;
        read_json(resp).await
    }

    async fn request_cancel(&self, executor_job_id: &str) -> Result<(), CoreError> {
        let resp = self
            .client
            .post(self.url(&format!("/deployments/{}/cancel", executor_job_id)))
            .send()
            .await
            .map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(CoreError::Executor {
                code: status.as_u16().to_string(),
                message,
            });
        }
        Ok(())
    }

    async fn retry(&self, executor_job_id: &str) -> Result<ExecutorStart, CoreError> {
        let resp = self
            .client
            .post(self.url(&format!("/deployments/{}/retry", executor_job_id)))
            .send()
            .await
            .map_err(transport)?;
        read_json(resp).await
    }
}
