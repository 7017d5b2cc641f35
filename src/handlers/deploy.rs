//! Deployment handlers: submit, inspect, cancel, retry.

use crate::deploy::{DeployOptions, SubmitSource};
use crate::error::{AppError, CoreError};
use crate::response::{created, list, ok};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBody {
    #[serde(default)]
    pub config_id: Option<Uuid>,
    #[serde(default)]
    pub version_id: Option<Uuid>,
    #[serde(default)]
    pub options: DeployOptions,
}

pub async fn submit(
    State(state): State<AppState>,
    Json(body): Json<SubmitBody>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let source = match (body.config_id, body.version_id) {
        (Some(_), Some(_)) => {
            return Err(AppError::BadRequest(
                "provide configId or versionId, not both".into(),
            ))
        }
        (Some(config_id), None) => {
            let drafts = state
                .drafts
                .read()
                .map_err(|_| AppError::BadRequest("state lock".into()))?;
            let config = drafts
                .get(&config_id)
                .cloned()
                .ok_or_else(|| CoreError::not_found("config", config_id))?;
            SubmitSource::Draft(config)
        }
        (None, Some(version_id)) => SubmitSource::Version(version_id),
        (None, None) => {
            return Err(AppError::BadRequest("configId or versionId required".into()))
        }
    };
    let job = state.orchestrator.submit(source, body.options).await?;
    Ok(created(job))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default)]
    pub deployment_id: Option<Uuid>,
}

pub async fn list_jobs(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let jobs = match params.deployment_id {
        Some(deployment_id) => state.orchestrator.lineage(deployment_id),
        None => state.orchestrator.list(),
    };
    Ok(list(jobs))
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    Ok(ok(state.orchestrator.get(id)?))
}

pub async fn cancel_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    Ok(ok(state.orchestrator.cancel(id).await?))
}

pub async fn retry_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    Ok(created(state.orchestrator.retry(id).await?))
}
