//! Version history handlers: snapshot, history, compare, rollback.

use crate::error::{AppError, CoreError};
use crate::response::{created, list, ok};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct SnapshotBody {
    #[serde(default)]
    pub note: Option<String>,
}

pub async fn snapshot_config(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SnapshotBody>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let config = {
        let drafts = state
            .drafts
            .read()
            .map_err(|_| AppError::BadRequest("state lock".into()))?;
        drafts
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("config", id))?
    };
    let version = state
        .versions
        .snapshot(&config, body.note.as_deref().unwrap_or(""))?;
    Ok(created(version))
}

pub async fn list_versions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    Ok(list(state.versions.history(id)))
}

pub async fn get_version(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    Ok(ok(state.versions.get(id)?))
}

pub async fn compare_versions(
    State(state): State<AppState>,
    Path((a, b)): Path<(Uuid, Uuid)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    Ok(ok(state.versions.compare(a, b)?))
}

pub async fn rollback_version(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    Ok(created(state.versions.rollback(id)?))
}
