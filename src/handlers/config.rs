//! Wizard session and draft-config handlers.

use crate::config::{validate, Config};
use crate::error::AppError;
use crate::response::{created, list, ok};
use crate::schema::{map_columns, FieldDescriptor};
use crate::state::AppState;
use crate::wizard::{BasicsInput, WizardError, WizardSession};
use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

fn with_wizard<T>(
    state: &AppState,
    id: Uuid,
    f: impl FnOnce(&mut WizardSession) -> Result<T, WizardError>,
) -> Result<(T, WizardSession), AppError> {
    let mut wizards = state
        .wizards
        .write()
        .map_err(|_| AppError::BadRequest("state lock".into()))?;
    let session = wizards
        .get_mut(&id)
        .ok_or_else(|| AppError::BadRequest(format!("unknown wizard session: {}", id)))?;
    let out = f(session)?;
    Ok((out, session.clone()))
}

pub async fn create_wizard(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let session = WizardSession::new();
    state
        .wizards
        .write()
        .map_err(|_| AppError::BadRequest("state lock".into()))?
        .insert(session.id, session.clone());
    Ok(created(session))
}

pub async fn get_wizard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let wizards = state
        .wizards
        .read()
        .map_err(|_| AppError::BadRequest("state lock".into()))?;
    let session = wizards
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::BadRequest(format!("unknown wizard session: {}", id)))?;
    Ok(ok(session))
}

pub async fn wizard_basics(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<BasicsInput>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let (_, session) = with_wizard(&state, id, |w| w.apply_basics(input))?;
    Ok(ok(session))
}

/// Introspect the session's table and run the schema mapper over the result.
/// Overwrites any manual field edits in the session.
pub async fn wizard_import(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let (datasource, table) = {
        let wizards = state
            .wizards
            .read()
            .map_err(|_| AppError::BadRequest("state lock".into()))?;
        let session = wizards
            .get(&id)
            .ok_or_else(|| AppError::BadRequest(format!("unknown wizard session: {}", id)))?;
        let (d, t) = session.table_ref();
        (d.to_string(), t.to_string())
    };
    let columns = state.introspector.list_columns(&datasource, &table).await?;
    let (_, session) = with_wizard(&state, id, |w| w.import_columns(&columns))?;
    Ok(ok(session))
}

pub async fn wizard_fields(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(fields): Json<Vec<FieldDescriptor>>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let (_, session) = with_wizard(&state, id, |w| w.set_fields(fields))?;
    Ok(ok(session))
}

pub async fn wizard_confirm_fields(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let (_, session) = with_wizard(&state, id, |w| w.confirm_fields())?;
    Ok(ok(session))
}

pub async fn wizard_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(page): Json<crate::config::PageConfig>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let (_, session) = with_wizard(&state, id, |w| w.set_page(page))?;
    Ok(ok(session))
}

pub async fn wizard_back(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let (_, session) = with_wizard(&state, id, |w| w.back())?;
    Ok(ok(session))
}

/// Complete the wizard: the produced config becomes the current draft.
pub async fn wizard_finish(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let (config, _) = with_wizard(&state, id, |w| w.finish())?;
    state
        .drafts
        .write()
        .map_err(|_| AppError::BadRequest("state lock".into()))?
        .insert(config.id, config.clone());
    Ok(created(config))
}

pub async fn list_configs(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let drafts = state
        .drafts
        .read()
        .map_err(|_| AppError::BadRequest("state lock".into()))?;
    let mut configs: Vec<Config> = drafts.values().cloned().collect();
    configs.sort_by_key(|c| c.created_at);
    Ok(list(configs))
}

pub async fn get_config(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let drafts = state
        .drafts
        .read()
        .map_err(|_| AppError::BadRequest("state lock".into()))?;
    let config = drafts
        .get(&id)
        .cloned()
        .ok_or_else(|| crate::error::CoreError::not_found("config", id))?;
    Ok(ok(config))
}

/// Replace a draft. A config that has been snapshotted is immutable: the
/// edit lands in a new draft with a fresh id and lineage.
pub async fn update_config(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(mut body): Json<Config>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let mut drafts = state
        .drafts
        .write()
        .map_err(|_| AppError::BadRequest("state lock".into()))?;
    if !drafts.contains_key(&id) {
        return Err(crate::error::CoreError::not_found("config", id).into());
    }
    if state.versions.history(id).is_empty() {
        body.id = id;
        drafts.insert(id, body.clone());
        Ok(ok(body))
    } else {
        body.id = Uuid::new_v4();
        tracing::info!(config_id = %id, new_id = %body.id, "snapshotted config edited, new draft created");
        drafts.insert(body.id, body.clone());
        Ok(created(body))
    }
}

/// Run the full validation and return the error list (200 either way).
pub async fn validate_config(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let drafts = state
        .drafts
        .read()
        .map_err(|_| AppError::BadRequest("state lock".into()))?;
    let config = drafts
        .get(&id)
        .ok_or_else(|| crate::error::CoreError::not_found("config", id))?;
    Ok(list(validate(config)))
}

/// Preview: introspect a table and return the mapped field descriptors
/// without touching any wizard session.
pub async fn table_columns(
    State(state): State<AppState>,
    Path((datasource, table)): Path<(String, String)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let columns = state.introspector.list_columns(&datasource, &table).await?;
    Ok(list(map_columns(&columns)))
}
