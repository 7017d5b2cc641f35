//! Typed errors and HTTP mapping.

use crate::config::ValidationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failures of the scaffolding core, transport-agnostic.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("config failed validation with {} error(s)", .0.len())]
    InvalidConfig(Vec<ValidationError>),
    #[error("not found: {kind} '{id}'")]
    NotFound { kind: &'static str, id: String },
    #[error("versions belong to different config lineages")]
    IncompatibleLineage,
    /// Executor-side failure, surfaced verbatim (message + code) so the root
    /// cause survives into audit logs.
    #[error("executor [{code}]: {message}")]
    Executor { code: String, message: String },
    #[error("state conflict: {0}")]
    StateConflict(String),
}

impl CoreError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        CoreError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Wizard(#[from] crate::wizard::WizardError),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, details) = match &self {
            AppError::Core(CoreError::InvalidConfig(errors)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                serde_json::to_value(errors).ok(),
            ),
            AppError::Core(CoreError::NotFound { .. }) => (StatusCode::NOT_FOUND, "not_found", None),
            AppError::Core(CoreError::IncompatibleLineage) => {
                (StatusCode::CONFLICT, "incompatible_lineage", None)
            }
            AppError::Core(CoreError::Executor { .. }) => (StatusCode::BAD_GATEWAY, "executor_error", None),
            AppError::Core(CoreError::StateConflict(_)) => (StatusCode::CONFLICT, "state_conflict", None),
            AppError::Wizard(e) => match e {
                crate::wizard::WizardError::StepMismatch { .. } => {
                    (StatusCode::CONFLICT, "wizard_step_conflict", None)
                }
                crate::wizard::WizardError::EmptySchema => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "empty_schema", None)
                }
                crate::wizard::WizardError::Invalid(errors) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "validation_error",
                    serde_json::to_value(errors).ok(),
                ),
            },
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found", None)
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
                }
            }
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request", None),
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}
