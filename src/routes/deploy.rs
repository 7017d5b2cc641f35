//! Deployment routes.

use crate::handlers::deploy::{cancel_job, get_job, list_jobs, retry_job, submit};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn deploy_routes(state: AppState) -> Router {
    Router::new()
        .route("/deployments", post(submit).get(list_jobs))
        .route("/deployments/:id", get(get_job))
        .route("/deployments/:id/cancel", post(cancel_job))
        .route("/deployments/:id/retry", post(retry_job))
        .with_state(state)
}
