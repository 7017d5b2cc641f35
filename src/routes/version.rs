//! Version history routes.

use crate::handlers::version::{
    compare_versions, get_version, list_versions, rollback_version, snapshot_config,
};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn version_routes(state: AppState) -> Router {
    Router::new()
        .route("/configs/:id/versions", post(snapshot_config).get(list_versions))
        .route("/versions/:id", get(get_version))
        .route("/versions/:id/compare/:other", get(compare_versions))
        .route("/versions/:id/rollback", post(rollback_version))
        .with_state(state)
}
