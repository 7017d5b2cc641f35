//! Wizard, draft-config and table-introspection routes.

use crate::handlers::config::{
    create_wizard, get_config, get_wizard, list_configs, table_columns, update_config,
    validate_config, wizard_back, wizard_basics, wizard_confirm_fields, wizard_fields,
    wizard_finish, wizard_import, wizard_page,
};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn config_routes(state: AppState) -> Router {
    Router::new()
        .route("/wizard", post(create_wizard))
        .route("/wizard/:id", get(get_wizard))
        .route("/wizard/:id/basics", post(wizard_basics))
        .route("/wizard/:id/import", post(wizard_import))
        .route("/wizard/:id/fields", post(wizard_fields))
        .route("/wizard/:id/fields/confirm", post(wizard_confirm_fields))
        .route("/wizard/:id/page", post(wizard_page))
        .route("/wizard/:id/back", post(wizard_back))
        .route("/wizard/:id/finish", post(wizard_finish))
        .route("/configs", get(list_configs))
        .route("/configs/:id", get(get_config).put(update_config))
        .route("/configs/:id/validate", post(validate_config))
        .route("/tables/:datasource/:table/columns", get(table_columns))
        .with_state(state)
}
