//! Dev server: PostgreSQL for introspection, an HTTP executor for
//! generation/deploy, and the wizard/version/deployment API mounted under
//! /api/v1.

use axum::Router;
use scaffold_sdk::{
    common_routes, config_routes, deploy_routes, version_routes, AppState, HttpExecutor,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("scaffold_sdk=info".parse()?))
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/scaffold".into());
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    let executor_url =
        std::env::var("EXECUTOR_URL").unwrap_or_else(|_| "http://localhost:8090".into());
    let state = AppState::new(pool, Arc::new(HttpExecutor::new(&executor_url)));

    let api = Router::new()
        .merge(common_routes(state.clone()))
        .nest("/api/v1", config_routes(state.clone()))
        .nest("/api/v1", version_routes(state.clone()))
        .nest("/api/v1", deploy_routes(state.clone()));

    let app = api.layer(TraceLayer::new_for_http());

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    state.orchestrator.shutdown();
    Ok(())
}
