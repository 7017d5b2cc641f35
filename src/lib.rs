//! Scaffold SDK: schema-driven module scaffolding with versioned configs and
//! deployment orchestration.

pub mod config;
pub mod deploy;
pub mod error;
pub mod handlers;
pub mod introspect;
pub mod response;
pub mod routes;
pub mod schema;
pub mod state;
pub mod version;
pub mod wizard;

pub use config::{api_prefix, build_default, package_name, validate, Config, PageConfig, ValidationError};
pub use deploy::{
    DeployExecutor, DeployOptions, DeploymentJob, ExecutorReport, ExecutorStart, HttpExecutor,
    JobStatus, Orchestrator, SubmitSource,
};
pub use error::{AppError, CoreError};
pub use introspect::{PgIntrospector, TableIntrospector};
pub use routes::{common_routes, config_routes, deploy_routes, version_routes};
pub use schema::{map_columns, ColumnInfo, FieldDescriptor, LogicalType, QueryOperator};
pub use state::AppState;
pub use version::{Diff, Version, VersionStore};
pub use wizard::{WizardSession, WizardStep};
