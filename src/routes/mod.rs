pub mod common;
pub mod config;
pub mod deploy;
pub mod version;

pub use common::common_routes;
pub use config::config_routes;
pub use deploy::deploy_routes;
pub use version::version_routes;
