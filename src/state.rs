//! Shared application state for all routes.

use crate::config::Config;
use crate::deploy::{DeployExecutor, Orchestrator};
use crate::introspect::{PgIntrospector, TableIntrospector};
use crate::version::VersionStore;
use crate::wizard::WizardSession;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub introspector: Arc<dyn TableIntrospector>,
    /// In-flight wizard sessions.
    pub wizards: Arc<RwLock<HashMap<Uuid, WizardSession>>>,
    /// Current drafts; snapshots live in the version store.
    pub drafts: Arc<RwLock<HashMap<Uuid, Config>>>,
    pub versions: Arc<VersionStore>,
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(pool: PgPool, executor: Arc<dyn DeployExecutor>) -> Self {
        let versions = Arc::new(VersionStore::new());
        AppState {
            introspector: Arc::new(PgIntrospector::new(pool.clone())),
            pool,
            wizards: Arc::new(RwLock::new(HashMap::new())),
            drafts: Arc::new(RwLock::new(HashMap::new())),
            orchestrator: Arc::new(Orchestrator::new(executor, Arc::clone(&versions))),
            versions,
        }
    }
}
