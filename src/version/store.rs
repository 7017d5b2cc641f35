//! Append-only version history per config lineage: snapshot, compare, rollback.

use crate::config::{validate, Config};
use crate::error::CoreError;
use crate::version::diff::{diff_configs, Diff};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use uuid::Uuid;

/// Immutable snapshot of a config. `snapshot` is a deep value copy and is
/// never mutated after creation; rollback appends a new version instead.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: Uuid,
    pub config_id: Uuid,
    /// Monotonically increasing per lineage, starting at 1, no gaps.
    pub sequence: u64,
    pub snapshot: Config,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

type Lineage = Arc<Mutex<Vec<Version>>>;

/// In-process version history, safe for concurrent use. Snapshots on
/// different lineages proceed independently; snapshots on the same lineage
/// serialize on the lineage lock so sequence assignment has no gaps or
/// duplicates.
#[derive(Default)]
pub struct VersionStore {
    lineages: RwLock<HashMap<Uuid, Lineage>>,
    /// version id -> owning config id, for O(1) lookup across lineages.
    index: RwLock<HashMap<Uuid, Uuid>>,
}

impl VersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep-copy `config` as the next version in its lineage. Fails with
    /// `InvalidConfig` when the config does not validate.
    pub fn snapshot(&self, config: &Config, note: &str) -> Result<Version, CoreError> {
        let errors = validate(config);
        if !errors.is_empty() {
            return Err(CoreError::InvalidConfig(errors));
        }

        let lineage = self.lineage_for(config.id);
        let mut versions = lineage.lock().unwrap_or_else(|e| e.into_inner());
        let version = Version {
            id: Uuid::new_v4(),
            config_id: config.id,
            sequence: versions.len() as u64 + 1,
            snapshot: config.clone(),
            note: note.into(),
            created_at: Utc::now(),
        };
        self.index
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(version.id, config.id);
        versions.push(version.clone());
        tracing::info!(config_id = %config.id, sequence = version.sequence, "snapshot taken");
        Ok(version)
    }

    pub fn get(&self, version_id: Uuid) -> Result<Version, CoreError> {
        let config_id = *self
            .index
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&version_id)
            .ok_or_else(|| CoreError::not_found("version", version_id))?;
        let lineage = self.lineage_for(config_id);
        let versions = lineage.lock().unwrap_or_else(|e| e.into_inner());
        versions
            .iter()
            .find(|v| v.id == version_id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("version", version_id))
    }

    /// Full history of a config lineage, ordered by sequence. Empty when the
    /// config has never been snapshotted.
    pub fn history(&self, config_id: Uuid) -> Vec<Version> {
        let lineages = self.lineages.read().unwrap_or_else(|e| e.into_inner());
        match lineages.get(&config_id) {
            Some(lineage) => lineage.lock().unwrap_or_else(|e| e.into_inner()).clone(),
            None => Vec::new(),
        }
    }

    /// Structural diff between two versions of the same lineage.
    pub fn compare(&self, a: Uuid, b: Uuid) -> Result<Diff, CoreError> {
        let va = self.get(a)?;
        let vb = self.get(b)?;
        if va.config_id != vb.config_id {
            return Err(CoreError::IncompatibleLineage);
        }
        Ok(diff_configs(&va.snapshot, &vb.snapshot))
    }

    /// Append a new version whose snapshot equals the target version's
    /// snapshot. History is never rewritten, so a rollback is itself
    /// diff-able and rollback-able.
    pub fn rollback(&self, version_id: Uuid) -> Result<Version, CoreError> {
        let target = self.get(version_id)?;
        let note = format!("rollback to v{}", target.sequence);
        self.snapshot(&target.snapshot, &note)
    }

    fn lineage_for(&self, config_id: Uuid) -> Lineage {
        if let Some(lineage) = self
            .lineages
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&config_id)
        {
            return Arc::clone(lineage);
        }
        let mut lineages = self.lineages.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(lineages.entry(config_id).or_default())
    }
}
