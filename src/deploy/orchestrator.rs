//! Drives submitted configs through generation and deployment by mirroring
//! an external executor, one owned polling task per active job.

use crate::config::{validate, Config};
use crate::deploy::executor::DeployExecutor;
use crate::deploy::job::{DeployOptions, DeploymentJob, JobStatus};
use crate::error::CoreError;
use crate::version::VersionStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

const POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Polls without progress before a job is flagged stalled.
const STALL_POLLS: u32 = 10;

/// What to deploy: an in-progress draft or an existing immutable version.
pub enum SubmitSource {
    Draft(Config),
    Version(Uuid),
}

type JobMap = Arc<RwLock<HashMap<Uuid, DeploymentJob>>>;
type PollerMap = Arc<Mutex<HashMap<Uuid, JoinHandle<()>>>>;

/// Exclusive owner of job state. The executor remains the source of truth
/// for status/progress/logs; this type mirrors reports into local jobs under
/// a single writer, with UI reads going through cheap clones.
pub struct Orchestrator {
    executor: Arc<dyn DeployExecutor>,
    versions: Arc<VersionStore>,
    jobs: JobMap,
    pollers: PollerMap,
    poll_interval: Duration,
    stall_polls: u32,
}

impl Orchestrator {
    pub fn new(executor: Arc<dyn DeployExecutor>, versions: Arc<VersionStore>) -> Self {
        Self::with_timing(executor, versions, POLL_INTERVAL, STALL_POLLS)
    }

    /// Timing hook so tests can poll in milliseconds.
    pub fn with_timing(
        executor: Arc<dyn DeployExecutor>,
        versions: Arc<VersionStore>,
        poll_interval: Duration,
        stall_polls: u32,
    ) -> Self {
        Orchestrator {
            executor,
            versions,
            jobs: Arc::new(RwLock::new(HashMap::new())),
            pollers: Arc::new(Mutex::new(HashMap::new())),
            poll_interval,
            stall_polls,
        }
    }

    /// Validate, pin a version, hand the config to the executor, and start
    /// polling. Returns the new job immediately; progress arrives
    /// asynchronously.
    ///
    /// A draft with no matching version is snapshotted first so every
    /// deployment is traceable to an immutable configuration.
    pub async fn submit(
        &self,
        source: SubmitSource,
        options: DeployOptions,
    ) -> Result<DeploymentJob, CoreError> {
        let (config, version_id) = match source {
            SubmitSource::Draft(config) => {
                let latest = self.versions.history(config.id).pop();
                let version = match latest {
                    Some(v) if v.snapshot == config => v,
                    _ => self.versions.snapshot(&config, "deploy snapshot")?,
                };
                (config, Some(version.id))
            }
            SubmitSource::Version(version_id) => {
                let version = self.versions.get(version_id)?;
                let errors = validate(&version.snapshot);
                if !errors.is_empty() {
                    return Err(CoreError::InvalidConfig(errors));
                }
                (version.snapshot, Some(version_id))
            }
        };

        let start = self.executor.start(&config, &options).await?;
        let job = DeploymentJob::new(
            Uuid::new_v4(),
            config.id,
            version_id,
            start.job_id,
            start.destination,
        );
        tracing::info!(job_id = %job.id, config_id = %config.id, "deployment submitted");
        self.jobs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(job.id, job.clone());
        self.spawn_poller(job.id);
        Ok(job)
    }

    pub fn get(&self, job_id: Uuid) -> Result<DeploymentJob, CoreError> {
        self.jobs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&job_id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("job", job_id))
    }

    /// All jobs ordered by creation time.
    pub fn list(&self) -> Vec<DeploymentJob> {
        let mut jobs: Vec<DeploymentJob> = self
            .jobs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect();
        jobs.sort_by_key(|j| j.created_at);
        jobs
    }

    /// All attempts of one deployment, oldest first.
    pub fn lineage(&self, deployment_id: Uuid) -> Vec<DeploymentJob> {
        let mut jobs: Vec<DeploymentJob> = self
            .jobs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|j| j.deployment_id == deployment_id)
            .cloned()
            .collect();
        jobs.sort_by_key(|j| j.created_at);
        jobs
    }

    /// Ask the executor to cancel. The local status does not change until the
    /// executor confirms `Canceled`, so local state never runs ahead of
    /// executor truth. Cancel after a terminal status is an idempotent no-op.
    pub async fn cancel(&self, job_id: Uuid) -> Result<DeploymentJob, CoreError> {
        let job = self.get(job_id)?;
        if job.status.is_terminal() {
            tracing::warn!(job_id = %job_id, status = ?job.status, "cancel after terminal status is a no-op");
            return Ok(job);
        }
        self.executor.request_cancel(&job.executor_job_id).await?;
        tracing::info!(job_id = %job_id, "cancellation requested");
        self.get(job_id)
    }

    /// New attempt for a failed job: new id, progress reset, same
    /// `deployment_id` lineage. The failed record is retained for audit.
    pub async fn retry(&self, job_id: Uuid) -> Result<DeploymentJob, CoreError> {
        let old = self.get(job_id)?;
        if old.status != JobStatus::Failed {
            return Err(CoreError::StateConflict(format!(
                "retry requires a failed job, status is {:?}",
                old.status
            )));
        }
        let start = self.executor.retry(&old.executor_job_id).await?;
        let job = DeploymentJob::new(
            old.deployment_id,
            old.config_id,
            old.version_id,
            start.job_id,
            start.destination.or(old.destination),
        );
        tracing::info!(job_id = %job.id, retried = %old.id, "retry submitted");
        self.jobs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(job.id, job.clone());
        self.spawn_poller(job.id);
        Ok(job)
    }

    /// Stop every polling task. Jobs keep their last mirrored state.
    pub fn shutdown(&self) {
        let mut pollers = self.pollers.lock().unwrap_or_else(|e| e.into_inner());
        for (job_id, handle) in pollers.drain() {
            tracing::debug!(job_id = %job_id, "poller stopped on teardown");
            handle.abort();
        }
    }

    fn spawn_poller(&self, job_id: Uuid) {
        let handle = tokio::spawn(poll_loop(
            Arc::clone(&self.jobs),
            Arc::clone(&self.pollers),
            Arc::clone(&self.executor),
            job_id,
            self.poll_interval,
            self.stall_polls,
        ));
        self.pollers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(job_id, handle);
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// One request/response per tick, never overlapping: the next poll is only
/// scheduled after the previous response was applied. Transport failures are
/// logged and polling continues; only executor-confirmed terminal states (or
/// teardown) stop the loop.
async fn poll_loop(
    jobs: JobMap,
    pollers: PollerMap,
    executor: Arc<dyn DeployExecutor>,
    job_id: Uuid,
    interval: Duration,
    stall_polls: u32,
) {
    let mut polls_without_progress = 0u32;
    loop {
        tokio::time::sleep(interval).await;

        let target = {
            let guard = jobs.read().unwrap_or_else(|e| e.into_inner());
            guard
                .get(&job_id)
                .map(|j| (j.executor_job_id.clone(), j.status.is_terminal()))
        };
        let executor_job_id = match target {
            Some((_, true)) | None => break,
            Some((id, false)) => id,
        };

        match executor.status(&executor_job_id).await {
            Ok(report) => {
                let mut guard = jobs.write().unwrap_or_else(|e| e.into_inner());
                let Some(job) = guard.get_mut(&job_id) else { break };
                let advanced = job.apply_report(&report);
                if job.status.is_terminal() {
                    tracing::info!(job_id = %job_id, status = ?job.status, "job reached terminal status");
                    break;
                }
                if advanced {
                    polls_without_progress = 0;
                } else {
                    polls_without_progress += 1;
                    if polls_without_progress >= stall_polls && !job.stalled {
                        job.stalled = true;
                        tracing::warn!(job_id = %job_id, polls = polls_without_progress,
                            "no progress; job flagged stalled, waiting for operator action");
                    }
                }
            }
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "status poll failed, retrying next tick");
            }
        }
    }
    pollers
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .remove(&job_id);
}
