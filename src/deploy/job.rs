//! Deployment job model and its status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Job lifecycle: `Pending -> Running -> {Success | Failed | Canceled}`.
/// Terminal states are immutable once reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Success,
    Failed,
    Canceled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Failed | JobStatus::Canceled)
    }

    /// Legal successor states. A fast executor may skip `Running` entirely.
    pub fn transitions(self) -> &'static [JobStatus] {
        match self {
            JobStatus::Pending => &[
                JobStatus::Running,
                JobStatus::Success,
                JobStatus::Failed,
                JobStatus::Canceled,
            ],
            JobStatus::Running => &[JobStatus::Success, JobStatus::Failed, JobStatus::Canceled],
            JobStatus::Success | JobStatus::Failed | JobStatus::Canceled => &[],
        }
    }

    pub fn can_transition_to(self, next: JobStatus) -> bool {
        self.transitions().contains(&next)
    }
}

/// One log line mirrored from the executor, in report order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogLine {
    pub level: String,
    pub message: String,
}

/// Executor-side failure detail, kept verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobError {
    pub code: String,
    pub message: String,
}

/// What to deploy and where.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployOptions {
    #[serde(default)]
    pub target_env: Option<String>,
    /// Generate the module without pushing it to the target.
    #[serde(default)]
    pub generate_only: bool,
}

/// One cumulative status report from the executor. `logs` carries the full
/// ordered log so far; the orchestrator mirrors the unseen suffix.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutorReport {
    pub status: JobStatus,
    pub progress: u8,
    #[serde(default)]
    pub logs: Vec<LogLine>,
    #[serde(default)]
    pub error: Option<JobError>,
}

/// One execution attempt. Retries create a new job under the same
/// `deployment_id` lineage; old attempts are retained untouched for audit.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentJob {
    pub id: Uuid,
    /// Lineage shared across retries of the same deployment.
    pub deployment_id: Uuid,
    pub config_id: Uuid,
    pub version_id: Option<Uuid>,
    /// Executor-side handle for this attempt.
    pub executor_job_id: String,
    pub status: JobStatus,
    /// 0-100, non-decreasing within one attempt.
    pub progress: u8,
    pub logs: Vec<LogLine>,
    /// Opaque target descriptor reported by the executor.
    pub destination: Option<String>,
    /// No progress for the stall window; warning only, never auto-canceled.
    pub stalled: bool,
    pub error: Option<JobError>,
    pub created_at: DateTime<Utc>,
}

impl DeploymentJob {
    pub(crate) fn new(
        deployment_id: Uuid,
        config_id: Uuid,
        version_id: Option<Uuid>,
        executor_job_id: String,
        destination: Option<String>,
    ) -> Self {
        DeploymentJob {
            id: Uuid::new_v4(),
            deployment_id,
            config_id,
            version_id,
            executor_job_id,
            status: JobStatus::Pending,
            progress: 0,
            logs: Vec::new(),
            destination,
            stalled: false,
            error: None,
            created_at: Utc::now(),
        }
    }

    /// Mirror one executor report into the local job. The executor is the
    /// source of truth, but reports that would move the status backward are
    /// logged and ignored, progress never decreases, and log lines are
    /// appended in report order. Returns true when status or progress
    /// advanced (stall tracking).
    pub(crate) fn apply_report(&mut self, report: &ExecutorReport) -> bool {
        if self.status.is_terminal() {
            tracing::warn!(job_id = %self.id, status = ?self.status, reported = ?report.status,
                "report after terminal status ignored");
            return false;
        }

        let mut advanced = false;
        if report.status != self.status {
            if self.status.can_transition_to(report.status) {
                tracing::info!(job_id = %self.id, from = ?self.status, to = ?report.status, "status change");
                self.status = report.status;
                advanced = true;
            } else {
                tracing::warn!(job_id = %self.id, status = ?self.status, reported = ?report.status,
                    "backward status report ignored");
            }
        }

        let progress = report.progress.min(100);
        if progress > self.progress {
            self.progress = progress;
            advanced = true;
        }

        if report.logs.len() > self.logs.len() {
            self.logs.extend_from_slice(&report.logs[self.logs.len()..]);
        }

        if self.status == JobStatus::Failed && self.error.is_none() {
            self.error = report.error.clone();
        }
        if advanced {
            self.stalled = false;
        }
        advanced
    }
}
