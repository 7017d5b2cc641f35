//! Shared test support: a scripted executor and a polling assertion helper.
#![allow(dead_code)] // each test binary uses a subset

use async_trait::async_trait;
use scaffold_sdk::deploy::{
    DeployExecutor, DeployOptions, ExecutorReport, ExecutorStart, JobStatus, LogLine,
};
use scaffold_sdk::{Config, CoreError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// One scripted poll outcome.
#[derive(Clone)]
pub enum Step {
    Report(ExecutorReport),
    /// Transport-level poll failure.
    Fail(String),
}

pub fn report(status: JobStatus, progress: u8) -> ExecutorReport {
    ExecutorReport {
        status,
        progress,
        logs: Vec::new(),
        error: None,
    }
}

pub fn log_line(message: &str) -> LogLine {
    LogLine {
        level: "info".into(),
        message: message.into(),
    }
}

/// Executor double that replays a scripted sequence of status reports.
/// The last step is sticky; a cancel request makes every later poll report
/// `Canceled`, mimicking an executor that confirms asynchronously.
pub struct ScriptedExecutor {
    script: Mutex<VecDeque<Step>>,
    retry_script: Mutex<Option<VecDeque<Step>>>,
    canceled: Mutex<bool>,
    pub starts: AtomicUsize,
    pub cancel_requests: AtomicUsize,
}

impl ScriptedExecutor {
    pub fn new(steps: Vec<Step>) -> Self {
        ScriptedExecutor {
            script: Mutex::new(steps.into()),
            retry_script: Mutex::new(None),
            canceled: Mutex::new(false),
            starts: AtomicUsize::new(0),
            cancel_requests: AtomicUsize::new(0),
        }
    }

    pub fn with_retry_script(self, steps: Vec<Step>) -> Self {
        *self.retry_script.lock().unwrap() = Some(steps.into());
        self
    }
}

#[async_trait]
impl DeployExecutor for ScriptedExecutor {
    async fn start(&self, _config: &Config, _options: &DeployOptions) -> Result<ExecutorStart, CoreError> {
        let n = self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(ExecutorStart {
            job_id: format!("exec-{}", n),
            destination: Some("file:///tmp/out".into()),
        })
    }

    async fn status(&self, _executor_job_id: &str) -> Result<ExecutorReport, CoreError> {
        if *self.canceled.lock().unwrap() {
            return Ok(report(JobStatus::Canceled, 0));
        }
        let mut script = self.script.lock().unwrap();
        let step = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        };
        match step {
            Some(Step::Report(r)) => Ok(r),
            Some(Step::Fail(message)) => Err(CoreError::Executor {
                code: "transport".into(),
                message,
            }),
            None => Ok(report(JobStatus::Pending, 0)),
        }
    }

    async fn request_cancel(&self, _executor_job_id: &str) -> Result<(), CoreError> {
        self.cancel_requests.fetch_add(1, Ordering::SeqCst);
        *self.canceled.lock().unwrap() = true;
        Ok(())
    }

    async fn retry(&self, _executor_job_id: &str) -> Result<ExecutorStart, CoreError> {
        if let Some(steps) = self.retry_script.lock().unwrap().take() {
            *self.script.lock().unwrap() = steps;
        }
        let n = self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(ExecutorStart {
            job_id: format!("exec-retry-{}", n),
            destination: None,
        })
    }
}

/// Poll `cond` until true or panic after `timeout`.
pub async fn wait_for(cond: impl Fn() -> bool, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    while !cond() {
        assert!(
            Instant::now() < deadline,
            "condition not met within {:?}",
            timeout
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
