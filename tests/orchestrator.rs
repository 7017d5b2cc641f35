//! Orchestrator behavior against a scripted executor: polling, cancellation,
//! retry, stall detection.

mod support;

use scaffold_sdk::deploy::{DeployOptions, JobStatus, Orchestrator, SubmitSource};
use scaffold_sdk::{build_default, CoreError, VersionStore};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use support::{log_line, report, wait_for, ScriptedExecutor, Step};

const FAST_POLL: Duration = Duration::from_millis(10);
const WAIT: Duration = Duration::from_secs(2);

fn orchestrator(executor: ScriptedExecutor) -> (Arc<Orchestrator>, Arc<VersionStore>) {
    let versions = Arc::new(VersionStore::new());
    let orch = Arc::new(Orchestrator::with_timing(
        Arc::new(executor),
        Arc::clone(&versions),
        FAST_POLL,
        3,
    ));
    (orch, versions)
}

#[tokio::test]
async fn draft_submit_runs_to_success_with_implicit_snapshot() {
    let mut running = report(JobStatus::Running, 40);
    running.logs = vec![log_line("generating views"), log_line("emitting sql")];
    let mut done = report(JobStatus::Success, 100);
    done.logs = vec![
        log_line("generating views"),
        log_line("emitting sql"),
        log_line("deployed"),
    ];
    let (orch, versions) = orchestrator(ScriptedExecutor::new(vec![
        Step::Report(running),
        Step::Report(done),
    ]));

    let config = build_default("orders", "orders");
    let job = orch
        .submit(SubmitSource::Draft(config.clone()), DeployOptions::default())
        .await
        .unwrap();
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.progress, 0);

    // every deployment is traceable to an immutable version
    let history = versions.history(config.id);
    assert_eq!(history.len(), 1);
    assert_eq!(job.version_id, Some(history[0].id));

    wait_for(|| orch.get(job.id).unwrap().status == JobStatus::Success, WAIT).await;
    let job = orch.get(job.id).unwrap();
    assert_eq!(job.progress, 100);
    let messages: Vec<String> = job.logs.iter().map(|l| l.message.clone()).collect();
    assert_eq!(messages, vec!["generating views", "emitting sql", "deployed"]);
}

#[tokio::test]
async fn unchanged_draft_reuses_the_latest_version() {
    let (orch, versions) = orchestrator(ScriptedExecutor::new(vec![Step::Report(report(
        JobStatus::Success,
        100,
    ))]));
    let config = build_default("orders", "orders");
    let v1 = versions.snapshot(&config, "initial").unwrap();

    let job = orch
        .submit(SubmitSource::Draft(config.clone()), DeployOptions::default())
        .await
        .unwrap();
    assert_eq!(job.version_id, Some(v1.id));
    assert_eq!(versions.history(config.id).len(), 1);
}

#[tokio::test]
async fn invalid_draft_is_rejected_before_the_executor_is_called() {
    let executor = ScriptedExecutor::new(vec![]);
    let versions = Arc::new(VersionStore::new());
    let executor = Arc::new(executor);
    let orch = Orchestrator::with_timing(
        Arc::clone(&executor) as Arc<dyn scaffold_sdk::DeployExecutor>,
        versions,
        FAST_POLL,
        3,
    );

    let mut config = build_default("orders", "orders");
    config.fields.clear();
    let err = orch
        .submit(SubmitSource::Draft(config), DeployOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidConfig(_)));
    assert_eq!(executor.starts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cancel_waits_for_executor_confirmation_and_is_idempotent() {
    let (orch, _) = orchestrator(ScriptedExecutor::new(vec![Step::Report(report(
        JobStatus::Running,
        50,
    ))]));
    let job = orch
        .submit(
            SubmitSource::Draft(build_default("orders", "orders")),
            DeployOptions::default(),
        )
        .await
        .unwrap();
    wait_for(|| orch.get(job.id).unwrap().status == JobStatus::Running, WAIT).await;

    // cancellation is a request; the local job moves only when the executor
    // confirms on a later poll
    let after_cancel = orch.cancel(job.id).await.unwrap();
    assert!(!after_cancel.status.is_terminal() || after_cancel.status == JobStatus::Canceled);
    wait_for(|| orch.get(job.id).unwrap().status == JobStatus::Canceled, WAIT).await;

    // cancel after terminal is a no-op success
    let again = orch.cancel(job.id).await.unwrap();
    assert_eq!(again.status, JobStatus::Canceled);
}

#[tokio::test]
async fn retry_creates_a_new_attempt_in_the_same_lineage() {
    let mut failed = report(JobStatus::Failed, 35);
    failed.error = Some(scaffold_sdk::deploy::JobError {
        code: "E_DEPLOY".into(),
        message: "target unreachable".into(),
    });
    let executor = ScriptedExecutor::new(vec![
        Step::Report(report(JobStatus::Running, 35)),
        Step::Report(failed),
    ])
    .with_retry_script(vec![Step::Report(report(JobStatus::Success, 100))]);
    let (orch, _) = orchestrator(executor);

    let first = orch
        .submit(
            SubmitSource::Draft(build_default("orders", "orders")),
            DeployOptions::default(),
        )
        .await
        .unwrap();
    wait_for(|| orch.get(first.id).unwrap().status == JobStatus::Failed, WAIT).await;
    assert_eq!(orch.get(first.id).unwrap().error.unwrap().code, "E_DEPLOY");

    let second = orch.retry(first.id).await.unwrap();
    assert_ne!(second.id, first.id);
    assert_eq!(second.deployment_id, first.deployment_id);
    assert_eq!(second.status, JobStatus::Pending);
    assert_eq!(second.progress, 0);

    wait_for(|| orch.get(second.id).unwrap().status == JobStatus::Success, WAIT).await;

    // the failed attempt is retained untouched for audit
    let old = orch.get(first.id).unwrap();
    assert_eq!(old.status, JobStatus::Failed);
    assert_eq!(old.progress, 35);

    let lineage = orch.lineage(first.deployment_id);
    assert_eq!(lineage.len(), 2);
    assert_eq!(lineage[0].id, first.id);
    assert_eq!(lineage[1].id, second.id);
}

#[tokio::test]
async fn retry_is_only_legal_from_failed() {
    let (orch, _) = orchestrator(ScriptedExecutor::new(vec![Step::Report(report(
        JobStatus::Success,
        100,
    ))]));
    let job = orch
        .submit(
            SubmitSource::Draft(build_default("orders", "orders")),
            DeployOptions::default(),
        )
        .await
        .unwrap();
    wait_for(|| orch.get(job.id).unwrap().status == JobStatus::Success, WAIT).await;
    assert!(matches!(
        orch.retry(job.id).await,
        Err(CoreError::StateConflict(_))
    ));
}

#[tokio::test]
async fn stalled_job_is_flagged_but_never_auto_canceled() {
    // sticky report: same status and progress forever
    let (orch, _) = orchestrator(ScriptedExecutor::new(vec![Step::Report(report(
        JobStatus::Running,
        50,
    ))]));
    let job = orch
        .submit(
            SubmitSource::Draft(build_default("orders", "orders")),
            DeployOptions::default(),
        )
        .await
        .unwrap();
    wait_for(|| orch.get(job.id).unwrap().stalled, WAIT).await;
    let job = orch.get(job.id).unwrap();
    assert_eq!(job.status, JobStatus::Running);
    assert!(!job.status.is_terminal());
}

#[tokio::test]
async fn transient_poll_failures_do_not_fail_the_job() {
    let (orch, _) = orchestrator(ScriptedExecutor::new(vec![
        Step::Fail("connection refused".into()),
        Step::Fail("connection refused".into()),
        Step::Report(report(JobStatus::Success, 100)),
    ]));
    let job = orch
        .submit(
            SubmitSource::Draft(build_default("orders", "orders")),
            DeployOptions::default(),
        )
        .await
        .unwrap();
    wait_for(|| orch.get(job.id).unwrap().status == JobStatus::Success, WAIT).await;
}

#[tokio::test]
async fn submit_by_version_deploys_the_snapshot() {
    let (orch, versions) = orchestrator(ScriptedExecutor::new(vec![Step::Report(report(
        JobStatus::Success,
        100,
    ))]));
    let config = build_default("orders", "orders");
    let version = versions.snapshot(&config, "initial").unwrap();

    let job = orch
        .submit(SubmitSource::Version(version.id), DeployOptions::default())
        .await
        .unwrap();
    assert_eq!(job.version_id, Some(version.id));
    assert_eq!(job.config_id, config.id);
    wait_for(|| orch.get(job.id).unwrap().status == JobStatus::Success, WAIT).await;
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let (orch, _) = orchestrator(ScriptedExecutor::new(vec![]));
    let id = uuid::Uuid::new_v4();
    assert!(matches!(orch.get(id), Err(CoreError::NotFound { .. })));
    assert!(matches!(orch.cancel(id).await, Err(CoreError::NotFound { .. })));
    assert!(matches!(
        orch.submit(SubmitSource::Version(id), DeployOptions::default()).await,
        Err(CoreError::NotFound { .. })
    ));
}
