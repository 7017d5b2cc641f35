//! End-to-end lifecycle of a `users` table module: map, validate, snapshot,
//! deploy, roll back.

mod support;

use scaffold_sdk::deploy::{DeployOptions, JobStatus, Orchestrator, SubmitSource};
use scaffold_sdk::schema::ColumnInfo;
use scaffold_sdk::{map_columns, validate, Config, VersionStore};
use std::sync::Arc;
use std::time::Duration;
use support::{report, wait_for, ScriptedExecutor, Step};

fn users_columns() -> Vec<ColumnInfo> {
    let mk = |name: &str, type_: &str, nullable: bool, pk: bool, auto: bool| ColumnInfo {
        name: name.into(),
        type_: type_.into(),
        length: None,
        nullable,
        is_primary: pk,
        is_auto_increment: auto,
        default_value: None,
        comment: None,
    };
    vec![
        mk("id", "int", false, true, true),
        mk("name", "varchar", false, false, false),
        mk("email", "varchar", true, false, false),
    ]
}

#[tokio::test]
async fn users_module_full_lifecycle() {
    let fields = map_columns(&users_columns());
    assert_eq!(fields.len(), 3);
    assert!(!fields[0].display.in_form);
    assert!(fields[1].rules.iter().any(|r| r.kind == "required"));
    assert!(fields[2].rules.is_empty());

    let mut config = Config::new("users", "users", "default", "kaushik");
    config.fields = fields;
    assert!(validate(&config).is_empty());

    let versions = Arc::new(VersionStore::new());
    let v1 = versions.snapshot(&config, "initial").unwrap();
    assert_eq!(v1.sequence, 1);

    let orch = Orchestrator::with_timing(
        Arc::new(ScriptedExecutor::new(vec![
            Step::Report(report(JobStatus::Running, 60)),
            Step::Report(report(JobStatus::Success, 100)),
        ])),
        Arc::clone(&versions),
        Duration::from_millis(10),
        10,
    );
    let job = orch
        .submit(SubmitSource::Version(v1.id), DeployOptions::default())
        .await
        .unwrap();
    assert_eq!(job.status, JobStatus::Pending);
    wait_for(
        || orch.get(job.id).unwrap().status == JobStatus::Success,
        Duration::from_secs(2),
    )
    .await;

    let v2 = versions.rollback(v1.id).unwrap();
    assert_eq!(v2.sequence, 2);
    assert_eq!(v2.note, "rollback to v1");
    let diff = versions.compare(v1.id, v2.id).unwrap();
    assert!(diff.is_empty(), "rollback must restore identical content: {:?}", diff);
}
