#![cfg(unix)]

mod common;
use crate::common::builders::{CommandSpecBuilder, PoolConfigBuilder};
use crate::common::{init_tracing, with_timeout};

use std::sync::Arc;

use prun::exec::ProcessRunner;
use prun::pool::run_pool;

#[tokio::test]
async fn six_echo_jobs_on_four_workers_succeed() {
    init_tracing();
    let spec = CommandSpecBuilder::new("echo").arg("{}").build();
    let cfg = PoolConfigBuilder::new(spec)
        .total(6)
        .concurrency(4)
        .index_template("{}")
        .build();

    let result = with_timeout(run_pool(&cfg, Arc::new(ProcessRunner))).await.unwrap();

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.workers, 4);
    assert_eq!(result.dispatched, 6);
    assert_eq!(result.reported, 6);
}

#[tokio::test]
async fn each_index_runs_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let script = format!(
        "echo ran >> {}/job-{{}}.txt",
        dir.path().display()
    );
    let cfg = PoolConfigBuilder::new(CommandSpecBuilder::shell(&script).build())
        .total(6)
        .concurrency(4)
        .index_template("{}")
        .build();

    let result = with_timeout(run_pool(&cfg, Arc::new(ProcessRunner))).await.unwrap();
    assert_eq!(result.exit_code, 0);

    for i in 0..6 {
        let content = std::fs::read_to_string(dir.path().join(format!("job-{i}.txt"))).unwrap();
        assert_eq!(content, "ran\n", "job {i} ran an unexpected number of times");
    }
}

#[tokio::test]
async fn failing_job_code_is_propagated() {
    init_tracing();
    let spec = CommandSpecBuilder::shell("if [ {} -eq 1 ]; then exit 5; fi").build();
    let cfg = PoolConfigBuilder::new(spec)
        .total(3)
        .concurrency(2)
        .index_template("{}")
        .build();

    let result = with_timeout(run_pool(&cfg, Arc::new(ProcessRunner))).await.unwrap();

    assert_eq!(result.exit_code, 5);
    assert_eq!(result.reported, result.dispatched);
}

#[tokio::test]
async fn missing_command_maps_to_127() {
    let spec = CommandSpecBuilder::new("prun-definitely-not-a-command").build();
    let cfg = PoolConfigBuilder::new(spec).total(4).concurrency(2).build();

    let result = with_timeout(run_pool(&cfg, Arc::new(ProcessRunner))).await.unwrap();

    assert_eq!(result.exit_code, 127);
}

#[tokio::test]
async fn signalled_job_maps_to_255() {
    let spec = CommandSpecBuilder::shell("kill -9 $$").build();
    let cfg = PoolConfigBuilder::new(spec).total(1).concurrency(1).build();

    let result = with_timeout(run_pool(&cfg, Arc::new(ProcessRunner))).await.unwrap();

    assert_eq!(result.exit_code, 255);
}
