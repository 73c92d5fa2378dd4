mod common;
use crate::common::builders::{CommandSpecBuilder, PoolConfigBuilder};
use crate::common::fake_runner::FakeRunner;
use crate::common::{init_tracing, with_timeout};

use std::sync::Arc;
use std::time::Duration;

use prun::errors::PrunError;
use prun::pool::run_pool;

fn echo_index() -> prun::exec::CommandSpec {
    CommandSpecBuilder::new("echo").arg("job-{}").build()
}

#[tokio::test]
async fn zero_total_returns_immediately_without_workers() {
    init_tracing();
    let cfg = PoolConfigBuilder::new(echo_index()).total(0).concurrency(4).build();
    let runner = Arc::new(FakeRunner::new());

    let result = with_timeout(run_pool(&cfg, Arc::clone(&runner))).await.unwrap();

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.workers, 0);
    assert_eq!(result.dispatched, 0);
    assert_eq!(result.reported, 0);
    assert!(runner.started().is_empty());
}

#[tokio::test]
async fn zero_concurrency_is_invalid() {
    let cfg = PoolConfigBuilder::new(echo_index()).total(3).concurrency(0).build();
    let err = run_pool(&cfg, Arc::new(FakeRunner::new())).await.unwrap_err();
    assert!(matches!(err, PrunError::InvalidArgument(_)));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn concurrency_above_total_starts_one_worker_per_job() {
    init_tracing();
    let cfg = PoolConfigBuilder::new(echo_index()).total(3).concurrency(8).build();
    let runner = Arc::new(FakeRunner::new().delay(Duration::from_millis(50)));

    let result = with_timeout(run_pool(&cfg, Arc::clone(&runner))).await.unwrap();

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.workers, 3);
    assert_eq!(result.dispatched, 3);
    assert_eq!(result.reported, 3);
    assert!(runner.max_running() <= 3);
}

#[tokio::test]
async fn in_flight_jobs_never_exceed_concurrency() {
    init_tracing();
    let cfg = PoolConfigBuilder::new(echo_index()).total(20).concurrency(4).build();
    let runner = Arc::new(FakeRunner::new().delay(Duration::from_millis(20)));

    let result = with_timeout(run_pool(&cfg, Arc::clone(&runner))).await.unwrap();

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.workers, 4);
    assert_eq!(result.reported, 20);
    assert!(runner.max_running() <= 4, "saw {} jobs at once", runner.max_running());

    let mut indices = runner.started_indices();
    indices.sort_unstable();
    assert_eq!(indices, (0..20).collect::<Vec<_>>());
}

#[tokio::test]
async fn single_worker_runs_jobs_in_index_order() {
    let cfg = PoolConfigBuilder::new(echo_index()).total(5).concurrency(1).build();
    let runner = Arc::new(FakeRunner::new());

    with_timeout(run_pool(&cfg, Arc::clone(&runner))).await.unwrap();

    assert_eq!(runner.started_indices(), vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn index_template_is_substituted_per_job() {
    let spec = CommandSpecBuilder::new("cp")
        .arg("in-%i")
        .arg("out/%i/%i.txt")
        .build();
    let cfg = PoolConfigBuilder::new(spec)
        .total(3)
        .concurrency(2)
        .index_template("%i")
        .build();
    let runner = Arc::new(FakeRunner::new());

    with_timeout(run_pool(&cfg, Arc::clone(&runner))).await.unwrap();

    let mut jobs = runner.started();
    jobs.sort_by_key(|j| j.index);
    for job in &jobs {
        let i = job.index;
        assert_eq!(job.spec.name(), "cp");
        assert_eq!(
            job.spec.args(),
            [format!("in-{i}"), format!("out/{i}/{i}.txt")]
        );
    }
}

#[tokio::test]
async fn empty_index_template_leaves_arguments_alone() {
    let cfg = PoolConfigBuilder::new(echo_index()).total(2).concurrency(2).build();
    let runner = Arc::new(FakeRunner::new());

    with_timeout(run_pool(&cfg, Arc::clone(&runner))).await.unwrap();

    for job in runner.started() {
        assert_eq!(job.spec.args(), ["job-{}"]);
    }
}

#[tokio::test]
async fn first_failure_is_reported_and_stops_dispatch() {
    init_tracing();
    let cfg = PoolConfigBuilder::new(echo_index()).total(100).concurrency(2).build();
    let runner = Arc::new(
        FakeRunner::new()
            .fail(1, 5)
            .delay(Duration::from_millis(10)),
    );

    let result = with_timeout(run_pool(&cfg, Arc::clone(&runner))).await.unwrap();

    assert_eq!(result.exit_code, 5);
    assert!(result.dispatched < 100, "dispatch did not stop: {result:?}");
    // Every dispatched job ran and reported exactly once.
    assert_eq!(result.reported, result.dispatched);
    assert_eq!(runner.started().len() as u64, result.dispatched);
}

#[tokio::test]
async fn three_jobs_one_failing_always_reports_its_code() {
    for _ in 0..20 {
        let cfg = PoolConfigBuilder::new(echo_index()).total(3).concurrency(2).build();
        let runner = Arc::new(FakeRunner::new().fail(1, 5));

        let result = with_timeout(run_pool(&cfg, Arc::clone(&runner))).await.unwrap();

        assert_eq!(result.exit_code, 5);
        // Job 2 may or may not have been dispatched before the abort landed.
        assert!(result.dispatched == 2 || result.dispatched == 3);
        assert_eq!(result.reported, result.dispatched);
    }
}

#[tokio::test]
async fn in_flight_jobs_finish_after_abort() {
    // Job 0 is slow, job 1 fails fast: job 0 must still complete and report.
    let cfg = PoolConfigBuilder::new(echo_index()).total(10).concurrency(2).build();
    let runner = Arc::new(
        FakeRunner::new()
            .delay_for(0, Duration::from_millis(200))
            .fail(1, 7),
    );

    let result = with_timeout(run_pool(&cfg, Arc::clone(&runner))).await.unwrap();

    assert_eq!(result.exit_code, 7);
    assert!(runner.started_indices().contains(&0));
    assert_eq!(result.reported, result.dispatched);
}

#[tokio::test]
async fn concurrent_failures_report_one_of_their_codes() {
    let cfg = PoolConfigBuilder::new(echo_index()).total(4).concurrency(4).build();
    let runner = Arc::new(
        FakeRunner::new()
            .fail(0, 3)
            .fail(1, 4)
            .fail(2, 6)
            .delay(Duration::from_millis(20)),
    );

    let result = with_timeout(run_pool(&cfg, Arc::clone(&runner))).await.unwrap();

    assert!([3, 4, 6].contains(&result.exit_code), "got {}", result.exit_code);
    assert_eq!(result.reported, result.dispatched);
}

#[tokio::test]
async fn panicking_job_fails_the_pool() {
    init_tracing();
    let cfg = PoolConfigBuilder::new(echo_index()).total(3).concurrency(1).build();
    let runner = Arc::new(FakeRunner::new().panic_on(1));

    let err = with_timeout(run_pool(&cfg, Arc::clone(&runner))).await.unwrap_err();

    assert!(matches!(err, PrunError::Other(_)), "got {err:?}");
    assert_eq!(err.exit_code(), 1);
    // The only worker died on job 1; job 2 had nobody left to run it.
    assert_eq!(runner.started_indices(), vec![0, 1]);
}

#[tokio::test]
async fn panicking_job_stops_dispatch_for_other_workers() {
    let cfg = PoolConfigBuilder::new(echo_index()).total(20).concurrency(3).build();
    let runner = Arc::new(
        FakeRunner::new()
            .panic_on(0)
            .delay(Duration::from_millis(50)),
    );

    let err = with_timeout(run_pool(&cfg, Arc::clone(&runner))).await.unwrap_err();

    assert_eq!(err.exit_code(), 1);
    assert!(runner.started().len() < 20, "dispatch should stop after a worker dies");
}
