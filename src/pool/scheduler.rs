// src/pool/scheduler.rs

//! Bounded worker pool: fan `total` jobs out over a fixed set of workers and
//! stop dispatching after the first failure.
//!
//! Layout of one pool run:
//!
//! - one dispatch task feeding jobs, in index order, into a work queue of
//!   capacity 1 (so it blocks until a worker is free);
//! - `min(concurrency, total)` worker tasks sharing the queue receiver;
//! - the calling task acting as aggregator over the results channel.
//!
//! The aggregator fires a [`CancellationToken`] on the first nonzero code,
//! or when a worker task dies. The dispatcher observes it and closes the
//! queue; jobs already handed out run to completion. The pool returns once
//! every worker task has been joined. A dead worker, or any dispatched job
//! without a report, makes the whole run an error.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::PoolConfig;
use crate::errors::{PrunError, Result};
use crate::exec::{CommandSpec, JobRunner};
use crate::pool::Job;

/// Capacity of the results channel; workers rarely get ahead of the
/// aggregator.
const RESULTS_CAPACITY: usize = 64;

/// Final reduction of a pool run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolResult {
    /// First nonzero code observed, or 0.
    pub exit_code: i32,
    /// Number of worker tasks started.
    pub workers: u64,
    /// Number of jobs handed to the work queue.
    pub dispatched: u64,
    /// Number of outcomes the aggregator received.
    pub reported: u64,
}

/// One finished job, as reported by a worker.
#[derive(Debug, Clone, Copy)]
struct JobReport {
    index: u64,
    code: i32,
}

/// Run the pool described by `config`, executing each job with `runner`.
pub async fn run_pool<R: JobRunner>(config: &PoolConfig, runner: Arc<R>) -> Result<PoolResult> {
    config.validate()?;

    if config.total == 0 {
        debug!("pool has no jobs; nothing to do");
        return Ok(PoolResult::default());
    }

    let workers = config.workers();
    info!(
        total = config.total,
        concurrency = config.concurrency,
        workers,
        command = %config.command,
        "starting worker pool"
    );

    let (work_tx, work_rx) = mpsc::channel::<Job>(1);
    let work_rx = Arc::new(Mutex::new(work_rx));
    let (result_tx, mut result_rx) = mpsc::channel::<JobReport>(RESULTS_CAPACITY);
    let abort = CancellationToken::new();

    let mut worker_tasks = JoinSet::new();
    for worker_id in 0..workers {
        worker_tasks.spawn(worker_loop(
            worker_id,
            Arc::clone(&work_rx),
            result_tx.clone(),
            Arc::clone(&runner),
        ));
    }
    // Only workers hold senders and the receiver now; the results channel
    // closes when the last one exits, and the queue with it.
    drop(result_tx);
    drop(work_rx);

    let dispatcher = tokio::spawn(dispatch_loop(
        config.total,
        config.index_template.clone(),
        config.command.clone(),
        work_tx,
        abort.clone(),
    ));

    let mut exit_code = 0;
    let mut reported = 0;
    let mut worker_failure: Option<JoinError> = None;
    loop {
        tokio::select! {
            report = result_rx.recv() => {
                let Some(report) = report else {
                    break;
                };
                reported += 1;
                debug!(index = report.index, code = report.code, "job reported");

                if report.code != 0 && exit_code == 0 {
                    info!(
                        index = report.index,
                        code = report.code,
                        "job failed; no further jobs will be dispatched"
                    );
                    exit_code = report.code;
                    abort.cancel();
                }
            }
            Some(joined) = worker_tasks.join_next() => {
                if let Err(err) = joined {
                    note_worker_failure(&mut worker_failure, err, &abort);
                }
            }
        }
    }
    while let Some(joined) = worker_tasks.join_next().await {
        if let Err(err) = joined {
            note_worker_failure(&mut worker_failure, err, &abort);
        }
    }

    let dispatched = dispatcher
        .await
        .map_err(|e| PrunError::Other(e.into()))?;

    info!(exit_code, dispatched, reported, "worker pool finished");

    if let Some(err) = worker_failure {
        return Err(PrunError::Other(
            anyhow::Error::new(err).context("pool worker died before reporting its job"),
        ));
    }
    if reported != dispatched {
        return Err(PrunError::Other(anyhow::anyhow!(
            "{} of {dispatched} dispatched jobs never reported",
            dispatched - reported
        )));
    }

    Ok(PoolResult {
        exit_code,
        workers,
        dispatched,
        reported,
    })
}

fn note_worker_failure(slot: &mut Option<JoinError>, err: JoinError, abort: &CancellationToken) {
    warn!(error = %err, "worker task died; no further jobs will be dispatched");
    abort.cancel();
    slot.get_or_insert(err);
}

/// Hand out jobs in index order until done or aborted. Returns how many
/// jobs were handed out.
///
/// Dropping `work_tx` on return closes the queue, which lets idle workers
/// exit.
async fn dispatch_loop(
    total: u64,
    index_template: String,
    command: CommandSpec,
    work_tx: mpsc::Sender<Job>,
    abort: CancellationToken,
) -> u64 {
    let mut dispatched = 0;

    for index in 0..total {
        if abort.is_cancelled() {
            break;
        }
        let job = Job::from_template(index, &command, &index_template);

        tokio::select! {
            biased;
            _ = abort.cancelled() => break,
            sent = work_tx.send(job) => {
                if sent.is_err() {
                    // Every worker is gone; nobody is left to run jobs.
                    break;
                }
                dispatched += 1;
            }
        }
    }

    if dispatched < total {
        debug!(dispatched, total, "dispatch stopped early");
    }
    dispatched
}

async fn worker_loop<R: JobRunner>(
    worker_id: u64,
    work_rx: Arc<Mutex<mpsc::Receiver<Job>>>,
    result_tx: mpsc::Sender<JobReport>,
    runner: Arc<R>,
) {
    debug!(worker_id, "worker started");

    loop {
        let next = {
            let mut rx = work_rx.lock().await;
            rx.recv().await
        };
        let Some(job) = next else {
            break;
        };

        let index = job.index;
        debug!(worker_id, index, command = %job.spec, "running job");
        let code = runner.run_job(job).await;

        if result_tx.send(JobReport { index, code }).await.is_err() {
            break;
        }
    }

    debug!(worker_id, "worker finished");
}
