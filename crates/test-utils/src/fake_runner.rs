use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use prun::exec::JobRunner;
use prun::pool::Job;

/// A fake job runner that:
/// - records which jobs were "run", in start order
/// - tracks how many jobs were running at the same time
/// - returns scripted exit codes (0 unless told otherwise)
/// - optionally holds each job for a fixed delay
/// - can panic mid-job, like a runner with a bug
#[derive(Debug, Default)]
pub struct FakeRunner {
    codes: HashMap<u64, i32>,
    delays: HashMap<u64, Duration>,
    panics: HashSet<u64>,
    default_delay: Duration,
    started: Mutex<Vec<Job>>,
    running: AtomicUsize,
    max_running: AtomicUsize,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Job `index` reports `code`.
    pub fn fail(mut self, index: u64, code: i32) -> Self {
        self.codes.insert(index, code);
        self
    }

    /// Job `index` panics instead of reporting.
    pub fn panic_on(mut self, index: u64) -> Self {
        self.panics.insert(index);
        self
    }

    /// Every job takes `delay` to finish.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    /// Job `index` takes `delay` to finish.
    pub fn delay_for(mut self, index: u64, delay: Duration) -> Self {
        self.delays.insert(index, delay);
        self
    }

    /// Jobs in the order workers picked them up.
    pub fn started(&self) -> Vec<Job> {
        self.started.lock().unwrap().clone()
    }

    pub fn started_indices(&self) -> Vec<u64> {
        self.started().iter().map(|j| j.index).collect()
    }

    /// Highest number of jobs observed running at once.
    pub fn max_running(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }
}

impl JobRunner for FakeRunner {
    fn run_job(&self, job: Job) -> Pin<Box<dyn Future<Output = i32> + Send + '_>> {
        Box::pin(async move {
            let index = job.index;
            {
                let mut guard = self.started.lock().unwrap();
                guard.push(job);
            }

            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_running.fetch_max(now, Ordering::SeqCst);

            let delay = self.delays.get(&index).copied().unwrap_or(self.default_delay);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            } else {
                tokio::task::yield_now().await;
            }

            self.running.fetch_sub(1, Ordering::SeqCst);
            if self.panics.contains(&index) {
                panic!("fake runner told to panic on job {index}");
            }
            self.codes.get(&index).copied().unwrap_or(0)
        })
    }
}
