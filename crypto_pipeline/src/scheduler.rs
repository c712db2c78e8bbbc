//! Fixed-interval scheduler.
//!
//! The first run is due one interval after the scheduler is created; every later run
//! is due one interval after the previous one *completed*, so a slow cycle pushes the
//! next one back instead of stacking up. A single foreground loop checks for due work
//! every `poll_interval`; jobs run to completion and are never cancelled.

use std::{future::Future, time::Duration};

use tokio::time::{Instant, sleep};
use tracing::{debug, info};

#[derive(Debug)]
pub struct Scheduler {
    interval: Duration,
    poll_interval: Duration,
    next_run: Instant,
}

impl Scheduler {
    pub fn new(interval: Duration, poll_interval: Duration) -> Self {
        Self {
            interval,
            poll_interval,
            next_run: Instant::now() + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn next_run(&self) -> Instant {
        self.next_run
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_run
    }

    /// Schedule the next run one interval after `completed_at`.
    pub fn reschedule(&mut self, completed_at: Instant) {
        self.next_run = completed_at + self.interval;
    }

    /// Poll until `shutdown` resolves, running `job` whenever it is due.
    ///
    /// `shutdown` is only observed between jobs. Returns the number of jobs run.
    pub async fn run<F, Fut, S>(&mut self, mut job: F, shutdown: S) -> usize
    where
        F: FnMut() -> Fut,
        Fut: Future,
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut runs = 0;

        loop {
            if self.is_due(Instant::now()) {
                job().await;
                runs += 1;
                self.reschedule(Instant::now());
                debug!(
                    in_secs = self.interval.as_secs(),
                    "Next pipeline run scheduled"
                );
            }

            tokio::select! {
                _ = &mut shutdown => {
                    info!(runs, "Shutdown requested; scheduler stopped");
                    return runs;
                }
                _ = sleep(self.poll_interval) => {}
            }
        }
    }
}
