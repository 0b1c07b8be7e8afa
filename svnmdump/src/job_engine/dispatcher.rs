// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, info};

use crate::config::PoolConfig;
use crate::error::{DiscoveryError, DispatchError};
use crate::job_engine::completion::CompletionTracker;
use crate::job_engine::job::{JobDescriptor, JobRunner};
use crate::job_engine::queue::WorkQueue;
use crate::job_engine::worker_pool::{WorkerContext, WorkerExit, WorkerPool, WorkerStats};
use crate::run_log::RunLog;

/// Aggregate result of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub dispatched: usize,
    pub succeeded: usize,
    /// Failed jobs, including jobs lost with a crashed worker.
    pub failed: usize,
    pub elapsed: Duration,
}

/// Starts the pool, feeds it, closes the queue and waits for the workers.
#[derive(Debug)]
pub struct Dispatcher<'a> {
    config: &'a PoolConfig,
    runner: &'a dyn JobRunner,
    log: &'a RunLog,
}

impl<'a> Dispatcher<'a> {
    pub fn new(config: &'a PoolConfig, runner: &'a dyn JobRunner, log: &'a RunLog) -> Self {
        Self {
            config,
            runner,
            log,
        }
    }

    /// Run every job in `jobs` and block until all workers have exited.
    ///
    /// A discovery error stops the feeding. Jobs already queued still run,
    /// then the error is returned.
    pub fn run<I>(&self, jobs: I) -> Result<RunSummary, DispatchError>
    where
        I: IntoIterator<Item = Result<JobDescriptor, DiscoveryError>>,
    {
        let started = Instant::now();
        let result = self.dispatch(jobs);
        let elapsed = started.elapsed();

        match result {
            Ok((dispatched, succeeded)) => {
                let failed = dispatched - succeeded;
                self.log.line(format!(
                    ":: All Done - runtime {elapsed:?} - {dispatched} jobs, {failed} failed ::"
                ));
                info!("Finished {dispatched} job(s) in {elapsed:?}, {failed} failed");
                Ok(RunSummary {
                    dispatched,
                    succeeded,
                    failed,
                    elapsed,
                })
            }
            Err(e) => {
                let dispatched = match &e {
                    DispatchError::StartWorker { .. } => 0,
                    DispatchError::Discovery { dispatched, .. }
                    | DispatchError::Queue { dispatched, .. } => *dispatched,
                };
                error!("{e}");
                self.log.line(format!("!! {e}"));
                self.log.line(format!(
                    ":: Aborted - runtime {elapsed:?} - {dispatched} jobs dispatched ::"
                ));
                Err(e)
            }
        }
    }

    /// Returns the number of dispatched and of succeeded jobs.
    fn dispatch<I>(&self, jobs: I) -> Result<(usize, usize), DispatchError>
    where
        I: IntoIterator<Item = Result<JobDescriptor, DiscoveryError>>,
    {
        let ctx = WorkerContext {
            config: self.config,
            runner: self.runner,
            log: self.log,
        };
        let tracker = CompletionTracker::new();
        let (queue, receiver) = WorkQueue::bounded(self.config.worker_count.get());

        thread::scope(|scope| {
            // workers first, they wait on the empty queue
            let pool = match WorkerPool::start(scope, ctx, receiver, &tracker) {
                Ok(pool) => pool,
                Err(e) => {
                    queue.close();
                    return Err(e);
                }
            };
            info!("Dispatching jobs to {} workers", pool.len());

            let fed = feed(&queue, jobs);
            queue.close();

            tracker.wait();
            debug!("All workers reached their terminal state");

            let mut succeeded = 0;
            for exit in pool.join() {
                let stats = exit.stats();
                succeeded += stats.jobs_run - stats.jobs_failed;
                if let WorkerExit::Panicked(WorkerStats { id, .. }) = exit {
                    error!("worker {id} panicked");
                    self.log
                        .line(format!("!! Worker {id} died, its current job did not finish"));
                }
            }

            fed.map(|dispatched| (dispatched, succeeded))
        })
    }
}

/// Push jobs into the queue until the source is exhausted or fails.
fn feed<I>(queue: &WorkQueue, jobs: I) -> Result<usize, DispatchError>
where
    I: IntoIterator<Item = Result<JobDescriptor, DiscoveryError>>,
{
    let mut dispatched = 0;
    for job in jobs {
        let job = job.map_err(|source| DispatchError::Discovery { dispatched, source })?;
        debug!("Queueing {}", job.origin);
        queue
            .enqueue(job)
            .map_err(|source| DispatchError::Queue { dispatched, source })?;
        dispatched += 1;
    }
    Ok(dispatched)
}
