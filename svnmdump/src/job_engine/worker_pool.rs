// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, Scope, ScopedJoinHandle};
use std::time::Instant;

use log::warn;

use crate::config::PoolConfig;
use crate::error::DispatchError;
use crate::job_engine::completion::{CompletionGuard, CompletionTracker};
use crate::job_engine::job::{JobDescriptor, JobRunner, RunStatus};
use crate::job_engine::queue::JobReceiver;
use crate::run_log::RunLog;

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum WorkerState {
    IdleWaiting,
    RunningJob,
    Terminated,
}

/// Everything a worker reads. Borrowed, never owned.
#[derive(Clone, Copy, Debug)]
pub struct WorkerContext<'env> {
    pub config: &'env PoolConfig,
    pub runner: &'env dyn JobRunner,
    pub log: &'env RunLog,
}

#[derive(Clone, Debug, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub id: usize,
    pub jobs_run: usize,
    pub jobs_failed: usize,
}

/// How a worker ended. Both variants carry the jobs it completed; a
/// panicked worker's in-flight job is not among them.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    Finished(WorkerStats),
    Panicked(WorkerStats),
}

impl WorkerExit {
    pub fn stats(&self) -> WorkerStats {
        match *self {
            WorkerExit::Finished(stats) | WorkerExit::Panicked(stats) => stats,
        }
    }
}

/// State and counters of one worker, readable from outside its thread.
#[derive(Debug)]
struct WorkerSlot {
    state: WorkerState,
    stats: WorkerStats,
}

#[derive(Debug)]
struct Worker<'scope> {
    slot: Arc<Mutex<WorkerSlot>>,
    handle: ScopedJoinHandle<'scope, ()>,
}

/// A fixed set of threads draining one [`JobReceiver`].
#[derive(Debug)]
pub struct WorkerPool<'scope> {
    workers: Vec<Worker<'scope>>,
}

impl<'scope> WorkerPool<'scope> {
    /// Spawn `config.worker_count` workers inside `scope`. Each one is
    /// registered with `tracker` before it starts and marked done when its
    /// loop ends.
    pub fn start<'env>(
        scope: &'scope Scope<'scope, 'env>,
        ctx: WorkerContext<'env>,
        receiver: JobReceiver,
        tracker: &CompletionTracker,
    ) -> Result<Self, DispatchError> {
        let count = ctx.config.worker_count.get();
        let mut workers = Vec::with_capacity(count);

        for id in 1..=count {
            let slot = Arc::new(Mutex::new(WorkerSlot {
                state: WorkerState::IdleWaiting,
                stats: WorkerStats {
                    id,
                    ..Default::default()
                },
            }));
            let worker_slot = slot.clone();
            let receiver = receiver.clone();
            let guard = tracker.enter();

            let handle = thread::Builder::new()
                .name(format!("worker-{id}"))
                .spawn_scoped(scope, move || work(id, ctx, receiver, &worker_slot, guard))
                .map_err(|source| DispatchError::StartWorker { id, source })?;

            workers.push(Worker { slot, handle });
        }

        Ok(Self { workers })
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn states(&self) -> Vec<WorkerState> {
        self.workers
            .iter()
            .map(|w| lock(&w.slot).state)
            .collect()
    }

    pub fn join(self) -> Vec<WorkerExit> {
        self.workers
            .into_iter()
            .map(|w| {
                let joined = w.handle.join();
                let stats = lock(&w.slot).stats;
                match joined {
                    Ok(()) => WorkerExit::Finished(stats),
                    Err(_) => WorkerExit::Panicked(stats),
                }
            })
            .collect()
    }
}

fn lock(slot: &Mutex<WorkerSlot>) -> MutexGuard<'_, WorkerSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

fn work(
    id: usize,
    ctx: WorkerContext<'_>,
    receiver: JobReceiver,
    slot: &Mutex<WorkerSlot>,
    _guard: CompletionGuard,
) {
    while let Some(job) = receiver.next_or_done() {
        lock(slot).state = WorkerState::RunningJob;
        let succeeded = run_job(id, &ctx, &job);

        // counted only once the job is over, an unwinding job stays uncounted
        let mut entry = lock(slot);
        entry.stats.jobs_run += 1;
        if !succeeded {
            entry.stats.jobs_failed += 1;
        }
        entry.state = WorkerState::IdleWaiting;
    }

    ctx.log.line(format!(">> Worker {id} has exited"));
    lock(slot).state = WorkerState::Terminated;
}

/// Run one job and log everything about it. Returns whether it succeeded.
fn run_job(id: usize, ctx: &WorkerContext<'_>, job: &JobDescriptor) -> bool {
    let origin = &job.origin;
    ctx.log
        .line(format!(">> Worker {id} is working on \"{origin}\""));

    let started = Instant::now();
    let outcome = ctx.runner.run(ctx.config.mode, job);

    // stdout first, stderr after it
    for line in outcome.stdout.lines().filter(|l| !l.trim().is_empty()) {
        ctx.log.line(format!(">> Worker {id} [{origin}]: {line}"));
    }

    let failure = match &outcome.status {
        RunStatus::Succeeded => None,
        RunStatus::Failed { code: Some(code) } => Some(format!("exit status {code}")),
        RunStatus::Failed { code: None } => Some("terminated by signal".to_string()),
        RunStatus::SpawnFailed { reason } => {
            Some(format!("could not start {}: {reason}", ctx.runner.desc()))
        }
    };

    if let Some(reason) = &failure {
        warn!("worker {id}: job {origin} failed: {reason}");
        ctx.log
            .line(format!("!! Worker {id} [{origin}]: Error Encountered - {reason}"));
        for line in outcome.stderr.lines().filter(|l| !l.trim().is_empty()) {
            ctx.log.line(format!("!! Worker {id} [{origin}]: {line}"));
        }
    }

    ctx.log.line(format!(
        ">> Worker {id} has finished with \"{origin}\" - runtime {:?}",
        started.elapsed()
    ));

    failure.is_none()
}
