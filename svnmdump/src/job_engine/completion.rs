// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Wait-group: counts running workers, `wait` returns once all are done.
#[derive(Debug, Clone, Default)]
pub struct CompletionTracker {
    state: Arc<(Mutex<usize>, Condvar)>,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn count(&self) -> MutexGuard<'_, usize> {
        self.state.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add(&self) {
        *self.count() += 1;
    }

    /// Register a worker and get a guard that marks it done when dropped,
    /// also when the worker unwinds.
    pub fn enter(&self) -> CompletionGuard {
        self.add();
        CompletionGuard {
            tracker: self.clone(),
        }
    }

    pub fn done(&self) {
        let (_, cvar) = &*self.state;
        let mut count = self.count();
        *count = count.saturating_sub(1);
        if *count == 0 {
            cvar.notify_all();
        }
    }

    pub fn outstanding(&self) -> usize {
        *self.count()
    }

    /// Block until every registered worker is done.
    pub fn wait(&self) {
        let (_, cvar) = &*self.state;
        let mut count = self.count();
        while *count > 0 {
            count = cvar.wait(count).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like `wait`, but give up after `timeout`. Returns whether all
    /// workers finished.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (_, cvar) = &*self.state;
        let count = self.count();
        let (count, _) = cvar
            .wait_timeout_while(count, timeout, |count| *count > 0)
            .unwrap_or_else(PoisonError::into_inner);
        *count == 0
    }
}

#[derive(Debug)]
pub struct CompletionGuard {
    tracker: CompletionTracker,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.tracker.done();
    }
}
