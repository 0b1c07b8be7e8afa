// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use async_channel::{Receiver, Sender};
use log::debug;

use crate::error::QueueError;
use crate::job_engine::job::JobDescriptor;

/// Producer side of the work queue.
///
/// Closing consumes the queue, so nothing can be enqueued afterwards.
#[derive(Debug)]
pub struct WorkQueue {
    tx: Sender<JobDescriptor>,
}

/// Consumer side of the work queue. Cloned once per worker.
#[derive(Debug, Clone)]
pub struct JobReceiver {
    rx: Receiver<JobDescriptor>,
}

impl WorkQueue {
    /// Create a FIFO queue buffering at most `capacity` jobs.
    ///
    /// # Panics
    /// If `capacity` is zero.
    pub fn bounded(capacity: usize) -> (WorkQueue, JobReceiver) {
        let (tx, rx) = async_channel::bounded(capacity);
        (WorkQueue { tx }, JobReceiver { rx })
    }

    /// Hand `job` to the workers, blocking while the buffer is full.
    ///
    /// Fails if every receiver has been dropped.
    pub fn enqueue(&self, job: JobDescriptor) -> Result<(), QueueError> {
        self.tx
            .send_blocking(job)
            .map_err(|_| QueueError::Disconnected)
    }

    /// Number of jobs buffered and not yet taken by a worker.
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    /// Signal that no more jobs will follow. Jobs already buffered are
    /// still delivered before receivers see the end of the queue.
    pub fn close(self) {
        debug!("Closing work queue with {} job(s) buffered", self.tx.len());
        drop(self.tx);
    }
}

impl JobReceiver {
    /// Next job in FIFO order, or `None` once the queue is closed and
    /// drained. Blocks while the queue is open and empty.
    pub fn next_or_done(&self) -> Option<JobDescriptor> {
        self.rx.recv_blocking().ok()
    }
}
