// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>
//! # Design: Fixed Worker Pool Over One Bounded Queue
//!
//! ## Overview
//! - The dispatcher starts `worker_count` threads first. They block on the
//!   empty queue.
//! - Job descriptors are then streamed into a single bounded FIFO queue
//!   (capacity = `worker_count`), so the producer blocks when every worker
//!   is busy and the buffer is full.
//! - Each job is received by exactly one worker. Workers run the job
//!   runner, log its output and pick up the next job.
//! - Closing the queue lets workers drain what is buffered, then every
//!   worker exits and the completion tracker reaches zero.
//! - Nothing is retried, reordered or persisted. A job runner that hangs
//!   keeps its worker busy forever; there is no timeout.
//!
//! ```text
//!                  +-------------------+
//!                  |     Dispatcher    |
//!                  +---------+---------+
//!                            | enqueue (blocking)
//!                            v
//!                  +-------------------+
//!                  |  WorkQueue (FIFO) |
//!                  +--+------+------+--+
//!                     |      |      |   next_or_done
//!                +----v-+ +--v---+ +v-----+
//!                | W 1  | | W 2  | | W n  |  --> job runner --> RunLog
//!                +------+ +------+ +------+
//! ```

pub mod closure_runner;
pub mod completion;
pub mod dispatcher;
pub mod job;
pub mod queue;
pub mod worker_pool;
