// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

//! `svnmdump` dumps many Subversion repositories at the same time.
//!
//! The binary entrypoint lives in `main.rs`; everything it drives is
//! exported here so the pool can be embedded and tested.

pub mod config;
pub mod error;
pub mod job_engine;
pub mod job_source;
pub mod process_runner;
pub mod run_log;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
