// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::path::PathBuf;

use crate::config::DumpMode;

/// One backup target and where its dump goes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobDescriptor {
    /// Root of the repository to dump.
    pub source_path: PathBuf,
    /// Directory the dump artifacts are written to.
    pub destination_path: PathBuf,
    /// Descriptor file this job came from. Only used for logging.
    pub origin: String,
}

impl JobDescriptor {
    pub fn new(
        source_path: impl Into<PathBuf>,
        destination_path: impl Into<PathBuf>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            destination_path: destination_path.into(),
            origin: origin.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Succeeded,
    /// The runner exited non-zero. `None` if it was killed by a signal.
    Failed { code: Option<i32> },
    /// The runner could not be started at all.
    SpawnFailed { reason: String },
}

/// What a job runner reports back for a single job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub status: RunStatus,
    pub stdout: String,
    pub stderr: String,
}

impl JobOutcome {
    pub fn succeeded(stdout: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Succeeded,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: Option<i32>, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Failed { code },
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    pub fn spawn_failed(reason: impl Into<String>) -> Self {
        Self {
            status: RunStatus::SpawnFailed {
                reason: reason.into(),
            },
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Succeeded
    }
}

/// Executes a single job. Shared by reference between all workers, hence
/// `Sync`. Failures are reported in the outcome, never raised.
pub trait JobRunner: Send + Sync {
    /// Free-form description, used for logging
    fn desc(&self) -> &str;

    /// Run `job` to completion. Blocks for as long as the job takes.
    fn run(&self, mode: DumpMode, job: &JobDescriptor) -> JobOutcome;
}

impl<'a> std::fmt::Debug for dyn JobRunner + 'a {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRunner")
            .field("desc", &self.desc())
            .finish()
    }
}
