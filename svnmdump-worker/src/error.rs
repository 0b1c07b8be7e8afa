// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Repo {} does not exist", .0.display())]
    RepoMissing(PathBuf),

    #[error("could not create dump directory {}: {source}", dir.display())]
    CreateDumpDir { dir: PathBuf, source: io::Error },

    #[error("could not run {program}: {source}")]
    Spawn { program: String, source: io::Error },

    #[error("svnlook youngest {} failed: {stderr}", repo.display())]
    Youngest { repo: PathBuf, stderr: String },

    #[error("svnlook youngest {} printed {output:?}, not a revision", repo.display())]
    BadRevision { repo: PathBuf, output: String },

    #[error("could not create {}: {source}", path.display())]
    CreateDumpFile { path: PathBuf, source: io::Error },

    /// `svnadmin dump` ran and failed; its stderr is passed on verbatim.
    #[error("{stderr}")]
    Dump { stderr: String },

    #[error("could not update {}: {source}", path.display())]
    State { path: PathBuf, source: io::Error },
}

impl WorkerError {
    /// Exit status of the worker process for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            WorkerError::RepoMissing(_) => 2,
            WorkerError::Dump { .. } | WorkerError::CreateDumpFile { .. } => 3,
            _ => 1,
        }
    }
}
