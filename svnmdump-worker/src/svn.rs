// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::debug;

use crate::error::WorkerError;

/// The two Subversion admin tools the worker needs.
#[derive(Debug, Clone)]
pub struct SvnTools {
    pub svnlook: PathBuf,
    pub svnadmin: PathBuf,
}

impl SvnTools {
    /// `svnlook youngest <repo>`
    pub fn youngest(&self, repo: &Path) -> Result<u64, WorkerError> {
        debug!("{} youngest {}", self.svnlook.display(), repo.display());
        let output = Command::new(&self.svnlook)
            .arg("youngest")
            .arg(repo)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| WorkerError::Spawn {
                program: self.svnlook.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(WorkerError::Youngest {
                repo: repo.to_path_buf(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .trim()
            .parse()
            .map_err(|_| WorkerError::BadRevision {
                repo: repo.to_path_buf(),
                output: stdout.trim().to_string(),
            })
    }

    /// `svnadmin dump -q [--incremental] -r <from>:<to> <repo>`, the dump
    /// stream going straight into `dump_file`.
    pub fn dump(
        &self,
        repo: &Path,
        (from, to): (u64, u64),
        incremental: bool,
        dump_file: &Path,
    ) -> Result<(), WorkerError> {
        let out = File::create(dump_file).map_err(|source| WorkerError::CreateDumpFile {
            path: dump_file.to_path_buf(),
            source,
        })?;

        let mut cmd = Command::new(&self.svnadmin);
        cmd.arg("dump").arg("-q");
        if incremental {
            cmd.arg("--incremental");
        }
        cmd.arg("-r").arg(format!("{from}:{to}")).arg(repo);
        debug!("{cmd:?} > {}", dump_file.display());

        let output = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::from(out))
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| WorkerError::Spawn {
                program: self.svnadmin.display().to_string(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(WorkerError::Dump {
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            })
        }
    }
}
