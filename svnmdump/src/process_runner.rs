// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::path::PathBuf;
use std::process::{Command, Stdio};

use log::debug;

use crate::config::DumpMode;
use crate::job_engine::job::{JobDescriptor, JobOutcome, JobRunner};

/// Runs an external executable as
/// `<program> <mode token> <source path> <destination path>`
/// and captures stdout and stderr separately.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
    desc: String,
}

impl ProcessRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let desc = program.display().to_string();
        Self { program, desc }
    }
}

impl JobRunner for ProcessRunner {
    fn desc(&self) -> &str {
        &self.desc
    }

    fn run(&self, mode: DumpMode, job: &JobDescriptor) -> JobOutcome {
        debug!(
            "Executing {} {} {} {}",
            self.desc,
            mode.token(),
            job.source_path.display(),
            job.destination_path.display()
        );

        let output = Command::new(&self.program)
            .arg(mode.token())
            .arg(&job.source_path)
            .arg(&job.destination_path)
            .stdin(Stdio::null())
            .output();

        match output {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                if output.status.success() {
                    JobOutcome {
                        stderr,
                        ..JobOutcome::succeeded(stdout)
                    }
                } else {
                    JobOutcome::failed(output.status.code(), stdout, stderr)
                }
            }
            Err(e) => JobOutcome::spawn_failed(e.to_string()),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::job_engine::job::RunStatus;
    use std::fs;
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn write_script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("runner.sh");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "#!/bin/sh").unwrap();
        write!(f, "{body}").unwrap();
        drop(f);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn job() -> JobDescriptor {
        JobDescriptor::new("/svn/alpha", "/dump/alpha", "alpha.svnmdump.toml")
    }

    #[test]
    fn passes_mode_and_paths_as_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "echo \"$1|$2|$3\"\n");

        let outcome = ProcessRunner::new(&script).run(DumpMode::Incremental, &job());

        assert_eq!(outcome.status, RunStatus::Succeeded);
        assert_eq!(outcome.stdout.trim(), "--inc|/svn/alpha|/dump/alpha");
    }

    #[test]
    fn captures_streams_separately_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "echo progress\necho broken >&2\nexit 3\n");

        let outcome = ProcessRunner::new(&script).run(DumpMode::Full, &job());

        assert_eq!(outcome.status, RunStatus::Failed { code: Some(3) });
        assert_eq!(outcome.stdout.trim(), "progress");
        assert_eq!(outcome.stderr.trim(), "broken");
    }

    #[test]
    fn missing_program_is_a_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessRunner::new(dir.path().join("does-not-exist"));

        let outcome = runner.run(DumpMode::Full, &job());

        assert!(matches!(outcome.status, RunStatus::SpawnFailed { .. }));
        assert!(!outcome.is_success());
    }
}
