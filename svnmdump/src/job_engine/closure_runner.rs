// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use crate::config::DumpMode;
use crate::job_engine::job::{JobDescriptor, JobOutcome, JobRunner};

type RunFn = dyn Fn(DumpMode, &JobDescriptor) -> JobOutcome + Send + Sync + 'static;

/// Job runner that calls a closure instead of starting a process.
pub struct ClosureRunner {
    desc: String,
    run_fn: Box<RunFn>,
}

impl ClosureRunner {
    pub fn new(
        desc: impl Into<String>,
        f: impl Fn(DumpMode, &JobDescriptor) -> JobOutcome + Send + Sync + 'static,
    ) -> Self {
        Self {
            desc: desc.into(),
            run_fn: Box::new(f),
        }
    }
}

impl JobRunner for ClosureRunner {
    fn desc(&self) -> &str {
        &self.desc
    }

    fn run(&self, mode: DumpMode, job: &JobDescriptor) -> JobOutcome {
        (self.run_fn)(mode, job)
    }
}

#[test]
pub fn example() {
    let runner = ClosureRunner::new("echo", |mode, job| {
        JobOutcome::succeeded(format!("{} {}", mode.token(), job.source_path.display()))
    });
    let job = JobDescriptor::new("/svn/a", "/dump/a", "a.svnmdump.toml");

    let outcome = runner.run(DumpMode::Incremental, &job);

    assert_eq!(runner.desc(), "echo");
    assert!(outcome.is_success());
    assert_eq!(outcome.stdout, "--inc /svn/a");
}
