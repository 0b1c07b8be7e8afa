// SPDX-License-Identifier: MIT
// svnmdump: dumps multiple SVN repositories at the same time
//
// - Reads one job descriptor per repository from the `repos` directory.
// - Hands them to a fixed pool of workers, each running the worker script.
// - Everything the workers do ends up in one log file.
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgGroup, Parser};
use log::{error, info};

use svnmdump::config::{DumpMode, MainConfig, PoolConfig};
use svnmdump::job_engine::dispatcher::{Dispatcher, RunSummary};
use svnmdump::job_source::JobSource;
use svnmdump::process_runner::ProcessRunner;
use svnmdump::run_log::RunLog;
use svnmdump::VERSION;

#[derive(Debug, Parser)]
#[command(author, version, about)]
#[command(group(ArgGroup::new("mode").required(true).args(["full", "inc"])))]
struct Args {
    /// Dump every revision of each repository
    #[arg(long)]
    full: bool,

    /// Dump only the revisions committed since the last full dump
    #[arg(long)]
    inc: bool,

    /// Path to the main configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
}

impl Args {
    fn mode(&self) -> DumpMode {
        if self.full {
            DumpMode::Full
        } else {
            DumpMode::Incremental
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match run(args.mode(), &args.config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(mode: DumpMode, config_path: &Path) -> anyhow::Result<RunSummary> {
    let conf = MainConfig::load(config_path)?;
    // no log file yet, these only reach stderr
    conf.check_dump_store()?;
    let run_log = RunLog::open(&conf.log)?;

    run_log.line(format!(":: Starting SVN Multi Dump Tool v{VERSION} ::"));
    info!(
        "Starting svnmdump v{VERSION} in {} mode, logging to {}",
        mode.token(),
        conf.log.display()
    );

    let (pool_config, source) = match prepare(&conf, mode) {
        Ok(prepared) => prepared,
        Err(e) => {
            run_log.line(format!("!! {e:#}"));
            return Err(e);
        }
    };
    info!(
        "Found {} job descriptor(s) in {}",
        source.remaining(),
        conf.repos.display()
    );

    let runner = ProcessRunner::new(&pool_config.job_runner);
    let summary = Dispatcher::new(&pool_config, &runner, &run_log)
        .run(source)
        .context("dump run aborted")?;
    Ok(summary)
}

/// Checks that have to pass before any worker starts.
fn prepare(conf: &MainConfig, mode: DumpMode) -> anyhow::Result<(PoolConfig, JobSource)> {
    let pool_config = conf.pool_config(mode)?;
    conf.check_worker_script()?;
    conf.check_repos_dir()?;
    let source = JobSource::scan(&conf.repos)?;
    Ok((pool_config, source))
}
