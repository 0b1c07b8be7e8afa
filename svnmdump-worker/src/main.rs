// SPDX-License-Identifier: MIT
// svnmdump-worker: dumps one Subversion repository for svnmdump
//
// - FULL dumps every revision into FULL.dump and records it in state.full.
// - INCREMENTAL dumps the revisions since the last full dump into INC.dump.
// - Progress goes to stdout, failures to stderr and the exit status.
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgGroup, Parser};
use log::debug;

pub mod error;
pub mod plan;
pub mod svn;

use crate::error::WorkerError;
use crate::plan::{DumpPlan, Method, INC_DUMP, STATE_INC};
use crate::svn::SvnTools;

#[derive(Debug, Parser)]
#[command(author, version, about)]
#[command(group(ArgGroup::new("method").required(true).args(["full", "inc"])))]
struct Args {
    /// Dump every revision
    #[arg(long)]
    full: bool,

    /// Dump the revisions committed since the last full dump
    #[arg(long)]
    inc: bool,

    /// Path of the repository
    #[arg(value_name = "REPO")]
    repo: PathBuf,

    /// Directory receiving the dump and state files
    #[arg(value_name = "DUMP_DIR")]
    dump_dir: PathBuf,

    /// svnlook executable
    #[arg(long, env = "SVNMDUMP_SVNLOOK", default_value = "svnlook")]
    svnlook: PathBuf,

    /// svnadmin executable
    #[arg(long, env = "SVNMDUMP_SVNADMIN", default_value = "svnadmin")]
    svnadmin: PathBuf,
}

impl Args {
    fn method(&self) -> Method {
        if self.full {
            Method::Full
        } else {
            Method::Incremental
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let svn = SvnTools {
        svnlook: args.svnlook.clone(),
        svnadmin: args.svnadmin.clone(),
    };

    match run(args.method(), &args.repo, &args.dump_dir, &svn) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(method: Method, repo: &Path, dump_dir: &Path, svn: &SvnTools) -> Result<(), WorkerError> {
    if !repo.is_dir() {
        return Err(WorkerError::RepoMissing(repo.to_path_buf()));
    }
    if !dump_dir.is_dir() {
        println!("Creating \"{}\"", dump_dir.display());
        fs::create_dir_all(dump_dir).map_err(|source| WorkerError::CreateDumpDir {
            dir: dump_dir.to_path_buf(),
            source,
        })?;
    }

    let youngest = svn.youngest(repo)?;
    debug!("youngest revision of {} is {youngest}", repo.display());

    let (dump_plan, note) = plan::plan(method, youngest, plan::read_full_state(dump_dir));
    if let Some(note) = note {
        println!("{note}");
    }

    let (method, from, to) = match dump_plan {
        DumpPlan::UpToDate { revision } => {
            println!(
                "Latest FULL Dump Revision is already same as Youngest Revision {revision}, nothing to increment"
            );
            return Ok(());
        }
        DumpPlan::Full { youngest } => (Method::Full, 0, youngest),
        DumpPlan::Incremental { from, to } => (Method::Incremental, from, to),
    };
    let dump_file = dump_dir.join(method.dump_file_name());

    println!(
        "Performing {method} dump of {} to {} from Revision {from} to {to}",
        repo.display(),
        dump_file.display()
    );
    svn.dump(repo, (from, to), method == Method::Incremental, &dump_file)?;

    if let Some((name, record)) = dump_plan.state_record() {
        let path = dump_dir.join(name);
        fs::write(&path, record).map_err(|source| WorkerError::State { path, source })?;
    }

    if method == Method::Full {
        remove_stale(
            &dump_dir.join(INC_DUMP),
            "Removing previous INCREMENTAL",
        )?;
        remove_stale(
            &dump_dir.join(STATE_INC),
            "Removing INCREMENTAL state file",
        )?;
    }
    Ok(())
}

/// Removes a leftover of the previous incremental dump, if any.
fn remove_stale(path: &Path, what: &str) -> Result<(), WorkerError> {
    match fs::remove_file(path) {
        Ok(()) => {
            println!("{what} {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(WorkerError::State {
            path: path.to_path_buf(),
            source,
        }),
    }
}
