// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

//! Stands in for the dump worker. Sources whose path contains `fail` are
//! refused with exit status 3. Every other source gets a `dumped` marker in
//! its destination, which must not exist yet.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use clap::{ArgGroup, Parser};

#[derive(Debug, Parser)]
#[command(group(ArgGroup::new("mode").required(true).args(["full", "inc"])))]
struct Args {
    #[arg(long)]
    full: bool,

    #[arg(long)]
    inc: bool,

    source: PathBuf,

    destination: PathBuf,

    /// How long a dump pretends to take
    #[arg(long, env = "STUB_RUNNER_DELAY_MS", default_value_t = 20)]
    delay_ms: u64,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let source = args.source.display().to_string();

    println!("starting {source}");
    thread::sleep(Duration::from_millis(args.delay_ms));

    if source.contains("fail") {
        eprintln!("cannot dump {source}");
        eprintln!("giving up");
        return ExitCode::from(3);
    }

    let token = if args.full { "--full" } else { "--inc" };
    let marker = args.destination.join("dumped");
    let written = fs::create_dir_all(&args.destination).and_then(|_| {
        let mut f = OpenOptions::new().write(true).create_new(true).open(&marker)?;
        writeln!(f, "{token}")
    });
    if let Err(e) = written {
        eprintln!("cannot write {}: {e}", marker.display());
        return ExitCode::from(4);
    }

    println!("dumped {source}");
    ExitCode::SUCCESS
}
