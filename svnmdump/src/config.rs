// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::StartupError;

/// Contents of the main configuration file.
///
/// ```toml
/// repos = "/data/svnmdump/repos"
/// log = "/data/svnmdump/log/svnmdump.log"
/// dump_store = "/data/svndump/dump_store"
/// workers = 5
/// worker_script = "/usr/local/bin/svnmdump-worker"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MainConfig {
    /// Directory holding the per-repository `*.svnmdump.toml` descriptors.
    pub repos: PathBuf,
    /// Log file, opened in append mode.
    pub log: PathBuf,
    /// Where the dump artifacts live. Only checked for existence here.
    pub dump_store: PathBuf,
    pub workers: usize,
    /// Job runner executable.
    pub worker_script: PathBuf,
}

/// Full or incremental dump. The core never interprets it, it only
/// passes the token on to the job runner.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DumpMode {
    Full,
    Incremental,
}

impl DumpMode {
    pub fn token(&self) -> &'static str {
        match self {
            DumpMode::Full => "--full",
            DumpMode::Incremental => "--inc",
        }
    }
}

/// Immutable settings shared by reference with every worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub worker_count: NonZeroUsize,
    pub job_runner: PathBuf,
    pub mode: DumpMode,
}

impl PoolConfig {
    pub fn new(
        workers: usize,
        job_runner: impl Into<PathBuf>,
        mode: DumpMode,
    ) -> Result<Self, StartupError> {
        let worker_count = NonZeroUsize::new(workers).ok_or(StartupError::NoWorkers)?;
        Ok(Self {
            worker_count,
            job_runner: job_runner.into(),
            mode,
        })
    }
}

impl MainConfig {
    pub fn load(path: &Path) -> Result<Self, StartupError> {
        if !path.exists() {
            return Err(StartupError::MissingConfig(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path).map_err(|source| StartupError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &raw)
    }

    fn parse(path: &Path, raw: &str) -> Result<Self, StartupError> {
        toml::from_str(raw).map_err(|source| StartupError::ParseConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn check_dump_store(&self) -> Result<(), StartupError> {
        require_dir(&self.dump_store)
    }

    pub fn check_worker_script(&self) -> Result<(), StartupError> {
        if self.worker_script.exists() {
            Ok(())
        } else {
            Err(StartupError::MissingPath(self.worker_script.clone()))
        }
    }

    pub fn check_repos_dir(&self) -> Result<(), StartupError> {
        require_dir(&self.repos)
    }

    pub fn pool_config(&self, mode: DumpMode) -> Result<PoolConfig, StartupError> {
        PoolConfig::new(self.workers, self.worker_script.clone(), mode)
    }
}

fn require_dir(path: &Path) -> Result<(), StartupError> {
    let meta =
        fs::metadata(path).map_err(|_| StartupError::MissingPath(path.to_path_buf()))?;
    if meta.is_dir() {
        Ok(())
    } else {
        Err(StartupError::NotADirectory(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
repos = "/data/svnmdump/repos"
log = "/data/svnmdump/log/svnmdump.log"
dump_store = "/data/svndump/dump_store"
workers = 5
worker_script = "./svnmdump-worker"
"#;

    #[test]
    fn parses_main_config() {
        let conf = MainConfig::parse(Path::new("svnmdump.toml"), SAMPLE).unwrap();
        assert_eq!(conf.repos, PathBuf::from("/data/svnmdump/repos"));
        assert_eq!(conf.workers, 5);
        assert_eq!(conf.worker_script, PathBuf::from("./svnmdump-worker"));
    }

    #[test]
    fn missing_key_is_a_parse_error() {
        let raw = SAMPLE.replace("workers = 5", "");
        let err = MainConfig::parse(Path::new("svnmdump.toml"), &raw).unwrap_err();
        assert!(matches!(err, StartupError::ParseConfig { .. }));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let raw = format!("{SAMPLE}\ncolour = \"blue\"\n");
        assert!(MainConfig::parse(Path::new("svnmdump.toml"), &raw).is_ok());
    }

    #[test]
    fn zero_workers_are_rejected() {
        let err = PoolConfig::new(0, "/bin/true", DumpMode::Full).unwrap_err();
        assert!(matches!(err, StartupError::NoWorkers));
    }

    #[test]
    fn mode_tokens() {
        assert_eq!(DumpMode::Full.token(), "--full");
        assert_eq!(DumpMode::Incremental.token(), "--inc");
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let err = MainConfig::load(&path).unwrap_err();
        assert!(matches!(err, StartupError::MissingConfig(p) if p == path));
    }

    #[test]
    fn directory_checks() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        fs::write(&file, "x").unwrap();

        let mut conf = MainConfig::parse(Path::new("svnmdump.toml"), SAMPLE).unwrap();
        conf.dump_store = dir.path().to_path_buf();
        conf.repos = file.clone();
        conf.worker_script = dir.path().join("missing-worker");

        assert!(conf.check_dump_store().is_ok());
        assert!(matches!(
            conf.check_repos_dir(),
            Err(StartupError::NotADirectory(_))
        ));
        assert!(matches!(
            conf.check_worker_script(),
            Err(StartupError::MissingPath(_))
        ));
    }
}
