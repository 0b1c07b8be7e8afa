// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::fs;
use std::path::{Path, PathBuf};

use svnmdump::config::{DumpMode, PoolConfig};
use tempfile::TempDir;

/// A throwaway `repos` directory and dump store.
pub struct Scenario {
    dir: TempDir,
}

impl Scenario {
    pub fn new() -> Self {
        let scenario = Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        };
        fs::create_dir(scenario.repos()).expect("failed to create repos dir");
        fs::create_dir(scenario.dump_store()).expect("failed to create dump store");
        scenario
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn repos(&self) -> PathBuf {
        self.root().join("repos")
    }

    pub fn dump_store(&self) -> PathBuf {
        self.root().join("dump_store")
    }

    /// Writes `<name>.svnmdump.toml` pointing at `svn/<name>` and the
    /// dump store.
    pub fn add_repo(&self, name: &str) {
        let raw = format!(
            "root = {:?}\ndump = {:?}\n",
            self.root().join("svn").join(name),
            self.dump_store().join(name)
        );
        fs::write(self.descriptor(name), raw).expect("failed to write descriptor");
    }

    pub fn add_malformed(&self, name: &str) {
        fs::write(self.descriptor(name), "root = [\n").expect("failed to write descriptor");
    }

    fn descriptor(&self, name: &str) -> PathBuf {
        self.repos().join(format!("{name}.svnmdump.toml"))
    }

    /// Content of the marker the stub runner leaves behind, if it ran.
    pub fn dumped(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.dump_store().join(name).join("dumped"))
            .ok()
            .map(|s| s.trim().to_string())
    }

    pub fn pool_config(&self, workers: usize, runner: &Path, mode: DumpMode) -> PoolConfig {
        PoolConfig::new(workers, runner, mode).expect("workers must be positive")
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}
