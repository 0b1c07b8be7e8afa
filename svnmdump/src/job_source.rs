// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

//! Discovery of `*.svnmdump.toml` job descriptors.
//!
//! A descriptor names the repository and the dump directory:
//!
//! ```toml
//! root = "/data/svn/project"
//! dump = "/data/svndump/dump_store/project"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::debug;
use regex::Regex;
use serde::Deserialize;

use crate::error::DiscoveryError;
use crate::job_engine::job::JobDescriptor;

pub const DESCRIPTOR_SUFFIX: &str = ".svnmdump.toml";

fn descriptor_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&format!("{}$", regex::escape(DESCRIPTOR_SUFFIX)))
            .expect("escaped suffix is a valid pattern")
    })
}

pub fn is_descriptor_name(name: &str) -> bool {
    descriptor_pattern().is_match(name)
}

#[derive(Debug, Deserialize)]
struct DescriptorFile {
    root: PathBuf,
    dump: PathBuf,
}

/// The descriptor files of one directory, listed once and sorted by file
/// name. Iterating decodes them one at a time.
#[derive(Debug)]
pub struct JobSource {
    files: std::vec::IntoIter<PathBuf>,
}

impl JobSource {
    pub fn scan(dir: &Path) -> Result<Self, DiscoveryError> {
        let list_err = |source| DiscoveryError::ListDirectory {
            dir: dir.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(list_err)? {
            let entry = entry.map_err(list_err)?;
            let path = entry.path();
            let matches = entry.file_name().to_str().is_some_and(is_descriptor_name);
            if matches && !path.is_dir() {
                files.push(path);
            } else {
                debug!("Ignoring {}", path.display());
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        Ok(Self {
            files: files.into_iter(),
        })
    }

    pub fn remaining(&self) -> usize {
        self.files.len()
    }
}

impl Iterator for JobSource {
    type Item = Result<JobDescriptor, DiscoveryError>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.files.next()?;
        Some(load_descriptor(&path))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.files.size_hint()
    }
}

pub fn load_descriptor(path: &Path) -> Result<JobDescriptor, DiscoveryError> {
    let raw = fs::read_to_string(path).map_err(|source| DiscoveryError::ReadDescriptor {
        path: path.to_path_buf(),
        source,
    })?;
    let file: DescriptorFile =
        toml::from_str(&raw).map_err(|source| DiscoveryError::MalformedDescriptor {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(JobDescriptor::new(
        file.root,
        file.dump,
        path.display().to_string(),
    ))
}

/// Every descriptor of `dir`, in the order a run would dispatch them.
pub fn discover(dir: &Path) -> Result<Vec<JobDescriptor>, DiscoveryError> {
    JobSource::scan(dir)?.collect()
}
