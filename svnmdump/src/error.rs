// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::io;
use std::path::PathBuf;

/// Errors that stop the run before any worker is started.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("{} does not exist!", .0.display())]
    MissingConfig(PathBuf),

    #[error("could not read {}: {source}", path.display())]
    ReadConfig { path: PathBuf, source: io::Error },

    #[error("could not parse {}: {}", path.display(), source.message())]
    ParseConfig {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("workers must be at least 1")]
    NoWorkers,

    #[error("{} does not exist!", .0.display())]
    MissingPath(PathBuf),

    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("could not open log file {}: {source}", path.display())]
    OpenLog { path: PathBuf, source: io::Error },
}

/// Errors raised while enumerating job descriptors.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("could not list descriptor directory {}: {source}", dir.display())]
    ListDirectory { dir: PathBuf, source: io::Error },

    #[error("could not read job descriptor {}: {source}", path.display())]
    ReadDescriptor { path: PathBuf, source: io::Error },

    #[error("malformed job descriptor {}: {}", path.display(), source.message())]
    MalformedDescriptor {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("work queue has no consumers left")]
    Disconnected,
}

/// Errors that end a dispatch early.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("could not start worker {id}: {source}")]
    StartWorker { id: usize, source: io::Error },

    #[error("job discovery aborted the run after {dispatched} job(s): {source}")]
    Discovery {
        dispatched: usize,
        source: DiscoveryError,
    },

    #[error("all workers are gone, {dispatched} job(s) were dispatched: {source}")]
    Queue {
        dispatched: usize,
        source: QueueError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_reads_like_a_diagnostic() {
        let err = StartupError::MissingConfig(PathBuf::from("/etc/svnmdump.toml"));
        assert_eq!(err.to_string(), "/etc/svnmdump.toml does not exist!");
    }

    #[test]
    fn not_a_directory_names_the_path() {
        let err = StartupError::NotADirectory(PathBuf::from("/data/dump_store"));
        assert_eq!(err.to_string(), "/data/dump_store is not a directory");
    }

    #[test]
    fn dispatch_error_keeps_the_discovery_cause() {
        let err = DispatchError::Discovery {
            dispatched: 2,
            source: DiscoveryError::ReadDescriptor {
                path: PathBuf::from("/repos/a.svnmdump.toml"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("after 2 job(s)"), "{msg}");
        assert!(msg.contains("/repos/a.svnmdump.toml"), "{msg}");
        assert!(std::error::Error::source(&err).is_some());
    }
}
