// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

//! The run log: one timestamped line per record, shared by all workers.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, warn};
use time::macros::format_description;
use time::OffsetDateTime;

use crate::error::StartupError;

/// Length of the `YYYY/MM/DD HH:MM:SS ` prefix of every record.
pub const TIMESTAMP_PREFIX_LEN: usize = 20;

/// Serializes records onto a single sink. Every record is written with one
/// `write_all` while the lock is held, so lines from different workers
/// never tear.
pub struct RunLog {
    sink: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for RunLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLog").finish_non_exhaustive()
    }
}

impl RunLog {
    pub fn new(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Mutex::new(Box::new(sink)),
        }
    }

    /// Open `path` for appending, creating it if needed.
    pub fn open(path: &Path) -> Result<Self, StartupError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| StartupError::OpenLog {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(file))
    }

    /// A log writing into memory, together with a handle to read it back.
    pub fn in_memory() -> (Self, SharedBuffer) {
        let buffer = SharedBuffer::default();
        (Self::new(buffer.clone()), buffer)
    }

    pub fn line(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        debug!(target: "svnmdump::run", "{message}");

        let stamp = timestamp();
        let mut record = String::with_capacity(message.len() + TIMESTAMP_PREFIX_LEN + 1);
        // multi-line messages become one record per line, written together
        for line in message.trim_end_matches(['\r', '\n']).split('\n') {
            record.push_str(&stamp);
            record.push(' ');
            record.push_str(line.trim_end_matches('\r'));
            record.push('\n');
        }
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = sink.write_all(record.as_bytes()).and_then(|_| sink.flush()) {
            warn!("could not write to the run log: {e}");
        }
    }
}

fn timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(format_description!(
            "[year]/[month]/[day] [hour]:[minute]:[second]"
        ))
        .unwrap_or_else(|_| "0000/00/00 00:00:00".to_string())
}

/// Cloneable in-memory sink.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        let buf = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Complete records, timestamps included.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    /// Records with the timestamp prefix removed.
    pub fn messages(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .map(|line| line.get(TIMESTAMP_PREFIX_LEN..).unwrap_or_default().to_string())
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn records_carry_a_timestamp() {
        let (log, buffer) = RunLog::in_memory();
        log.line(":: hello ::");

        let lines = buffer.lines();
        assert_eq!(lines.len(), 1);
        let (stamp, message) = lines[0].split_at(TIMESTAMP_PREFIX_LEN);
        assert_eq!(message, ":: hello ::");
        assert_eq!(&stamp[4..5], "/");
        assert_eq!(&stamp[10..11], " ");
        assert_eq!(buffer.messages(), vec![":: hello ::".to_string()]);
    }

    #[test]
    fn multi_line_messages_are_split_into_records() {
        let (log, buffer) = RunLog::in_memory();
        log.line("first\nsecond\n");
        assert_eq!(buffer.messages(), vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn concurrent_writers_do_not_tear_lines() {
        let (log, buffer) = RunLog::in_memory();

        thread::scope(|s| {
            for worker in 0..8 {
                let log = &log;
                s.spawn(move || {
                    for n in 0..50 {
                        log.line(format!(">> Worker {worker} line {n} {}", "x".repeat(64)));
                    }
                });
            }
        });

        let messages = buffer.messages();
        assert_eq!(messages.len(), 8 * 50);
        for message in messages {
            assert!(message.starts_with(">> Worker "), "{message}");
            assert!(message.ends_with(&"x".repeat(64)), "{message}");
        }
    }

    #[test]
    fn open_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("svnmdump.log");
        std::fs::write(&path, "earlier run\n").unwrap();

        let log = RunLog::open(&path).unwrap();
        log.line("second run");
        drop(log);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("earlier run\n"));
        assert!(content.trim_end().ends_with("second run"));
    }
}
