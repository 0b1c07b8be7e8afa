// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

//! What to dump, decided from the youngest revision and the state files
//! left behind in the dump directory by earlier runs.
//!
//! - `state.full` holds the youngest revision at the time of the last full
//!   dump, `FULL.dump` the dump itself.
//! - `state.inc` holds `<from>-<to>` of the last incremental dump,
//!   `INC.dump` the dump itself. Every incremental dump starts right after
//!   the last full one, so it replaces the previous incremental.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use log::warn;

pub const STATE_FULL: &str = "state.full";
pub const STATE_INC: &str = "state.inc";
pub const FULL_DUMP: &str = "FULL.dump";
pub const INC_DUMP: &str = "INC.dump";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Full,
    Incremental,
}

impl Method {
    pub fn dump_file_name(&self) -> &'static str {
        match self {
            Method::Full => FULL_DUMP,
            Method::Incremental => INC_DUMP,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Full => write!(f, "FULL"),
            Method::Incremental => write!(f, "INCREMENTAL"),
        }
    }
}

/// Content of `state.full`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullState {
    Missing,
    /// The file exists but holds no revision.
    Unreadable,
    Revision(u64),
}

/// The first line made up of digits only, surrounding whitespace ignored.
pub fn parse_full_state(content: &str) -> Option<u64> {
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|line| line.parse().ok())
}

pub fn read_full_state(dump_dir: &Path) -> FullState {
    let path = dump_dir.join(STATE_FULL);
    match fs::read_to_string(&path) {
        Ok(content) => match parse_full_state(&content) {
            Some(rev) => FullState::Revision(rev),
            None => FullState::Unreadable,
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => FullState::Missing,
        Err(e) => {
            warn!("could not read {}: {e}", path.display());
            FullState::Unreadable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpPlan {
    /// Revisions `0..=youngest` into `FULL.dump`.
    Full { youngest: u64 },
    /// Revisions `from..=to` into `INC.dump`, `from` following the last full dump.
    Incremental { from: u64, to: u64 },
    /// The last full dump already covers the youngest revision.
    UpToDate { revision: u64 },
}

/// Decides the dump. The returned notes explain a switch from incremental
/// to full and are meant for stdout.
pub fn plan(method: Method, youngest: u64, full_state: FullState) -> (DumpPlan, Option<String>) {
    if method == Method::Full {
        return (DumpPlan::Full { youngest }, None);
    }

    match full_state {
        FullState::Missing => (
            DumpPlan::Full { youngest },
            Some("No record of FULL dump, switching method from INCREMENTAL to FULL".to_string()),
        ),
        FullState::Unreadable => (
            DumpPlan::Full { youngest },
            Some(format!(
                "No record of FULL dump on {STATE_FULL}, switching method from INCREMENTAL to FULL"
            )),
        ),
        FullState::Revision(full) if full > youngest => (
            DumpPlan::Full { youngest },
            Some(format!(
                "FULL dump revision {full} is newer than youngest revision {youngest}, \
                 switching method from INCREMENTAL to FULL"
            )),
        ),
        FullState::Revision(full) if full == youngest => {
            (DumpPlan::UpToDate { revision: full }, None)
        }
        FullState::Revision(full) => (
            DumpPlan::Incremental {
                from: full + 1,
                to: youngest,
            },
            None,
        ),
    }
}

impl DumpPlan {
    /// What gets written to the state file once the dump succeeded.
    pub fn state_record(&self) -> Option<(&'static str, String)> {
        match *self {
            DumpPlan::Full { youngest } => Some((STATE_FULL, youngest.to_string())),
            DumpPlan::Incremental { from, to } => Some((STATE_INC, format!("{from}-{to}"))),
            DumpPlan::UpToDate { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_state_takes_first_numeric_line() {
        assert_eq!(parse_full_state("42"), Some(42));
        assert_eq!(parse_full_state("\n  17 \n99\n"), Some(17));
        assert_eq!(parse_full_state("r17\n23\n"), Some(23));
        assert_eq!(parse_full_state("-3\n"), None);
        assert_eq!(parse_full_state(""), None);
    }

    #[test]
    fn full_mode_ignores_state() {
        let (p, note) = plan(Method::Full, 10, FullState::Revision(4));
        assert_eq!(p, DumpPlan::Full { youngest: 10 });
        assert_eq!(note, None);
        assert_eq!(p.state_record(), Some((STATE_FULL, "10".to_string())));
    }

    #[test]
    fn incremental_without_full_dump_falls_back() {
        for state in [FullState::Missing, FullState::Unreadable] {
            let (p, note) = plan(Method::Incremental, 7, state);
            assert_eq!(p, DumpPlan::Full { youngest: 7 });
            assert!(note.unwrap().contains("switching method from INCREMENTAL to FULL"));
        }
    }

    #[test]
    fn incremental_continues_after_full_dump() {
        let (p, note) = plan(Method::Incremental, 12, FullState::Revision(8));
        assert_eq!(p, DumpPlan::Incremental { from: 9, to: 12 });
        assert_eq!(note, None);
        assert_eq!(p.state_record(), Some((STATE_INC, "9-12".to_string())));
        assert_eq!(Method::Incremental.dump_file_name(), INC_DUMP);
    }

    #[test]
    fn nothing_to_increment() {
        let (p, _) = plan(Method::Incremental, 8, FullState::Revision(8));
        assert_eq!(p, DumpPlan::UpToDate { revision: 8 });
        assert_eq!(p.state_record(), None);
    }

    #[test]
    fn replaced_repository_gets_a_full_dump() {
        let (p, note) = plan(Method::Incremental, 3, FullState::Revision(8));
        assert_eq!(p, DumpPlan::Full { youngest: 3 });
        assert!(note.unwrap().contains("newer than youngest revision 3"));
    }

    #[test]
    fn state_file_is_read_from_dump_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_full_state(dir.path()), FullState::Missing);
        fs::write(dir.path().join(STATE_FULL), "garbage").unwrap();
        assert_eq!(read_full_state(dir.path()), FullState::Unreadable);
        fs::write(dir.path().join(STATE_FULL), "15").unwrap();
        assert_eq!(read_full_state(dir.path()), FullState::Revision(15));
    }
}
