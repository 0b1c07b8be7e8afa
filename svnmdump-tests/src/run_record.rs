// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

//! Reads run log messages (timestamps already stripped) back into events.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    Started { worker: usize, origin: String },
    Output { worker: usize, origin: String, line: String },
    Error { worker: usize, origin: String, line: String },
    Finished { worker: usize, origin: String },
    Exited { worker: usize },
    Other(String),
}

pub fn parse(message: &str) -> RunEvent {
    let other = || RunEvent::Other(message.to_string());

    let (is_error, rest) = if let Some(rest) = message.strip_prefix(">> Worker ") {
        (false, rest)
    } else if let Some(rest) = message.strip_prefix("!! Worker ") {
        (true, rest)
    } else {
        return other();
    };
    let Some((id, rest)) = rest.split_once(' ') else {
        return other();
    };
    let Ok(worker) = id.parse() else {
        return other();
    };

    if let Some(origin) = rest.strip_prefix("is working on ") {
        return RunEvent::Started {
            worker,
            origin: origin.trim_matches('"').to_string(),
        };
    }
    if let Some(rest) = rest.strip_prefix("has finished with \"") {
        if let Some((origin, _)) = rest.split_once("\" - runtime") {
            return RunEvent::Finished {
                worker,
                origin: origin.to_string(),
            };
        }
    }
    if rest == "has exited" {
        return RunEvent::Exited { worker };
    }
    if let Some(rest) = rest.strip_prefix('[') {
        if let Some((origin, line)) = rest.split_once("]: ") {
            let (origin, line) = (origin.to_string(), line.to_string());
            return if is_error {
                RunEvent::Error { worker, origin, line }
            } else {
                RunEvent::Output { worker, origin, line }
            };
        }
    }
    other()
}

#[derive(Debug, Clone, Default)]
pub struct RunRecord {
    pub events: Vec<RunEvent>,
}

impl RunRecord {
    pub fn from_messages<S: AsRef<str>>(messages: &[S]) -> Self {
        Self {
            events: messages.iter().map(|m| parse(m.as_ref())).collect(),
        }
    }

    /// Origins in the order the workers picked them up.
    pub fn started(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RunEvent::Started { origin, .. } => Some(origin.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn finished(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RunEvent::Finished { origin, .. } => Some(origin.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn exited_workers(&self) -> Vec<usize> {
        let mut ids: Vec<_> = self
            .events
            .iter()
            .filter_map(|e| match e {
                RunEvent::Exited { worker } => Some(*worker),
                _ => None,
            })
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Error lines logged for the job whose origin contains `needle`.
    pub fn errors_for(&self, needle: &str) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RunEvent::Error { origin, line, .. } if origin.contains(needle) => {
                    Some(line.as_str())
                }
                _ => None,
            })
            .collect()
    }

    /// Most jobs between their start and finish records at any point.
    pub fn peak_concurrency(&self) -> usize {
        let mut running = 0usize;
        let mut peak = 0;
        for event in &self.events {
            match event {
                RunEvent::Started { .. } => {
                    running += 1;
                    peak = peak.max(running);
                }
                RunEvent::Finished { .. } => running = running.saturating_sub(1),
                _ => {}
            }
        }
        peak
    }

    /// Every job record of a worker lies between its first start and its
    /// exit record.
    pub fn worker_exited_last(&self, worker: usize) -> bool {
        let exited_at = self
            .events
            .iter()
            .position(|e| *e == RunEvent::Exited { worker });
        let last_job = self.events.iter().rposition(|e| match e {
            RunEvent::Started { worker: w, .. }
            | RunEvent::Output { worker: w, .. }
            | RunEvent::Error { worker: w, .. }
            | RunEvent::Finished { worker: w, .. } => *w == worker,
            _ => false,
        });
        match (exited_at, last_job) {
            (Some(exit), Some(job)) => exit > job,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}
