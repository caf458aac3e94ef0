//! Per-cycle audit trail.

use std::fmt;

use tracing::{debug, info, warn};

/// Separator placed between entries when the log is rendered as one line.
pub const LOG_SEPARATOR: &str = " | ";

/// Ordered, human-readable diagnostics produced during one cycle.
///
/// Every entry is mirrored to `tracing` so a subscriber sees the same trail
/// as the caller. Plain entries go out at `debug`, issued controls at `info`,
/// and conditions an operator should look at at `warn`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleLog {
    entries: Vec<String>,
}

impl CycleLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a diagnostic entry.
    pub fn push(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        debug!(target: "vvc", "{entry}");
        self.entries.push(entry);
    }

    /// Appends an entry describing an issued control.
    pub fn control(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        info!(target: "vvc", "{entry}");
        self.entries.push(entry);
    }

    /// Appends an entry that warrants operator attention.
    pub fn alarm(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        warn!(target: "vvc", "{entry}");
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries containing `needle`.
    pub fn count_matching(&self, needle: &str) -> usize {
        self.entries.iter().filter(|e| e.contains(needle)).count()
    }

    /// Returns `true` if any entry contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.count_matching(needle) > 0
    }
}

impl fmt::Display for CycleLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.entries.join(LOG_SEPARATOR))
    }
}
