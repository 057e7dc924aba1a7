//! Combat log captured during a single iteration

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Simulation time in seconds
    pub time: f64,
    pub unit: String,
    pub message: String,
}

/// Ordered list of combat events, kept only when requested
#[derive(Debug, Clone, Default)]
pub struct CombatLog {
    entries: Vec<LogEntry>,
}

impl CombatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, time: Duration, unit: &str, message: String) {
        self.entries.push(LogEntry {
            time: time.as_secs_f64(),
            unit: unit.to_string(),
            message,
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:>7.2}] {}: {}", self.time, self.unit, self.message)
    }
}
