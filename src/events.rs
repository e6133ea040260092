//! Session event log.
//!
//! Every degradation in the fetch and mapping pipelines (fallback
//! substitution, simulated mode, save failure) must be observable after the
//! fact, primarily to diagnose why mock data is being shown. Entries are
//! retained in memory for the duration of the session and surfaced by the
//! UI's debug console; warnings and errors are additionally forwarded to
//! the `log` facade.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::Serialize;

/// Severity of a logged event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A single timestamped event.
#[derive(Debug, Clone, Serialize)]
pub struct EventEntry {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub message: String,
}

/// In-memory event log shared by the pipelines of one session.
///
/// Interior mutability lets concurrent fetches append from `&self`; the
/// critical section is a single `Vec` push.
#[derive(Debug, Default)]
pub struct EventLog {
    entries: Mutex<Vec<EventEntry>>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and forward it to the `log` facade.
    pub fn record(&self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Warning => warn!("{}", message),
            Severity::Error => error!("{}", message),
            _ => info!("{}", message),
        }
        let entry = EventEntry {
            timestamp: Utc::now(),
            severity,
            message,
        };
        self.entries
            .lock()
            .expect("event log mutex poisoned")
            .push(entry);
    }

    /// Snapshot of all entries in insertion order.
    pub fn snapshot(&self) -> Vec<EventEntry> {
        self.entries
            .lock()
            .expect("event log mutex poisoned")
            .clone()
    }

    /// Number of entries recorded so far.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("event log mutex poisoned").len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discard all entries (a new search clears the previous session's log).
    pub fn clear(&self) {
        self.entries
            .lock()
            .expect("event log mutex poisoned")
            .clear();
    }
}
