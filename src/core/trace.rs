//! Committed-transition trace.
//!
//! The machine appends one record per committed transition. The trace is
//! diagnostics only: the "previous state" pointer used by dynamic targets
//! lives on the machine itself, not here.

use super::event::EventId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single committed transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    /// Display name of the state exited.
    pub from: String,
    /// Display name of the state entered.
    pub to: String,
    /// The triggering event, or `None` for a pull evaluation.
    pub event: Option<EventId>,
    /// When the transition committed.
    pub timestamp: DateTime<Utc>,
}

/// Ordered trace of committed transitions.
///
/// # Example
///
/// ```rust
/// use flywheel::{TraceRecord, TransitionTrace};
/// use chrono::Utc;
///
/// let mut trace = TransitionTrace::new();
/// trace.record(TraceRecord {
///     from: "Idle".to_string(),
///     to: "Walk".to_string(),
///     event: None,
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(trace.path(), vec!["Idle", "Walk"]);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransitionTrace {
    records: Vec<TraceRecord>,
}

impl TransitionTrace {
    /// Create an empty trace.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append a record.
    pub fn record(&mut self, record: TraceRecord) {
        self.records.push(record);
    }

    /// All records, in commit order.
    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    /// The path of state names traversed: the first record's source, then the
    /// destination of every record.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.records.first() {
            path.push(first.from.as_str());
        }
        for record in &self.records {
            path.push(record.to.as_str());
        }
        path
    }

    /// Elapsed time between the first and last committed transition, or
    /// `None` for an empty trace.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.first()?, self.records.last()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    /// Drop all records.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Serialize the trace to JSON, for export into external tooling.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
