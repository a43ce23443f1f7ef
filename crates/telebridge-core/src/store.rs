//! Accumulating telemetry store.
//!
//! One producer per session appends raw reports; scrape requests drain them.
//! `append` and the take inside `drain_normalized` share a single mutex, so a
//! report is returned by exactly one drain. The lock is never held across an
//! `.await` (there are none in here) and normalization runs after it is
//! released.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::normalize::strip_agent_label;

#[derive(Debug, Default)]
pub struct TelemetryStore {
    reports: Mutex<Vec<String>>,
}

impl TelemetryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave a half-pushed entry, so a
    // poisoned guard is still consistent.
    fn reports(&self) -> MutexGuard<'_, Vec<String>> {
        self.reports.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add one raw report to the tail.
    pub fn append(&self, report: impl Into<String>) {
        self.reports().push(report.into());
    }

    /// Take every report in insertion order, normalized, leaving the store empty.
    pub fn drain_normalized(&self) -> Vec<String> {
        let taken = std::mem::take(&mut *self.reports());
        tracing::debug!(reports = taken.len(), "telemetry store drained");

        taken
            .into_iter()
            .map(|report| strip_agent_label(&report).into_owned())
            .collect()
    }

    /// Number of reports waiting for the next drain.
    pub fn len(&self) -> usize {
        self.reports().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
