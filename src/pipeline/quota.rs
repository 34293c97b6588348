//! Quota gate
//!
//! Shared state bounding the number of successful saves in one pipeline run.
//! `begin_save` hands out a permit only while the counter is below the
//! target; the permit holds the gate's lock, serializing the file write and
//! the counter increment pipeline-wide. `commit` increments the counter and
//! fires the run's cancellation token exactly once when the target is
//! reached.

use std::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

/// Gate enforcing an upper bound on successful saves
pub struct QuotaGate {
    target: u64,
    saved: Mutex<u64>,
    cancel: CancellationToken,
}

/// Exclusive permission to write one file and count it
///
/// Holds the gate's lock until committed or dropped. Dropping without
/// committing releases the lock without consuming quota (the save failed).
/// The critical section must not await.
pub struct SavePermit<'a> {
    gate: &'a QuotaGate,
    guard: MutexGuard<'a, u64>,
}

impl QuotaGate {
    /// Creates a gate for one run. A target of zero is already met: the
    /// cancellation token fires at construction and no permit is ever issued.
    pub fn new(target: u64) -> Self {
        let cancel = CancellationToken::new();
        if target == 0 {
            cancel.cancel();
        }
        Self {
            target,
            saved: Mutex::new(0),
            cancel,
        }
    }

    /// The run-wide cancellation token, fired when the quota is met
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    /// Snapshot of the saved counter
    pub fn saved(&self) -> u64 {
        *self.saved.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Takes the gate's lock and returns a permit if the counter is still
    /// below the target; `None` once the quota is met
    pub fn begin_save(&self) -> Option<SavePermit<'_>> {
        let guard = self.saved.lock().unwrap_or_else(|e| e.into_inner());
        if *guard >= self.target {
            None
        } else {
            Some(SavePermit { gate: self, guard })
        }
    }
}

impl SavePermit<'_> {
    /// Counts the save and returns the new total, cancelling the run when the
    /// target is reached
    pub fn commit(mut self) -> u64 {
        *self.guard += 1;
        let saved = *self.guard;
        if saved == self.gate.target {
            self.gate.cancel.cancel();
        }
        saved
    }
}
