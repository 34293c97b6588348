//! Batch persistence consumer
//!
//! A single task accumulates saved-file records from the result queue and
//! flushes the whole accumulator as one batch write on a fixed interval.
//! Flush failures are logged and the batch is dropped; persistence is
//! at-most-once, best-effort. When the result queue closes, the tail batch
//! gets one final flush attempt before the task exits.

use crate::storage::{ImageRecord, ImageStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error};

/// Interval between batch flush attempts
pub const FLUSH_INTERVAL: Duration = Duration::from_secs(1);

/// Runs the consumer until the result queue closes and the tail is flushed
pub async fn run_batcher(
    store: Arc<dyn ImageStore>,
    mut results: mpsc::Receiver<ImageRecord>,
    flush_interval: Duration,
) {
    let mut batch: Vec<ImageRecord> = Vec::new();
    let mut ticker = tokio::time::interval(flush_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            record = results.recv() => match record {
                Some(record) => batch.push(record),
                None => break,
            },
            _ = ticker.tick() => flush(store.as_ref(), &mut batch).await,
        }
    }

    // Queue closed: flush whatever arrived since the last tick
    flush(store.as_ref(), &mut batch).await;
}

/// One flush attempt; the accumulator is emptied whether or not it succeeds
async fn flush(store: &dyn ImageStore, batch: &mut Vec<ImageRecord>) {
    if batch.is_empty() {
        return;
    }
    match store.append_batch(batch).await {
        Ok(()) => debug!("flushed {} records", batch.len()),
        Err(e) => error!("batch flush failed, dropping {} records: {e}", batch.len()),
    }
    batch.clear();
}
