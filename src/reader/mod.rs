//! Paginated wraparound reader
//!
//! Streams a caller-specified number of stored records over a bounded
//! channel, reading the store in fixed-size pages with an offset cursor. An
//! empty page wraps the cursor back to zero, treating the store as circular
//! so a caller may request more records than currently exist. Page reads are
//! bounded by a short timeout; errors and timeouts count as empty pages, and
//! a run of fruitless pages closes the stream early instead of spinning
//! against a dead store.

use crate::storage::{ImageRecord, ImageStore, PAGE_SIZE};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, warn};

/// Per-page read timeout
pub const PAGE_TIMEOUT: Duration = Duration::from_millis(100);

/// Consecutive fruitless pages (empty, errored, or timed out) before the
/// reader gives up; an emitted record resets the streak
pub const MAX_FRUITLESS_PAGES: u32 = 15;

const CHANNEL_CAPACITY: usize = 50;

/// Streams `count` records from the store
///
/// Returns the receiving half of a bounded channel; the stream is finite and
/// not restartable. The channel closes when `count` records have been
/// emitted, when the caller drops the receiver, or when the give-up rule
/// fires. A `count` of zero closes immediately.
pub fn read_records(store: Arc<dyn ImageStore>, count: u64) -> mpsc::Receiver<ImageRecord> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    tokio::spawn(read_loop(store, count, tx));
    rx
}

async fn read_loop(store: Arc<dyn ImageStore>, count: u64, tx: mpsc::Sender<ImageRecord>) {
    if count == 0 {
        return;
    }

    let mut emitted: u64 = 0;
    let mut offset: u64 = 0;
    let mut fruitless: u32 = 0;

    loop {
        let page = match tokio::time::timeout(PAGE_TIMEOUT, store.list_page(offset)).await {
            Ok(Ok(page)) => page,
            Ok(Err(e)) => {
                error!("page read at offset {offset} failed: {e}");
                Vec::new()
            }
            Err(_) => {
                error!("page read at offset {offset} timed out");
                Vec::new()
            }
        };

        if page.is_empty() {
            fruitless += 1;
            if fruitless >= MAX_FRUITLESS_PAGES {
                warn!(
                    "store yielded nothing for {fruitless} consecutive pages, \
                     closing stream after {emitted} of {count} records"
                );
                return;
            }
            // Wraparound: treat the store as circular
            offset = 0;
            continue;
        }
        fruitless = 0;

        for record in page {
            if tx.send(record).await.is_err() {
                return;
            }
            emitted += 1;
            if emitted >= count {
                return;
            }
        }
        offset += PAGE_SIZE;
    }
}
