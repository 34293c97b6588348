//! Ingestion pipeline
//!
//! Wires the stages together for one run: the crawler feeds the bounded URL
//! queue, the worker pool drains it under a shared rate limiter and quota
//! gate, and the batch consumer micro-batches saved paths into the store. A
//! single cancellation token, owned by the quota gate, stops the crawler and
//! the proxy refresher once the target count is reached; in-flight workers
//! drain to completion and self-abandon at the gate.

mod batcher;
mod quota;
mod worker;

pub use batcher::{run_batcher, FLUSH_INTERVAL};
pub use quota::{QuotaGate, SavePermit};
pub use worker::{
    build_limiter, run_worker, DirectRateLimiter, WorkerContext, FETCH_TIMEOUT, IMAGE_WIDTH,
};

use crate::config::Config;
use crate::crawler::{run_crawler, run_refresher, ProxyPool};
use crate::storage::ImageStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

/// One-run ingestion pipeline over a shared store
pub struct IngestPipeline {
    store: Arc<dyn ImageStore>,
    config: Config,
}

impl IngestPipeline {
    pub fn new(store: Arc<dyn ImageStore>, config: Config) -> Self {
        Self { store, config }
    }

    /// Runs ingestion until `target_count` images are saved, then returns the
    /// saved count
    ///
    /// With `use_proxy`, a periodic refresher keeps the proxy pool stocked
    /// for the duration of the run; without it, all fetches go direct.
    pub async fn run(&self, target_count: u64, use_proxy: bool) -> crate::Result<u64> {
        let ingest = &self.config.ingest;

        let gate = Arc::new(QuotaGate::new(target_count));
        let (url_tx, url_rx) = mpsc::channel::<String>(ingest.url_queue_capacity);
        let (result_tx, result_rx) = mpsc::channel(ingest.result_queue_capacity);
        let limiter = build_limiter(ingest.rate_limit);
        let proxies = Arc::new(ProxyPool::new(self.config.proxy.source_url.clone()));
        let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;

        let refresher = use_proxy.then(|| {
            tokio::spawn(run_refresher(
                Arc::clone(&proxies),
                client.clone(),
                Duration::from_secs(self.config.proxy.refresh_interval_secs),
                gate.token(),
            ))
        });

        let ctx = Arc::new(WorkerContext {
            gate: Arc::clone(&gate),
            limiter,
            proxies,
            save_dir: PathBuf::from(&ingest.save_dir),
            client: client.clone(),
            result_tx,
        });
        let url_rx = Arc::new(tokio::sync::Mutex::new(url_rx));

        let mut workers = Vec::with_capacity(ingest.workers);
        for _ in 0..ingest.workers {
            workers.push(tokio::spawn(run_worker(
                Arc::clone(&ctx),
                Arc::clone(&url_rx),
            )));
        }
        // The workers now hold the only references to the result sender; once
        // they drain the closed URL queue, the result queue closes too.
        drop(ctx);

        let crawler = tokio::spawn(run_crawler(client, url_tx, gate.token()));
        let batcher = tokio::spawn(run_batcher(
            Arc::clone(&self.store),
            result_rx,
            FLUSH_INTERVAL,
        ));

        let _ = crawler.await;
        for handle in workers {
            let _ = handle.await;
        }
        let _ = batcher.await;
        if let Some(handle) = refresher {
            let _ = handle.await;
        }

        info!("finished downloading and processing images");
        Ok(gate.saved())
    }
}
