//! Fetch-decode-resize-save workers
//!
//! A large pool of identical workers drains the shared URL queue. Each worker
//! rate-limits itself, fetches the URL (via a random proxy when the pool has
//! one), decodes the body as an image, resizes it to a fixed width, and saves
//! it as JPEG under the quota gate. Any per-URL failure drops that URL with a
//! debug log; nothing here is retried or fatal.

use crate::crawler::ProxyPool;
use crate::pipeline::quota::QuotaGate;
use crate::storage::ImageRecord;
use chrono::Utc;
use governor::{Quota, RateLimiter};
use image::imageops::FilterType;
use image::ImageFormat;
use rand::Rng;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

/// Per-request timeout for image and search-page fetches
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(2);

/// Target width of saved images; height follows the aspect ratio
pub const IMAGE_WIDTH: u32 = 100;

/// Direct (unkeyed, in-process) token-bucket limiter
pub type DirectRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Builds the shared token-bucket limiter: `per_second` operations/second
/// with a burst of the same size
pub fn build_limiter(per_second: u32) -> Arc<DirectRateLimiter> {
    let rate = NonZeroU32::new(per_second).expect("rate_limit must be > 0");
    let quota = Quota::per_second(rate).allow_burst(rate);
    Arc::new(RateLimiter::direct(quota))
}

/// State shared by every worker in the pool
pub struct WorkerContext {
    pub gate: Arc<QuotaGate>,
    pub limiter: Arc<DirectRateLimiter>,
    pub proxies: Arc<ProxyPool>,
    pub save_dir: PathBuf,
    pub client: reqwest::Client,
    pub result_tx: mpsc::Sender<ImageRecord>,
}

/// One worker: drains the shared URL queue until it closes
///
/// The receiver sits behind a mutex so the whole pool competes for the same
/// queue; the lock is held only for the duration of one `recv`.
pub async fn run_worker(ctx: Arc<WorkerContext>, urls: Arc<Mutex<mpsc::Receiver<String>>>) {
    loop {
        let url = {
            let mut urls = urls.lock().await;
            urls.recv().await
        };
        let Some(url) = url else {
            break;
        };

        // Wait for the rate limiter
        ctx.limiter.until_ready().await;

        if let Err(e) = process_url(&ctx, &url).await {
            debug!("dropping {url}: {e}");
        }
    }
}

/// Converts one URL into zero or one saved file
async fn process_url(ctx: &WorkerContext, url: &str) -> crate::Result<()> {
    let file = unique_filename();
    let full_path = ctx.save_dir.join(&file);

    let bytes = match ctx.proxies.pick() {
        Some(proxy) => {
            let proxied = reqwest::Client::builder()
                .proxy(reqwest::Proxy::all(&proxy)?)
                .timeout(FETCH_TIMEOUT)
                .build()?;
            proxied.get(url).send().await?.bytes().await?
        }
        None => ctx.client.get(url).send().await?.bytes().await?,
    };

    let img = image::load_from_memory(&bytes)?;
    let resized = img.resize(IMAGE_WIDTH, u32::MAX, FilterType::Lanczos3);

    // The gate's lock serializes the write and the counter increment across
    // the whole pool; nothing in this block may await.
    let saved = {
        let Some(permit) = ctx.gate.begin_save() else {
            // Quota met while this URL was in flight; self-abandon.
            return Ok(());
        };
        if let Err(e) = resized.save_with_format(&full_path, ImageFormat::Jpeg) {
            let _ = std::fs::remove_file(&full_path);
            return Err(e.into());
        }
        permit.commit()
    };

    info!("downloaded {saved} images");
    let _ = ctx.result_tx.send(ImageRecord::new(file)).await;
    Ok(())
}

/// Time-based filename with a bounded random suffix to avoid collisions
fn unique_filename() -> String {
    let stamp = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros());
    let suffix: i64 = rand::thread_rng().gen_range(0..9999);
    format!("{}.jpg", stamp + suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_filenames_do_not_collide() {
        let a = unique_filename();
        let b = unique_filename();
        assert!(a.ends_with(".jpg"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_limiter_allows_burst_up_to_rate() {
        let limiter = build_limiter(10);
        for _ in 0..10 {
            assert!(limiter.check().is_ok());
        }
        // Bucket exhausted until tokens replenish
        assert!(limiter.check().is_err());
    }
}
