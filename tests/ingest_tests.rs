//! Integration tests for the ingestion pipeline
//!
//! These tests drive the worker pool and batch consumer against wiremock
//! image endpoints and real SQLite databases, checking the quota and
//! persistence properties end to end.

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, RgbImage};
use petsnap::crawler::ProxyPool;
use petsnap::pipeline::{build_limiter, run_batcher, run_worker, QuotaGate, WorkerContext};
use petsnap::storage::{ImageRecord, ImageStore, SqliteImageStore, StoreError, StoreResult};
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Valid JPEG bytes for mock image endpoints
fn jpeg_bytes() -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(320, 240, image::Rgb([120, 80, 40])));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
    buf.into_inner()
}

async fn mock_image_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/img.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(jpeg_bytes())
                .insert_header("content-type", "image/jpeg"),
        )
        .mount(&server)
        .await;
    server
}

fn worker_context(
    gate: Arc<QuotaGate>,
    save_dir: &Path,
    result_tx: mpsc::Sender<ImageRecord>,
) -> Arc<WorkerContext> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();
    Arc::new(WorkerContext {
        gate,
        limiter: build_limiter(1_000),
        proxies: Arc::new(ProxyPool::new("https://proxies.invalid/")),
        save_dir: save_dir.to_path_buf(),
        client,
        result_tx,
    })
}

/// Feeds `urls` through a pool of workers and returns (saved count, emitted records)
async fn run_pool(urls: Vec<String>, target: u64, workers: usize, save_dir: &Path) -> (u64, Vec<ImageRecord>) {
    let gate = Arc::new(QuotaGate::new(target));
    let (url_tx, url_rx) = mpsc::channel(1_000);
    let (result_tx, mut result_rx) = mpsc::channel(1_000);
    let ctx = worker_context(Arc::clone(&gate), save_dir, result_tx);
    let url_rx = Arc::new(tokio::sync::Mutex::new(url_rx));

    let mut handles = Vec::new();
    for _ in 0..workers {
        handles.push(tokio::spawn(run_worker(
            Arc::clone(&ctx),
            Arc::clone(&url_rx),
        )));
    }
    drop(ctx);

    for url in urls {
        url_tx.send(url).await.unwrap();
    }
    drop(url_tx);

    for handle in handles {
        handle.await.unwrap();
    }

    let mut records = Vec::new();
    while let Some(record) = result_rx.recv().await {
        records.push(record);
    }
    (gate.saved(), records)
}

fn saved_file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn test_worker_pool_saves_exactly_target_count() {
    let server = mock_image_server().await;
    let save_dir = tempfile::tempdir().unwrap();

    // More URLs than quota: the gate must cap the saved files
    let urls: Vec<String> = (0..12).map(|_| format!("{}/img.jpg", server.uri())).collect();
    let (saved, records) = run_pool(urls, 5, 4, save_dir.path()).await;

    assert_eq!(saved, 5);
    assert_eq!(records.len(), 5);
    assert_eq!(saved_file_count(save_dir.path()), 5);
    for record in &records {
        assert!(record.file.ends_with(".jpg"));
        assert!(save_dir.path().join(&record.file).exists());
    }
}

#[tokio::test]
async fn test_target_zero_saves_nothing() {
    let server = mock_image_server().await;
    let save_dir = tempfile::tempdir().unwrap();

    let urls: Vec<String> = (0..4).map(|_| format!("{}/img.jpg", server.uri())).collect();
    let (saved, records) = run_pool(urls, 0, 2, save_dir.path()).await;

    assert_eq!(saved, 0);
    assert!(records.is_empty());
    assert_eq!(saved_file_count(save_dir.path()), 0);
}

#[tokio::test]
async fn test_undecodable_body_is_abandoned() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/not-an-image"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>search result page</body></html>")
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;
    let save_dir = tempfile::tempdir().unwrap();

    let urls: Vec<String> = (0..3)
        .map(|_| format!("{}/not-an-image", server.uri()))
        .collect();
    let (saved, records) = run_pool(urls, 3, 2, save_dir.path()).await;

    assert_eq!(saved, 0);
    assert!(records.is_empty());
    assert_eq!(saved_file_count(save_dir.path()), 0);
}

#[tokio::test]
async fn test_unreachable_url_is_abandoned() {
    let save_dir = tempfile::tempdir().unwrap();

    let urls = vec!["http://127.0.0.1:1/img.jpg".to_string()];
    let (saved, records) = run_pool(urls, 1, 1, save_dir.path()).await;

    assert_eq!(saved, 0);
    assert!(records.is_empty());
    assert_eq!(saved_file_count(save_dir.path()), 0);
}

#[tokio::test]
async fn test_end_to_end_pool_to_store() {
    let server = mock_image_server().await;
    let save_dir = tempfile::tempdir().unwrap();
    let db_dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn ImageStore> =
        Arc::new(SqliteImageStore::new(&db_dir.path().join("petsnap.db")).unwrap());

    let gate = Arc::new(QuotaGate::new(5));
    let (url_tx, url_rx) = mpsc::channel(100);
    let (result_tx, result_rx) = mpsc::channel(100);
    let ctx = worker_context(Arc::clone(&gate), save_dir.path(), result_tx);
    let url_rx = Arc::new(tokio::sync::Mutex::new(url_rx));

    let mut workers = Vec::new();
    for _ in 0..4 {
        workers.push(tokio::spawn(run_worker(
            Arc::clone(&ctx),
            Arc::clone(&url_rx),
        )));
    }
    drop(ctx);
    let batcher = tokio::spawn(run_batcher(
        Arc::clone(&store),
        result_rx,
        Duration::from_millis(50),
    ));

    // Deterministic source: five valid image URLs, then the queue closes
    for _ in 0..5 {
        url_tx.send(format!("{}/img.jpg", server.uri())).await.unwrap();
    }
    drop(url_tx);

    for handle in workers {
        handle.await.unwrap();
    }
    batcher.await.unwrap();

    assert_eq!(gate.saved(), 5);
    assert_eq!(saved_file_count(save_dir.path()), 5);

    // All five records made it to the store, in some order
    let page = store.list_page(0).await.unwrap();
    assert_eq!(page.len(), 5);
    for record in &page {
        assert!(save_dir.path().join(&record.file).exists());
    }
}

/// Store whose writes always fail
#[derive(Default)]
struct FailingStore {
    append_attempts: AtomicUsize,
}

#[async_trait]
impl ImageStore for FailingStore {
    async fn append_batch(&self, _records: &[ImageRecord]) -> StoreResult<()> {
        self.append_attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Database("store offline".to_string()))
    }

    async fn list_page(&self, _offset: u64) -> StoreResult<Vec<ImageRecord>> {
        Err(StoreError::Database("store offline".to_string()))
    }
}

#[tokio::test]
async fn test_ingestion_completes_when_store_always_fails() {
    let server = mock_image_server().await;
    let save_dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FailingStore::default());

    let gate = Arc::new(QuotaGate::new(3));
    let (url_tx, url_rx) = mpsc::channel(100);
    let (result_tx, result_rx) = mpsc::channel(100);
    let ctx = worker_context(Arc::clone(&gate), save_dir.path(), result_tx);
    let url_rx = Arc::new(tokio::sync::Mutex::new(url_rx));

    let mut workers = Vec::new();
    for _ in 0..2 {
        workers.push(tokio::spawn(run_worker(
            Arc::clone(&ctx),
            Arc::clone(&url_rx),
        )));
    }
    drop(ctx);
    let failing = Arc::clone(&store);
    let batcher = tokio::spawn(run_batcher(
        failing as Arc<dyn ImageStore>,
        result_rx,
        Duration::from_millis(50),
    ));

    for _ in 0..3 {
        url_tx.send(format!("{}/img.jpg", server.uri())).await.unwrap();
    }
    drop(url_tx);

    for handle in workers {
        handle.await.unwrap();
    }
    batcher.await.unwrap();

    // Files are saved even though nothing was durably stored
    assert_eq!(gate.saved(), 3);
    assert_eq!(saved_file_count(save_dir.path()), 3);
    assert!(store.append_attempts.load(Ordering::SeqCst) >= 1);
}
