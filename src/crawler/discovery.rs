//! URL discovery loop
//!
//! One task repeatedly samples a search backend and a query, fetches the
//! search page, and pushes every extracted image URL onto the bounded URL
//! queue. The push blocks when the queue is full, which is the pipeline's
//! backpressure point against an unbounded producer. The loop runs until the
//! pipeline's cancellation token fires, then drops its queue sender to signal
//! downstream completion.

use crate::crawler::engines::{random_query, SearchEngine};
use scraper::{Html, Selector};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Extracts all candidate image URLs from one search response body
///
/// Pure function over the HTML so the parsed document never crosses an await
/// point (scraper's DOM is not Send).
pub fn extract_image_urls(engine: SearchEngine, html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = match Selector::parse(engine.selector()) {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|element| engine.extract(&element))
        .collect()
}

/// Runs the crawler loop until cancelled
///
/// Per iteration: sample engine and query independently, fetch the search
/// page (the client carries a short per-request timeout), extract image URLs,
/// and push each onto the queue. Visit errors are logged and the iteration is
/// skipped; the same search URL is never retried.
pub async fn run_crawler(
    client: reqwest::Client,
    url_tx: mpsc::Sender<String>,
    cancel: CancellationToken,
) {
    'crawl: while !cancel.is_cancelled() {
        let engine = SearchEngine::random();
        let query = random_query();
        let search_url = engine.search_url(query);
        info!("scraping {} for '{}'", engine.name(), query);

        let response = tokio::select! {
            _ = cancel.cancelled() => break 'crawl,
            response = fetch_page(&client, &search_url) => response,
        };

        let body = match response {
            Ok(body) => body,
            Err(e) => {
                warn!("visit to {} failed: {e}", engine.name());
                continue;
            }
        };

        for url in extract_image_urls(engine, &body) {
            tokio::select! {
                _ = cancel.cancelled() => break 'crawl,
                sent = url_tx.send(url) => {
                    // Receiver gone means the workers are done; stop producing.
                    if sent.is_err() {
                        break 'crawl;
                    }
                }
            }
        }
    }

    info!("finished discovering image urls");
    // url_tx drops here, closing the queue for the workers
}

async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String, reqwest::Error> {
    client.get(url).send().await?.text().await
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOGLE_PAGE: &str = r#"
        <html><body>
        <img src="https://example.com/a.jpg">
        <img alt="decorative">
        <img src="https://example.com/b.jpg">
        </body></html>"#;

    const BING_PAGE: &str = r#"
        <html><body>
        <a class="iusc" m='{"murl":"https://example.com/c.jpg"}'>x</a>
        <a class="iusc" m='{"turl":"no-murl"}'>y</a>
        <a href="/other">plain link</a>
        </body></html>"#;

    #[test]
    fn test_extract_google_urls() {
        let urls = extract_image_urls(SearchEngine::Google, GOOGLE_PAGE);
        assert_eq!(
            urls,
            vec![
                "https://example.com/a.jpg".to_string(),
                "https://example.com/b.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn test_extract_bing_urls() {
        let urls = extract_image_urls(SearchEngine::Bing, BING_PAGE);
        assert_eq!(urls, vec!["https://example.com/c.jpg".to_string()]);
    }

    #[test]
    fn test_extract_from_empty_page() {
        assert!(extract_image_urls(SearchEngine::Google, "<html></html>").is_empty());
        assert!(extract_image_urls(SearchEngine::Bing, "").is_empty());
    }

    #[tokio::test]
    async fn test_crawler_stops_on_cancellation() {
        let client = reqwest::Client::new();
        let (url_tx, _url_rx) = mpsc::channel(10);
        let cancel = CancellationToken::new();
        cancel.cancel();

        // Already-cancelled token: the loop must exit without visiting anything.
        run_crawler(client, url_tx, cancel).await;
    }
}
