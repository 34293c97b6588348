//! Proxy pool
//!
//! Maintains a best-effort list of outbound HTTP proxies scraped from a
//! public proxy-list page. The list is replaced wholesale on every refresh;
//! workers take a brief shared lock to draw a random entry. Any refresh
//! failure clears the list so workers fall back to direct connections.

use rand::seq::SliceRandom;
use scraper::{Html, Selector};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Shared pool of proxy endpoint strings (`http://ip:port`)
pub struct ProxyPool {
    source_url: String,
    proxies: RwLock<Vec<String>>,
}

impl ProxyPool {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            proxies: RwLock::new(Vec::new()),
        }
    }

    /// Attempts one refresh: fetch the proxy-list page and swap in the parsed
    /// entries. On any error the list is cleared and a warning is logged;
    /// refresh failures are never fatal.
    pub async fn refresh(&self, client: &reqwest::Client) {
        match self.fetch_proxies(client).await {
            Ok(proxies) => {
                debug!("refreshed proxy list ({} entries)", proxies.len());
                if let Ok(mut list) = self.proxies.write() {
                    *list = proxies;
                }
            }
            Err(e) => {
                warn!("failed to fetch new proxies: {e}");
                warn!("running without proxies until the next refresh");
                if let Ok(mut list) = self.proxies.write() {
                    list.clear();
                }
            }
        }
    }

    async fn fetch_proxies(&self, client: &reqwest::Client) -> Result<Vec<String>, reqwest::Error> {
        let body = client
            .get(&self.source_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(parse_proxy_table(&body))
    }

    /// Draws one proxy uniformly at random; `None` when the list is empty
    pub fn pick(&self) -> Option<String> {
        let list = self.proxies.read().ok()?;
        list.choose(&mut rand::thread_rng()).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.read().map(|l| l.is_empty()).unwrap_or(true)
    }

    #[cfg(test)]
    fn set_proxies(&self, proxies: Vec<String>) {
        *self.proxies.write().unwrap() = proxies;
    }
}

/// Parses `(ip, port)` pairs row-wise out of the proxy-list HTML table
///
/// Rows missing either cell are skipped; a page with no matching table yields
/// an empty list.
pub fn parse_proxy_table(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let row_selector = match Selector::parse("table.table tr") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };
    let cell_selector = match Selector::parse("td") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let mut proxies = Vec::new();
    for row in document.select(&row_selector) {
        let mut cells = row.select(&cell_selector);
        let ip: String = match cells.next() {
            Some(cell) => cell.text().collect::<String>().trim().to_string(),
            None => continue,
        };
        let port: String = match cells.next() {
            Some(cell) => cell.text().collect::<String>().trim().to_string(),
            None => continue,
        };
        if !ip.is_empty() && !port.is_empty() {
            proxies.push(format!("http://{}:{}", ip, port));
        }
    }
    proxies
}

/// Periodic proxy refresher, owned by the pipeline's lifecycle
///
/// Refreshes immediately, then once per interval, until the pipeline's
/// cancellation token fires (quota met).
pub async fn run_refresher(
    pool: Arc<ProxyPool>,
    client: reqwest::Client,
    interval: Duration,
    cancel: CancellationToken,
) {
    loop {
        if cancel.is_cancelled() {
            return;
        }
        pool.refresh(&client).await;

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(interval) => {}
        }
    }
}
