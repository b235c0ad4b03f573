use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use reqwest::Client;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;
use url::Url;

use crate::config::CrawlConfig;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP client setup failed: {0}")]
    Client(#[source] reqwest::Error),
    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

/// One fetched page: the final URL after redirects (the resolution base
/// for everything on the page) and the raw body.
pub struct FetchedPage {
    pub url: Url,
    pub body: String,
}

/// Rate-limited page fetcher. One instance per crawl; the lock table is
/// never shared across crawls, so concurrent crawls of the same host do
/// not coordinate with each other.
pub struct PoliteFetcher {
    client: Client,
    min_delay: Duration,
    hosts: DashMap<String, Arc<Mutex<Option<Instant>>>>,
}

impl PoliteFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            min_delay: Duration::from_millis(config.min_delay_per_host_ms),
            hosts: DashMap::new(),
        })
    }

    /// Fetches one page, spacing successive fetch *starts* to the same
    /// host by at least the configured delay. The host lock is released
    /// before the request goes on the wire, so slow responses may still
    /// overlap; only start times are throttled.
    pub async fn fetch(&self, url: &str, host: &str) -> Result<FetchedPage, FetchError> {
        let slot = self.hosts.entry(host.to_string()).or_default().clone();

        {
            let mut last_start = slot.lock().await;
            if let Some(prev) = *last_start {
                let elapsed = prev.elapsed();
                if elapsed < self.min_delay {
                    trace!(host, wait_ms = (self.min_delay - elapsed).as_millis() as u64, "throttling");
                    tokio::time::sleep(self.min_delay - elapsed).await;
                }
            }
            *last_start = Some(Instant::now());
        }

        let response = self.client.get(url).send().await?;
        let final_url = response.url().clone();
        let body = response.text().await?;

        Ok(FetchedPage {
            url: final_url,
            body,
        })
    }
}
