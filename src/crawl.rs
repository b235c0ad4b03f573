use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use dashmap::DashSet;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::CrawlConfig;
use crate::extract::{extract_images, extract_links};
use crate::fetch::PoliteFetcher;
use crate::norm::{host_of, normalize};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// One not-yet-fetched page. Created when a link wins the visited
/// test-and-set, consumed when a worker picks it up, never mutated.
#[derive(Debug, Clone)]
struct FrontierEntry {
    url: String,
    depth: usize,
}

struct CrawlState {
    config: CrawlConfig,
    allowed_host: String,
    fetcher: PoliteFetcher,
    frontier: Mutex<VecDeque<FrontierEntry>>,
    visited: DashSet<String>,
    images: DashSet<String>,
    pages_attempted: AtomicUsize,
}

/// Single-host image crawler. Every call to [`Crawler::crawl_images`]
/// allocates its own frontier, visited/image sets, host lock table and
/// worker pool; concurrent crawls share nothing, not even politeness
/// clocks.
pub struct Crawler {
    config: CrawlConfig,
}

impl Crawler {
    pub fn new(config: CrawlConfig) -> Self {
        Self { config }
    }

    /// Crawls from `seed_url` and returns the deduplicated, ascending
    /// sorted set of absolute image URLs found within the configured
    /// depth and page budgets.
    ///
    /// Never fails: a blank, unparseable or hostless seed yields an
    /// empty vec with no network activity, and every per-page failure
    /// degrades to skipping that page. Dropping the returned future
    /// aborts outstanding workers; images already collected at that
    /// point are simply discarded with the rest of the state.
    pub async fn crawl_images(&self, seed_url: &str) -> Vec<String> {
        let seed = match normalize(seed_url) {
            Ok(seed) => seed,
            Err(err) => {
                debug!(seed_url, %err, "rejecting seed");
                return Vec::new();
            }
        };
        let Some(allowed_host) = host_of(&seed) else {
            return Vec::new();
        };

        let fetcher = match PoliteFetcher::new(&self.config) {
            Ok(f) => f,
            Err(err) => {
                warn!(%err, "cannot build fetch client");
                return Vec::new();
            }
        };

        let state = Arc::new(CrawlState {
            config: self.config.clone(),
            allowed_host,
            fetcher,
            frontier: Mutex::new(VecDeque::new()),
            visited: DashSet::new(),
            images: DashSet::new(),
            pages_attempted: AtomicUsize::new(0),
        });

        state.visited.insert(seed.clone());
        state.frontier.lock().await.push_back(FrontierEntry {
            url: seed.clone(),
            depth: 0,
        });

        let started = Instant::now();
        let max_threads = self.config.effective_threads();
        let mut workers: JoinSet<()> = JoinSet::new();

        loop {
            while workers.len() < max_threads {
                let mut frontier = state.frontier.lock().await;
                if state.pages_attempted.load(Ordering::Relaxed) >= state.config.max_pages {
                    // Nothing in the backlog may ever be admitted once the
                    // budget is spent; drop it so the drain condition below
                    // can be met.
                    frontier.clear();
                    break;
                }
                let Some(entry) = frontier.pop_front() else {
                    break;
                };
                drop(frontier);

                let state = Arc::clone(&state);
                workers.spawn(async move { crawl_one(state, entry).await });
            }

            if workers.is_empty() && state.frontier.lock().await.is_empty() {
                break;
            }

            // Bounded poll: on timeout the loop re-runs and re-observes
            // frontier growth produced by workers that just finished.
            match tokio::time::timeout(POLL_INTERVAL, workers.join_next()).await {
                Ok(Some(Err(err))) if !err.is_cancelled() => {
                    warn!(%err, "crawl worker failed");
                }
                Ok(_) | Err(_) => {}
            }
        }

        workers.abort_all();

        let mut out: Vec<String> = state.images.iter().map(|url| url.clone()).collect();
        out.sort();

        info!(
            seed = %seed,
            pages_attempted = state.pages_attempted.load(Ordering::Relaxed),
            images = out.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "crawl finished"
        );
        out
    }
}

async fn crawl_one(state: Arc<CrawlState>, entry: FrontierEntry) {
    // The attempt is counted whether or not the fetch happens; together
    // with the racy pre-admission check this caps total attempts at
    // max_pages + max_threads rather than exactly max_pages.
    let attempt = state.pages_attempted.fetch_add(1, Ordering::Relaxed) + 1;
    if attempt > state.config.max_pages {
        return;
    }

    let Some(host) = host_of(&entry.url) else {
        return;
    };
    if !host.eq_ignore_ascii_case(&state.allowed_host) {
        debug!(url = %entry.url, "host mismatch on dequeued entry");
        return;
    }

    let page = match state.fetcher.fetch(&entry.url, &host).await {
        Ok(page) => page,
        Err(err) => {
            warn!(url = %entry.url, %err, "fetch failed, skipping page");
            return;
        }
    };

    for image in extract_images(&page.body, &page.url) {
        state.images.insert(image);
    }

    // Link-following stops exactly at the depth budget; images on pages
    // at that depth were still collected above.
    if entry.depth >= state.config.max_depth {
        return;
    }

    let links = extract_links(&page.body, &page.url, &state.allowed_host);
    let mut frontier = state.frontier.lock().await;
    for link in links {
        if state.visited.insert(link.clone()) {
            frontier.push_back(FrontierEntry {
                url: link,
                depth: entry.depth + 1,
            });
        }
    }
}
