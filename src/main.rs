use std::fs;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use imagehound::config::{CrawlConfig, DEFAULT_USER_AGENT};
use imagehound::crawl::Crawler;
use imagehound::serve;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "imagehound",
    version,
    about = "Crawl a single host and list every image URL it serves"
)]
struct Cli {
    #[arg(value_name = "URL", required_unless_present = "listen")]
    url: Option<String>,

    #[arg(long, value_name = "N", default_value_t = 8)]
    threads: usize,

    #[arg(long, value_name = "N", default_value_t = 40)]
    max_pages: usize,

    #[arg(long, value_name = "N", default_value_t = 1)]
    depth: usize,

    #[arg(long, value_name = "MS", default_value_t = 5000)]
    timeout_ms: u64,

    #[arg(long, value_name = "MS", default_value_t = 50)]
    delay_ms: u64,

    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    #[arg(long, value_name = "ADDR")]
    listen: Option<String>,
}

impl Cli {
    fn crawl_config(&self) -> CrawlConfig {
        CrawlConfig {
            max_threads: self.threads,
            max_pages: self.max_pages,
            max_depth: self.depth,
            timeout_ms: self.timeout_ms,
            min_delay_per_host_ms: self.delay_ms,
            user_agent: self
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.crawl_config();

    if let Some(addr) = cli.listen.clone() {
        let handle = tokio::runtime::Handle::current();
        return tokio::task::spawn_blocking(move || -> Result<()> {
            serve::run(&addr, config, handle)
        })
        .await?;
    }

    // clap guarantees the URL is present when --listen is absent.
    let seed = cli.url.clone().unwrap_or_default();
    let crawler = Crawler::new(config);
    let images = crawler.crawl_images(&seed).await;

    let body = serde_json::to_string_pretty(&images)?;
    match cli.output {
        Some(path) => fs::write(path, body)?,
        None => println!("{body}"),
    }

    Ok(())
}
