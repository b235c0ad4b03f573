//! Single-host image crawler: seed it with a URL and it returns the
//! sorted set of absolute image URLs reachable within the configured
//! depth and page budgets, throttling fetches per host along the way.

pub mod config;
pub mod crawl;
pub mod extract;
pub mod fetch;
pub mod norm;
pub mod serve;

pub use config::CrawlConfig;
pub use crawl::Crawler;
