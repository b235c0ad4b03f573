use serde::Deserialize;

pub const DEFAULT_USER_AGENT: &str =
    "ImagehoundBot/0.3 (+https://github.com/coderscantina/imagehound)";

/// Budgets and politeness knobs for one crawl. Immutable once built;
/// every worker reads it through a shared reference.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub max_threads: usize,
    pub max_pages: usize,
    pub max_depth: usize,
    pub timeout_ms: u64,
    pub min_delay_per_host_ms: u64,
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_threads: 8,
            max_pages: 40,
            max_depth: 1,
            timeout_ms: 5000,
            min_delay_per_host_ms: 50,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CrawlConfig {
    /// A pool of zero workers would stall the dispatch loop forever.
    pub fn effective_threads(&self) -> usize {
        self.max_threads.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_budgets() {
        let config = CrawlConfig::default();
        assert_eq!(config.max_threads, 8);
        assert_eq!(config.max_pages, 40);
        assert_eq!(config.max_depth, 1);
        assert_eq!(config.timeout_ms, 5000);
        assert_eq!(config.min_delay_per_host_ms, 50);
        assert!(config.user_agent.contains("http"));
    }

    #[test]
    fn zero_threads_is_sanitized() {
        let config = CrawlConfig {
            max_threads: 0,
            ..CrawlConfig::default()
        };
        assert_eq!(config.effective_threads(), 1);
    }

    #[test]
    fn deserializes_partial_json_over_defaults() {
        let config: CrawlConfig = serde_json::from_str(r#"{"max_depth": 3}"#).unwrap();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.max_pages, 40);
    }
}
