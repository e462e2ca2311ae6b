use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_SEARCH_URL: &str = "https://html.duckduckgo.com/html/";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Knobs for the scrape pipeline. `Default` matches production behavior.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Search engine HTML results page used to resolve names.
    pub search_url: String,
    pub user_agent: String,
    /// Timeout for search and staff-directory lookups.
    pub search_timeout: Duration,
    /// Timeout for page fetches (sites, Wikipedia, feeds).
    pub page_timeout: Duration,
    /// Inputs not started before this elapses get a failure result.
    pub batch_deadline: Option<Duration>,
    pub max_batch_size: usize,
    pub allow_private_hosts: bool,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            search_timeout: Duration::from_secs(5),
            page_timeout: Duration::from_secs(10),
            batch_deadline: Some(Duration::from_secs(120)),
            max_batch_size: 100,
            allow_private_hosts: false,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Web server
    pub web_host: String,
    pub web_port: u16,

    // Scraping
    pub scraper: ScraperConfig,

    // News
    pub news_feed_url: Option<String>,
    pub news_max_items: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = ScraperConfig::default();
        let deadline_secs: u64 = parsed_env("BATCH_DEADLINE_SECS", 120)?;

        let config = Self {
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: parsed_env("WEB_PORT", 3000)?,
            scraper: ScraperConfig {
                search_url: env::var("SEARCH_URL").unwrap_or(defaults.search_url),
                user_agent: env::var("SCRAPER_USER_AGENT").unwrap_or(defaults.user_agent),
                search_timeout: Duration::from_secs(parsed_env("SEARCH_TIMEOUT_SECS", 5)?),
                page_timeout: Duration::from_secs(parsed_env("PAGE_TIMEOUT_SECS", 10)?),
                batch_deadline: (deadline_secs > 0).then(|| Duration::from_secs(deadline_secs)),
                max_batch_size: parsed_env("MAX_BATCH_SIZE", defaults.max_batch_size)?,
                allow_private_hosts: parsed_env("ALLOW_PRIVATE_HOSTS", false)?,
            },
            news_feed_url: env::var("NEWS_FEED_URL").ok().filter(|s| !s.trim().is_empty()),
            news_max_items: parsed_env("NEWS_MAX_ITEMS", 20)?,
        };

        config.log_summary();
        Ok(config)
    }

    fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  listen: {}:{}", self.web_host, self.web_port);
        tracing::info!("  SEARCH_URL: {}", self.scraper.search_url);
        tracing::info!(
            "  timeouts: search={}s page={}s",
            self.scraper.search_timeout.as_secs(),
            self.scraper.page_timeout.as_secs()
        );
        tracing::info!(
            "  batch: max_size={} deadline={}",
            self.scraper.max_batch_size,
            self.scraper
                .batch_deadline
                .map(|d| format!("{}s", d.as_secs()))
                .unwrap_or_else(|| "<none>".to_string())
        );
        tracing::info!(
            "  NEWS_FEED_URL: {}",
            self.news_feed_url.as_deref().unwrap_or("<not set>")
        );
    }
}

fn parsed_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        _ => Ok(default),
    }
}
