use serde::Deserialize;
use std::time::Duration;

/// Substrings that disqualify a discovered URL unless the config overrides them
pub const DEFAULT_BANNED_SUBSTRINGS: &[&str] = &["mailto:", "javascript:", "logout", "signup"];

/// Main configuration structure for Ripple-Crawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub seeds: SeedsConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Minimum time between dispatches to the same origin (seconds)
    #[serde(rename = "politeness-delay", default = "default_politeness_delay")]
    pub politeness_delay: f64,

    /// Number of successfully fetched pages after which the crawl stops
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u64,

    /// Maximum link depth from a seed URL
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Number of concurrent fetch workers
    #[serde(default = "default_workers")]
    pub workers: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "fetch-timeout", default = "default_fetch_timeout")]
    pub fetch_timeout: u64,
}

impl CrawlerConfig {
    pub fn politeness(&self) -> Duration {
        Duration::from_secs_f64(self.politeness_delay)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            politeness_delay: default_politeness_delay(),
            max_pages: default_max_pages(),
            max_depth: default_max_depth(),
            workers: default_workers(),
            fetch_timeout: default_fetch_timeout(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version` or `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Where seed URLs come from
#[derive(Debug, Clone, Deserialize)]
pub struct SeedsConfig {
    /// Path to the seed list, one URL per line
    pub path: String,

    /// Optional search-based discovery supplementing the seed list
    #[serde(default)]
    pub discovery: Option<DiscoveryConfig>,
}

/// Best-effort seed discovery through a search results page
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    /// Search query sent to the endpoint
    pub query: String,

    /// Search endpoint; the query is passed as the `q` parameter
    pub endpoint: String,

    /// Maximum number of discovered seeds
    #[serde(rename = "max-results", default = "default_max_results")]
    pub max_results: usize,
}

/// URL filtering policy
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// URLs containing any of these (case-insensitive) are never enqueued
    #[serde(rename = "banned-substrings", default = "default_banned_substrings")]
    pub banned_substrings: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            banned_substrings: default_banned_substrings(),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// When false, fetches are recorded into a no-op sink
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,

    /// How often the metrics snapshot is logged (seconds)
    #[serde(rename = "report-interval", default = "default_report_interval")]
    pub report_interval: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            report_interval: default_report_interval(),
        }
    }
}

fn default_politeness_delay() -> f64 {
    1.0
}

fn default_max_pages() -> u64 {
    200
}

fn default_max_depth() -> u32 {
    2
}

fn default_workers() -> u32 {
    4
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_max_results() -> usize {
    30
}

fn default_banned_substrings() -> Vec<String> {
    DEFAULT_BANNED_SUBSTRINGS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_report_interval() -> u64 {
    10
}
