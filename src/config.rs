use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_FALLBACK_IMAGE: &str =
    "https://images.unsplash.com/photo-1504711434969-e33886168f5c";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// How long an aggregated result stays fresh, in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Top entries taken from each feed
    #[serde(default = "default_entries_per_source")]
    pub entries_per_source: usize,
    /// Items kept after sorting the combined list
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    #[serde(default = "default_article_timeout_secs")]
    pub article_timeout_secs: u64,
    #[serde(default = "default_feed_timeout_secs")]
    pub feed_timeout_secs: u64,
    #[serde(default = "default_fallback_image")]
    pub fallback_image: String,
    #[serde(default = "default_excerpt_max_chars")]
    pub excerpt_max_chars: usize,
    /// Paragraphs must be longer than this (after trimming) to count as body text
    #[serde(default = "default_min_paragraph_chars")]
    pub min_paragraph_chars: usize,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    /// Let concurrent cache misses share one refresh instead of each running their own
    #[serde(default)]
    pub coalesce_refreshes: bool,
    /// Refresh the cache in the background on this interval (minutes)
    #[serde(default)]
    pub warm_interval_minutes: Option<u64>,
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_entries_per_source() -> usize {
    3
}

fn default_max_items() -> usize {
    10
}

fn default_article_timeout_secs() -> u64 {
    10
}

fn default_feed_timeout_secs() -> u64 {
    30
}

fn default_fallback_image() -> String {
    DEFAULT_FALLBACK_IMAGE.to_string()
}

fn default_excerpt_max_chars() -> usize {
    500
}

fn default_min_paragraph_chars() -> usize {
    100
}

fn default_bind_address() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_language() -> String {
    "de".to_string()
}

fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::new("Tagesschau", "https://www.tagesschau.de/xml/rss2/"),
        SourceConfig::new("Zeit Online", "https://newsfeed.zeit.de/index"),
        SourceConfig::new(
            "Spiegel Online",
            "https://www.spiegel.de/schlagzeilen/tops/index.rss",
        ),
    ]
}

/// A news source. Display name, feed URL and language tag.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub name: String,
    pub url: String,
    #[serde(default = "default_language")]
    pub language: String,
}

impl SourceConfig {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            language: default_language(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            entries_per_source: default_entries_per_source(),
            max_items: default_max_items(),
            article_timeout_secs: default_article_timeout_secs(),
            feed_timeout_secs: default_feed_timeout_secs(),
            fallback_image: default_fallback_image(),
            excerpt_max_chars: default_excerpt_max_chars(),
            min_paragraph_chars: default_min_paragraph_chars(),
            bind_address: default_bind_address(),
            cors_origins: default_cors_origins(),
            coalesce_refreshes: false,
            warm_interval_minutes: None,
            sources: default_sources(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load the file if it exists, otherwise use the built-in defaults.
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()
    }

    fn validate(self) -> anyhow::Result<Self> {
        if self.warm_interval_minutes == Some(0) {
            anyhow::bail!("warm_interval_minutes must be at least 1");
        }
        Ok(self)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn article_timeout(&self) -> Duration {
        Duration::from_secs(self.article_timeout_secs)
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }
}
