// src/config.rs
// =============================================================================
// Run configuration for the URL sampler.
//
// Everything the crawl needs to know is collected in one struct that does not
// change while a run is in progress:
// - how many URLs to find and how many may share a domain
// - which discovered links are acceptable at all (domain depth, exclusions)
// - how politely to crawl (delay, timeout, redirects, headers)
// - where to start (seed URLs) and how many seeds to crawl at once
//
// Values come from three layers, later ones winning:
//   built-in defaults -> optional JSON file -> command-line flags
// =============================================================================

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Errors found while loading or validating a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("max_urls_per_domain must be greater than 0")]
    ZeroDomainCap,

    #[error("concurrency must be greater than 0")]
    ZeroConcurrency,

    #[error("min_domain_level must be at least 1")]
    ZeroDomainLevel,

    #[error("at least one seed URL is required")]
    NoSeeds,

    #[error("invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },
}

/// Immutable settings for one sampling run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// How many URLs to collect when the caller doesn't say
    pub number_of_urls: usize,
    /// Upper bound on accepted URLs sharing one hostname
    pub max_urls_per_domain: usize,
    /// Minimum number of dot-separated labels in a hostname ("a.test" = 2)
    pub min_domain_level: usize,
    /// Hostnames containing any of these substrings are never followed
    pub excluded_domains: Vec<String>,
    /// Pause before each recursive page visit, in milliseconds
    pub crawl_delay_ms: u64,
    /// Per-request timeout, in seconds
    pub timeout_secs: u64,
    /// How many redirects a single request may follow
    pub max_redirects: usize,
    /// Extra request headers sent with every request
    pub headers: BTreeMap<String, String>,
    /// Where the crawl starts
    pub seed_urls: Vec<String>,
    /// How many seeds are crawled at the same time
    pub concurrency: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(
            "User-Agent".to_string(),
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
             Chrome/120.0 Safari/537.36"
                .to_string(),
        );
        headers.insert(
            "Accept".to_string(),
            "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8".to_string(),
        );

        Self {
            number_of_urls: 100,
            max_urls_per_domain: 3,
            min_domain_level: 2,
            excluded_domains: [
                "facebook.com",
                "twitter.com",
                "x.com",
                "instagram.com",
                "linkedin.com",
                "doubleclick.net",
                "googleadservices.com",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            crawl_delay_ms: 500,
            timeout_secs: 10,
            max_redirects: 5,
            headers,
            seed_urls: [
                "https://en.wikipedia.org/wiki/Special:Random",
                "https://news.ycombinator.com/",
                "https://www.reddit.com/r/InternetIsBeautiful/",
                "https://github.com/trending",
                "https://www.bbc.com/news",
                "https://lobste.rs/",
                "https://www.producthunt.com/",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            concurrency: 5,
        }
    }
}

impl SamplerConfig {
    /// Loads a JSON config file; fields missing from the file keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;

        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// Checks the settings that would make a run meaningless or impossible
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_urls_per_domain == 0 {
            return Err(ConfigError::ZeroDomainCap);
        }
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.min_domain_level == 0 {
            return Err(ConfigError::ZeroDomainLevel);
        }
        if self.seed_urls.is_empty() {
            return Err(ConfigError::NoSeeds);
        }
        self.header_map()?;
        Ok(())
    }

    pub fn crawl_delay(&self) -> Duration {
        Duration::from_millis(self.crawl_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Converts the configured headers into the form reqwest expects
    pub fn header_map(&self) -> Result<HeaderMap, ConfigError> {
        let mut map = HeaderMap::new();

        for (name, value) in &self.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| ConfigError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            map.insert(header_name, header_value);
        }

        Ok(map)
    }
}
