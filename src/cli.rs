// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
// Two subcommands:
// - sample: crawl from the seed URLs and print a domain-diverse URL sample
// - check:  run the validator on specific URLs and show why each passes/fails
//
// Sampling flags override values from --config, which override the defaults.
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use url_sampler::SamplerConfig;

#[derive(Parser, Debug)]
#[command(
    name = "url-sampler",
    version,
    about = "Sample valid, domain-diverse URLs by crawling outward from seed pages",
    long_about = "url-sampler follows links from a set of seed pages and collects a target number \
                  of reachable URLs, capping how many may come from any one domain so the sample \
                  isn't dominated by a few sites."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl from the seed URLs and print the sampled URLs
    ///
    /// Example: url-sampler sample --count 50 --max-per-domain 2
    Sample {
        #[command(flatten)]
        options: SampleOptions,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Check whether URLs would be accepted by the validator
    ///
    /// Example: url-sampler check https://example.com https://example.org/missing
    Check {
        /// URLs to check
        #[arg(required = true)]
        urls: Vec<String>,

        /// JSON config file (only timeout, redirects and headers are used)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },
}

/// Settings for one sampling run; anything left unset comes from the config
#[derive(Args, Debug, Default)]
pub struct SampleOptions {
    /// JSON config file; any field may be omitted
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of URLs to collect
    #[arg(long, short = 'n')]
    pub count: Option<usize>,

    /// Maximum accepted URLs per domain
    #[arg(long)]
    pub max_per_domain: Option<usize>,

    /// Minimum number of labels in a hostname (2 = "example.com")
    #[arg(long)]
    pub min_domain_level: Option<usize>,

    /// Skip hostnames containing this text (repeatable, replaces the configured list)
    #[arg(long = "exclude")]
    pub excluded_domains: Vec<String>,

    /// Seed URL to start from (repeatable, replaces the configured list)
    #[arg(long = "seed")]
    pub seeds: Vec<String>,

    /// Delay before each followed link, in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Per-request timeout, in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Maximum redirects per request
    #[arg(long)]
    pub max_redirects: Option<usize>,

    /// Number of seeds crawled at once
    #[arg(long)]
    pub concurrency: Option<usize>,
}

impl SampleOptions {
    /// Applies the flags that were given on top of `config`
    pub fn apply(&self, mut config: SamplerConfig) -> SamplerConfig {
        if let Some(count) = self.count {
            config.number_of_urls = count;
        }
        if let Some(max) = self.max_per_domain {
            config.max_urls_per_domain = max;
        }
        if let Some(level) = self.min_domain_level {
            config.min_domain_level = level;
        }
        if !self.excluded_domains.is_empty() {
            config.excluded_domains = self.excluded_domains.clone();
        }
        if !self.seeds.is_empty() {
            config.seed_urls = self.seeds.clone();
        }
        if let Some(delay) = self.delay_ms {
            config.crawl_delay_ms = delay;
        }
        if let Some(timeout) = self.timeout_secs {
            config.timeout_secs = timeout;
        }
        if let Some(redirects) = self.max_redirects {
            config.max_redirects = redirects;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sample_flags() {
        let cli = Cli::parse_from([
            "url-sampler",
            "sample",
            "-n",
            "20",
            "--seed",
            "https://a.test",
            "--seed",
            "https://b.test",
            "--exclude",
            "spam.test",
            "--json",
        ]);

        match cli.command {
            Commands::Sample { options, json } => {
                assert!(json);
                assert_eq!(options.count, Some(20));
                assert_eq!(options.seeds, vec!["https://a.test", "https://b.test"]);
                assert_eq!(options.excluded_domains, vec!["spam.test"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_apply_overrides_only_given_flags() {
        let options = SampleOptions {
            count: Some(5),
            seeds: vec!["https://a.test".to_string()],
            ..SampleOptions::default()
        };
        let config = options.apply(SamplerConfig::default());

        assert_eq!(config.number_of_urls, 5);
        assert_eq!(config.seed_urls, vec!["https://a.test"]);
        assert_eq!(config.max_urls_per_domain, SamplerConfig::default().max_urls_per_domain);
        assert!(!config.excluded_domains.is_empty());
    }

    #[test]
    fn test_check_requires_urls() {
        assert!(Cli::try_parse_from(["url-sampler", "check"]).is_err());
    }
}
