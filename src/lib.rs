// src/lib.rs
// =============================================================================
// url-sampler: find a number of distinct, reachable URLs by crawling outward
// from seed pages, without letting a handful of domains dominate the result.
//
// The binary in main.rs is a thin CLI over `crawl::sample_urls`. Everything
// else lives here so the crawler can be embedded or tested on its own.
// =============================================================================

pub mod checker;
pub mod config;
pub mod crawl;
pub mod domain;

pub use checker::{HtmlLinkExtractor, HttpValidator, LinkExtractor, UrlValidator};
pub use config::{ConfigError, SamplerConfig};
pub use crawl::{get_valid_urls, sample_urls, SampleOutcome, Sampler};
