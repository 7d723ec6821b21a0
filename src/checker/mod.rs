// src/checker/mod.rs
// =============================================================================
// This module holds the two collaborators the crawler talks to:
//
// - http: decides whether a URL is acceptable as a result (UrlValidator)
// - html: fetches a page and returns the links on it (LinkExtractor)
//
// The crawler only knows about the traits below, so tests can swap in
// in-memory versions and never touch the network.
// =============================================================================

mod html;
mod http;

use async_trait::async_trait;

pub use html::{extract_html_links, HtmlLinkExtractor};
pub use http::{HttpValidator, LinkCheckResult, LinkStatus};

/// Reports whether a URL may be accepted into the result set
///
/// Implementations must always resolve to a boolean: a failed check is
/// simply `false`.
#[async_trait]
pub trait UrlValidator: Send + Sync {
    async fn is_valid_url(&self, url: &str) -> bool;
}

/// Returns the outbound links of a page as absolute, deduplicated URLs
///
/// Failures (network, status, content type, parse) yield an empty list.
#[async_trait]
pub trait LinkExtractor: Send + Sync {
    async fn extract_links(&self, url: &str) -> Vec<String>;
}
