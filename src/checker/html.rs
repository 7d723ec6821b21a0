// src/checker/html.rs
// =============================================================================
// This module fetches a page and pulls the outbound links out of its HTML.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (built on html5ever)
// - Supports CSS selectors for finding elements
//
// And the `url` crate to:
// - Resolve relative links against the page address
// - Drop #fragments so the same page isn't seen under several names
//
// What comes back is already filtered (http/https only, domain deep enough,
// not excluded), deduplicated, and shuffled.
// =============================================================================

use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

use super::LinkExtractor;
use crate::config::SamplerConfig;
use crate::domain::DomainFilter;

/// Link extractor backed by real HTTP requests
#[derive(Debug, Clone)]
pub struct HtmlLinkExtractor {
    client: Client,
    filter: DomainFilter,
}

impl HtmlLinkExtractor {
    pub fn new(config: &SamplerConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .default_headers(config.header_map()?)
            .build()?;

        Ok(Self::with_client(client, config))
    }

    /// Uses an already configured client; only the link filter comes from `config`
    pub fn with_client(client: Client, config: &SamplerConfig) -> Self {
        Self {
            client,
            filter: DomainFilter::new(config.min_domain_level, &config.excluded_domains),
        }
    }

    // Fetches the page body, refusing anything that isn't a successful HTML response
    async fn fetch_html(&self, url: &str) -> anyhow::Result<String> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP {}", response.status());
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();
        if !content_type.contains("text/html") && !content_type.contains("application/xhtml") {
            anyhow::bail!("not an HTML response (content-type: '{}')", content_type);
        }

        let html = response.text().await?;
        Ok(html)
    }
}

#[async_trait]
impl LinkExtractor for HtmlLinkExtractor {
    async fn extract_links(&self, url: &str) -> Vec<String> {
        match self.fetch_html(url).await {
            Ok(html) => {
                let mut links = extract_html_links(&html, url, &self.filter);
                links.shuffle(&mut rand::thread_rng());
                links
            }
            Err(e) => {
                debug!(url, error = %e, "link extraction failed");
                Vec::new()
            }
        }
    }
}

// Extracts every acceptable link from HTML content
//
// Parameters:
//   html: the HTML content to parse
//   base_url: the URL of the page (for resolving relative links)
//   filter: which hostnames are allowed
//
// Returns: unique absolute URLs in document order
pub fn extract_html_links(html: &str, base_url: &str, filter: &DomainFilter) -> Vec<String> {
    let mut links = Vec::new();

    let base = match Url::parse(base_url) {
        Ok(url) => url,
        Err(_) => {
            debug!(base_url, "cannot resolve links against invalid base URL");
            return links;
        }
    };

    let document = Html::parse_document(html);
    // Constant selector, known to be valid
    let selector = Selector::parse("a[href]").unwrap();
    let mut seen = HashSet::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(resolved) = resolve_url(&base, href) else {
            continue;
        };
        if !is_followable(&resolved, filter) {
            continue;
        }

        let absolute = resolved.to_string();
        if seen.insert(absolute.clone()) {
            links.push(absolute);
        }
    }

    links
}

// Resolves a possibly-relative href to an absolute URL without a fragment
//
//   base = "https://example.com/page"
//   href = "/docs"            -> https://example.com/docs
//   href = "../other#intro"   -> https://example.com/other
//   href = "mailto:me@x.com"  -> None
fn resolve_url(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let mut url = base.join(href).ok()?;
    url.set_fragment(None);
    Some(url)
}

// http/https with a hostname the filter accepts
fn is_followable(url: &Url, filter: &DomainFilter) -> bool {
    if url.scheme() != "http" && url.scheme() != "https" {
        return false;
    }

    match url.host_str() {
        Some(host) => filter.allows(host),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn open_filter() -> DomainFilter {
        DomainFilter::new(2, &[])
    }

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<a href="https://www.rust-lang.org">Rust</a>"#;
        let links = extract_html_links(html, "https://example.com", &open_filter());
        assert_eq!(links, vec!["https://www.rust-lang.org/"]);
    }

    #[test]
    fn test_resolve_relative_link() {
        let html = r#"<a href="/docs">Docs</a>"#;
        let links = extract_html_links(html, "https://example.com/page", &open_filter());
        assert_eq!(links, vec!["https://example.com/docs"]);
    }

    #[test]
    fn test_skip_non_http_schemes() {
        let html = r##"
            <a href="mailto:test@example.com">Email</a>
            <a href="javascript:void(0)">JS</a>
            <a href="ftp://files.example.com/x">FTP</a>
            <a href="#top">Top</a>
        "##;
        let links = extract_html_links(html, "https://example.com", &open_filter());
        assert!(links.is_empty());
    }

    #[test]
    fn test_fragments_are_stripped_and_deduplicated() {
        let html = r##"
            <a href="/about#team">Team</a>
            <a href="/about#history">History</a>
            <a href="https://example.com/about">About</a>
        "##;
        let links = extract_html_links(html, "https://example.com/", &open_filter());
        assert_eq!(links, vec!["https://example.com/about"]);
    }

    #[test]
    fn test_excluded_domain_is_filtered() {
        let filter = DomainFilter::new(2, &["spam.test".to_string()]);
        let html = r#"
            <a href="http://spam.test/x">Spam</a>
            <a href="http://sub.spam.test/y">More spam</a>
            <a href="http://ham.test/z">Ham</a>
        "#;
        let links = extract_html_links(html, "https://a.test", &filter);
        assert_eq!(links, vec!["http://ham.test/z"]);
    }

    #[test]
    fn test_shallow_domain_is_filtered() {
        let filter = DomainFilter::new(3, &[]);
        let html = r#"
            <a href="https://a.test/">Shallow</a>
            <a href="https://www.a.test/">Deep enough</a>
        "#;
        let links = extract_html_links(html, "https://www.a.test", &filter);
        assert_eq!(links, vec!["https://www.a.test/"]);
    }

    // Serves one canned HTTP response on a local port and returns the page URL
    async fn serve_once(status_line: &'static str, content_type: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut request = [0u8; 4096];
                let _ = socket.read(&mut request).await;

                let body = r#"<html><body><a href="https://b.test/page">B</a></body></html>"#;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    content_type,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{}/", addr)
    }

    fn local_extractor() -> HtmlLinkExtractor {
        let config = SamplerConfig {
            timeout_secs: 5,
            ..SamplerConfig::default()
        };
        let client = Client::builder()
            .no_proxy()
            .timeout(config.timeout())
            .build()
            .unwrap();
        HtmlLinkExtractor::with_client(client, &config)
    }

    #[tokio::test]
    async fn test_fetches_links_from_html_page() {
        let url = serve_once("200 OK", "text/html; charset=utf-8").await;
        let links = local_extractor().extract_links(&url).await;
        assert_eq!(links, vec!["https://b.test/page"]);
    }

    #[tokio::test]
    async fn test_non_html_response_yields_nothing() {
        let url = serve_once("200 OK", "text/plain").await;
        let links = local_extractor().extract_links(&url).await;
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_yields_nothing() {
        let url = serve_once("500 Internal Server Error", "text/html").await;
        let links = local_extractor().extract_links(&url).await;
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn test_connection_refused_yields_nothing() {
        // Grab a free port, then close it so nothing is listening there
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let links = local_extractor()
            .extract_links(&format!("http://{}/", addr))
            .await;
        assert!(links.is_empty());
    }

    #[test]
    fn test_invalid_base_yields_nothing() {
        let html = r#"<a href="/docs">Docs</a>"#;
        let links = extract_html_links(html, "not a url", &open_filter());
        assert!(links.is_empty());
    }
}
