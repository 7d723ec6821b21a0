// src/checker/http.rs
// =============================================================================
// This module decides whether a URL is alive enough to be a sampled result.
//
// Key functionality:
// - Cheap syntactic checks first (parses, http/https, has a host)
// - HTTP HEAD request (lightweight, no body download)
// - Falls back to GET when the server refuses HEAD (405 / 501)
// - Sorts failures into categories (404, timeout, SSL errors, etc.) so the
//   debug log says why a URL was rejected
//
// Only Ok and Redirect count as valid. Every failure becomes `false`; the
// crawler never sees an error from here.
// =============================================================================

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::UrlValidator;
use crate::config::SamplerConfig;

// Represents the status of a URL after checking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LinkStatus {
    /// URL answered with 2xx
    Ok,
    /// URL answered with 3xx (only seen when redirects aren't followed)
    Redirect(String),
    /// 404 / 410
    Broken,
    /// Request timed out
    Timeout,
    /// SSL/TLS certificate error
    SslError,
    /// Redirect loop or longer chain than configured
    TooManyRedirects,
    /// Could not resolve hostname
    DnsError,
    /// Not an absolute http(s) URL with a host
    Malformed,
    /// Anything else (5xx, connection reset, ...)
    Error,
}

// The outcome of checking a single URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkCheckResult {
    pub url: String,
    #[serde(flatten)]
    pub status: LinkStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LinkCheckResult {
    /// Ok and Redirect are the only statuses that make a URL acceptable
    pub fn is_ok(&self) -> bool {
        matches!(self.status, LinkStatus::Ok | LinkStatus::Redirect(_))
    }
}

/// Validator that checks URLs over HTTP
#[derive(Debug, Clone)]
pub struct HttpValidator {
    client: Client,
}

impl HttpValidator {
    /// Builds the shared HTTP client from the run configuration
    ///
    /// The client is reused for every request (connection pooling).
    pub fn new(config: &SamplerConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .default_headers(config.header_map()?)
            .build()?;

        Ok(Self { client })
    }

    /// Checks a single URL and returns its full classification
    pub async fn check(&self, url: &str) -> LinkCheckResult {
        if let Some(reason) = malformed_reason(url) {
            return LinkCheckResult {
                url: url.to_string(),
                status: LinkStatus::Malformed,
                message: Some(reason.to_string()),
            };
        }

        // HEAD first; some servers don't implement it, so retry those with GET
        let result = match self.client.head(url).send().await {
            Ok(response)
                if matches!(
                    response.status(),
                    StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED
                ) =>
            {
                self.client.get(url).send().await
            }
            other => other,
        };

        match result {
            Ok(response) => analyze_response(url.to_string(), &response),
            Err(e) => categorize_error(url.to_string(), e),
        }
    }
}

#[async_trait]
impl UrlValidator for HttpValidator {
    async fn is_valid_url(&self, url: &str) -> bool {
        let result = self.check(url).await;
        if !result.is_ok() {
            debug!(
                url = %result.url,
                status = ?result.status,
                message = result.message.as_deref().unwrap_or(""),
                "url rejected by validator"
            );
        }
        result.is_ok()
    }
}

// Returns why a URL can't even be requested, or None if it looks fine
fn malformed_reason(url: &str) -> Option<&'static str> {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return Some("not an absolute URL"),
    };

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Some("unsupported scheme");
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Some("missing host");
    }

    None
}

// Maps an HTTP status code to a LinkStatus
//
// - 200-299: Success
// - 300-399: Redirect
// - 404/410: Broken
// - everything else: Error
fn analyze_response(url: String, response: &reqwest::Response) -> LinkCheckResult {
    let status_code = response.status();
    let redirect_target = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    classify_status(url, status_code, redirect_target)
}

fn classify_status(
    url: String,
    status_code: StatusCode,
    redirect_target: Option<String>,
) -> LinkCheckResult {
    let code = status_code.as_u16();

    if status_code.is_success() {
        LinkCheckResult {
            url,
            status: LinkStatus::Ok,
            message: Some(format!("HTTP {}", code)),
        }
    } else if status_code.is_redirection() {
        let target = redirect_target.unwrap_or_else(|| "unknown".to_string());
        LinkCheckResult {
            url,
            message: Some(format!("HTTP {} -> {}", code, target)),
            status: LinkStatus::Redirect(target),
        }
    } else if matches!(status_code, StatusCode::NOT_FOUND | StatusCode::GONE) {
        LinkCheckResult {
            url,
            status: LinkStatus::Broken,
            message: Some(format!("HTTP {}", code)),
        }
    } else {
        LinkCheckResult {
            url,
            status: LinkStatus::Error,
            message: Some(format!("HTTP {}", code)),
        }
    }
}

// Sorts reqwest errors into timeout / redirect / DNS / TLS / other
fn categorize_error(url: String, error: reqwest::Error) -> LinkCheckResult {
    let error_string = error.to_string();
    let lowered = error_string.to_lowercase();

    let (status, message) = if error.is_timeout() {
        (LinkStatus::Timeout, "Request timed out".to_string())
    } else if error.is_redirect() {
        (LinkStatus::TooManyRedirects, "Too many redirects".to_string())
    } else if error.is_connect() {
        if lowered.contains("dns") {
            (LinkStatus::DnsError, "Could not resolve hostname".to_string())
        } else {
            (LinkStatus::Error, "Connection failed".to_string())
        }
    } else if lowered.contains("certificate") || lowered.contains("ssl") {
        (LinkStatus::SslError, "SSL certificate error".to_string())
    } else {
        (LinkStatus::Error, error_string)
    };

    LinkCheckResult {
        url,
        status,
        message: Some(message),
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why HEAD and then GET?
//    - HEAD returns only headers, so validating is cheap
//    - A few servers answer HEAD with 405/501 even though GET works fine
//
// 2. Why does is_valid_url return bool instead of Result?
//    - The crawler treats "couldn't check" exactly like "invalid"
//    - Keeping errors here means the frontier has no error path at all
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> HttpValidator {
        HttpValidator::new(&SamplerConfig::default()).unwrap()
    }

    #[test]
    fn test_link_result_is_ok() {
        let ok_result = LinkCheckResult {
            url: "https://example.com".to_string(),
            status: LinkStatus::Ok,
            message: None,
        };
        assert!(ok_result.is_ok());

        let redirect = LinkCheckResult {
            url: "https://example.com".to_string(),
            status: LinkStatus::Redirect("https://example.org".to_string()),
            message: None,
        };
        assert!(redirect.is_ok());

        let broken_result = LinkCheckResult {
            url: "https://example.com".to_string(),
            status: LinkStatus::Broken,
            message: None,
        };
        assert!(!broken_result.is_ok());
    }

    #[test]
    fn test_classify_status_codes() {
        let url = "https://a.test".to_string();
        assert_eq!(
            classify_status(url.clone(), StatusCode::OK, None).status,
            LinkStatus::Ok
        );
        assert_eq!(
            classify_status(url.clone(), StatusCode::NOT_FOUND, None).status,
            LinkStatus::Broken
        );
        assert_eq!(
            classify_status(url.clone(), StatusCode::GONE, None).status,
            LinkStatus::Broken
        );
        assert_eq!(
            classify_status(url.clone(), StatusCode::INTERNAL_SERVER_ERROR, None).status,
            LinkStatus::Error
        );
        assert_eq!(
            classify_status(
                url,
                StatusCode::MOVED_PERMANENTLY,
                Some("https://b.test/".to_string())
            )
            .status,
            LinkStatus::Redirect("https://b.test/".to_string())
        );
    }

    #[test]
    fn test_malformed_reason() {
        assert_eq!(malformed_reason("https://a.test/x"), None);
        assert!(malformed_reason("ftp://a.test/x").is_some());
        assert!(malformed_reason("/relative").is_some());
        assert!(malformed_reason("mailto:me@a.test").is_some());
    }

    #[tokio::test]
    async fn test_malformed_url_is_invalid_without_request() {
        let v = validator();
        let result = v.check("javascript:void(0)").await;
        assert_eq!(result.status, LinkStatus::Malformed);
        assert!(!v.is_valid_url("not a url").await);
    }
}
