// src/domain.rs
// =============================================================================
// Hostname helpers shared by the link extractor and the frontier.
//
// A "domain" here is simply the hostname of a URL (www.example.com and
// example.com are different domains). It is always derived from the URL,
// never stored on its own.
// =============================================================================

use url::Url;

/// Returns the lowercase hostname of `url`, or None if the URL is malformed
/// or has no host (e.g. `mailto:` or `data:` URLs)
pub fn domain_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .host_str()
        .filter(|host| !host.is_empty())
        .map(|host| host.to_ascii_lowercase())
}

/// Canonical string form used for every URL comparison: absolute, as
/// serialized by the `url` crate, without a fragment
///
///   "https://a.test"          -> "https://a.test/"
///   "https://A.test/x#intro"  -> "https://a.test/x"
pub fn normalize_url(url: &str) -> Option<String> {
    let mut parsed = Url::parse(url.trim()).ok()?;
    parsed.set_fragment(None);
    Some(parsed.to_string())
}

/// Number of dot-separated labels, ignoring a trailing root dot
///
///   "a.test"       -> 2
///   "www.a.test"   -> 3
///   "localhost"    -> 1
pub fn label_count(domain: &str) -> usize {
    domain
        .trim_end_matches('.')
        .split('.')
        .filter(|label| !label.is_empty())
        .count()
}

/// Decides which discovered hostnames are worth following at all
#[derive(Debug, Clone)]
pub struct DomainFilter {
    min_domain_level: usize,
    excluded: Vec<String>,
}

impl DomainFilter {
    pub fn new(min_domain_level: usize, excluded: &[String]) -> Self {
        Self {
            min_domain_level,
            excluded: excluded
                .iter()
                .map(|s| s.trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// True if the domain is deep enough and matches no excluded substring
    pub fn allows(&self, domain: &str) -> bool {
        let domain = domain.to_ascii_lowercase();

        if label_count(&domain) < self.min_domain_level {
            return false;
        }

        !self.excluded.iter().any(|needle| domain.contains(needle.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_of_absolute_url() {
        assert_eq!(
            domain_of("https://Www.Example.com/path?q=1"),
            Some("www.example.com".to_string())
        );
    }

    #[test]
    fn test_domain_of_malformed_url() {
        assert_eq!(domain_of("not a url"), None);
        assert_eq!(domain_of("/relative/path"), None);
        assert_eq!(domain_of("mailto:someone@example.com"), None);
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("https://a.test"), Some("https://a.test/".to_string()));
        assert_eq!(
            normalize_url(" https://A.test/x#intro "),
            Some("https://a.test/x".to_string())
        );
        assert_eq!(normalize_url("/relative"), None);
    }

    #[test]
    fn test_label_count() {
        assert_eq!(label_count("a.test"), 2);
        assert_eq!(label_count("www.a.test."), 3);
        assert_eq!(label_count("localhost"), 1);
    }

    #[test]
    fn test_filter_min_level() {
        let filter = DomainFilter::new(2, &[]);
        assert!(filter.allows("a.test"));
        assert!(!filter.allows("localhost"));
    }

    #[test]
    fn test_filter_excluded_substring() {
        let filter = DomainFilter::new(2, &["Spam.test".to_string()]);
        assert!(!filter.allows("spam.test"));
        assert!(!filter.allows("www.spam.test"));
        assert!(filter.allows("ham.test"));
    }
}
