// src/crawl/frontier.rs
// =============================================================================
// Bookkeeping for one sampling run: what has been visited, what has been
// accepted, and how many accepted URLs each domain already has.
//
// Every method does its check and its update in one call, so as long as the
// Frontier sits behind a single lock, two concurrent visits can never both
// squeeze past the same domain cap or both claim the same URL.
// =============================================================================

use rand::seq::SliceRandom;
use std::collections::{BTreeMap, HashMap, HashSet};

/// What happened when a URL was offered to the result set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Accepted; carries the new result-set size
    Accepted(usize),
    /// The domain already holds `max_urls_per_domain` results
    DomainCapped,
    /// Already in the result set
    Duplicate,
    /// The target count has been reached
    Full,
}

#[derive(Debug)]
pub struct Frontier {
    target: usize,
    max_per_domain: usize,
    visited: HashSet<String>,
    accepted: Vec<String>,
    accepted_set: HashSet<String>,
    domain_counts: HashMap<String, usize>,
}

impl Frontier {
    pub fn new(target: usize, max_per_domain: usize) -> Self {
        Self {
            target,
            max_per_domain,
            visited: HashSet::new(),
            accepted: Vec::new(),
            accepted_set: HashSet::new(),
            domain_counts: HashMap::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.accepted.len() >= self.target
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Claims `url` for crawling. False if the run is full or someone got there first.
    pub fn mark_visited(&mut self, url: &str) -> bool {
        if self.is_full() || self.visited.contains(url) {
            return false;
        }
        self.visited.insert(url.to_string());
        true
    }

    /// Offers a validated URL to the result set under the per-domain cap
    pub fn admit(&mut self, url: &str, domain: &str) -> Admission {
        if self.is_full() {
            return Admission::Full;
        }
        if self.accepted_set.contains(url) {
            return Admission::Duplicate;
        }

        let count = self.domain_counts.entry(domain.to_string()).or_insert(0);
        if *count >= self.max_per_domain {
            return Admission::DomainCapped;
        }

        *count += 1;
        self.accepted_set.insert(url.to_string());
        self.accepted.push(url.to_string());
        Admission::Accepted(self.accepted.len())
    }

    /// True once at least one accepted URL lives on `domain`
    pub fn has_domain(&self, domain: &str) -> bool {
        self.domain_counts.get(domain).is_some_and(|count| *count > 0)
    }

    /// Orders freshly discovered links for exploration
    ///
    /// Links on domains not yet in the result set come first; each group is
    /// shuffled. Already-visited links and links without a host are dropped.
    pub fn order_candidates(&self, links: Vec<String>) -> Vec<String> {
        let mut fresh = Vec::new();
        let mut known = Vec::new();

        for link in links {
            if self.visited.contains(&link) {
                continue;
            }
            match crate::domain::domain_of(&link) {
                Some(domain) if self.has_domain(&domain) => known.push(link),
                Some(_) => fresh.push(link),
                None => {}
            }
        }

        let mut rng = rand::thread_rng();
        fresh.shuffle(&mut rng);
        known.shuffle(&mut rng);
        fresh.extend(known);
        fresh
    }

    pub fn accepted_len(&self) -> usize {
        self.accepted.len()
    }

    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    pub fn domain_count(&self, domain: &str) -> usize {
        self.domain_counts.get(domain).copied().unwrap_or(0)
    }

    /// Accepted URLs in acceptance order, cut to the target
    pub fn results(&self) -> Vec<String> {
        self.accepted.iter().take(self.target).cloned().collect()
    }

    /// Per-domain counts, sorted by domain, without empty entries
    pub fn domain_counts(&self) -> BTreeMap<String, usize> {
        self.domain_counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(domain, count)| (domain.clone(), *count))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admit_respects_domain_cap() {
        let mut frontier = Frontier::new(10, 2);
        assert_eq!(frontier.admit("https://a.test/1", "a.test"), Admission::Accepted(1));
        assert_eq!(frontier.admit("https://a.test/2", "a.test"), Admission::Accepted(2));
        assert_eq!(frontier.admit("https://a.test/3", "a.test"), Admission::DomainCapped);
        assert_eq!(frontier.domain_count("a.test"), 2);
        assert_eq!(frontier.admit("https://b.test/", "b.test"), Admission::Accepted(3));
    }

    #[test]
    fn test_admit_is_idempotent() {
        let mut frontier = Frontier::new(10, 5);
        frontier.admit("https://a.test/", "a.test");
        assert_eq!(frontier.admit("https://a.test/", "a.test"), Admission::Duplicate);
        assert_eq!(frontier.accepted_len(), 1);
        assert_eq!(frontier.domain_count("a.test"), 1);
    }

    #[test]
    fn test_admit_stops_at_target() {
        let mut frontier = Frontier::new(1, 5);
        assert_eq!(frontier.admit("https://a.test/", "a.test"), Admission::Accepted(1));
        assert!(frontier.is_full());
        assert_eq!(frontier.admit("https://b.test/", "b.test"), Admission::Full);
        assert_eq!(frontier.results(), vec!["https://a.test/"]);
    }

    #[test]
    fn test_mark_visited_once() {
        let mut frontier = Frontier::new(5, 1);
        assert!(frontier.mark_visited("https://a.test/"));
        assert!(!frontier.mark_visited("https://a.test/"));
        assert_eq!(frontier.visited_len(), 1);
    }

    #[test]
    fn test_mark_visited_refused_when_full() {
        let mut frontier = Frontier::new(0, 1);
        assert!(!frontier.mark_visited("https://a.test/"));
        assert_eq!(frontier.visited_len(), 0);
    }

    #[test]
    fn test_order_candidates_prefers_new_domains() {
        let mut frontier = Frontier::new(10, 3);
        frontier.admit("https://a.test/", "a.test");
        frontier.mark_visited("https://c.test/seen");

        let ordered = frontier.order_candidates(vec![
            "https://a.test/1".to_string(),
            "https://b.test/1".to_string(),
            "https://a.test/2".to_string(),
            "https://d.test/1".to_string(),
            "https://c.test/seen".to_string(),
            "not a url".to_string(),
        ]);

        assert_eq!(ordered.len(), 4);
        let (first, second) = ordered.split_at(2);
        assert!(first.iter().all(|u| u.contains("b.test") || u.contains("d.test")));
        assert!(second.iter().all(|u| u.contains("a.test")));
    }

    #[test]
    fn test_domain_counts_match_results() {
        let mut frontier = Frontier::new(10, 2);
        frontier.admit("https://a.test/1", "a.test");
        frontier.admit("https://b.test/1", "b.test");
        frontier.admit("https://a.test/2", "a.test");
        frontier.admit("https://a.test/3", "a.test");

        let counts = frontier.domain_counts();
        assert_eq!(counts.get("a.test"), Some(&2));
        assert_eq!(counts.get("b.test"), Some(&1));
        assert_eq!(counts.values().sum::<usize>(), frontier.results().len());
    }
}
