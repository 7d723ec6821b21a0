// src/crawl/queue.rs
// =============================================================================
// This module runs the sampling crawl.
//
// How it works:
// 1. Deduplicate and shuffle the seed URLs
// 2. Crawl the seeds in batches; seeds in one batch run concurrently, and a
//    batch finishes (including everything reachable from it) before the next
// 3. Visiting a page: validate it, offer it to the result set under the
//    per-domain cap, then fetch its links
// 4. Links on domains not yet in the result set are explored before links on
//    domains we already have
// 5. Stop as soon as the result set is full or there is nothing left to visit
//
// Exploration is depth-first like a recursive crawl would be, but driven by
// an explicit stack so a long chain of pages can't overflow the call stack.
//
// Politeness:
// - A fixed delay before every page visited from a discovered link
// =============================================================================

use futures::future::join_all;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

use super::frontier::{Admission, Frontier};
use crate::checker::{HtmlLinkExtractor, HttpValidator, LinkExtractor, UrlValidator};
use crate::config::SamplerConfig;
use crate::domain::{domain_of, normalize_url};

/// Everything a finished run produced
#[derive(Debug, Clone, Serialize)]
pub struct SampleOutcome {
    /// How many URLs were asked for
    pub requested: usize,
    /// Accepted URLs in the order they were accepted
    pub urls: Vec<String>,
    /// Accepted URLs per domain
    pub domain_counts: BTreeMap<String, usize>,
    /// How many URLs were dequeued for crawling
    pub visited: usize,
}

impl SampleOutcome {
    pub fn reached_target(&self) -> bool {
        self.urls.len() >= self.requested
    }
}

/// Drives a crawl over any link extractor / validator pair
pub struct Sampler<E, V> {
    extractor: E,
    validator: V,
    max_urls_per_domain: usize,
    concurrency: usize,
    crawl_delay: Duration,
}

impl<E: LinkExtractor, V: UrlValidator> Sampler<E, V> {
    pub fn new(extractor: E, validator: V, config: &SamplerConfig) -> Self {
        Self {
            extractor,
            validator,
            max_urls_per_domain: config.max_urls_per_domain,
            concurrency: config.concurrency.max(1),
            crawl_delay: config.crawl_delay(),
        }
    }

    /// Crawls outward from `seeds` until `target` URLs are accepted or the
    /// reachable pages run out
    pub async fn run(&self, seeds: &[String], target: usize) -> SampleOutcome {
        let frontier = Mutex::new(Frontier::new(target, self.max_urls_per_domain));

        if target > 0 {
            let seeds = prepare_seeds(seeds);
            info!(
                target,
                seeds = seeds.len(),
                concurrency = self.concurrency,
                "starting url sampling"
            );

            for (index, batch) in seeds.chunks(self.concurrency).enumerate() {
                if lock(&frontier).is_full() {
                    break;
                }

                join_all(batch.iter().map(|seed| self.explore(seed, target, &frontier))).await;

                let state = lock(&frontier);
                info!(
                    batch = index + 1,
                    accepted = state.accepted_len(),
                    visited = state.visited_len(),
                    "seed batch finished"
                );
            }
        }

        let state = lock(&frontier);
        let outcome = SampleOutcome {
            requested: target,
            urls: state.results(),
            domain_counts: state.domain_counts(),
            visited: state.visited_len(),
        };

        info!(
            found = outcome.urls.len(),
            requested = target,
            domains = outcome.domain_counts.len(),
            visited = outcome.visited,
            "url sampling finished"
        );
        outcome
    }

    // Depth-first exploration from one seed.
    //
    // Each stack frame holds the not-yet-tried links of one page, already in
    // exploration order. Visiting a link pushes that page's links on top, so
    // the order matches a recursive crawl.
    async fn explore(&self, seed: &str, target: usize, frontier: &Mutex<Frontier>) {
        let mut stack: Vec<VecDeque<String>> = Vec::new();

        if let Some(links) = self.visit(seed, target, frontier).await {
            stack.push(links.into());
        }

        while let Some(frame) = stack.last_mut() {
            let Some(next) = frame.pop_front() else {
                stack.pop();
                continue;
            };

            {
                let state = lock(frontier);
                if state.is_full() {
                    break;
                }
                if state.is_visited(&next) {
                    continue;
                }
            }

            tokio::time::sleep(self.crawl_delay).await;

            if let Some(links) = self.visit(&next, target, frontier).await {
                stack.push(links.into());
            }
        }
    }

    // Visits one page. Returns the links to explore next, or None when this
    // page is a dead end (already visited, invalid, malformed, or run is full).
    async fn visit(
        &self,
        url: &str,
        target: usize,
        frontier: &Mutex<Frontier>,
    ) -> Option<Vec<String>> {
        if !lock(frontier).mark_visited(url) {
            return None;
        }

        if !self.validator.is_valid_url(url).await {
            return None;
        }

        let Some(domain) = domain_of(url) else {
            debug!(url, "skipping url without a usable domain");
            return None;
        };

        let admission = lock(frontier).admit(url, &domain);
        match admission {
            Admission::Accepted(count) => {
                info!(
                    url,
                    domain = %domain,
                    progress = %format!("{}/{}", count, target),
                    "accepted url"
                );
            }
            Admission::DomainCapped => {
                debug!(url, domain = %domain, "domain cap reached, exploring links only");
            }
            Admission::Duplicate | Admission::Full => {}
        }

        if lock(frontier).is_full() {
            return None;
        }

        let links = self.extractor.extract_links(url).await;
        let ordered = lock(frontier).order_candidates(links);
        Some(ordered)
    }
}

/// Samples URLs with the real HTTP collaborators and returns the full outcome
///
/// `num_urls` falls back to `config.number_of_urls`.
pub async fn sample_urls(
    config: &SamplerConfig,
    num_urls: Option<usize>,
) -> anyhow::Result<SampleOutcome> {
    config.validate()?;

    let sampler = Sampler::new(
        HtmlLinkExtractor::new(config)?,
        HttpValidator::new(config)?,
        config,
    );
    let target = num_urls.unwrap_or(config.number_of_urls);

    Ok(sampler.run(&config.seed_urls, target).await)
}

/// Returns up to `num_urls` valid, domain-diverse URLs
pub async fn get_valid_urls(
    config: &SamplerConfig,
    num_urls: Option<usize>,
) -> anyhow::Result<Vec<String>> {
    Ok(sample_urls(config, num_urls).await?.urls)
}

// Normalizes every seed the same way discovered links are normalized (absolute,
// no fragment), drops the ones that don't parse and repeats (first occurrence
// wins), then shuffles
fn prepare_seeds(seeds: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut prepared = Vec::new();

    for seed in seeds.iter().map(|seed| seed.trim()).filter(|seed| !seed.is_empty()) {
        let Some(normalized) = normalize_url(seed) else {
            debug!(seed, "dropping seed that is not an absolute URL");
            continue;
        };
        if seen.insert(normalized.clone()) {
            prepared.push(normalized);
        }
    }

    prepared.shuffle(&mut rand::thread_rng());
    prepared
}

// A panic while holding the lock can't leave the frontier half-updated, since
// every mutation is a single method call; keep using it.
fn lock(frontier: &Mutex<Frontier>) -> MutexGuard<'_, Frontier> {
    frontier.lock().unwrap_or_else(PoisonError::into_inner)
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why a std Mutex inside async code?
//    - The lock is only ever held for a few map operations and is always
//      released before the next .await
//    - tokio's Mutex is only needed when a guard must live across an await
//
// 2. Why join_all instead of tokio::spawn?
//    - Seeds in a batch share the same Sampler by reference; join_all polls
//      them concurrently on the current task without needing 'static data
//    - The work is I/O bound, so one task is plenty
//
// 3. Why a stack of VecDeques?
//    - The front of each deque is the next link of that page to try
//    - Pushing a new frame = descending one level; popping = returning
// -----------------------------------------------------------------------------
