// src/crawl/mod.rs
// =============================================================================
// This module handles the sampling crawl.
//
// Features:
// - Seed URLs crawled in concurrent batches
// - Per-domain cap on accepted URLs, so no single site dominates the sample
// - Links to domains we don't have yet are followed first
// - Polite crawling with a delay before each followed link
// - Each URL is fetched and validated at most once per run
//
// Submodules:
// - frontier: visited set, result set and per-domain counts
// - queue: the crawl loop and the public entry points
// =============================================================================

mod frontier;
mod queue;

pub use frontier::{Admission, Frontier};
pub use queue::{get_valid_urls, sample_urls, SampleOutcome, Sampler};
