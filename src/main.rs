// src/main.rs
// =============================================================================
// This is the entry point of the CLI.
//
// What happens here:
// 1. Set up logging (stderr, so --json output on stdout stays clean)
// 2. Parse command-line arguments using clap
// 3. Build the configuration: defaults -> --config file -> flags
// 4. Run the sampler (or the validator for `check`) and print the results
// 5. Exit with proper code (0 = success, 1 = fell short / invalid, 2 = error)
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use futures::stream::{self, StreamExt};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use url_sampler::checker::LinkCheckResult;
use url_sampler::{sample_urls, HttpValidator, SampleOutcome, SamplerConfig};

// How many `check` URLs are checked at the same time
const CHECK_CONCURRENCY: usize = 10;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = target reached / every checked URL is valid
//   Ok(1) = fewer URLs than requested / some checked URL is invalid
//   Err   = configuration or start-up error
async fn run() -> Result<i32> {
    init_tracing()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Sample { options, json } => {
            let config = options.apply(load_config(options.config.as_deref())?);
            handle_sample(&config, json).await
        }
        Commands::Check { urls, config, json } => {
            let config = load_config(config.as_deref())?;
            handle_check(&config, urls, json).await
        }
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("url_sampler=info"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SamplerConfig> {
    match path {
        Some(path) => SamplerConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(SamplerConfig::default()),
    }
}

// Handles the 'sample' subcommand
async fn handle_sample(config: &SamplerConfig, json: bool) -> Result<i32> {
    let outcome = sample_urls(config, None).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_sample_table(&outcome);
    }

    if outcome.reached_target() {
        Ok(0)
    } else {
        Ok(1)
    }
}

// Handles the 'check' subcommand
async fn handle_check(config: &SamplerConfig, urls: Vec<String>, json: bool) -> Result<i32> {
    let validator = HttpValidator::new(config)?;

    let results: Vec<LinkCheckResult> = stream::iter(urls)
        .map(|url| {
            let validator = validator.clone();
            async move { validator.check(&url).await }
        })
        .buffered(CHECK_CONCURRENCY)
        .collect()
        .await;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_check_table(&results);
    }

    if results.iter().all(LinkCheckResult::is_ok) {
        Ok(0)
    } else {
        Ok(1)
    }
}

fn print_sample_table(outcome: &SampleOutcome) {
    println!("{:<80} {:<30}", "URL", "DOMAIN");
    println!("{}", "=".repeat(111));

    for url in &outcome.urls {
        let domain = url_sampler::domain::domain_of(url).unwrap_or_default();
        println!("{:<80} {:<30}", truncate(url, 77), domain);
    }

    println!();
    println!("📊 Summary:");
    println!("   🎯 Requested: {}", outcome.requested);
    println!("   ✅ Found: {}", outcome.urls.len());
    println!("   🌐 Distinct domains: {}", outcome.domain_counts.len());
    println!("   🔍 Pages visited: {}", outcome.visited);
}

fn print_check_table(results: &[LinkCheckResult]) {
    println!("{:<60} {:<15} {:<30}", "URL", "STATUS", "MESSAGE");
    println!("{}", "=".repeat(105));

    for result in results {
        let message = result.message.as_deref().unwrap_or("");
        println!(
            "{:<60} {:<15} {:<30}",
            truncate(&result.url, 57),
            format_status(&result.status),
            message
        );
    }

    println!();
    let ok_count = results.iter().filter(|r| r.is_ok()).count();
    println!("📊 Summary:");
    println!("   ✅ Valid: {}", ok_count);
    println!("   ❌ Invalid: {}", results.len() - ok_count);
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

fn format_status(status: &url_sampler::checker::LinkStatus) -> String {
    use url_sampler::checker::LinkStatus;

    match status {
        LinkStatus::Ok => "✅ OK".to_string(),
        LinkStatus::Redirect(_) => "🔀 REDIRECT".to_string(),
        LinkStatus::Broken => "❌ BROKEN".to_string(),
        LinkStatus::Timeout => "⏱️  TIMEOUT".to_string(),
        LinkStatus::SslError => "🔒 SSL ERROR".to_string(),
        LinkStatus::TooManyRedirects => "🔁 TOO MANY REDIRECTS".to_string(),
        LinkStatus::DnsError => "🌐 DNS ERROR".to_string(),
        LinkStatus::Malformed => "🚫 MALFORMED".to_string(),
        LinkStatus::Error => "⚠️  ERROR".to_string(),
    }
}
