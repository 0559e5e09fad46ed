// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging
// 3. Build the run configuration and the shared crawl context
// 4. Crawl the seeds, then write the sitemap
// 5. Exit with proper code (0 = sitemap written, 1 = write failed, 2 = error)
// =============================================================================

mod cli;       // src/cli.rs - command-line parsing
mod config;    // src/config.rs - run configuration
mod crawl;     // src/crawl/ - the concurrent crawl engine
mod error;     // src/error.rs - error types
mod logging;   // src/logging.rs - tracing setup
mod sitemap;   // src/sitemap.rs - sitemap aggregation and persistence

use anyhow::{Context, Result};
use clap::Parser;
use std::fmt::Write;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, warn};

use cli::{Cli, Commands, CrawlArgs};
use config::CrawlConfig;
use crawl::{run_crawl, CrawlContext, CrawlOutcome, CrawlResult, CrawlTask};
use sitemap::SiteMap;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "crawl aborted");
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = sitemap written
//   Ok(1) = crawl ran but the sitemap could not be written
//   Err   = bad configuration or setup failure
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Commands::Crawl(args) => handle_crawl(args).await,
    }
}

async fn handle_crawl(args: CrawlArgs) -> Result<i32> {
    let json = args.json;
    let config = CrawlConfig::try_from(args)?;

    status(json, &format!("🔍 Crawling {} seed URL(s)", config.seeds.len()));
    status(
        json,
        &format!(
            "⏱️  Pacing: {:?} + up to {:?} per request to '{}'",
            config.rate_limit.delay, config.rate_limit.jitter, config.rate_limit.domain_glob
        ),
    );

    // Ctrl+C flips the cancellation signal; in-flight fetches stop and the
    // results gathered so far are still written
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("received Ctrl+C, cancelling in-flight fetches");
            let _ = cancel_tx.send(true);
        }
    });

    let ctx = CrawlContext::new(&config, cancel_rx).context("could not build HTTP client")?;
    let tasks: Vec<CrawlTask> = config.seeds.iter().map(CrawlTask::new).collect();

    let results = run_crawl(tasks, config.scheduling, Arc::new(ctx)).await;
    let sitemap = SiteMap::from_results(&results);
    print_results(&results, &sitemap, json)?;

    if sitemap.is_empty() {
        status(json, "⚠️  No page was crawled successfully, writing an empty sitemap");
    }

    match sitemap.write_to(&config.output) {
        Ok(()) => {
            status(
                json,
                &format!("📄 Sitemap with {} page(s) written to {}", sitemap.len(), config.output.display()),
            );
            Ok(0)
        }
        Err(e) => {
            eprintln!("❌ Could not write sitemap: {}", e);
            Ok(1)
        }
    }
}

// Progress lines go to stdout, or to stderr when stdout carries JSON
fn status(json: bool, line: &str) {
    if json {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}

// Prints the sitemap as JSON, or the results table otherwise
fn print_results(results: &[CrawlResult], sitemap: &SiteMap, json: bool) -> Result<()> {
    print!("{}", render_results(results, sitemap, json)?);
    Ok(())
}

fn render_results(results: &[CrawlResult], sitemap: &SiteMap, json: bool) -> Result<String> {
    if json {
        Ok(format!("{}\n", sitemap.to_pretty_json()?))
    } else {
        Ok(render_table(results))
    }
}

// One line per crawled URL plus a summary
fn render_table(results: &[CrawlResult]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<60} {:<12} {:<30}", "URL", "OUTCOME", "DETAIL");
    let _ = writeln!(out, "{}", "=".repeat(102));

    for result in results {
        let (outcome, detail) = match &result.outcome {
            CrawlOutcome::Success => ("✅ OK", format!("{} link(s)", result.task.links.len())),
            CrawlOutcome::Denied => ("🚫 DENIED", "robots.txt".to_string()),
            CrawlOutcome::Failed(e) => ("❌ FAILED", e.to_string()),
        };

        let url_display = if result.task.url.chars().count() > 57 {
            let head: String = result.task.url.chars().take(57).collect();
            format!("{}...", head)
        } else {
            result.task.url.clone()
        };

        let _ = writeln!(out, "{:<60} {:<12} {:<30}", url_display, outcome, detail);
    }

    out.push('\n');

    let ok_count = results.iter().filter(|r| r.is_success()).count();
    let denied_count = results
        .iter()
        .filter(|r| matches!(r.outcome, CrawlOutcome::Denied))
        .count();

    let _ = writeln!(out, "📊 Summary:");
    let _ = writeln!(out, "   ✅ Crawled: {}", ok_count);
    let _ = writeln!(out, "   🚫 Denied: {}", denied_count);
    let _ = writeln!(out, "   ❌ Failed: {}", results.len() - ok_count - denied_count);
    let _ = writeln!(out, "   📋 Total: {}", results.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    fn results() -> Vec<CrawlResult> {
        let mut ok = CrawlTask::new("https://a.test/");
        ok.links = vec!["https://a.test/x".to_string()];
        vec![
            CrawlResult {
                task: ok,
                outcome: CrawlOutcome::Success,
            },
            CrawlResult {
                task: CrawlTask::new("http://127.0.0.1:9/x"),
                outcome: CrawlOutcome::Failed(FetchError::Request("connection refused".to_string())),
            },
        ]
    }

    #[test]
    fn test_json_mode_prints_only_the_sitemap() {
        let results = results();
        let sitemap = SiteMap::from_results(&results);

        let out = render_results(&results, &sitemap, true).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(parsed["https://a.test/"][0], "https://a.test/x");
        assert!(!out.contains("Summary"));
    }

    #[test]
    fn test_json_mode_with_nothing_crawled_is_an_empty_object() {
        let results = vec![results().remove(1)];
        let sitemap = SiteMap::from_results(&results);

        let out = render_results(&results, &sitemap, true).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, serde_json::json!({}));
    }

    #[test]
    fn test_table_mode_lists_every_result() {
        let results = results();
        let sitemap = SiteMap::from_results(&results);

        let out = render_results(&results, &sitemap, false).unwrap();
        assert!(out.contains("https://a.test/"));
        assert!(out.contains("FAILED"));
        assert!(out.contains("📋 Total: 2"));
    }
}
