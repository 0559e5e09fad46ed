// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
//   crab crawl https://example.com https://example.org
//   crab crawl --seeds-file seeds.txt --concurrency 4 --json
//   crab -vv crawl                       (built-in seeds, debug logging)
// =============================================================================

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "crab",
    version = "0.1.0",
    about = "Crawl seed URLs politely and write their outbound links to a sitemap",
    long_about = "crab fetches a list of seed URLs concurrently, honours each site's robots.txt, \
                  paces requests per domain and writes every page's outbound links to siteMap.json."
)]
pub struct Cli {
    /// Increase log verbosity (-v = debug, -vv = trace). RUST_LOG wins if set.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl seed URLs and write the sitemap
    ///
    /// Example: crab crawl https://example.com --concurrency 4
    Crawl(CrawlArgs),
}

#[derive(Args, Debug)]
pub struct CrawlArgs {
    /// Seed URLs to crawl (the built-in list is used when none are given)
    pub urls: Vec<String>,

    /// File with one seed URL per line ('#' starts a comment)
    #[arg(long)]
    pub seeds_file: Option<PathBuf>,

    /// Where to write the sitemap
    #[arg(long, default_value = "siteMap.json")]
    pub output: PathBuf,

    /// Maximum number of pages fetched at the same time
    #[arg(long, default_value_t = 10)]
    pub concurrency: usize,

    /// Treat --concurrency as the old launch cap instead of a pool size
    ///
    /// With this flag every seed is launched at once when there are at most
    /// --concurrency of them; otherwise only the first seed is crawled.
    #[arg(long)]
    pub legacy_cap: bool,

    /// Fixed wait before each request, in seconds
    #[arg(long, default_value_t = 5.0)]
    pub delay_secs: f64,

    /// Upper bound of the extra random wait before each request, in seconds
    #[arg(long, default_value_t = 5.0)]
    pub jitter_secs: f64,

    /// Domains the pacing rule applies to ('*' matches anything)
    #[arg(long, default_value = "*")]
    pub domain_glob: String,

    /// Give up on a single fetch after this many seconds
    #[arg(long, default_value_t = 30.0)]
    pub timeout_secs: f64,

    /// Agent token checked against robots.txt
    #[arg(long, default_value = "GoEngine")]
    pub agent: String,

    /// Print the sitemap to stdout as JSON instead of the results table
    #[arg(long)]
    pub json: bool,
}
