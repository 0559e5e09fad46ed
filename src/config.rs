// src/config.rs
// =============================================================================
// Run configuration.
//
// Everything a crawl run needs to know lives in CrawlConfig. It is built from
// the command line (see cli.rs) and then handed to CrawlContext, which turns
// it into live services (HTTP client, robots gate, rate limiter).
//
// CrawlConfig::default() reproduces the constants the crawler has always used:
// a cap of 10, 5s + up to 5s between requests, the "GoEngine" agent token and
// siteMap.json as the output file.
// =============================================================================

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::CrawlArgs;
use crate::crawl::{RateLimitPolicy, SchedulingPolicy, DEFAULT_AGENT};
use crate::sitemap::DEFAULT_SITEMAP_PATH;

/// Seeds used when none are given on the command line
pub const DEFAULT_SEEDS: &[&str] = &[
    "https://www.kaggle.com/search?q=housing+prices",
    "http://books.toscrape.com/",
    "https://www.kaggle.com/search?q=stocks",
    "https://www.kaggle.com/search?q=stock+market",
    "https://www.kaggle.com/search?q=real+estate",
];

/// User-Agent headers rotated across fetch sessions
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36",
];

pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub seeds: Vec<String>,
    pub output: PathBuf,
    pub scheduling: SchedulingPolicy,
    pub rate_limit: RateLimitPolicy,
    pub agent: String,
    pub user_agents: Vec<String>,
    pub fetch_timeout: Duration,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seeds: DEFAULT_SEEDS.iter().map(|s| s.to_string()).collect(),
            output: PathBuf::from(DEFAULT_SITEMAP_PATH),
            scheduling: SchedulingPolicy::Pool(DEFAULT_CONCURRENCY),
            rate_limit: RateLimitPolicy::default(),
            agent: DEFAULT_AGENT.to_string(),
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
            fetch_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TryFrom<CrawlArgs> for CrawlConfig {
    type Error = anyhow::Error;

    fn try_from(args: CrawlArgs) -> Result<Self> {
        let defaults = CrawlConfig::default();

        // Seeds: command line first, then the seeds file, then the built-in list
        let mut seeds = args.urls;
        if let Some(path) = &args.seeds_file {
            seeds.extend(load_seeds_file(path)?);
        }
        if seeds.is_empty() {
            seeds = defaults.seeds;
        }

        let scheduling = if args.legacy_cap {
            SchedulingPolicy::LegacyCap(args.concurrency)
        } else {
            SchedulingPolicy::Pool(args.concurrency)
        };

        Ok(Self {
            seeds,
            output: args.output,
            scheduling,
            rate_limit: RateLimitPolicy {
                domain_glob: args.domain_glob,
                delay: seconds(args.delay_secs, "--delay-secs")?,
                jitter: seconds(args.jitter_secs, "--jitter-secs")?,
            },
            agent: args.agent,
            user_agents: defaults.user_agents,
            fetch_timeout: seconds(args.timeout_secs, "--timeout-secs")?,
        })
    }
}

// Durations must be finite and non-negative
fn seconds(value: f64, flag: &str) -> Result<Duration> {
    Duration::try_from_secs_f64(value)
        .with_context(|| format!("{} must be a non-negative number of seconds, got {}", flag, value))
}

// Reads seed URLs from a file, one per line
//
// Blank lines and lines starting with '#' are skipped.
pub fn load_seeds_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("could not read seeds file {}", path.display()))?;
    Ok(parse_seeds(&content))
}

fn parse_seeds(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
