// src/crawl/task.rs
// =============================================================================
// The data that flows through a crawl run.
//
// - CrawlTask: one seed URL plus the links discovered on it
// - CrawlOutcome: what happened when a worker tried that task
// - CrawlResult: the task and its outcome, sent once on the results channel
//
// A task is moved into exactly one worker and comes back out inside its
// CrawlResult. Nothing else can touch its link list while the worker runs.
// =============================================================================

use chrono::{DateTime, Utc};

use crate::error::FetchError;

// One unit of work for the crawler
#[derive(Debug, Clone)]
pub struct CrawlTask {
    /// The URL to fetch
    pub url: String,
    /// When the task was enqueued
    pub created: DateTime<Utc>,
    /// Outbound links in discovery order (duplicates kept)
    pub links: Vec<String>,
}

impl CrawlTask {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            created: Utc::now(),
            links: Vec::new(),
        }
    }
}

// How a single task ended
#[derive(Debug)]
pub enum CrawlOutcome {
    /// HTTP 200; the discovered links are on the task
    Success,
    /// robots.txt (or a malformed URL) kept us from fetching
    Denied,
    /// The fetch was attempted and did not produce a page
    Failed(FetchError),
}

// What a worker sends back, exactly once per launched task
#[derive(Debug)]
pub struct CrawlResult {
    pub task: CrawlTask,
    pub outcome: CrawlOutcome,
}

impl CrawlResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, CrawlOutcome::Success)
    }
}
