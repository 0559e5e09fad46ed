// src/crawl/mod.rs
// =============================================================================
// This module is the concurrent crawl engine.
//
// Submodules (leaves first):
// - robots: may our agent fetch this URL? (robots.txt, cached per host)
// - rate_limit: how long to wait before each request to a domain
// - links: pull <a href> links out of a fetched page
// - task: CrawlTask / CrawlOutcome / CrawlResult
// - context: the per-run services every worker is handed
// - worker: one worker per task, reports exactly one result
// - scheduler: launches workers and drains their results
// =============================================================================

mod context;
mod links;
mod rate_limit;
mod robots;
mod scheduler;
mod task;
mod worker;

pub use context::CrawlContext;
pub use rate_limit::RateLimitPolicy;
pub use robots::DEFAULT_AGENT;
pub use scheduler::{run_crawl, SchedulingPolicy};
pub use task::{CrawlOutcome, CrawlResult, CrawlTask};
