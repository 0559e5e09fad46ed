// src/crawl/worker.rs
// =============================================================================
// The fetch worker: one worker owns one CrawlTask from start to finish.
//
// Steps:
// 1. Ask the robots.txt gate; a denied task is reported as Denied
// 2. Wait out the rate limiter for the page's host
// 3. GET the page with a User-Agent from the rotation table
// 4. On HTTP 200, collect every <a href> into the task's link list
// 5. Send exactly one CrawlResult on the results channel
//
// Failures (non-200 status, timeouts, network errors, cancellation) end up as
// CrawlOutcome::Failed on that task only. Nothing is retried.
// =============================================================================

use reqwest::header::USER_AGENT;
use reqwest::StatusCode;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use url::Url;

use super::context::CrawlContext;
use super::links::extract_links;
use super::task::{CrawlOutcome, CrawlResult, CrawlTask};
use crate::error::FetchError;

#[derive(Clone)]
pub struct FetchWorker {
    ctx: Arc<CrawlContext>,
}

impl FetchWorker {
    pub fn new(ctx: Arc<CrawlContext>) -> Self {
        Self { ctx }
    }

    // Crawls the task and reports the result
    //
    // `results` is dropped when this returns, whatever the outcome. The
    // scheduler relies on that: the channel closes once every worker's
    // sender is gone.
    pub async fn run(&self, task: CrawlTask, results: mpsc::Sender<CrawlResult>) {
        let result = self.crawl(task).await;
        if let Err(e) = results.send(result).await {
            warn!(url = %e.0.task.url, "results channel closed, dropping result");
        }
    }

    /// Runs the gate and the fetch, returning the task with its outcome
    pub async fn crawl(&self, mut task: CrawlTask) -> CrawlResult {
        debug!(url = %task.url, created = %task.created, "starting task");

        if self.ctx.is_cancelled() {
            return CrawlResult {
                task,
                outcome: CrawlOutcome::Failed(FetchError::Cancelled),
            };
        }

        if !self.ctx.robots.is_allowed(&task.url).await {
            info!(url = %task.url, "skipping, disallowed by robots.txt");
            return CrawlResult {
                task,
                outcome: CrawlOutcome::Denied,
            };
        }

        let fetched = tokio::select! {
            fetched = self.fetch(&mut task) => fetched,
            _ = self.ctx.cancelled() => Err(FetchError::Cancelled),
        };

        let outcome = match fetched {
            Ok(()) => {
                info!(url = %task.url, links = task.links.len(), "crawled");
                CrawlOutcome::Success
            }
            Err(e) => {
                warn!(url = %task.url, error = %e, "error occurred while crawling");
                CrawlOutcome::Failed(e)
            }
        };

        CrawlResult { task, outcome }
    }

    // Fetches the page and appends its links to the task
    async fn fetch(&self, task: &mut CrawlTask) -> Result<(), FetchError> {
        let page_url =
            Url::parse(&task.url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        if let Some(host) = page_url.host_str() {
            self.ctx.limiter.pace(host).await;
        }

        let mut request = self.ctx.client.get(page_url.clone());
        if let Some(agent) = self.ctx.user_agent() {
            request = request.header(USER_AGENT, agent);
        }

        let response = request.send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        // Resolve relative links against where we ended up after redirects
        let base = response.url().clone();
        let html = response.text().await?;

        for link in extract_links(&html, &base) {
            debug!(url = %task.url, link = %link, "found link");
            task.links.push(link);
        }

        Ok(())
    }
}
