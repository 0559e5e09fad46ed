// src/crawl/context.rs
// =============================================================================
// Per-run services shared by every worker.
//
// Instead of reaching for global functions, each worker is handed an
// Arc<CrawlContext> when it is created. The context owns:
// - the HTTP client (with the per-fetch timeout baked in)
// - the robots.txt gate and its per-host cache
// - the rate limiter
// - the User-Agent rotation table
// - the cancellation signal flipped by Ctrl+C
// =============================================================================

use rand::seq::SliceRandom;
use reqwest::Client;
use tokio::sync::watch;

use super::rate_limit::RateLimiter;
use super::robots::RobotsGate;
use crate::config::CrawlConfig;

pub struct CrawlContext {
    pub client: Client,
    pub robots: RobotsGate,
    pub limiter: RateLimiter,
    user_agents: Vec<String>,
    cancel: watch::Receiver<bool>,
}

impl CrawlContext {
    /// Builds the services for one run from its configuration
    pub fn new(config: &CrawlConfig, cancel: watch::Receiver<bool>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.fetch_timeout).build()?;

        Ok(Self {
            robots: RobotsGate::new(client.clone(), config.agent.clone()),
            limiter: RateLimiter::new(vec![config.rate_limit.clone()]),
            client,
            user_agents: config.user_agents.clone(),
            cancel,
        })
    }

    /// A random entry of the User-Agent table, if there is one
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agents
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Resolves once the run has been cancelled
    ///
    /// If the sender is gone without ever cancelling, this never resolves.
    pub async fn cancelled(&self) {
        let mut cancel = self.cancel.clone();
        loop {
            if *cancel.borrow_and_update() {
                return;
            }
            if cancel.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}
