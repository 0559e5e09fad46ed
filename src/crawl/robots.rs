// src/crawl/robots.rs
// =============================================================================
// The robots.txt policy gate.
//
// Before a worker fetches a page it asks: "may our agent fetch this URL?"
//
// Decision table:
// - URL does not parse / has no host  -> deny  (malformed input, fail closed)
// - robots.txt unreachable            -> allow (no policy is not a denial)
// - robots.txt 2xx                    -> ask the robotstxt matcher
// - robots.txt 4xx (e.g. 404)         -> allow everything
// - robots.txt 5xx                    -> deny everything on that host
//
// Every host's robots.txt is fetched at most once per run. The first worker
// to ask about a host performs the fetch; any worker asking about the same
// host while that fetch is in flight waits for it instead of fetching again.
// =============================================================================

use reqwest::header::USER_AGENT;
use reqwest::Client;
use robotstxt::DefaultMatcher;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::{debug, warn};
use url::Url;

/// Agent token tested against robots.txt groups
pub const DEFAULT_AGENT: &str = "GoEngine";

// What we learned from a host's robots.txt
#[derive(Debug, Clone)]
enum HostPolicy {
    /// 2xx: the body, to be evaluated per URL
    Rules(String),
    /// 4xx: no usable policy, everything allowed
    AllowAll,
    /// 5xx: the server is unhappy, stay away
    DisallowAll,
    /// Network error, fail open
    Unreachable,
}

type PolicyCell = Arc<OnceCell<HostPolicy>>;

pub struct RobotsGate {
    client: Client,
    agent: String,
    cache: Mutex<HashMap<String, PolicyCell>>,
    fetches: AtomicUsize,
}

impl RobotsGate {
    pub fn new(client: Client, agent: impl Into<String>) -> Self {
        Self {
            client,
            agent: agent.into(),
            cache: Mutex::new(HashMap::new()),
            fetches: AtomicUsize::new(0),
        }
    }

    /// May our agent fetch `url`?
    pub async fn is_allowed(&self, url: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(url, error = %e, "could not parse URL, denying");
                return false;
            }
        };

        let Some(authority) = authority_of(&parsed) else {
            warn!(url, "URL has no host, denying");
            return false;
        };

        let cell = self.cell_for(&authority);
        let policy = cell
            .get_or_init(|| self.fetch_policy(&authority))
            .await;

        match policy {
            HostPolicy::Rules(body) => {
                let mut matcher = DefaultMatcher::default();
                let allowed = matcher.one_agent_allowed_by_robots(body, &self.agent, url);
                debug!(url, agent = %self.agent, allowed, "robots.txt evaluated");
                allowed
            }
            HostPolicy::AllowAll | HostPolicy::Unreachable => true,
            HostPolicy::DisallowAll => false,
        }
    }

    /// How many robots.txt documents were actually requested
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    // Returns the shared cell for a host, creating it on first use
    //
    // The lock only guards the map lookup; it is released before anyone
    // awaits the cell.
    fn cell_for(&self, authority: &str) -> PolicyCell {
        let mut cache = match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache
            .entry(authority.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    async fn fetch_policy(&self, authority: &str) -> HostPolicy {
        let robots_url = format!("http://{}/robots.txt", authority);
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let request = self.client.get(&robots_url).header(USER_AGENT, &self.agent);
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(robots_url = %robots_url, error = %e, "could not fetch robots.txt, allowing");
                return HostPolicy::Unreachable;
            }
        };

        let status = response.status();
        if status.is_client_error() {
            debug!(robots_url = %robots_url, status = status.as_u16(), "no robots.txt, allowing all");
            return HostPolicy::AllowAll;
        }
        if status.is_server_error() {
            warn!(robots_url = %robots_url, status = status.as_u16(), "robots.txt server error, disallowing all");
            return HostPolicy::DisallowAll;
        }

        match response.text().await {
            Ok(body) => HostPolicy::Rules(body),
            Err(e) => {
                warn!(robots_url = %robots_url, error = %e, "could not read robots.txt, allowing");
                HostPolicy::Unreachable
            }
        }
    }
}

// host[:port], the part of the URL robots.txt is scoped to
fn authority_of(url: &Url) -> Option<String> {
    let host = url.host_str().filter(|h| !h.is_empty())?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is OnceCell?
//    - A slot that is filled exactly once
//    - get_or_init() runs the async initializer only for the first caller
//    - Everyone else who calls it at the same time waits for that result
//
// 2. Why is the Mutex a std::sync::Mutex and not tokio's?
//    - We only hold it long enough to look up or insert a cell
//    - It is never held across an .await, so the blocking mutex is fine
//
// 3. What does `let Some(x) = ... else { ... };` do?
//    - It's "let-else": bind x if the pattern matches, otherwise run the
//      else block, which must return (or break/continue)
// -----------------------------------------------------------------------------
