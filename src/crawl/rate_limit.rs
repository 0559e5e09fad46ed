// src/crawl/rate_limit.rs
// =============================================================================
// Polite pacing for page fetches.
//
// A RateLimitPolicy is plain configuration: a domain glob, a fixed delay and
// an upper bound for extra random jitter. The RateLimiter holds the rules and
// sleeps before every request to a host that matches one of them.
//
// Only one rule is configured per run (by default "*", 5s + up to 5s), and
// no per-domain state is kept: each request just waits delay + jitter.
// =============================================================================

use rand::Rng;
use std::time::Duration;
use tracing::debug;

// A pacing rule keyed by domain glob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Glob matched against the request host ("*" matches everything)
    pub domain_glob: String,
    /// Fixed wait before each request
    pub delay: Duration,
    /// Upper bound of the extra random wait
    pub jitter: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            domain_glob: "*".to_string(),
            delay: Duration::from_secs(5),
            jitter: Duration::from_secs(5),
        }
    }
}

impl RateLimitPolicy {
    /// A policy that never waits
    #[cfg(test)]
    pub fn none() -> Self {
        Self {
            domain_glob: "*".to_string(),
            delay: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }

    /// Does this rule apply to `host`?
    pub fn matches(&self, host: &str) -> bool {
        glob_match(
            &self.domain_glob.to_ascii_lowercase(),
            &host.to_ascii_lowercase(),
        )
    }

    /// The wait for the next request: delay plus a uniform draw in [0, jitter]
    pub fn next_delay(&self) -> Duration {
        let jitter_nanos = u64::try_from(self.jitter.as_nanos()).unwrap_or(u64::MAX);
        if jitter_nanos == 0 {
            return self.delay;
        }
        let extra = rand::thread_rng().gen_range(0..=jitter_nanos);
        self.delay.saturating_add(Duration::from_nanos(extra))
    }
}

// Applies the configured rules before outbound requests
#[derive(Debug, Clone, Default)]
pub struct RateLimiter {
    rules: Vec<RateLimitPolicy>,
}

impl RateLimiter {
    pub fn new(rules: Vec<RateLimitPolicy>) -> Self {
        Self { rules }
    }

    // Returns the delay that pace() would sleep for, without sleeping
    pub fn delay_for(&self, host: &str) -> Option<Duration> {
        self.rules
            .iter()
            .find(|rule| rule.matches(host))
            .map(RateLimitPolicy::next_delay)
    }

    /// Sleeps for the first matching rule's delay; no match, no wait
    pub async fn pace(&self, host: &str) {
        if let Some(wait) = self.delay_for(host) {
            if !wait.is_zero() {
                debug!(host, wait_ms = wait.as_millis() as u64, "pacing request");
                tokio::time::sleep(wait).await;
            }
        }
    }
}

// Glob matching where '*' matches any run of characters
//
// Classic two-pointer wildcard matching: remember the last '*' we saw and
// backtrack to it whenever a literal character fails to match.
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern = pattern.as_bytes();
    let text = text.as_bytes();

    let (mut p, mut t) = (0, 0);
    let mut star: Option<usize> = None;
    let mut star_t = 0;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == b'*' {
            star = Some(p);
            star_t = t;
            p += 1;
        } else if p < pattern.len() && pattern[p] == text[t] {
            p += 1;
            t += 1;
        } else if let Some(s) = star {
            p = s + 1;
            star_t += 1;
            t = star_t;
        } else {
            return false;
        }
    }

    // Trailing stars can match the empty string
    pattern[p..].iter().all(|&c| c == b'*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_five_plus_five_seconds() {
        let policy = RateLimitPolicy::default();
        assert_eq!(policy.domain_glob, "*");
        assert_eq!(policy.delay, Duration::from_secs(5));
        assert_eq!(policy.jitter, Duration::from_secs(5));
    }

    #[test]
    fn test_star_matches_every_domain() {
        let policy = RateLimitPolicy::default();
        assert!(policy.matches("example.com"));
        assert!(policy.matches("books.toscrape.com"));
        assert!(policy.matches(""));
    }

    #[test]
    fn test_glob_patterns() {
        assert!(glob_match("*.example.com", "www.example.com"));
        assert!(!glob_match("*.example.com", "example.com"));
        assert!(glob_match("example.*", "example.org"));
        assert!(glob_match("*kaggle*", "www.kaggle.com"));
        assert!(!glob_match("kaggle.com", "www.kaggle.com"));
        assert!(glob_match("kaggle.com", "kaggle.com"));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let policy = RateLimitPolicy {
            domain_glob: "*.Example.COM".to_string(),
            ..RateLimitPolicy::none()
        };
        assert!(policy.matches("WWW.example.com"));
    }

    #[test]
    fn test_next_delay_stays_within_bounds() {
        let policy = RateLimitPolicy {
            domain_glob: "*".to_string(),
            delay: Duration::from_millis(100),
            jitter: Duration::from_millis(50),
        };
        for _ in 0..200 {
            let wait = policy.next_delay();
            assert!(wait >= Duration::from_millis(100));
            assert!(wait <= Duration::from_millis(150));
        }
    }

    #[test]
    fn test_zero_jitter_is_exact() {
        let policy = RateLimitPolicy {
            domain_glob: "*".to_string(),
            delay: Duration::from_millis(20),
            jitter: Duration::ZERO,
        };
        assert_eq!(policy.next_delay(), Duration::from_millis(20));
    }

    #[test]
    fn test_limiter_skips_unmatched_hosts() {
        let limiter = RateLimiter::new(vec![RateLimitPolicy {
            domain_glob: "*.slow.test".to_string(),
            delay: Duration::from_secs(1),
            jitter: Duration::ZERO,
        }]);
        assert_eq!(limiter.delay_for("a.slow.test"), Some(Duration::from_secs(1)));
        assert_eq!(limiter.delay_for("fast.test"), None);
    }

    #[tokio::test]
    async fn test_pace_waits_before_each_request() {
        let limiter = RateLimiter::new(vec![RateLimitPolicy {
            domain_glob: "*".to_string(),
            delay: Duration::from_millis(30),
            jitter: Duration::ZERO,
        }]);
        let start = tokio::time::Instant::now();
        limiter.pace("example.com").await;
        limiter.pace("example.com").await;
        assert!(start.elapsed() >= Duration::from_millis(60));
    }
}
