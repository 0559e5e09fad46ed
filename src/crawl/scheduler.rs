// src/crawl/scheduler.rs
// =============================================================================
// The crawl scheduler: launch workers, collect their results.
//
// How it works:
// 1. Create a results channel with one slot per launched task, so no worker
//    ever waits to report
// 2. Launch workers according to the SchedulingPolicy
// 3. Drop our own sender; each worker holds a clone
// 4. Drain the channel until it closes
//
// The channel closes exactly once, when the last worker drops its sender.
// That sender count is our completion counter: there is no separate
// "wait for everyone, then close" step that could run too early or twice.
//
// Two scheduling policies:
// - Pool(n): every task runs, at most n at a time (the default)
// - LegacyCap(c): the old capacity rule. With at most c tasks all of them are
//   launched at once; with more than c only the first task is launched,
//   because the check runs right after the first launch and stops the loop.
// =============================================================================

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

use super::context::CrawlContext;
use super::task::{CrawlOutcome, CrawlResult, CrawlTask};
use super::worker::FetchWorker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulingPolicy {
    /// Bounded worker pool: all tasks, at most this many in flight
    Pool(usize),
    /// Launch cap: all tasks if len <= cap, otherwise only the first.
    /// A run of exactly `cap` tasks launches all of them.
    LegacyCap(usize),
}

/// How many of `len` tasks a policy will launch
pub fn launch_count(len: usize, policy: SchedulingPolicy) -> usize {
    match policy {
        SchedulingPolicy::Pool(_) => len,
        SchedulingPolicy::LegacyCap(cap) if len > cap => len.min(1),
        SchedulingPolicy::LegacyCap(_) => len,
    }
}

/// Crawls `tasks` and returns one result per launched task, in arrival order
pub async fn run_crawl(
    tasks: Vec<CrawlTask>,
    policy: SchedulingPolicy,
    ctx: Arc<CrawlContext>,
) -> Vec<CrawlResult> {
    let launched = launch_count(tasks.len(), policy);
    if launched < tasks.len() {
        info!(
            total = tasks.len(),
            launched,
            "launch cap reached, remaining tasks are not crawled"
        );
    }

    let (tx, mut rx) = mpsc::channel(launched.max(1));
    let worker = FetchWorker::new(ctx.clone());

    info!(tasks = launched, ?policy, "starting crawl");
    match policy {
        SchedulingPolicy::LegacyCap(_) => {
            for task in tasks.into_iter().take(launched) {
                info!(url = %task.url, "crawling URL");
                let worker = worker.clone();
                let tx = tx.clone();
                tokio::spawn(async move { worker.run(task, tx).await });
            }
        }
        SchedulingPolicy::Pool(size) => {
            let size = size.max(1);
            let tx = tx.clone();
            tokio::spawn(async move {
                stream::iter(tasks)
                    .for_each_concurrent(size, |task| {
                        let worker = worker.clone();
                        let tx = tx.clone();
                        async move {
                            info!(url = %task.url, "crawling URL");
                            worker.run(task, tx).await
                        }
                    })
                    .await;
            });
        }
    }

    // Only worker-held senders remain; recv() returns None once they are gone
    drop(tx);
    info!("waiting for crawlers to finish");

    let mut results = Vec::with_capacity(launched);
    while let Some(result) = rx.recv().await {
        results.push(result);
    }
    info!("all workers finished, channel closed");

    log_summary(&results, ctx.robots.fetches());
    results
}

fn log_summary(results: &[CrawlResult], robots_fetches: usize) {
    let mut succeeded = 0;
    let mut denied = 0;
    let mut failed = 0;
    for result in results {
        match result.outcome {
            CrawlOutcome::Success => succeeded += 1,
            CrawlOutcome::Denied => denied += 1,
            CrawlOutcome::Failed(_) => failed += 1,
        }
    }
    info!(
        finished = results.len(),
        succeeded, denied, failed, robots_fetches, "crawl finished"
    );
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does dropping `tx` matter?
//    - An mpsc channel stays open while any Sender exists
//    - If we kept ours, rx.recv() would wait forever after the last worker
//    - Once every worker has finished (and dropped its clone), recv() → None
//
// 2. What is for_each_concurrent?
//    - Like buffer_unordered, it runs up to N futures from a stream at once
//    - As soon as one finishes, the next task from the stream starts
//
// 3. Why tokio::spawn the pool?
//    - The pool runs in the background while we drain the channel here
//    - Otherwise we would have to finish every fetch before reading results,
//      which only works because the channel has room for all of them
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlConfig;
    use crate::crawl::RateLimitPolicy;
    use crate::error::FetchError;
    use crate::sitemap::SiteMap;
    use std::time::Duration;
    use tokio::sync::watch;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn context() -> Arc<CrawlContext> {
        // With the sender gone the run can never be cancelled
        let (_, rx) = watch::channel(false);
        let config = CrawlConfig {
            rate_limit: RateLimitPolicy::none(),
            fetch_timeout: Duration::from_secs(10),
            ..CrawlConfig::default()
        };
        Arc::new(CrawlContext::new(&config, rx).unwrap())
    }

    async fn mount_page(server: &MockServer, page: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    async fn open_server() -> MockServer {
        let server = MockServer::start().await;
        mount_page(&server, "/robots.txt", 404, "").await;
        server
    }

    fn tasks(urls: impl IntoIterator<Item = String>) -> Vec<CrawlTask> {
        urls.into_iter().map(CrawlTask::new).collect()
    }

    #[test]
    fn test_legacy_cap_launch_counts() {
        // Fewer tasks than the cap: all of them
        assert_eq!(launch_count(3, SchedulingPolicy::LegacyCap(10)), 3);
        // Exactly the cap: all of them
        assert_eq!(launch_count(10, SchedulingPolicy::LegacyCap(10)), 10);
        // More than the cap: the loop stops after the first launch
        assert_eq!(launch_count(11, SchedulingPolicy::LegacyCap(10)), 1);
        assert_eq!(launch_count(5, SchedulingPolicy::LegacyCap(0)), 1);
        assert_eq!(launch_count(0, SchedulingPolicy::LegacyCap(0)), 0);
    }

    #[test]
    fn test_pool_launches_everything() {
        assert_eq!(launch_count(50, SchedulingPolicy::Pool(4)), 50);
        assert_eq!(launch_count(0, SchedulingPolicy::Pool(4)), 0);
    }

    #[tokio::test]
    async fn test_empty_task_list_finishes() {
        let results = run_crawl(Vec::new(), SchedulingPolicy::Pool(4), context()).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_legacy_cap_truncates_to_first_task() {
        let server = open_server().await;
        for i in 0..4 {
            mount_page(&server, &format!("/p/{}", i), 200, "<p>hi</p>").await;
        }
        let uri = server.uri();
        let list = tasks((0..4).map(|i| format!("{}/p/{}", uri, i)));

        let results = run_crawl(list, SchedulingPolicy::LegacyCap(3), context()).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].task.url, format!("{}/p/0", uri));
    }

    #[tokio::test]
    async fn test_legacy_cap_within_limit_launches_all() {
        let server = open_server().await;
        for i in 0..3 {
            mount_page(&server, &format!("/p/{}", i), 200, "<p>hi</p>").await;
        }
        let uri = server.uri();
        let list = tasks((0..3).map(|i| format!("{}/p/{}", uri, i)));

        let results = run_crawl(list, SchedulingPolicy::LegacyCap(3), context()).await;

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(CrawlResult::is_success));
    }

    #[tokio::test]
    async fn test_pool_limits_in_flight_fetches() {
        let server = open_server().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(200)))
            .mount(&server)
            .await;
        let uri = server.uri();
        let list = tasks((0..4).map(|_| format!("{}/slow", uri)));

        let start = std::time::Instant::now();
        let results = run_crawl(list, SchedulingPolicy::Pool(2), context()).await;

        assert_eq!(results.len(), 4);
        // Four 200ms fetches, two at a time: at least two rounds
        assert!(start.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_many_workers_each_keep_their_own_links() {
        let server = open_server().await;
        let count = 40;
        for i in 0..count {
            let body = format!(r#"<a href="/p/{i}/child">c</a><a href="/shared">s</a>"#);
            mount_page(&server, &format!("/p/{}", i), 200, &body).await;
        }
        let uri = server.uri();
        let list = tasks((0..count).map(|i| format!("{}/p/{}", uri, i)));

        let results = run_crawl(list, SchedulingPolicy::Pool(count), context()).await;

        // One result per task, and the drain loop terminated
        assert_eq!(results.len(), count);
        for result in &results {
            assert!(result.is_success());
            assert_eq!(
                result.task.links,
                vec![
                    format!("{}/child", result.task.url),
                    format!("{}/shared", uri),
                ]
            );
        }
    }

    #[tokio::test]
    async fn test_unreachable_hosts_do_not_stall_the_run() {
        // Port 9 refuses connections: robots fails open, the fetch fails
        let list = tasks((0..10).map(|i| format!("http://127.0.0.1:9/{}", i)));

        let results = run_crawl(list, SchedulingPolicy::LegacyCap(10), context()).await;

        assert_eq!(results.len(), 10);
        assert!(results
            .iter()
            .all(|r| matches!(r.outcome, CrawlOutcome::Failed(FetchError::Request(_)))));
    }

    #[tokio::test]
    async fn test_end_to_end_denied_missing_and_ok() {
        let server = MockServer::start().await;
        mount_page(&server, "/robots.txt", 200, "User-agent: *\nDisallow: /blocked\n").await;
        mount_page(&server, "/blocked", 200, r#"<a href="/never">n</a>"#).await;
        mount_page(&server, "/missing", 404, r#"<a href="/never">n</a>"#).await;
        mount_page(
            &server,
            "/ok",
            200,
            r#"<html><body><a href="/first">1</a><a href="https://elsewhere.test/second">2</a></body></html>"#,
        )
        .await;
        let uri = server.uri();
        let list = tasks(["/blocked", "/missing", "/ok"].map(|p| format!("{}{}", uri, p)));

        let results = run_crawl(list, SchedulingPolicy::Pool(3), context()).await;
        assert_eq!(results.len(), 3);

        let sitemap = SiteMap::from_results(&results);
        assert_eq!(sitemap.len(), 1);
        assert_eq!(
            sitemap.get(&format!("{}/ok", uri)).unwrap(),
            &vec![
                format!("{}/first", uri),
                "https://elsewhere.test/second".to_string(),
            ]
        );
        assert!(sitemap.get(&format!("{}/blocked", uri)).is_none());
        assert!(sitemap.get(&format!("{}/missing", uri)).is_none());
    }
}
