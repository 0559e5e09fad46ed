// src/error.rs
// =============================================================================
// Error types shared across the crawler.
//
// FetchError stays inside a single task: it is recorded on that task's
// CrawlResult and never aborts the run.
//
// SitemapError is the only error that reaches the top-level caller, because
// a run whose sitemap was not written is incomplete.
// =============================================================================

use std::io;
use std::path::PathBuf;

use thiserror::Error;

// Why a page fetch did not produce a document
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Request(String),

    #[error("could not read response body: {0}")]
    Body(String),

    #[error("crawl was cancelled")]
    Cancelled,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else if error.is_body() || error.is_decode() {
            FetchError::Body(error.to_string())
        } else {
            FetchError::Request(error.to_string())
        }
    }
}

// Failures while persisting or loading the sitemap
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("could not serialize sitemap: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("could not write sitemap to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[cfg(test)]
    #[error("could not read sitemap from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[cfg(test)]
    #[error("sitemap is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),
}
