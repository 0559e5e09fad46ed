// src/sitemap.rs
// =============================================================================
// The sitemap: every successfully crawled URL and the links found on it.
//
// Built once at the end of a run from the drained results, then written as a
// single JSON object:
//
//   {"https://a.test/": ["https://a.test/x", "https://b.test/"]}
//
// The file is written to a temporary sibling first and then renamed over the
// target, so readers never see a half-written sitemap.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::crawl::CrawlResult;
use crate::error::SitemapError;

/// Where the sitemap goes unless told otherwise
pub const DEFAULT_SITEMAP_PATH: &str = "siteMap.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteMap {
    pages: BTreeMap<String, Vec<String>>,
}

impl SiteMap {
    /// Keeps successful results only; a later result for a URL replaces an
    /// earlier one
    pub fn from_results(results: &[CrawlResult]) -> Self {
        let mut sitemap = Self::default();
        for result in results.iter().filter(|result| result.is_success()) {
            sitemap.insert(result.task.url.clone(), result.task.links.clone());
        }
        sitemap
    }

    pub fn insert(&mut self, url: impl Into<String>, links: Vec<String>) {
        self.pages.insert(url.into(), links);
    }

    #[cfg(test)]
    pub fn get(&self, url: &str) -> Option<&Vec<String>> {
        self.pages.get(url)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn to_pretty_json(&self) -> Result<String, SitemapError> {
        serde_json::to_string_pretty(self).map_err(SitemapError::Serialize)
    }

    /// Serializes the whole map and atomically replaces `path`
    pub fn write_to(&self, path: &Path) -> Result<(), SitemapError> {
        let result = self.write_atomically(path);
        match &result {
            Ok(()) => info!(path = %path.display(), pages = self.len(), "sitemap created successfully"),
            Err(e) => error!(path = %path.display(), error = %e, "error writing sitemap"),
        }
        result
    }

    fn write_atomically(&self, path: &Path) -> Result<(), SitemapError> {
        let json = serde_json::to_vec(self).map_err(SitemapError::Serialize)?;

        let tmp = temp_path(path);
        std::fs::write(&tmp, &json).map_err(|source| SitemapError::Write {
            path: tmp.clone(),
            source,
        })?;

        std::fs::rename(&tmp, path).map_err(|source| {
            let _ = std::fs::remove_file(&tmp);
            SitemapError::Write {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    #[cfg(test)]
    pub fn read_from(path: &Path) -> Result<Self, SitemapError> {
        let bytes = std::fs::read(path).map_err(|source| SitemapError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(SitemapError::Parse)
    }
}

// siteMap.json -> siteMap.json.tmp, in the same directory so rename stays on
// one filesystem
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
