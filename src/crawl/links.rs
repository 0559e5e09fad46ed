// src/crawl/links.rs
// =============================================================================
// This module extracts outbound links from a fetched HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Every <a href> becomes one entry, in document order. Duplicates are kept
// and nothing is normalized beyond resolving relative links against the page.
// =============================================================================

use scraper::{Html, Selector};
use url::Url;

// Extracts all anchor links from HTML content
//
// Parameters:
//   html: the HTML content to parse (borrowed as &str)
//   page_url: the URL the page was fetched from (for resolving relative links)
//
// Returns: Vec<String> of absolute URLs, in the order they appear
//
// Example:
//   html = "<a href='/docs'>Docs</a><a href='/docs'>Again</a>"
//   page_url = "https://example.com"
//   result = ["https://example.com/docs", "https://example.com/docs"]
pub fn extract_links(html: &str, page_url: &Url) -> Vec<String> {
    let mut links = Vec::new();

    let document = Html::parse_document(html);

    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return links,
    };

    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            if let Some(absolute_url) = resolve_url(page_url, href) {
                links.push(absolute_url);
            }
        }
    }

    links
}

// Resolves a possibly-relative href to an absolute URL
//
// Examples:
//   base = "https://example.com/page"
//   href = "/docs"              -> Some("https://example.com/docs")
//   href = "../other"           -> Some("https://example.com/other")
//   href = "https://other.com"  -> Some("https://other.com/")
//   href = "#top"               -> None (same-page fragment)
fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    // Url::join handles both absolute and relative hrefs
    base.join(href).ok().map(|url| url.to_string())
}
