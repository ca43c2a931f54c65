//! HTML parser for extracting links
//!
//! Every `<a href>` on the page is resolved against the page's URL. No
//! filtering happens here: scheme checks, banned substrings and
//! deduplication belong to the URL policy and the frontier.

use scraper::{Html, Selector};
use url::Url;

/// Extracts all links from an HTML page as absolute URLs
///
/// # Arguments
///
/// * `base_url` - The URL the page was served from (after redirects)
/// * `html` - The page body
///
/// # Returns
///
/// Absolute URLs in document order. Duplicates are kept. Hrefs that cannot
/// be resolved are dropped. An unparseable base URL or empty body yields no
/// links.
///
/// # Example
///
/// ```
/// use ripple_crawl::crawler::extract_links;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// let links = extract_links("https://example.com/", html);
/// assert_eq!(links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn extract_links(base_url: &str, html: &str) -> Vec<String> {
    if html.trim().is_empty() {
        return Vec::new();
    }

    let base = match Url::parse(base_url) {
        Ok(base) => base,
        Err(e) => {
            tracing::debug!("Cannot resolve links against {}: {}", base_url, e);
            return Vec::new();
        }
    };

    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let document = Html::parse_document(html);
    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, &base))
        .collect()
}

/// Resolves an href against the base URL
fn resolve_link(href: &str, base: &Url) -> Option<String> {
    base.join(href.trim()).ok().map(String::from)
}
