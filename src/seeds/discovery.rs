//! Best-effort seed discovery through an HTML search results page

use crate::{SeedError, UrlError};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Query parameter some search engines use to wrap outbound result links
const REDIRECT_PARAM: &str = "uddg";

/// Finds seed URLs for a search query
#[async_trait]
pub trait SeedDiscovery: Send + Sync {
    /// Returns at most `k` URLs relevant to `query`
    async fn discover(&self, query: &str, k: usize) -> Result<Vec<String>, SeedError>;
}

/// Scrapes result links from an HTML search endpoint
///
/// Sends `GET <endpoint>?q=<query>` and keeps the links that point away from
/// the endpoint's own host. Same-host links wrapping a result in a `uddg`
/// parameter are unwrapped.
#[derive(Debug, Clone)]
pub struct HtmlSearchDiscovery {
    client: Client,
    endpoint: Url,
}

impl HtmlSearchDiscovery {
    pub fn new(client: Client, endpoint: &str) -> Result<Self, UrlError> {
        let endpoint = Url::parse(endpoint).map_err(|e| UrlError::Parse(e.to_string()))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(UrlError::InvalidScheme(endpoint.scheme().to_string()));
        }
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SeedDiscovery for HtmlSearchDiscovery {
    async fn discover(&self, query: &str, k: usize) -> Result<Vec<String>, SeedError> {
        let mut request_url = self.endpoint.clone();
        request_url.query_pairs_mut().append_pair("q", query);

        let response = self.client.get(request_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SeedError::DiscoveryStatus(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(parse_results(&self.endpoint, &body, k))
    }
}

/// Extracts up to `k` distinct outbound result URLs from a results page
fn parse_results(endpoint: &Url, html: &str, k: usize) -> Vec<String> {
    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut results = Vec::new();

    for href in document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
    {
        if results.len() >= k {
            break;
        }

        let Some(result) = result_target(endpoint, href) else {
            continue;
        };
        if seen.insert(result.clone()) {
            results.push(result);
        }
    }

    results
}

/// Resolves a result link, unwrapping same-host redirect links
fn result_target(endpoint: &Url, href: &str) -> Option<String> {
    let resolved = endpoint.join(href.trim()).ok()?;

    let target = if resolved.host_str() == endpoint.host_str() {
        let wrapped = resolved
            .query_pairs()
            .find(|(key, _)| key == REDIRECT_PARAM)
            .map(|(_, value)| value.into_owned())?;
        Url::parse(&wrapped).ok()?
    } else {
        resolved
    };

    let crawlable = matches!(target.scheme(), "http" | "https") && target.host_str().is_some();
    crawlable.then(|| target.into())
}

/// Runs discovery, logging and swallowing any failure
///
/// Discovery only supplements the seed list, so a failed provider yields an
/// empty list instead of an error.
pub async fn discover_seeds(provider: &dyn SeedDiscovery, query: &str, k: usize) -> Vec<String> {
    match provider.discover(query, k).await {
        Ok(mut urls) => {
            urls.truncate(k);
            tracing::info!("Discovered {} seed URLs for query {:?}", urls.len(), query);
            urls
        }
        Err(e) => {
            tracing::warn!("Seed discovery for {:?} failed: {}", query, e);
            Vec::new()
        }
    }
}
