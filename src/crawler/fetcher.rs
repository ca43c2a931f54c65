//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests with a per-request timeout, following redirects
//! - Content-Type gating (only textual bodies are read)
//! - Error classification into an explicit [`FetchResult`]
//!
//! A fetch never fails with an `Err`: every failure is a `FetchResult` value,
//! so one bad page can never stop the crawl loop.

use crate::config::UserAgentConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client};
use std::fmt;
use std::time::Duration;

/// Maximum redirect hops followed before a fetch is considered failed
const MAX_REDIRECTS: usize = 10;

/// Why a request produced no HTTP response (or no readable body)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchFailure {
    /// The request exceeded its timeout
    Timeout,
    /// Connection refused, DNS failure, TLS handshake failure
    Connect,
    /// Redirect loop or too many redirects
    Redirect,
    /// The response body could not be read
    Body,
    /// Any other request error
    Request,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Redirect => "redirect",
            Self::Body => "body",
            Self::Request => "request",
        };
        f.write_str(label)
    }
}

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// Successfully fetched a textual page (the body may be empty)
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value (lowercased)
        content_type: String,
        /// Page body content
        body: String,
    },

    /// The response was not text/HTML/XML; the body was not read
    ContentMismatch {
        /// The HTTP status code
        status_code: u16,
        /// The actual Content-Type received
        content_type: String,
    },

    /// Non-success HTTP status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// No usable response
    NetworkError {
        /// Failure classification
        kind: FetchFailure,
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Returns true if a page body was retrieved
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the HTTP status code, if a response was received
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Success { status_code, .. }
            | Self::ContentMismatch { status_code, .. }
            | Self::HttpError { status_code } => Some(*status_code),
            Self::NetworkError { .. } => None,
        }
    }

    /// Short label for log lines
    pub fn describe(&self) -> String {
        match self {
            Self::Success {
                status_code,
                content_type,
                body,
                ..
            } => format!("{} {}, bytes={}", status_code, content_type, body.len()),
            Self::ContentMismatch {
                status_code,
                content_type,
            } => format!("{} skipped content-type {}", status_code, content_type),
            Self::HttpError { status_code } => format!("HTTP {}", status_code),
            Self::NetworkError { kind, error } => format!("{} error: {}", kind, error),
        }
    }
}

/// Retrieves pages for the crawler
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url`, giving up after `timeout`
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchResult;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    Client::builder()
        .user_agent(config.header_value())
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true for content types whose body is worth reading
fn is_textual(content_type: &str) -> bool {
    content_type.contains("text/") || content_type.contains("html") || content_type.contains("xml")
}

/// Classifies a request error
fn classify_error(error: &reqwest::Error) -> FetchFailure {
    if error.is_timeout() {
        FetchFailure::Timeout
    } else if error.is_connect() {
        FetchFailure::Connect
    } else if error.is_redirect() {
        FetchFailure::Redirect
    } else if error.is_body() || error.is_decode() {
        FetchFailure::Body
    } else {
        FetchFailure::Request
    }
}

/// Fetches a URL with full error handling
///
/// # Request Flow
///
/// 1. Send GET request, following up to 10 redirects
/// 2. Non-2xx status → `HttpError`
/// 3. Non-textual Content-Type → `ContentMismatch` (body not read)
/// 4. Read the body as text (undecodable bytes are replaced) → `Success`
///
/// Transport failures become `NetworkError`. There are no retries.
pub async fn fetch_url(client: &Client, url: &str, timeout: Duration) -> FetchResult {
    let response = match client.get(url).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => {
            return FetchResult::NetworkError {
                kind: classify_error(&e),
                error: e.to_string(),
            }
        }
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_lowercase();

    if !is_textual(&content_type) {
        return FetchResult::ContentMismatch {
            status_code: status.as_u16(),
            content_type,
        };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
        },
        Err(e) => FetchResult::NetworkError {
            kind: classify_error(&e),
            error: e.to_string(),
        },
    }
}

/// [`Fetcher`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client from the user agent configuration
    pub fn from_config(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchResult {
        fetch_url(&self.client, url, timeout).await
    }
}
