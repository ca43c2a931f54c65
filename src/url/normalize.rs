use crate::UrlError;
use url::Url;

/// Normalizes a URL according to Ripple-Crawl's normalization rules
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Accept only the `http` and `https` schemes
/// 3. Require a host
/// 4. Remove the fragment (everything after #)
///
/// Parsing also applies the WHATWG serialization (lowercase scheme and host,
/// empty path becomes `/`, default ports dropped). Nothing else is rewritten:
/// query strings, path case and trailing slashes are kept as discovered.
///
/// # Examples
///
/// ```
/// use ripple_crawl::url::normalize_url;
///
/// let url = normalize_url("HTTP://Example.COM/Page#top").unwrap();
/// assert_eq!(url, "http://example.com/Page");
/// ```
pub fn normalize_url(url_str: &str) -> Result<String, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    Ok(url.into())
}
