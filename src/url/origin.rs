use url::Url;

/// Extracts the origin (politeness and fairness unit) from a URL string
///
/// The origin is the lowercase host, followed by `:port` when the URL names a
/// port other than its scheme's default. Returns `None` for strings that do
/// not parse or have no host; the frontier refuses such URLs.
///
/// # Examples
///
/// ```
/// use ripple_crawl::url::extract_origin;
///
/// assert_eq!(extract_origin("https://EXAMPLE.com/path"), Some("example.com".to_string()));
/// assert_eq!(extract_origin("http://example.com:8080/"), Some("example.com:8080".to_string()));
/// assert_eq!(extract_origin("http://example.com:80/"), Some("example.com".to_string()));
/// assert_eq!(extract_origin("not a url"), None);
/// ```
pub fn extract_origin(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str().filter(|h| !h.is_empty())?.to_lowercase();

    match parsed.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}
