//! URL handling module for Ripple-Crawl
//!
//! This module provides URL normalization, origin extraction, and the
//! policy that decides which discovered links may enter the frontier.

mod normalize;
mod origin;

use crate::config::PolicyConfig;
use crate::UrlError;

// Re-export main functions
pub use normalize::normalize_url;
pub use origin::extract_origin;

/// Filters and normalizes discovered URLs before they reach the frontier
///
/// The frontier itself never canonicalizes: it compares URLs by exact string
/// equality, so every URL must pass through [`UrlPolicy::normalize`] first.
#[derive(Debug, Clone)]
pub struct UrlPolicy {
    /// Lowercased substrings that disqualify a URL
    banned: Vec<String>,
}

impl UrlPolicy {
    /// Creates a policy rejecting URLs that contain any of `banned` (case-insensitive)
    pub fn new<I, S>(banned: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            banned: banned
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Builds the policy from configuration
    pub fn from_config(config: &PolicyConfig) -> Self {
        Self::new(&config.banned_substrings)
    }

    /// Strips the fragment and rejects non-HTTP(S) or hostless URLs
    pub fn normalize(&self, url: &str) -> Result<String, UrlError> {
        normalize_url(url)
    }

    /// Returns false if the URL contains a banned substring
    ///
    /// # Examples
    ///
    /// ```
    /// use ripple_crawl::url::UrlPolicy;
    ///
    /// let policy = UrlPolicy::default();
    /// assert!(policy.should_enqueue("https://example.com/about"));
    /// assert!(!policy.should_enqueue("https://example.com/LOGOUT"));
    /// ```
    pub fn should_enqueue(&self, url: &str) -> bool {
        let lowered = url.to_lowercase();
        !self.banned.iter().any(|b| lowered.contains(b.as_str()))
    }

    /// Normalizes then filters, yielding the URL to enqueue if it is admitted
    pub fn admit(&self, url: &str) -> Option<String> {
        match self.normalize(url) {
            Ok(normalized) if self.should_enqueue(&normalized) => Some(normalized),
            Ok(normalized) => {
                tracing::trace!("Policy rejected {}", normalized);
                None
            }
            Err(e) => {
                tracing::trace!("Skipping {}: {}", url, e);
                None
            }
        }
    }
}

impl Default for UrlPolicy {
    fn default() -> Self {
        Self::from_config(&PolicyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_banned_substrings() {
        let policy = UrlPolicy::default();
        assert!(!policy.should_enqueue("https://example.com/signup?next=/"));
        assert!(!policy.should_enqueue("https://example.com/account/logout"));
        assert!(!policy.should_enqueue("https://example.com/?r=javascript:alert(1)"));
        assert!(!policy.should_enqueue("https://example.com/?to=mailto:a@b.c"));
        assert!(policy.should_enqueue("https://example.com/articles/1"));
    }

    #[test]
    fn test_banned_match_is_case_insensitive() {
        let policy = UrlPolicy::new(["SignUp"]);
        assert!(!policy.should_enqueue("https://example.com/SIGNUP"));
        assert!(!policy.should_enqueue("https://example.com/signup"));
    }

    #[test]
    fn test_custom_policy_allows_defaults() {
        let policy = UrlPolicy::new(["/private/"]);
        assert!(policy.should_enqueue("https://example.com/logout"));
        assert!(!policy.should_enqueue("https://example.com/private/x"));
    }

    #[test]
    fn test_admit() {
        let policy = UrlPolicy::default();
        assert_eq!(
            policy.admit("https://example.com/page#comments"),
            Some("https://example.com/page".to_string())
        );
        assert_eq!(policy.admit("mailto:someone@example.com"), None);
        assert_eq!(policy.admit("ftp://example.com/file"), None);
        assert_eq!(policy.admit("https://example.com/logout"), None);
    }
}
