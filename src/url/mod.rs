//! URL handling module
//!
//! Two representations are in play during a crawl: the relative path found in
//! an anchor's `href`, and the full URL (origin + path) used as the canonical
//! key for every set-membership and persistence operation.

mod filter;

pub use filter::{strip_fragment, LinkFilter};

use crate::{UrlError, UrlResult};
use url::{Position, Url};

/// The scheme and host (plus non-default port) every crawled page shares
///
/// Derived once from the seed URL and held constant for the whole session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteOrigin {
    origin: String,
}

impl SiteOrigin {
    /// Splits an absolute seed URL into its origin and its relative path
    ///
    /// # Examples
    ///
    /// ```
    /// use wiki_math_crawler::url::SiteOrigin;
    ///
    /// let (origin, path) = SiteOrigin::from_seed("https://en.wikipedia.org/wiki/Mathematics").unwrap();
    /// assert_eq!(origin.as_str(), "https://en.wikipedia.org");
    /// assert_eq!(path, "/wiki/Mathematics");
    /// assert_eq!(origin.full_url(&path), "https://en.wikipedia.org/wiki/Mathematics");
    /// ```
    pub fn from_seed(seed: &str) -> UrlResult<(Self, String)> {
        let url = Url::parse(seed).map_err(|e| UrlError::Parse(format!("{}: {}", seed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(url.scheme().to_string()));
        }
        if url.host_str().is_none() {
            return Err(UrlError::MissingHost(seed.to_string()));
        }

        let origin = url.origin().ascii_serialization();
        // Discovered links lose their fragment; the seed must match them
        let path = url[Position::BeforePath..Position::AfterQuery].to_string();

        Ok((Self { origin }, path))
    }

    pub fn as_str(&self) -> &str {
        &self.origin
    }

    /// Joins a site-relative path onto the origin
    pub fn full_url(&self, path: &str) -> String {
        format!("{}{}", self.origin, path)
    }
}

/// Derives the stable per-page key: the path with the article prefix removed
///
/// Paths outside the article namespace (only ever the seed) keep their
/// leading slash stripped instead.
pub fn canonical_key(path: &str, article_prefix: &str) -> String {
    let key = path
        .strip_prefix(article_prefix)
        .unwrap_or_else(|| path.trim_start_matches('/'));
    strip_fragment(key).to_string()
}
