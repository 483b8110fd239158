use crate::config::FilterConfig;

/// Drops a `#fragment` suffix, if any
pub fn strip_fragment(path: &str) -> &str {
    match path.find('#') {
        Some(index) => &path[..index],
        None => path,
    }
}

/// Decides which anchor hrefs are article pages worth adding to the frontier
///
/// # Rules
///
/// **Accept** only site-relative paths starting with the article prefix.
///
/// **Reject:**
/// - paths containing the namespace separator (`Special:`, `File:`, `Talk:`, ...)
/// - paths ending with an image extension (case-insensitive)
/// - the bare prefix with no article name
///
/// Accepted paths come back with their fragment removed, so
/// `/wiki/Topology#History` and `/wiki/Topology` are the same frontier entry.
#[derive(Debug, Clone)]
pub struct LinkFilter {
    article_prefix: String,
    namespace_separator: String,
    rejected_extensions: Vec<String>,
}

impl LinkFilter {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            article_prefix: config.article_prefix.clone(),
            namespace_separator: config.namespace_separator.clone(),
            rejected_extensions: config
                .rejected_extensions
                .iter()
                .map(|ext| ext.to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn article_prefix(&self) -> &str {
        &self.article_prefix
    }

    /// Returns the normalized path if `href` is an article link
    ///
    /// # Examples
    ///
    /// ```
    /// use wiki_math_crawler::config::FilterConfig;
    /// use wiki_math_crawler::url::LinkFilter;
    ///
    /// let filter = LinkFilter::new(&FilterConfig::default());
    /// assert_eq!(filter.accept("/wiki/Topic"), Some("/wiki/Topic".to_string()));
    /// assert_eq!(filter.accept("/wiki/Special:Search"), None);
    /// assert_eq!(filter.accept("/wiki/Topic.png"), None);
    /// assert_eq!(filter.accept("https://other.site/x"), None);
    /// ```
    pub fn accept(&self, href: &str) -> Option<String> {
        let href = href.trim();

        if !href.starts_with(&self.article_prefix) {
            return None;
        }

        let path = strip_fragment(href);

        if path.len() == self.article_prefix.len() {
            return None;
        }

        if path.contains(self.namespace_separator.as_str()) {
            return None;
        }

        let lowered = path.to_ascii_lowercase();
        if self
            .rejected_extensions
            .iter()
            .any(|ext| lowered.ends_with(ext.as_str()))
        {
            return None;
        }

        Some(path.to_string())
    }
}
