//! Per-URL unit of work: fetch, parse, filter, build the record

use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::parser::{ArticleParser, ParseError};
use crate::output::ArticleRecord;
use crate::url::{canonical_key, SiteOrigin};
use std::collections::HashSet;
use thiserror::Error;

/// Why one processing attempt failed
///
/// Every variant means "requeue for a later round"; none of them ends the crawl.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("No content region '{container}' in {url}")]
    MissingContent { url: String, container: String },

    #[error("Worker task failed: {0}")]
    Worker(String),
}

/// What happened to the page itself
#[derive(Debug)]
pub enum PageOutcome {
    /// A fresh article; its record must be emitted before the URL is marked visited
    Extracted(ArticleRecord),

    /// The URL was visited before this attempt ran; links were still discovered
    AlreadyVisited,

    Failed(PageError),
}

/// Outcome of one processing attempt for one URL
#[derive(Debug)]
pub struct CrawlResult {
    /// Relative path as dispatched
    pub path: String,
    pub full_url: String,

    /// Accepted article paths not in the visited snapshot, in document order
    pub discovered_links: Vec<String>,

    pub outcome: PageOutcome,
}

impl CrawlResult {
    pub fn failed(path: String, full_url: String, error: PageError) -> Self {
        Self {
            path,
            full_url,
            discovered_links: Vec::new(),
            outcome: PageOutcome::Failed(error),
        }
    }

    pub fn success(&self) -> bool {
        !matches!(self.outcome, PageOutcome::Failed(_))
    }
}

/// Fetches and parses one article page
#[derive(Debug, Clone)]
pub struct PageProcessor {
    origin: SiteOrigin,
    fetcher: Fetcher,
    parser: ArticleParser,
}

impl PageProcessor {
    pub fn new(origin: SiteOrigin, fetcher: Fetcher, parser: ArticleParser) -> Self {
        Self {
            origin,
            fetcher,
            parser,
        }
    }

    pub fn origin(&self) -> &SiteOrigin {
        &self.origin
    }

    /// Processes `path` against a read-only snapshot of the visited set
    ///
    /// A 404 page without a content region still counts as a success and
    /// yields an empty record; on a 200 page the same condition is a failure.
    pub async fn process(&self, path: &str, visited: &HashSet<String>) -> CrawlResult {
        let full_url = self.origin.full_url(path);

        let page = match self.fetcher.fetch(&full_url).await {
            Ok(page) => page,
            Err(e) => return CrawlResult::failed(path.to_string(), full_url, e.into()),
        };

        let parsed = match self.parser.parse(&page.body) {
            Ok(parsed) => parsed,
            Err(ParseError::MissingContent { .. }) if page.is_not_found() => {
                tracing::debug!("{} is a dead link without content", full_url);
                Default::default()
            }
            Err(ParseError::MissingContent { container }) => {
                return CrawlResult::failed(
                    path.to_string(),
                    full_url.clone(),
                    PageError::MissingContent {
                        url: full_url,
                        container,
                    },
                )
            }
        };

        let discovered_links = parsed
            .links
            .into_iter()
            .filter(|link| !visited.contains(&self.origin.full_url(link)))
            .collect();

        let outcome = if visited.contains(&full_url) {
            PageOutcome::AlreadyVisited
        } else {
            PageOutcome::Extracted(ArticleRecord {
                key: canonical_key(path, self.parser.filter().article_prefix()),
                url: full_url.clone(),
                text: parsed.text,
            })
        };

        CrawlResult {
            path: path.to_string(),
            full_url,
            discovered_links,
            outcome,
        }
    }
}
