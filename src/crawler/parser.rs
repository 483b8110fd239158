//! Article page parser
//!
//! This module turns a fetched page body into the two things a crawl needs:
//! - Article links to follow, taken from the main content region
//! - The region's math-aware plain text, with trailing navigational and
//!   citation sections cut off

use crate::config::Config;
use crate::extract::{ArticleTextExtractor, MarkupElement, MathMarkup};
use crate::url::LinkFilter;
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use thiserror::Error;

/// Extracted information from an article page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Accepted article paths, fragment-free, deduplicated, in document order
    pub links: Vec<String>,

    /// Paragraph and standalone math segments, each ending with `\n`
    pub text: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("No element with id '{container}' in page")]
    MissingContent { container: String },
}

/// Parses article pages with a fixed link policy and extraction markup
#[derive(Debug, Clone)]
pub struct ArticleParser {
    filter: LinkFilter,
    extractor: ArticleTextExtractor,
    content_container_id: String,
    excluded_sections: HashSet<String>,
}

impl ArticleParser {
    pub fn new(config: &Config) -> Result<Self, regex::Error> {
        Ok(Self {
            filter: LinkFilter::new(&config.filter),
            extractor: ArticleTextExtractor::new(MathMarkup::from(&config.extract))?,
            content_container_id: config.filter.content_container_id.clone(),
            excluded_sections: config.filter.excluded_sections.iter().cloned().collect(),
        })
    }

    pub fn filter(&self) -> &LinkFilter {
        &self.filter
    }

    /// Parses one page body
    ///
    /// Links are collected from the whole content region before any section is
    /// removed, so references and "see also" lists still feed the frontier.
    ///
    /// # Example
    ///
    /// ```
    /// use wiki_math_crawler::config::Config;
    /// use wiki_math_crawler::crawler::ArticleParser;
    ///
    /// let parser = ArticleParser::new(&Config::default()).unwrap();
    /// let page = parser
    ///     .parse(r#"<div id="mw-content-text"><p>See <a href="/wiki/Ring">rings</a>.</p></div>"#)
    ///     .unwrap();
    /// assert_eq!(page.links, vec!["/wiki/Ring".to_string()]);
    /// assert_eq!(page.text, "See rings.\n");
    /// ```
    pub fn parse(&self, html: &str) -> Result<ParsedPage, ParseError> {
        let mut document = Html::parse_document(html);

        let links = match find_by_id(&document, &self.content_container_id) {
            Some(content) => self.extract_links(content),
            None => {
                return Err(ParseError::MissingContent {
                    container: self.content_container_id.clone(),
                })
            }
        };

        self.truncate_sections(&mut document);

        // The container itself can sit after an excluded anchor on odd pages
        let text = find_by_id(&document, &self.content_container_id)
            .map(|content| self.extractor.extract_text(content))
            .unwrap_or_default();

        Ok(ParsedPage { links, text })
    }

    fn extract_links(&self, content: ElementRef<'_>) -> Vec<String> {
        let mut seen = HashSet::new();

        content
            .descendant_elements()
            .into_iter()
            .filter(|element| element.tag_name().eq_ignore_ascii_case("a"))
            .filter_map(|anchor| anchor.attr("href").and_then(|href| self.filter.accept(href)))
            .filter(|path| seen.insert(path.clone()))
            .collect()
    }

    /// Removes the first excluded section anchor and every element after it
    ///
    /// Only elements are detached. A text node following the anchor survives
    /// unless it sits inside a removed element, so `<p>a <span id="References">x</span> b</p>`
    /// keeps `a  b`.
    fn truncate_sections(&self, document: &mut Html) {
        if self.excluded_sections.is_empty() {
            return;
        }

        let doomed: Vec<_> = document
            .tree
            .root()
            .descendants()
            .skip_while(|node| {
                !node
                    .value()
                    .as_element()
                    .and_then(|element| element.id())
                    .is_some_and(|id| self.excluded_sections.contains(id))
            })
            .filter(|node| node.value().is_element())
            .map(|node| node.id())
            .collect();

        if let Some(anchor) = doomed.first() {
            tracing::trace!("Truncating {} elements from section anchor {:?}", doomed.len(), anchor);
        }

        for id in doomed {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }
    }
}

/// Finds the first element carrying `id`, in document order
fn find_by_id<'a>(document: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    document
        .tree
        .root()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().id() == Some(id))
}
