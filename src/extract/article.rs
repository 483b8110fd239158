//! Page-level text assembly: paragraphs, standalone math, citation markers

use crate::extract::markup::MarkupElement;
use crate::extract::math::{MathMarkup, MathTextExtractor};
use regex::Regex;

/// Bracketed citation markers such as `[12]` or `[citation needed]`
const CITATION_PATTERN: &str = r"\[.+?\]";

const PARAGRAPH_TAG: &str = "p";

/// Assembles the text of an article's content region
///
/// Walks the region in document order. Every paragraph goes through the
/// [`MathTextExtractor`] and has its citation markers removed; every math
/// element that is not inside an already processed paragraph is emitted on
/// its own as `$notation$`. Each non-empty segment ends with a newline.
#[derive(Debug, Clone)]
pub struct ArticleTextExtractor {
    math: MathTextExtractor,
    citations: Regex,
}

impl ArticleTextExtractor {
    pub fn new(markup: MathMarkup) -> Result<Self, regex::Error> {
        Ok(Self {
            math: MathTextExtractor::new(markup),
            citations: Regex::new(CITATION_PATTERN)?,
        })
    }

    pub fn extract_text<E: MarkupElement>(&self, content: E) -> String {
        // Math elements already emitted as part of a paragraph, by node identity
        let mut consumed: Vec<E> = Vec::new();
        let mut out = String::new();

        for element in content.descendant_elements() {
            if element.tag_name().eq_ignore_ascii_case(PARAGRAPH_TAG) {
                consumed.extend(
                    element
                        .descendant_elements()
                        .into_iter()
                        .filter(|d| self.math.is_math(d)),
                );

                let text = self.strip_citations(&self.math.extract(element));
                if !text.is_empty() {
                    out.push_str(&text);
                    out.push('\n');
                }
            } else if self.math.is_math(&element) && !consumed.contains(&element) {
                if let Some(notation) = self.math.notation(&element).map(str::trim) {
                    if !notation.is_empty() {
                        out.push('$');
                        out.push_str(notation);
                        out.push_str("$\n");
                    }
                }
            }
        }

        out
    }

    /// Removes every `[...]` marker, shortest match first
    pub fn strip_citations(&self, text: &str) -> String {
        self.citations.replace_all(text, "").into_owned()
    }
}
