//! Math-aware text extraction
//!
//! This module turns the content region of an article into plain text:
//! - `markup`: the node capabilities extraction relies on, implemented for `scraper`
//! - `math`: the recursive per-element extractor
//! - `article`: the page-level pass over paragraphs and standalone math
//!
//! Nothing here performs I/O or keeps state between pages.

mod article;
mod markup;
mod math;

pub use article::ArticleTextExtractor;
pub use markup::{MarkupChild, MarkupElement};
pub use math::{MathMarkup, MathTextExtractor};
