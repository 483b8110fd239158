//! Output sink traits and record types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize record for {url}: {source}")]
    Serialize {
        url: String,
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// One extracted article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Article path with the article prefix removed, e.g. `Euler%27s_identity`
    pub key: String,

    /// Full URL the text was extracted from
    pub url: String,

    /// Paragraph segments, each ending with `\n`; math wrapped in `$...$`
    pub text: String,
}

/// Destination for extracted articles
///
/// Consumers treat the output as an append-only log with one entry per
/// successfully processed article.
pub trait RecordSink {
    fn emit(&mut self, record: &ArticleRecord) -> OutputResult<()>;

    /// Makes every emitted record durable
    fn flush(&mut self) -> OutputResult<()>;
}
