//! Output module for extracted articles and session statistics
//!
//! This module handles:
//! - Appending article records as JSON lines
//! - Recording and printing crawl statistics

mod jsonl;
pub mod stats;
mod traits;

pub use jsonl::JsonlSink;
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{ArticleRecord, OutputError, OutputResult, RecordSink};

use crate::config::OutputConfig;
use std::fs::File;
use std::io::BufWriter;

/// Creates the output directory if needed and opens the records file for appending
pub fn open_record_sink(config: &OutputConfig) -> OutputResult<JsonlSink<BufWriter<File>>> {
    std::fs::create_dir_all(&config.directory)?;
    let path = config.records_path();
    tracing::info!("Appending article records to {}", path.display());
    JsonlSink::append_to(&path, config.record_format)
}
