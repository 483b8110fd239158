//! Crawler module for article fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with one retry of connection failures
//! - Article parsing: link discovery, section truncation, text extraction
//! - The frontier of visited and pending URLs
//! - Round and sub-batch coordination, with pause and stop control

mod control;
mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod processor;

pub use control::{listen_for_signals, proceed, ControlState, CrawlControl};
pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher};
pub use frontier::{Frontier, Requeue};
pub use parser::{ArticleParser, ParseError, ParsedPage};
pub use processor::{CrawlResult, PageError, PageOutcome, PageProcessor};
