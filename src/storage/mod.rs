//! Storage module for persisting crawl progress
//!
//! The only durable crawl state is the visited-URL checkpoint: pending URLs
//! are rebuilt from the seed on every start, while visited URLs are reloaded
//! here so a resumed session never processes a page twice.

mod checkpoint;
mod traits;

pub use checkpoint::UrlLog;
pub use traits::{CheckpointStore, StorageError, StorageResult};

use std::collections::HashSet;
use std::path::Path;

/// Opens the checkpoint at `path` and loads the URLs it already holds
///
/// # Returns
///
/// * `Ok((UrlLog, HashSet<String>))` - The log, ready for appends, and its contents
/// * `Err(StorageError)` - The file exists but could not be read
pub fn open_checkpoint(path: &Path) -> StorageResult<(UrlLog, HashSet<String>)> {
    let log = UrlLog::new(path);
    let visited = log.load()?;
    tracing::info!(
        "Loaded {} visited URLs from checkpoint {}",
        visited.len(),
        path.display()
    );
    Ok((log, visited))
}
