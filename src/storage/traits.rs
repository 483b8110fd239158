//! Storage traits and error types

use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to append to {path}: {source}")]
    Append {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable record of which URLs a session has already visited
///
/// Implementations are append-only: a URL, once recorded, is never rewritten
/// or removed, so a crash can lose in-flight progress but never corrupt what
/// was already committed.
pub trait CheckpointStore {
    /// Reads every recorded URL; a store that does not exist yet is empty
    fn load(&self) -> StorageResult<HashSet<String>>;

    /// Appends URLs in order and makes them durable before returning
    fn append(&mut self, urls: &[String]) -> StorageResult<()>;
}
