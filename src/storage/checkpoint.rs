//! Newline-delimited URL log backed by a plain file

use crate::storage::traits::{CheckpointStore, StorageError, StorageResult};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// An append-only file holding one URL per line
///
/// Serves as the visited-URL checkpoint and as the dead-letter log. The file
/// is opened lazily on the first append and flushed after every batch.
#[derive(Debug)]
pub struct UrlLog {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl UrlLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn writer(&mut self) -> StorageResult<&mut BufWriter<File>> {
        let writer = match self.writer.take() {
            Some(writer) => writer,
            None => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)
                    .map_err(|source| StorageError::Append {
                        path: self.path.clone(),
                        source,
                    })?;
                BufWriter::new(file)
            }
        };
        Ok(self.writer.insert(writer))
    }
}

impl CheckpointStore for UrlLog {
    fn load(&self) -> StorageResult<HashSet<String>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let mut urls = HashSet::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|source| StorageError::Read {
                path: self.path.clone(),
                source,
            })?;
            let url = line.trim();
            if !url.is_empty() {
                urls.insert(url.to_string());
            }
        }

        Ok(urls)
    }

    fn append(&mut self, urls: &[String]) -> StorageResult<()> {
        if urls.is_empty() {
            return Ok(());
        }

        let path = self.path.clone();
        let writer = self.writer()?;
        let wrap = |source| StorageError::Append {
            path: path.clone(),
            source,
        };

        for url in urls {
            writeln!(writer, "{}", url).map_err(wrap)?;
        }
        writer.flush().map_err(wrap)?;
        writer.get_ref().sync_data().map_err(wrap)?;

        Ok(())
    }
}
