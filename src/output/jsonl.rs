use crate::config::RecordFormat;
use crate::output::traits::{ArticleRecord, OutputError, OutputResult, RecordSink};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// The `{url, text}` shape written in [`RecordFormat::Plain`]
#[derive(Serialize)]
struct PlainRecord<'a> {
    url: &'a str,
    text: &'a str,
}

/// Writes one JSON object per line
pub struct JsonlSink<W: Write> {
    writer: W,
    format: RecordFormat,
    written: u64,
}

impl JsonlSink<BufWriter<File>> {
    /// Opens `path` for appending, creating it if needed
    pub fn append_to(path: &Path, format: RecordFormat) -> OutputResult<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file), format))
    }
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W, format: RecordFormat) -> Self {
        Self {
            writer,
            format,
            written: 0,
        }
    }

    /// Number of records emitted through this sink
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for JsonlSink<W> {
    fn emit(&mut self, record: &ArticleRecord) -> OutputResult<()> {
        let line = match self.format {
            RecordFormat::Keyed => serde_json::to_string(record),
            RecordFormat::Plain => serde_json::to_string(&PlainRecord {
                url: &record.url,
                text: &record.text,
            }),
        }
        .map_err(|source| OutputError::Serialize {
            url: record.url.clone(),
            source,
        })?;

        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}
