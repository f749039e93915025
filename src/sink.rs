//! Line sinks: where a [`CsvWriter`](crate::CsvWriter) puts finished lines
//!
//! - [`FileSink`] appends each line to an open file
//! - [`CachedFileSink`] keeps lines in memory until [`CachedFileSink::write_to_file`]
//! - [`StringSink`] keeps lines in memory and exposes them as text

use crate::error::{CsvError, Result};
use log::{debug, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Accepts completed lines
pub trait LineSink {
    /// Append one finished line, terminator included
    fn append_line(&mut self, line: &str) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Flush and release the underlying resource
    fn close(&mut self) -> Result<()> {
        self.flush()
    }

    /// Whether the sink was acquired successfully
    fn is_open(&self) -> bool {
        true
    }
}

/// Direct-to-file sink
///
/// Creating never fails: check [`is_open`](LineSink::is_open) first, or use
/// [`FileSink::try_create`].
pub struct FileSink {
    writer: Option<BufWriter<File>>,
    path: String,
    open_error: Option<String>,
}

impl FileSink {
    /// Create (truncate) a file for writing
    pub fn create<P: AsRef<Path>>(path: P) -> Self {
        let path_str = path.as_ref().display().to_string();
        match File::create(path.as_ref()) {
            Ok(file) => {
                debug!("created CSV sink {}", path_str);
                FileSink {
                    writer: Some(BufWriter::new(file)),
                    path: path_str,
                    open_error: None,
                }
            }
            Err(e) => {
                warn!("failed to create CSV sink {}: {}", path_str, e);
                FileSink {
                    writer: None,
                    path: path_str,
                    open_error: Some(e.to_string()),
                }
            }
        }
    }

    /// Create a file, failing immediately if it cannot be created
    pub fn try_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let sink = Self::create(path);
        match sink.open_error {
            Some(message) => Err(CsvError::OpenFailure {
                path: sink.path,
                message,
            }),
            None => Ok(sink),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>> {
        let FileSink {
            writer,
            path,
            open_error,
        } = self;
        match writer.as_mut() {
            Some(writer) => Ok(writer),
            None => Err(match open_error {
                Some(message) => CsvError::OpenFailure {
                    path: path.clone(),
                    message: message.clone(),
                },
                None => CsvError::InvalidState(format!("CSV sink {} is closed", path)),
            }),
        }
    }
}

impl LineSink for FileSink {
    fn append_line(&mut self, line: &str) -> Result<()> {
        self.writer()?
            .write_all(line.as_bytes())
            .map_err(|e| CsvError::WriteError(format!("Failed to write to file: {}", e)))
    }

    fn flush(&mut self) -> Result<()> {
        self.writer()?
            .flush()
            .map_err(|e| CsvError::WriteError(format!("Failed to flush file: {}", e)))
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer
                .flush()
                .map_err(|e| CsvError::WriteError(format!("Failed to flush file: {}", e)))?;
            debug!("closed CSV sink {}", self.path);
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.writer.is_some()
    }
}

/// In-memory sink persisted on demand
#[derive(Debug, Clone, Default)]
pub struct CachedFileSink {
    buffer: String,
}

impl CachedFileSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text accumulated since the last successful write
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Write everything accumulated so far to `path` and clear the buffer
    ///
    /// The buffer is kept when the write fails.
    pub fn write_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path_ref = path.as_ref();
        let mut file = File::create(path_ref).map_err(|e| CsvError::OpenFailure {
            path: path_ref.display().to_string(),
            message: e.to_string(),
        })?;
        file.write_all(self.buffer.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| CsvError::WriteError(format!("Failed to write to file: {}", e)))?;
        debug!(
            "wrote {} cached bytes to {}",
            self.buffer.len(),
            path_ref.display()
        );
        self.buffer.clear();
        Ok(())
    }
}

impl LineSink for CachedFileSink {
    fn append_line(&mut self, line: &str) -> Result<()> {
        self.buffer.push_str(line);
        Ok(())
    }
}

/// In-memory sink exposing the written text
#[derive(Debug, Clone, Default)]
pub struct StringSink {
    buffer: String,
}

impl StringSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn into_text(self) -> String {
        self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl LineSink for StringSink {
    fn append_line(&mut self, line: &str) -> Result<()> {
        self.buffer.push_str(line);
        Ok(())
    }
}
