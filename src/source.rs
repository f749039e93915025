//! Line sources: where a [`CsvReader`](crate::CsvReader) gets its lines
//!
//! Three implementations of [`LineSource`]:
//!
//! - [`FileSource`] streams a file through a buffered reader
//! - [`CachedFileSource`] loads the whole file into memory on open
//! - [`StrSource`] reads from an in-memory string

use crate::error::{CsvError, Result};
use log::{debug, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Supplies physical lines on demand
pub trait LineSource {
    /// Read the next line into `buf`, without its terminator
    ///
    /// `buf` is cleared first. Returns `Ok(false)` at end of input.
    fn next_line(&mut self, buf: &mut String) -> Result<bool>;

    /// Whether the source was acquired successfully
    fn is_open(&self) -> bool {
        true
    }

    /// Name used in diagnostics, usually the file path
    fn name(&self) -> &str {
        ""
    }

    /// Release the underlying resource; later reads see end of input
    fn close(&mut self) {}
}

/// Strip a trailing `\n` or `\r\n`
fn trim_line_end(buf: &mut String) {
    if buf.ends_with('\n') {
        buf.pop();
        if buf.ends_with('\r') {
            buf.pop();
        }
    }
}

/// Cut the next line out of an in-memory text
fn next_line_in(text: &str, pos: &mut usize, buf: &mut String) -> bool {
    buf.clear();
    if *pos >= text.len() {
        return false;
    }
    let rest = &text[*pos..];
    let end = rest.find('\n').map(|i| i + 1).unwrap_or(rest.len());
    buf.push_str(&rest[..end]);
    *pos += end;
    trim_line_end(buf);
    true
}

/// Streaming file source
///
/// Opening never fails: check [`is_open`](LineSource::is_open) before
/// reading, or use [`FileSource::try_open`] to get the error right away.
/// Reading from a source that failed to open returns
/// [`CsvError::OpenFailure`].
pub struct FileSource {
    reader: Option<BufReader<File>>,
    path: String,
    open_error: Option<String>,
}

impl FileSource {
    /// Open a file for streaming line reads
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path_str = path.as_ref().display().to_string();
        match File::open(path.as_ref()) {
            Ok(file) => {
                debug!("opened CSV source {}", path_str);
                FileSource {
                    reader: Some(BufReader::new(file)),
                    path: path_str,
                    open_error: None,
                }
            }
            Err(e) => {
                warn!("failed to open CSV source {}: {}", path_str, e);
                FileSource {
                    reader: None,
                    path: path_str,
                    open_error: Some(e.to_string()),
                }
            }
        }
    }

    /// Open a file, failing immediately if it cannot be opened
    pub fn try_open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = Self::open(path);
        match source.open_error {
            Some(message) => Err(CsvError::OpenFailure {
                path: source.path,
                message,
            }),
            None => Ok(source),
        }
    }
}

impl LineSource for FileSource {
    fn next_line(&mut self, buf: &mut String) -> Result<bool> {
        buf.clear();
        let reader = match self.reader.as_mut() {
            Some(reader) => reader,
            None => {
                return match &self.open_error {
                    Some(message) => Err(CsvError::OpenFailure {
                        path: self.path.clone(),
                        message: message.clone(),
                    }),
                    None => Ok(false),
                }
            }
        };
        let bytes_read = reader
            .read_line(buf)
            .map_err(|e| CsvError::ReadError(format!("Failed to read line: {}", e)))?;
        if bytes_read == 0 {
            return Ok(false);
        }
        trim_line_end(buf);
        Ok(true)
    }

    fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    fn name(&self) -> &str {
        &self.path
    }

    fn close(&mut self) {
        if self.reader.take().is_some() {
            debug!("closed CSV source {}", self.path);
        }
    }
}

/// File source that reads the whole file into memory when opened
///
/// Trades memory for fewer system calls on small and medium files.
pub struct CachedFileSource {
    text: String,
    pos: usize,
    path: String,
    open_error: Option<String>,
}

impl CachedFileSource {
    /// Load a file; check [`is_open`](LineSource::is_open) afterwards
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path_str = path.as_ref().display().to_string();
        match std::fs::read_to_string(path.as_ref()) {
            Ok(text) => {
                debug!("cached CSV source {} ({} bytes)", path_str, text.len());
                CachedFileSource {
                    text,
                    pos: 0,
                    path: path_str,
                    open_error: None,
                }
            }
            Err(e) => {
                warn!("failed to load CSV source {}: {}", path_str, e);
                CachedFileSource {
                    text: String::new(),
                    pos: 0,
                    path: path_str,
                    open_error: Some(e.to_string()),
                }
            }
        }
    }

    /// Load a file, failing immediately if it cannot be read
    pub fn try_open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = Self::open(path);
        match source.open_error {
            Some(message) => Err(CsvError::OpenFailure {
                path: source.path,
                message,
            }),
            None => Ok(source),
        }
    }
}

impl LineSource for CachedFileSource {
    fn next_line(&mut self, buf: &mut String) -> Result<bool> {
        if let Some(message) = &self.open_error {
            return Err(CsvError::OpenFailure {
                path: self.path.clone(),
                message: message.clone(),
            });
        }
        Ok(next_line_in(&self.text, &mut self.pos, buf))
    }

    fn is_open(&self) -> bool {
        self.open_error.is_none()
    }

    fn name(&self) -> &str {
        &self.path
    }

    fn close(&mut self) {
        self.text.clear();
        self.pos = 0;
    }
}

/// In-memory string source
#[derive(Debug, Clone, Default)]
pub struct StrSource {
    text: String,
    pos: usize,
}

impl StrSource {
    pub fn new(text: impl Into<String>) -> Self {
        StrSource {
            text: text.into(),
            pos: 0,
        }
    }

    /// Replace the input and rewind
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.pos = 0;
    }
}

impl LineSource for StrSource {
    fn next_line(&mut self, buf: &mut String) -> Result<bool> {
        Ok(next_line_in(&self.text, &mut self.pos, buf))
    }

    fn close(&mut self) {
        self.pos = self.text.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn collect<S: LineSource>(source: &mut S) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        let mut buf = String::new();
        while source.next_line(&mut buf)? {
            lines.push(buf.clone());
        }
        Ok(lines)
    }

    #[test]
    fn test_str_source_lines() -> Result<()> {
        let mut source = StrSource::new("a,b\r\n\nc,d");
        assert_eq!(collect(&mut source)?, vec!["a,b", "", "c,d"]);
        Ok(())
    }

    #[test]
    fn test_str_source_trailing_newline() -> Result<()> {
        let mut source = StrSource::new("x\n");
        assert_eq!(collect(&mut source)?, vec!["x"]);
        Ok(())
    }

    #[test]
    fn test_str_source_set_text_rewinds() -> Result<()> {
        let mut source = StrSource::new("one");
        collect(&mut source)?;
        source.set_text("two\nthree");
        assert_eq!(collect(&mut source)?, vec!["two", "three"]);
        Ok(())
    }

    #[test]
    fn test_file_sources_agree() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, "h1,h2\n1,2\r\n\n3,4")?;
        file.flush()?;

        let mut streamed = FileSource::try_open(file.path())?;
        let mut cached = CachedFileSource::try_open(file.path())?;
        let expected = vec!["h1,h2", "1,2", "", "3,4"];
        assert_eq!(collect(&mut streamed)?, expected);
        assert_eq!(collect(&mut cached)?, expected);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_not_open() {
        let mut source = FileSource::open("definitely/not/here.csv");
        assert!(!source.is_open());
        assert_eq!(source.name(), "definitely/not/here.csv");
        let mut buf = String::new();
        assert!(matches!(
            source.next_line(&mut buf),
            Err(CsvError::OpenFailure { .. })
        ));

        assert!(CachedFileSource::try_open("definitely/not/here.csv").is_err());
    }

    #[test]
    fn test_closed_file_source_is_exhausted() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "a")?;
        let mut source = FileSource::try_open(file.path())?;
        source.close();
        let mut buf = String::new();
        assert!(!source.next_line(&mut buf)?);
        Ok(())
    }
}
