//! CSV stream writing: typed values appended field by field

use crate::config::Config;
use crate::csv::CsvEncoder;
use crate::error::Result;
use crate::sink::{CachedFileSink, FileSink, LineSink, StringSink};
use crate::types::{Sep, SepScope, ToField};
use log::{debug, trace};
use std::path::Path;

/// CSV stream writer
///
/// Values are escaped, optionally quoted and collected into a line buffer;
/// [`end_line`](Self::end_line) terminates the line and hands it to the sink.
/// Nothing reaches the sink before the line is complete.
///
/// # Examples
///
/// ```
/// use csvstream::CsvWriter;
///
/// let mut writer = CsvWriter::in_memory();
/// writer.config_mut().set_delimiter(',', "");
/// writer.config_mut().enable_surround_quote(true, '"', "&quot;");
///
/// writer.append("Shampoo")?.append(&200)?.append(&15.0)?.end_line()?;
/// assert_eq!(writer.text(), "\"Shampoo\",200,15.000000\n");
/// # Ok::<(), csvstream::CsvError>(())
/// ```
///
/// # Writing a file
///
/// ```no_run
/// use csvstream::CsvWriter;
///
/// let mut writer = CsvWriter::create("products.csv");
/// if writer.is_open() {
///     writer.write_row(["Name", "Qty"])?;
///     writer.append("Soap")?.append(&80)?.end_line()?;
///     writer.save()?;
/// }
/// # Ok::<(), csvstream::CsvError>(())
/// ```
pub struct CsvWriter<K> {
    sink: K,
    config: Config,

    // Line state
    line: String,
    scratch: String,
    pending_delimiter: Option<char>,
    sep: Option<Sep>,
    row_count: u64,
}

impl CsvWriter<FileSink> {
    /// Create (truncate) a file and write lines to it as they complete
    ///
    /// Never fails; check [`is_open`](Self::is_open) before writing.
    pub fn create<P: AsRef<Path>>(path: P) -> Self {
        Self::new(FileSink::create(path))
    }

    /// Create a file, returning [`CsvError::OpenFailure`](crate::CsvError::OpenFailure)
    /// if it cannot be created
    pub fn try_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(FileSink::try_create(path)?))
    }
}

impl CsvWriter<CachedFileSink> {
    /// Hold lines in memory until [`write_to_file`](Self::write_to_file)
    pub fn cached() -> Self {
        Self::new(CachedFileSink::new())
    }

    /// Persist every completed line to `path` and clear the cache
    pub fn write_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.sink.write_to_file(path)
    }

    /// Completed lines not persisted yet
    pub fn text(&self) -> &str {
        self.sink.text()
    }
}

impl CsvWriter<StringSink> {
    /// Collect lines into a string
    pub fn in_memory() -> Self {
        Self::new(StringSink::new())
    }

    /// Every completed line so far
    pub fn text(&self) -> &str {
        self.sink.text()
    }
}

impl<K: LineSink> CsvWriter<K> {
    /// Write to any line sink with the default configuration
    pub fn new(sink: K) -> Self {
        CsvWriter {
            sink,
            config: Config::default(),
            line: String::with_capacity(4096),
            scratch: String::new(),
            pending_delimiter: None,
            sep: None,
            row_count: 0,
        }
    }

    /// Replace the configuration after validating it (builder pattern)
    pub fn with_config(mut self, config: Config) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mutable access to the configuration; change it only between lines
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Set the delimiter and its escape text
    pub fn set_delimiter(&mut self, delimiter: char, escape_text: &str) {
        self.config.set_delimiter(delimiter, escape_text);
    }

    /// Whether the sink was acquired successfully
    pub fn is_open(&self) -> bool {
        self.sink.is_open()
    }

    /// Override the delimiter for the next value or the rest of this line
    ///
    /// The override decides the escape text of the values appended under it
    /// and the delimiter written after them.
    pub fn apply_sep(&mut self, sep: Sep) -> &mut Self {
        self.sep = Some(sep);
        self
    }

    /// Append one value to the current line
    ///
    /// The delimiter is written between values, never after the last one.
    pub fn append<T: ToField + ?Sized>(&mut self, value: &T) -> Result<&mut Self> {
        let (delimiter, escape_text) = match &self.sep {
            Some(sep) => (sep.delimiter(), sep.text()),
            None => (self.config.delimiter(), self.config.escape_text()),
        };

        if let Some(pending) = self.pending_delimiter.take() {
            self.line.push(pending);
        }

        self.scratch.clear();
        value.write_text(&mut self.scratch, &self.config);
        CsvEncoder::with_delimiter(&self.config, delimiter, escape_text).encode_field(
            &self.scratch,
            value.kind(),
            &mut self.line,
        );
        self.pending_delimiter = Some(delimiter);

        if matches!(&self.sep, Some(sep) if sep.scope() == SepScope::Field) {
            self.sep = None;
        }
        Ok(self)
    }

    /// Terminate the current line and hand it to the sink
    ///
    /// Separator overrides end with the line. A line holding a single empty
    /// value is written as an empty quoted field, never as a blank line.
    pub fn end_line(&mut self) -> Result<()> {
        if self.line.is_empty()
            && self.pending_delimiter.is_some()
            && self.config.is_trim_quote_enabled()
        {
            let quote = self.config.quote_char();
            self.line.push(quote);
            self.line.push(quote);
        }
        self.line.push_str(self.config.line_terminator());
        let result = self.sink.append_line(&self.line);
        trace!("wrote line {}", self.row_count + 1);

        self.line.clear();
        self.pending_delimiter = None;
        self.sep = None;
        result?;

        self.row_count += 1;
        Ok(())
    }

    /// Append every value of a row, then end the line
    ///
    /// ```
    /// use csvstream::{CsvWriter, FieldValue};
    ///
    /// let mut writer = CsvWriter::in_memory();
    /// writer.write_row([
    ///     FieldValue::from("Alice"),
    ///     FieldValue::Int(30),
    ///     FieldValue::Float(75.5),
    /// ])?;
    /// assert_eq!(writer.text(), "Alice,30,75.500000\n");
    /// # Ok::<(), csvstream::CsvError>(())
    /// ```
    pub fn write_row<I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: ToField,
    {
        for value in values {
            self.append(&value)?;
        }
        self.end_line()
    }

    /// Write multiple rows at once
    pub fn write_rows_batch<I, R>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator,
        R::Item: ToField,
    {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// The unfinished line, as it would be written
    pub fn pending_line(&self) -> &str {
        &self.line
    }

    /// Get the number of lines written
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush()
    }

    /// End any unfinished line, then flush and release the sink
    pub fn close(&mut self) -> Result<()> {
        if !self.line.is_empty() || self.pending_delimiter.is_some() {
            debug!("closing with an unfinished line; terminating it");
            self.end_line()?;
        }
        self.sink.close()
    }

    /// Close the writer and hand back its sink
    ///
    /// This must be called (or [`close`](Self::close)) to be sure every
    /// line reached the file.
    pub fn save(mut self) -> Result<K> {
        self.close()?;
        Ok(self.sink)
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NChar;
    use crate::CsvError;

    fn comma_quoted() -> CsvWriter<StringSink> {
        let mut writer = CsvWriter::in_memory();
        writer.set_delimiter(',', "");
        writer.config_mut().enable_surround_quote(true, '"', "&quot;");
        writer
    }

    #[test]
    fn test_typed_values_with_surround_quote() -> Result<()> {
        let mut writer = comma_quoted();
        writer.append("Shampoo")?.append(&200)?.append(&15.0)?.end_line()?;
        assert_eq!(writer.text(), "\"Shampoo\",200,15.000000\n");
        assert_eq!(writer.row_count(), 1);
        Ok(())
    }

    #[test]
    fn test_default_escapes() -> Result<()> {
        let mut writer = CsvWriter::in_memory();
        writer.write_row(["a,b", "line1\nline2", "plain"])?;
        assert_eq!(writer.text(), "a##b,line1&newline;line2,plain\n");
        Ok(())
    }

    #[test]
    fn test_auto_quote_when_escape_text_is_empty() -> Result<()> {
        let mut writer = CsvWriter::in_memory();
        writer.set_delimiter(',', "");
        writer.write_row(["a,b", "c"])?;
        assert_eq!(writer.text(), "\"a,b\",c\n");
        Ok(())
    }

    #[test]
    fn test_nothing_reaches_sink_before_end_line() -> Result<()> {
        let mut writer = CsvWriter::in_memory();
        writer.append("x")?.append(&1)?;
        assert_eq!(writer.text(), "");
        assert_eq!(writer.pending_line(), "x,1");
        writer.end_line()?;
        assert_eq!(writer.text(), "x,1\n");
        assert_eq!(writer.pending_line(), "");
        Ok(())
    }

    #[test]
    fn test_line_scoped_sep() -> Result<()> {
        let mut writer = CsvWriter::in_memory();
        writer.set_delimiter(' ', "");
        writer.append("vt")?;
        writer.apply_sep(Sep::new(',', ""));
        writer.append(&37.8)?.append(&44.32)?.append(&75.1)?;
        writer.end_line()?;
        writer.append("vn")?.append(&1)?.end_line()?;
        assert_eq!(
            writer.text(),
            "vt 37.800000,44.320000,75.100000\nvn 1\n"
        );
        Ok(())
    }

    #[test]
    fn test_field_scoped_sep_reverts() -> Result<()> {
        let mut writer = CsvWriter::in_memory();
        writer.apply_sep(Sep::once(';', "<semi>"));
        writer.append("a;b")?.append("c")?.append("d")?.end_line()?;
        assert_eq!(writer.text(), "a<semi>b;c,d\n");
        Ok(())
    }

    #[test]
    fn test_nchar_and_char() -> Result<()> {
        let mut writer = CsvWriter::in_memory();
        writer.append(&NChar(56))?.append(&'8')?.end_line()?;
        assert_eq!(writer.text(), "56,8\n");
        Ok(())
    }

    #[test]
    fn test_custom_line_terminator_and_precision() -> Result<()> {
        let mut writer = CsvWriter::in_memory();
        writer.config_mut().set_line_terminator("\r\n");
        writer.config_mut().set_float_precision(Some(2));
        writer.write_row([1.5f64, 2.25])?;
        assert_eq!(writer.text(), "1.50,2.25\r\n");
        Ok(())
    }

    #[test]
    fn test_option_values() -> Result<()> {
        let mut writer = CsvWriter::in_memory();
        writer.write_row([Some(1), None, Some(3)])?;
        assert_eq!(writer.text(), "1,,3\n");
        Ok(())
    }

    #[test]
    fn test_single_empty_value_is_not_a_blank_line() -> Result<()> {
        let mut writer = CsvWriter::in_memory();
        writer.write_row([""])?;
        writer.write_row([None::<i32>])?;
        writer.end_line()?;
        assert_eq!(writer.text(), "\"\"\n\"\"\n\n");
        Ok(())
    }

    #[test]
    fn test_close_terminates_unfinished_line() -> Result<()> {
        let mut writer = CsvWriter::in_memory();
        writer.append("tail")?;
        let sink = writer.save()?;
        assert_eq!(sink.text(), "tail\n");
        Ok(())
    }

    #[test]
    fn test_cached_writer_persists_on_demand() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cached.csv");

        let mut writer = CsvWriter::cached();
        writer.write_rows_batch(vec![vec!["a", "b"], vec!["c", "d"]])?;
        assert!(!path.exists());
        writer.write_to_file(&path)?;
        assert_eq!(writer.text(), "");
        assert_eq!(std::fs::read_to_string(&path)?, "a,b\nc,d\n");
        Ok(())
    }

    #[test]
    fn test_unopened_file_writer() {
        let mut writer = CsvWriter::create("no/such/dir/out.csv");
        assert!(!writer.is_open());
        let result = writer.append("x").and_then(|w| w.end_line());
        assert!(matches!(result, Err(CsvError::OpenFailure { .. })));
        assert_eq!(writer.row_count(), 0);
        assert_eq!(writer.pending_line(), "");
    }
}
