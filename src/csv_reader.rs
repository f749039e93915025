//! CSV stream reading: one line at a time, one field at a time

use crate::config::Config;
use crate::convert::{Converter, StdConverter};
use crate::csv::{count_delimiters, CsvParser};
use crate::error::{CsvError, Result};
use crate::source::{CachedFileSource, FileSource, LineSource, StrSource};
use crate::types::{FromField, Sep, SepScope};
use log::{debug, trace};
use std::path::Path;

const BOM: char = '\u{feff}';

/// CSV stream reader with typed, field-by-field extraction
///
/// Call [`read_line`](Self::read_line) to load the next line, then pull
/// fields out of it in order with [`extract`](Self::extract). Each field is
/// unescaped and converted on its own, so a bad field fails alone and the
/// caller can carry on with the rest of the line.
///
/// # Examples
///
/// ```
/// use csvstream::CsvReader;
///
/// let mut reader = CsvReader::from_text("Shampoo,200,15.000000\nSoap,80,1.5");
///
/// let mut total = 0.0;
/// while reader.read_line()? {
///     let name: String = reader.extract()?;
///     let qty: u32 = reader.extract()?;
///     let price: f64 = reader.extract()?;
///     assert!(!name.is_empty());
///     total += f64::from(qty) * price;
/// }
/// assert_eq!(total, 3120.0);
/// # Ok::<(), csvstream::CsvError>(())
/// ```
///
/// # Reading a file
///
/// ```no_run
/// use csvstream::CsvReader;
///
/// let mut reader = CsvReader::open("products.csv");
/// if !reader.is_open() {
///     return Ok(());
/// }
/// reader.skip_line()?; // header
/// while reader.read_line()? {
///     let name: String = reader.extract()?;
///     println!("{}", name);
/// }
/// # Ok::<(), csvstream::CsvError>(())
/// ```
pub struct CsvReader<S, C = StdConverter> {
    source: S,
    converter: C,
    config: Config,

    // Line state
    line: String,
    pos: usize,
    exhausted: bool,
    sep: Option<Sep>,
    first_line_read: bool,
    line_num: usize,
    token_num: usize,
}

impl CsvReader<FileSource> {
    /// Open a file for streaming reads
    ///
    /// Never fails; check [`is_open`](Self::is_open) before reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::new(FileSource::open(path))
    }

    /// Open a file, returning [`CsvError::OpenFailure`] if it cannot be opened
    pub fn try_open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(FileSource::try_open(path)?))
    }
}

impl CsvReader<CachedFileSource> {
    /// Load a whole file into memory, then read it line by line
    pub fn open_cached<P: AsRef<Path>>(path: P) -> Self {
        Self::new(CachedFileSource::open(path))
    }
}

impl CsvReader<StrSource> {
    /// Read from an in-memory string
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(StrSource::new(text))
    }

    /// Replace the input text and start over with the default configuration
    pub fn set_new_input(&mut self, text: impl Into<String>) {
        self.source.set_text(text);
        self.reset();
    }
}

impl<S: LineSource> CsvReader<S> {
    /// Read from any line source with the default configuration
    pub fn new(source: S) -> Self {
        CsvReader {
            source,
            converter: StdConverter,
            config: Config::default(),
            line: String::with_capacity(1024),
            pos: 0,
            exhausted: true,
            sep: None,
            first_line_read: false,
            line_num: 0,
            token_num: 0,
        }
    }
}

impl<S: LineSource, C: Converter> CsvReader<S, C> {
    /// Swap the numeric conversion strategy (builder pattern)
    pub fn with_converter<C2: Converter>(self, converter: C2) -> CsvReader<S, C2> {
        CsvReader {
            source: self.source,
            converter,
            config: self.config,
            line: self.line,
            pos: self.pos,
            exhausted: self.exhausted,
            sep: self.sep,
            first_line_read: self.first_line_read,
            line_num: self.line_num,
            token_num: self.token_num,
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

    /// Set the delimiter and its unescape text
    pub fn set_delimiter(&mut self, delimiter: char, unescape_text: &str) {
        self.config.set_delimiter(delimiter, unescape_text);
    }

    /// Whether the line source was acquired successfully
    pub fn is_open(&self) -> bool {
        self.source.is_open()
    }

    /// Load the next line
    ///
    /// Returns `Ok(false)` at end of input. Blank lines follow the
    /// configured policy: with terminate-on-blank-line the first blank line
    /// ends the sequence (a later call resumes after it); otherwise they are
    /// skipped unless blank lines are allowed, in which case a blank line
    /// holds a single empty field.
    pub fn read_line(&mut self) -> Result<bool> {
        loop {
            if !self.next_physical_line()? {
                return Ok(false);
            }

            if self.line.is_empty() {
                if self.config.is_terminate_on_blank_line() {
                    debug!("blank line {} ends the read sequence", self.line_num);
                    self.clear_line();
                    return Ok(false);
                }
                if !self.config.is_blank_line_allowed() {
                    continue;
                }
            }

            self.exhausted = false;
            trace!("line {}: {}", self.line_num, self.line);
            return Ok(true);
        }
    }

    /// Discard the next physical line without extracting its fields
    ///
    /// Useful for header rows. The blank-line policy does not apply.
    /// Returns `Ok(false)` at end of input.
    pub fn skip_line(&mut self) -> Result<bool> {
        let read = self.next_physical_line()?;
        if read {
            trace!("skipped line {}", self.line_num);
        }
        self.clear_line();
        Ok(read)
    }

    /// Override the delimiter for the next field or the rest of this line
    pub fn apply_sep(&mut self, sep: Sep) -> &mut Self {
        self.sep = Some(sep);
        self
    }

    /// Extract the next field as unescaped text
    ///
    /// Fails with [`CsvError::ExhaustedLine`] when the line has no field left.
    pub fn next_field(&mut self) -> Result<String> {
        if self.exhausted {
            return Err(CsvError::ExhaustedLine {
                line: self.line_num,
                position: self.token_num + 1,
            });
        }

        let (text, scanned) = {
            let (delimiter, unescape_text) = self.working_delimiter();
            let parser = CsvParser::with_delimiter(&self.config, delimiter, unescape_text);
            parser.next_field(&self.line, self.pos)
        };

        self.pos = scanned.next;
        self.exhausted = scanned.at_end;
        self.token_num += 1;
        if matches!(&self.sep, Some(sep) if sep.scope() == SepScope::Field) {
            self.sep = None;
        }
        Ok(text)
    }

    /// Extract the next field and convert it to `T`
    ///
    /// ```
    /// use csvstream::{CsvReader, NChar};
    ///
    /// let mut reader = CsvReader::from_text("8,56");
    /// reader.read_line()?;
    /// let literal: char = reader.extract()?;
    /// let numeric: NChar = reader.extract()?;
    /// assert_eq!(literal, '8');
    /// assert_eq!(numeric, NChar(56));
    /// # Ok::<(), csvstream::CsvError>(())
    /// ```
    pub fn extract<T: FromField>(&mut self) -> Result<T> {
        let token = self.next_field()?;
        match T::from_text(&token, &self.converter) {
            Some(value) => Ok(value),
            None => Err(CsvError::Conversion {
                token,
                kind: T::KIND,
                line: self.line_num,
                position: self.token_num,
                source_name: self.source.name().to_string(),
            }),
        }
    }

    /// Extract the next field into `dest`, leaving it untouched on error
    pub fn extract_into<T: FromField>(&mut self, dest: &mut T) -> Result<()> {
        *dest = self.extract()?;
        Ok(())
    }

    /// Extract every field left on the current line as text
    pub fn remaining_fields(&mut self) -> Result<Vec<String>> {
        let mut fields = Vec::new();
        while !self.exhausted {
            fields.push(self.next_field()?);
        }
        Ok(fields)
    }

    /// Number of field-separating delimiters on the current line
    ///
    /// Counts the working delimiter, ignoring occurrences inside quoted
    /// fields. Always the field count of the line minus one.
    pub fn num_of_delimiter(&self) -> usize {
        let (delimiter, _) = self.working_delimiter();
        let quote = self
            .config
            .is_trim_quote_enabled()
            .then(|| self.config.quote_char());
        count_delimiters(&self.line, delimiter, quote)
    }

    /// The part of the current line not consumed yet
    pub fn get_rest_of_line(&self) -> &str {
        if self.exhausted {
            ""
        } else {
            &self.line[self.pos..]
        }
    }

    /// The current line as read, before any unescaping
    pub fn get_line(&self) -> &str {
        &self.line
    }

    /// 1-based physical line number of the current line (0 before any read)
    pub fn line_num(&self) -> usize {
        self.line_num
    }

    /// Number of fields extracted from the current line so far
    pub fn token_num(&self) -> usize {
        self.token_num
    }

    /// Iterate over the remaining lines as vectors of text fields
    ///
    /// ```
    /// use csvstream::CsvReader;
    ///
    /// let mut reader = CsvReader::from_text("a,b\nc,d");
    /// let rows: Vec<Vec<String>> = reader.records().collect::<Result<_, _>>()?;
    /// assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
    /// # Ok::<(), csvstream::CsvError>(())
    /// ```
    pub fn records(&mut self) -> Records<'_, S, C> {
        Records {
            reader: self,
            done: false,
        }
    }

    /// Clear the line state and restore the default configuration
    ///
    /// The source keeps its position.
    pub fn reset(&mut self) {
        self.config = Config::default();
        self.clear_line();
        self.first_line_read = false;
        self.line_num = 0;
    }

    /// Release the line source
    pub fn close(&mut self) {
        self.source.close();
        self.clear_line();
    }

    fn working_delimiter(&self) -> (char, &str) {
        match &self.sep {
            Some(sep) => (sep.delimiter(), sep.text()),
            None => (self.config.delimiter(), self.config.unescape_text()),
        }
    }

    fn next_physical_line(&mut self) -> Result<bool> {
        self.sep = None;
        if !self.source.next_line(&mut self.line)? {
            self.clear_line();
            return Ok(false);
        }
        if !self.first_line_read {
            self.first_line_read = true;
            if self.line.starts_with(BOM) {
                self.line.replace_range(..BOM.len_utf8(), "");
            }
        }
        self.line_num += 1;
        self.pos = 0;
        self.token_num = 0;
        self.exhausted = true;
        Ok(true)
    }

    fn clear_line(&mut self) {
        self.line.clear();
        self.pos = 0;
        self.exhausted = true;
        self.sep = None;
        self.token_num = 0;
    }
}

/// Iterator over the text fields of each remaining line
pub struct Records<'a, S, C> {
    reader: &'a mut CsvReader<S, C>,
    done: bool,
}

impl<'a, S: LineSource, C: Converter> Iterator for Records<'a, S, C> {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = match self.reader.read_line() {
            Ok(true) => self.reader.remaining_fields(),
            Ok(false) => {
                self.done = true;
                return None;
            }
            Err(e) => Err(e),
        };
        if item.is_err() {
            self.done = true;
        }
        Some(item)
    }
}
