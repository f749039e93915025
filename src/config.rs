//! Stream configuration shared by readers and writers

use crate::error::{CsvError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default replacement text for a delimiter found inside a value
pub const DEFAULT_DELIMITER_ESCAPE: &str = "##";
/// Default replacement text for a newline found inside a value
pub const DEFAULT_NEWLINE_ESCAPE: &str = "&newline;";
/// Default replacement text for a carriage return found inside a value
pub const DEFAULT_CARRIAGE_RETURN_ESCAPE: &str = "&cr;";
/// Default replacement text for a quote found inside a quoted value
pub const DEFAULT_QUOTE_ESCAPE: &str = "&quot;";

/// Delimiter, quoting and escaping settings of one stream
///
/// Each reader and writer owns its own `Config`. Change it only between
/// lines: the working delimiter of the tokenizer and formatter is refreshed
/// from here at every line boundary.
///
/// # Examples
///
/// ```
/// use csvstream::Config;
///
/// let mut config = Config::default();
/// config.set_delimiter('|', "<pipe>");
/// config.enable_surround_quote(true, '\'', "&apos;");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    delimiter: char,
    unescape_text: String,
    escape_text: String,
    newline_escape: String,
    newline_unescape: String,
    carriage_return_escape: String,
    carriage_return_unescape: String,
    quote_char: char,
    quote_escape: String,
    quote_unescape: String,
    surround_quote_enabled: bool,
    trim_quote_enabled: bool,
    blank_line_allowed: bool,
    terminate_on_blank_line: bool,
    line_terminator: String,
    float_precision: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delimiter: ',',
            unescape_text: DEFAULT_DELIMITER_ESCAPE.to_string(),
            escape_text: DEFAULT_DELIMITER_ESCAPE.to_string(),
            newline_escape: DEFAULT_NEWLINE_ESCAPE.to_string(),
            newline_unescape: DEFAULT_NEWLINE_ESCAPE.to_string(),
            carriage_return_escape: DEFAULT_CARRIAGE_RETURN_ESCAPE.to_string(),
            carriage_return_unescape: DEFAULT_CARRIAGE_RETURN_ESCAPE.to_string(),
            quote_char: '"',
            quote_escape: DEFAULT_QUOTE_ESCAPE.to_string(),
            quote_unescape: DEFAULT_QUOTE_ESCAPE.to_string(),
            surround_quote_enabled: false,
            trim_quote_enabled: true,
            blank_line_allowed: false,
            terminate_on_blank_line: true,
            line_terminator: "\n".to_string(),
            float_precision: Some(6),
        }
    }
}

impl Config {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delimiter and the text that stands for it inside values
    ///
    /// The text is used both as the escape (write side) and the unescape
    /// (read side) marker. An empty text disables substitution: the writer
    /// then quotes any value containing the delimiter instead.
    pub fn set_delimiter(&mut self, delimiter: char, text: &str) {
        self.delimiter = delimiter;
        self.escape_text = text.to_string();
        self.unescape_text = text.to_string();
    }

    /// Set the text that stands for a newline inside values
    pub fn set_newline_escape(&mut self, text: &str) {
        self.newline_escape = text.to_string();
        self.newline_unescape = text.to_string();
    }

    /// Set the text that stands for a carriage return inside values
    ///
    /// Without it a `\r` ending the last field would be taken for part of
    /// a `\r\n` line terminator on read.
    pub fn set_carriage_return_escape(&mut self, text: &str) {
        self.carriage_return_escape = text.to_string();
        self.carriage_return_unescape = text.to_string();
    }

    /// Enable or disable quote-surrounding of textual fields on write
    pub fn enable_surround_quote(&mut self, enable: bool, quote: char, escape: &str) {
        self.surround_quote_enabled = enable;
        self.quote_char = quote;
        self.quote_escape = escape.to_string();
    }

    /// Enable or disable recognition and stripping of quoted fields on read
    pub fn enable_trim_quote(&mut self, enable: bool, quote: char, unescape: &str) {
        self.trim_quote_enabled = enable;
        self.quote_char = quote;
        self.quote_unescape = unescape.to_string();
    }

    /// Return blank lines to the caller instead of skipping them
    ///
    /// Only has an effect when terminate-on-blank-line is disabled.
    pub fn enable_blank_line(&mut self, enable: bool) {
        self.blank_line_allowed = enable;
    }

    /// End the read sequence at the first blank line
    pub fn enable_terminate_on_blank_line(&mut self, enable: bool) {
        self.terminate_on_blank_line = enable;
    }

    /// Set the text written at the end of every line
    pub fn set_line_terminator(&mut self, terminator: &str) {
        self.line_terminator = terminator.to_string();
    }

    /// Set the number of decimals written for floating point values
    ///
    /// `None` writes the shortest text that parses back to the same value.
    pub fn set_float_precision(&mut self, precision: Option<usize>) {
        self.float_precision = precision;
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn escape_text(&self) -> &str {
        &self.escape_text
    }

    pub fn unescape_text(&self) -> &str {
        &self.unescape_text
    }

    pub fn newline_escape(&self) -> &str {
        &self.newline_escape
    }

    pub fn newline_unescape(&self) -> &str {
        &self.newline_unescape
    }

    pub fn carriage_return_escape(&self) -> &str {
        &self.carriage_return_escape
    }

    pub fn carriage_return_unescape(&self) -> &str {
        &self.carriage_return_unescape
    }

    pub fn quote_char(&self) -> char {
        self.quote_char
    }

    pub fn quote_escape(&self) -> &str {
        &self.quote_escape
    }

    pub fn quote_unescape(&self) -> &str {
        &self.quote_unescape
    }

    pub fn is_surround_quote_enabled(&self) -> bool {
        self.surround_quote_enabled
    }

    pub fn is_trim_quote_enabled(&self) -> bool {
        self.trim_quote_enabled
    }

    pub fn is_blank_line_allowed(&self) -> bool {
        self.blank_line_allowed
    }

    pub fn is_terminate_on_blank_line(&self) -> bool {
        self.terminate_on_blank_line
    }

    pub fn line_terminator(&self) -> &str {
        &self.line_terminator
    }

    pub fn float_precision(&self) -> Option<usize> {
        self.float_precision
    }

    /// Check that no substitution text collides with the characters it hides
    ///
    /// A marker that contains the delimiter, the quote character or a
    /// newline would reintroduce the very character it replaces.
    pub fn validate(&self) -> Result<()> {
        if self.delimiter == '\n' || self.delimiter == '\r' {
            return Err(CsvError::InvalidConfig(
                "delimiter cannot be a line break".to_string(),
            ));
        }
        if self.delimiter == self.quote_char {
            return Err(CsvError::InvalidConfig(format!(
                "delimiter and quote character are both {:?}",
                self.delimiter
            )));
        }

        let markers = [
            ("delimiter escape", &self.escape_text),
            ("delimiter unescape", &self.unescape_text),
            ("newline escape", &self.newline_escape),
            ("newline unescape", &self.newline_unescape),
            ("carriage return escape", &self.carriage_return_escape),
            ("carriage return unescape", &self.carriage_return_unescape),
            ("quote escape", &self.quote_escape),
            ("quote unescape", &self.quote_unescape),
        ];
        for (name, text) in markers {
            check_marker(name, text, self.delimiter, self.quote_char)?;
        }
        if self.line_terminator.is_empty() {
            return Err(CsvError::InvalidConfig(
                "line terminator cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Like [`validate`](Self::validate), and also require every escape text
    /// to equal its unescape counterpart
    ///
    /// Data written and read back with one `Config` only round-trips when the
    /// two sides substitute the same markers, line breaks are always
    /// substituted, and any quoting the writer relies on is recognized by the
    /// reader.
    pub fn validate_round_trip(&self) -> Result<()> {
        self.validate()?;

        let pairs = [
            ("delimiter", &self.escape_text, &self.unescape_text),
            ("newline", &self.newline_escape, &self.newline_unescape),
            (
                "carriage return",
                &self.carriage_return_escape,
                &self.carriage_return_unescape,
            ),
            ("quote", &self.quote_escape, &self.quote_unescape),
        ];
        for (name, escape, unescape) in pairs {
            if escape != unescape {
                return Err(CsvError::InvalidConfig(format!(
                    "{} escape {:?} differs from unescape {:?}",
                    name, escape, unescape
                )));
            }
        }
        if self.newline_escape.is_empty() || self.carriage_return_escape.is_empty() {
            return Err(CsvError::InvalidConfig(
                "line breaks inside values need a non-empty escape text".to_string(),
            ));
        }
        if self.surround_quote_enabled && !self.trim_quote_enabled {
            return Err(CsvError::InvalidConfig(
                "surround quote is enabled but trim quote is not".to_string(),
            ));
        }
        if self.escape_text.is_empty() && !self.trim_quote_enabled {
            return Err(CsvError::InvalidConfig(
                "an empty delimiter escape text relies on quoting, but trim quote is disabled"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

fn check_marker(name: &str, text: &str, delimiter: char, quote: char) -> Result<()> {
    if text.contains(delimiter) {
        return Err(CsvError::InvalidConfig(format!(
            "{} text {:?} contains the delimiter {:?}",
            name, text, delimiter
        )));
    }
    if text.contains(quote) {
        return Err(CsvError::InvalidConfig(format!(
            "{} text {:?} contains the quote character {:?}",
            name, text, quote
        )));
    }
    if text.contains('\n') || text.contains('\r') {
        return Err(CsvError::InvalidConfig(format!(
            "{} text {:?} contains a line break",
            name, text
        )));
    }
    Ok(())
}
