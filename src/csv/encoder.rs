//! Line formatter: escapes and quotes field values into one output line

use crate::config::Config;
use crate::csv::escape::{escape, EscapePolicy};
use crate::types::FieldKind;

/// CSV encoder for writing escaped, optionally quoted fields
pub struct CsvEncoder<'a> {
    policy: EscapePolicy<'a>,
}

impl<'a> CsvEncoder<'a> {
    /// Encoder using the configured delimiter
    pub fn new(config: &'a Config) -> Self {
        Self::with_delimiter(config, config.delimiter(), config.escape_text())
    }

    /// Encoder using an explicit delimiter and escape text
    pub fn with_delimiter(config: &'a Config, delimiter: char, escape_text: &'a str) -> Self {
        Self {
            policy: EscapePolicy::for_write(config, delimiter, escape_text),
        }
    }

    pub fn delimiter(&self) -> char {
        self.policy.delimiter()
    }

    /// Encode entire row of text fields into buffer
    pub fn encode_row(&self, fields: &[&str], buffer: &mut String) {
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                buffer.push(self.policy.delimiter());
            }
            self.encode_field(field, FieldKind::Text, buffer);
        }
    }

    /// Encode one field's text according to its kind
    ///
    /// Textual kinds get delimiter and line break escaping, and surround
    /// quoting when enabled. Other kinds only get their delimiter escaped.
    /// Any kind is quoted when the reader would otherwise misread it.
    pub fn encode_field(&self, text: &str, kind: FieldKind, buffer: &mut String) {
        let textual = kind.is_textual();
        let escaped = if textual {
            self.policy.escape_value(text)
        } else {
            escape(text, self.policy.delimiter(), self.policy.delimiter_text())
        };
        if self.policy.needs_quoting(&escaped, textual) {
            self.policy.push_quoted(&escaped, buffer);
        } else {
            buffer.push_str(&escaped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(config: &Config, fields: &[&str]) -> String {
        let encoder = CsvEncoder::new(config);
        let mut buffer = String::new();
        encoder.encode_row(fields, &mut buffer);
        buffer
    }

    #[test]
    fn test_simple_fields() {
        assert_eq!(encode(&Config::default(), &["a", "b", "c"]), "a,b,c");
    }

    #[test]
    fn test_escaped_delimiter() {
        assert_eq!(encode(&Config::default(), &["a,b", "c"]), "a##b,c");
    }

    #[test]
    fn test_auto_quoted_fields() {
        let mut config = Config::default();
        config.set_delimiter(',', "");
        assert_eq!(encode(&config, &["a,b", "c"]), r#""a,b",c"#);
    }

    #[test]
    fn test_quote_escape_inside_quoted_field() {
        let mut config = Config::default();
        config.enable_surround_quote(true, '"', "&quot;");
        assert_eq!(
            encode(&config, &[r#"Say "Hi""#, "x"]),
            r#""Say &quot;Hi&quot;","x""#
        );
    }

    #[test]
    fn test_newlines() {
        assert_eq!(
            encode(&Config::default(), &["Line 1\nLine 2", "normal"]),
            "Line 1&newline;Line 2,normal"
        );
    }

    #[test]
    fn test_empty_fields() {
        assert_eq!(encode(&Config::default(), &["a", "", "c"]), "a,,c");
        assert_eq!(encode(&Config::default(), &["", "", ""]), ",,");
    }

    #[test]
    fn test_custom_delimiter() {
        let mut config = Config::default();
        config.set_delimiter(';', "");
        assert_eq!(encode(&config, &["a", "b;c", "d"]), r#"a;"b;c";d"#);
    }

    #[test]
    fn test_numbers_are_never_surround_quoted() {
        let mut config = Config::default();
        config.enable_surround_quote(true, '"', "&quot;");
        let encoder = CsvEncoder::new(&config);
        let mut buffer = String::new();
        encoder.encode_field("200", FieldKind::Integer, &mut buffer);
        assert_eq!(buffer, "200");
    }

    #[test]
    fn test_number_containing_delimiter() {
        let mut config = Config::default();
        config.set_delimiter('.', "<dot>");
        let encoder = CsvEncoder::new(&config);
        let mut buffer = String::new();
        encoder.encode_field("1.5", FieldKind::Float, &mut buffer);
        assert_eq!(buffer, "1<dot>5");
    }

    #[test]
    fn test_number_starting_with_quote_char() {
        let mut config = Config::default();
        config.enable_trim_quote(true, '-', "&quot;");
        let encoder = CsvEncoder::new(&config);
        let mut buffer = String::new();
        encoder.encode_field("-7", FieldKind::Integer, &mut buffer);
        assert_eq!(buffer, "-&quot;7-");
    }

    #[test]
    fn test_leading_quote_kept_when_trim_quote_disabled() {
        let mut config = Config::default();
        config.enable_trim_quote(false, '"', "&quot;");
        assert_eq!(encode(&config, &["\"hi", "x"]), "\"hi,x");
    }
}
