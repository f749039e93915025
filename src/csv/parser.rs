//! Line tokenizer: splits one physical line into field tokens

use crate::config::Config;
use crate::csv::escape::EscapePolicy;

/// One field cut out of a line, before unescaping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedField {
    /// Field text with any quote wrapper removed
    pub raw: String,
    /// The field started with the quote character
    pub quoted: bool,
    /// Byte offset just past the consumed delimiter
    pub next: usize,
    /// The field ran to the end of the line (no delimiter followed it)
    pub at_end: bool,
}

/// Scan the field starting at byte offset `start`
///
/// With `quote` set, a field that begins with the quote character runs to
/// the matching closing quote; delimiters inside it are not boundaries and a
/// doubled quote stands for one literal quote. Text between the closing
/// quote and the next delimiter is kept. An unterminated quote swallows the
/// rest of the line.
pub fn scan_field(line: &str, start: usize, delimiter: char, quote: Option<char>) -> ScannedField {
    let rest = &line[start..];
    let mut chars = rest.char_indices().peekable();
    let mut raw = String::new();
    let mut quoted = false;

    if let Some(q) = quote {
        if rest.starts_with(q) {
            quoted = true;
            chars.next();
            loop {
                match chars.next() {
                    None => {
                        return ScannedField {
                            raw,
                            quoted,
                            next: line.len(),
                            at_end: true,
                        };
                    }
                    Some((_, c)) if c == q => {
                        if chars.peek().map(|&(_, n)| n) == Some(q) {
                            raw.push(q);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    Some((_, c)) => raw.push(c),
                }
            }
        }
    }

    for (i, c) in chars {
        if c == delimiter {
            return ScannedField {
                raw,
                quoted,
                next: start + i + c.len_utf8(),
                at_end: false,
            };
        }
        raw.push(c);
    }

    ScannedField {
        raw,
        quoted,
        next: line.len(),
        at_end: true,
    }
}

/// Count the delimiters of `line` that separate fields
///
/// Delimiters inside quoted fields are not counted, so the result is always
/// the number of fields minus one.
pub fn count_delimiters(line: &str, delimiter: char, quote: Option<char>) -> usize {
    let mut count = 0;
    let mut pos = 0;
    loop {
        let field = scan_field(line, pos, delimiter, quote);
        if field.at_end {
            return count;
        }
        count += 1;
        pos = field.next;
    }
}

/// Whole-line parser built on [`scan_field`] and an [`EscapePolicy`]
pub struct CsvParser<'a> {
    policy: EscapePolicy<'a>,
    quote: Option<char>,
}

impl<'a> CsvParser<'a> {
    /// Parser using the configured delimiter
    pub fn new(config: &'a Config) -> Self {
        Self::with_delimiter(config, config.delimiter(), config.unescape_text())
    }

    /// Parser using an explicit delimiter and unescape text
    pub fn with_delimiter(config: &'a Config, delimiter: char, unescape_text: &'a str) -> Self {
        let quote = config
            .is_trim_quote_enabled()
            .then(|| config.quote_char());
        Self {
            policy: EscapePolicy::for_read(config, delimiter, unescape_text),
            quote,
        }
    }

    /// Scan and unescape the field at `start`
    ///
    /// Returns the field text and the scan result describing where it ended.
    pub fn next_field(&self, line: &str, start: usize) -> (String, ScannedField) {
        let scanned = scan_field(line, start, self.policy.delimiter(), self.quote);
        let text = self.policy.unescape_token(&scanned.raw, scanned.quoted);
        (text, scanned)
    }

    /// Parse every field from byte offset `start` to the end of the line
    pub fn parse_from(&self, line: &str, start: usize) -> Vec<String> {
        let mut fields = Vec::new();
        let mut pos = start;
        loop {
            let (text, scanned) = self.next_field(line, pos);
            fields.push(text);
            if scanned.at_end {
                return fields;
            }
            pos = scanned.next;
        }
    }

    /// Parse a CSV line into fields
    pub fn parse_line(&self, line: &str) -> Vec<String> {
        self.parse_from(line, 0)
    }

    /// Number of field-separating delimiters in `line`
    pub fn count_delimiters(&self, line: &str) -> usize {
        count_delimiters(line, self.policy.delimiter(), self.quote)
    }
}
