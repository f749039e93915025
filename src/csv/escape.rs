//! Escape substitution for delimiters, newlines and quotes inside values
//!
//! Escaping replaces every literal occurrence of a character with a marker
//! text; unescaping replaces every marker with the character. An empty marker
//! turns both into no-ops.

use crate::config::Config;
use std::borrow::Cow;

/// Replace every occurrence of `find` in `src` with `to`
///
/// Replacement text is never rescanned, so `to` may contain `find`.
pub fn replace_all<'a>(src: &'a str, find: &str, to: &str) -> Cow<'a, str> {
    if find.is_empty() || !src.contains(find) {
        Cow::Borrowed(src)
    } else {
        Cow::Owned(src.replace(find, to))
    }
}

/// Replace every literal `ch` in `text` with `marker`
pub fn escape<'a>(text: &'a str, ch: char, marker: &str) -> Cow<'a, str> {
    if marker.is_empty() || !text.contains(ch) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + marker.len());
    for c in text.chars() {
        if c == ch {
            out.push_str(marker);
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// Replace every `marker` in `text` with `ch`
pub fn unescape<'a>(text: &'a str, marker: &str, ch: char) -> Cow<'a, str> {
    if marker.is_empty() {
        return Cow::Borrowed(text);
    }
    let mut buf = [0u8; 4];
    replace_all(text, marker, ch.encode_utf8(&mut buf))
}

/// The substitution rules in effect for one field
///
/// Built from the stream [`Config`] plus the working delimiter, which may
/// come from a separator override instead of the configuration.
#[derive(Debug, Clone, Copy)]
pub struct EscapePolicy<'a> {
    delimiter: char,
    delimiter_text: &'a str,
    newline_text: &'a str,
    cr_text: &'a str,
    quote: char,
    quote_text: &'a str,
    surround: bool,
    trim: bool,
}

impl<'a> EscapePolicy<'a> {
    /// Policy for writing with `delimiter` and its escape text
    pub fn for_write(config: &'a Config, delimiter: char, delimiter_text: &'a str) -> Self {
        Self {
            delimiter,
            delimiter_text,
            newline_text: config.newline_escape(),
            cr_text: config.carriage_return_escape(),
            quote: config.quote_char(),
            quote_text: config.quote_escape(),
            surround: config.is_surround_quote_enabled(),
            trim: config.is_trim_quote_enabled(),
        }
    }

    /// Policy for reading with `delimiter` and its unescape text
    pub fn for_read(config: &'a Config, delimiter: char, delimiter_text: &'a str) -> Self {
        Self {
            delimiter,
            delimiter_text,
            newline_text: config.newline_unescape(),
            cr_text: config.carriage_return_unescape(),
            quote: config.quote_char(),
            quote_text: config.quote_unescape(),
            surround: false,
            trim: config.is_trim_quote_enabled(),
        }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Escape (write) or unescape (read) text of the delimiter
    pub fn delimiter_text(&self) -> &'a str {
        self.delimiter_text
    }

    pub fn quote(&self) -> char {
        self.quote
    }

    /// Escape the delimiter and line breaks of a value
    pub fn escape_value<'t>(&self, text: &'t str) -> Cow<'t, str> {
        let mut value = escape(text, self.delimiter, self.delimiter_text);
        for (ch, marker) in [('\n', self.newline_text), ('\r', self.cr_text)] {
            let replaced = match escape(&value, ch, marker) {
                Cow::Owned(t) => Some(t),
                Cow::Borrowed(_) => None,
            };
            if let Some(t) = replaced {
                value = Cow::Owned(t);
            }
        }
        value
    }

    /// Whether an escaped value must be wrapped in quotes
    ///
    /// Surround-quote applies to textual values only. Otherwise a value is
    /// quoted when the delimiter survived escaping (empty escape text) or
    /// when it starts with the quote character and would be read back as a
    /// quoted field. Both cases only arise when the reader recognizes
    /// quotes (trim-quote enabled).
    pub fn needs_quoting(&self, escaped: &str, textual: bool) -> bool {
        if textual && self.surround {
            return true;
        }
        self.trim && (escaped.contains(self.delimiter) || escaped.starts_with(self.quote))
    }

    /// Append `escaped` to `out` wrapped in quotes
    ///
    /// Quotes inside the value become the quote escape text, or are doubled
    /// when that text is empty.
    pub fn push_quoted(&self, escaped: &str, out: &mut String) {
        out.push(self.quote);
        if self.quote_text.is_empty() {
            for c in escaped.chars() {
                if c == self.quote {
                    out.push(self.quote);
                }
                out.push(c);
            }
        } else {
            out.push_str(&escape(escaped, self.quote, self.quote_text));
        }
        out.push(self.quote);
    }

    /// Restore the literal characters of a raw token
    ///
    /// The quote marker is only honoured inside fields that were quoted,
    /// which is the only place the writer produces it.
    pub fn unescape_token(&self, raw: &str, quoted: bool) -> String {
        let text = unescape(raw, self.delimiter_text, self.delimiter);
        let text = unescape(&text, self.newline_text, '\n');
        let text = unescape(&text, self.cr_text, '\r').into_owned();
        if quoted {
            unescape(&text, self.quote_text, self.quote).into_owned()
        } else {
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_and_unescape() {
        assert_eq!(escape("a,b,c", ',', "##"), "a##b##c");
        assert_eq!(unescape("a##b##c", "##", ','), "a,b,c");
    }

    #[test]
    fn test_empty_marker_is_noop() {
        assert!(matches!(escape("a,b", ',', ""), Cow::Borrowed("a,b")));
        assert!(matches!(unescape("a##b", "", ','), Cow::Borrowed("a##b")));
    }

    #[test]
    fn test_escape_is_idempotent() {
        let once = escape("x,y\nz", ',', "##").into_owned();
        let twice = escape(&once, ',', "##").into_owned();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_replace_all_does_not_rescan() {
        assert_eq!(replace_all("aaa", "a", "aa"), "aaaaaa");
        assert_eq!(replace_all("abc", "", "x"), "abc");
    }

    #[test]
    fn test_write_policy_escapes_delimiter_and_newline() {
        let config = Config::default();
        let policy = EscapePolicy::for_write(&config, ',', "##");
        assert_eq!(policy.escape_value("a,b\nc"), "a##b&newline;c");
        assert!(!policy.needs_quoting("a##b", true));
    }

    #[test]
    fn test_empty_escape_text_triggers_auto_quoting() {
        let config = Config::default();
        let policy = EscapePolicy::for_write(&config, ',', "");
        let escaped = policy.escape_value("a,b");
        assert!(policy.needs_quoting(&escaped, true));

        let mut out = String::new();
        policy.push_quoted(&escaped, &mut out);
        assert_eq!(out, "\"a,b\"");
    }

    #[test]
    fn test_leading_quote_forces_quoting() {
        let config = Config::default();
        let policy = EscapePolicy::for_write(&config, ',', "##");
        assert!(policy.needs_quoting("\"hi\"", true));

        let mut out = String::new();
        policy.push_quoted("\"hi\"", &mut out);
        assert_eq!(out, "\"&quot;hi&quot;\"");
    }

    #[test]
    fn test_carriage_return_is_escaped() {
        let config = Config::default();
        let write = EscapePolicy::for_write(&config, ',', "##");
        let escaped = write.escape_value("a\r\nb\r");
        assert_eq!(escaped, "a&cr;&newline;b&cr;");

        let read = EscapePolicy::for_read(&config, ',', "##");
        assert_eq!(read.unescape_token(&escaped, false), "a\r\nb\r");
    }

    #[test]
    fn test_no_quoting_when_reader_ignores_quotes() {
        let mut config = Config::default();
        config.enable_trim_quote(false, '"', "&quot;");
        let policy = EscapePolicy::for_write(&config, ',', "");
        assert!(!policy.needs_quoting("\"hi", true));
        assert!(!policy.needs_quoting("a,b", true));
    }

    #[test]
    fn test_numbers_starting_with_quote_are_quoted() {
        let mut config = Config::default();
        config.enable_trim_quote(true, '-', "&quot;");
        let policy = EscapePolicy::for_write(&config, ',', "##");
        assert!(policy.needs_quoting("-7", false));
        assert!(!policy.needs_quoting("7", false));

        config.enable_surround_quote(true, '-', "&quot;");
        let policy = EscapePolicy::for_write(&config, ',', "##");
        assert!(!policy.needs_quoting("7", false));
        assert!(policy.needs_quoting("7", true));
    }

    #[test]
    fn test_empty_quote_escape_doubles_quotes() {
        let mut config = Config::default();
        config.enable_surround_quote(true, '"', "");
        let policy = EscapePolicy::for_write(&config, ',', "##");

        let mut out = String::new();
        policy.push_quoted("Say \"Hi\"", &mut out);
        assert_eq!(out, r#""Say ""Hi""""#);
    }

    #[test]
    fn test_unescape_token() {
        let config = Config::default();
        let policy = EscapePolicy::for_read(&config, ',', "##");
        assert_eq!(policy.unescape_token("a##b&newline;c", false), "a,b\nc");
        assert_eq!(policy.unescape_token("&quot;x&quot;", false), "&quot;x&quot;");
        assert_eq!(policy.unescape_token("&quot;x&quot;", true), "\"x\"");
    }
}
