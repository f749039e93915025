//! Field value types and the conversion boundary between text and values

use crate::config::Config;
use crate::convert::Converter;
use std::fmt::{self, Write};

/// The kind of value a field token is converted to or from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Signed integer
    Integer,
    /// Unsigned integer
    Unsigned,
    /// Floating point number
    Float,
    /// `true` / `false`
    Bool,
    /// A single literal character
    Char,
    /// A character read and written as its numeric code in `[-128, 127]`
    NChar,
    /// Free text
    Text,
}

impl FieldKind {
    /// Textual kinds go through the full escape policy and may be quoted;
    /// the others only get their delimiter escaped
    pub fn is_textual(&self) -> bool {
        matches!(self, FieldKind::Char | FieldKind::NChar | FieldKind::Text)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Integer => "integer",
            FieldKind::Unsigned => "unsigned integer",
            FieldKind::Float => "float",
            FieldKind::Bool => "bool",
            FieldKind::Char => "char",
            FieldKind::NChar => "numeric char",
            FieldKind::Text => "text",
        };
        f.write_str(name)
    }
}

/// A character stored and transferred as its signed numeric code
///
/// Reading `"56"` into a `char` fails (two characters); reading it into an
/// `NChar` yields code 56, which is the digit `'8'`.
///
/// ```
/// use csvstream::NChar;
///
/// let ch = NChar::from_char('8').unwrap();
/// assert_eq!(ch.code(), 56);
/// assert_eq!(ch.to_char(), Some('8'));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NChar(pub i8);

impl NChar {
    /// Wrap an ASCII character; `None` for anything outside `0..=127`
    pub fn from_char(ch: char) -> Option<Self> {
        i8::try_from(u32::from(ch)).ok().map(NChar)
    }

    pub fn code(&self) -> i8 {
        self.0
    }

    /// The character for a non-negative code
    pub fn to_char(&self) -> Option<char> {
        u8::try_from(self.0).ok().map(char::from)
    }
}

/// How long a [`Sep`] override lasts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SepScope {
    /// Only the next field
    Field,
    /// Every remaining field of the current line
    Line,
}

/// Separator token: overrides the delimiter inside one line
///
/// Constructing a `Sep` has no effect by itself; hand it to
/// [`CsvReader::apply_sep`](crate::CsvReader::apply_sep) or
/// [`CsvWriter::apply_sep`](crate::CsvWriter::apply_sep). The delimiter
/// configured in [`Config`] comes back at the next line either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sep {
    delimiter: char,
    text: String,
    scope: SepScope,
}

impl Sep {
    /// Override for the rest of the current line
    pub fn new(delimiter: char, text: &str) -> Self {
        Self {
            delimiter,
            text: text.to_string(),
            scope: SepScope::Line,
        }
    }

    /// Override for the next field only
    pub fn once(delimiter: char, text: &str) -> Self {
        Self {
            delimiter,
            text: text.to_string(),
            scope: SepScope::Field,
        }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Escape text on write, unescape text on read
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn scope(&self) -> SepScope {
        self.scope
    }
}

/// Values that can be parsed from an unescaped field token
pub trait FromField: Sized {
    /// Reported in conversion errors
    const KIND: FieldKind;

    /// Parse `token`, or `None` when it is not a valid representation
    fn from_text<C: Converter + ?Sized>(token: &str, conv: &C) -> Option<Self>;
}

/// Values that can be written as a field
pub trait ToField {
    fn kind(&self) -> FieldKind;

    /// Append the unescaped text of the value to `out`
    fn write_text(&self, out: &mut String, config: &Config);
}

impl<T: ToField + ?Sized> ToField for &T {
    fn kind(&self) -> FieldKind {
        (**self).kind()
    }

    fn write_text(&self, out: &mut String, config: &Config) {
        (**self).write_text(out, config)
    }
}

macro_rules! integer_field {
    ($parse:ident, $kind:expr, $($t:ty),*) => {
        $(
            impl ToField for $t {
                fn kind(&self) -> FieldKind {
                    $kind
                }

                fn write_text(&self, out: &mut String, _config: &Config) {
                    out.push_str(itoa::Buffer::new().format(*self));
                }
            }

            impl FromField for $t {
                const KIND: FieldKind = $kind;

                fn from_text<C: Converter + ?Sized>(token: &str, conv: &C) -> Option<Self> {
                    conv.$parse(token).and_then(|v| <$t>::try_from(v).ok())
                }
            }
        )*
    };
}

integer_field!(parse_i64, FieldKind::Integer, i8, i16, i32, i64, isize);
integer_field!(parse_u64, FieldKind::Unsigned, u8, u16, u32, u64, usize);

fn write_float(out: &mut String, value: f64, precision: Option<usize>) {
    // Writing into a String cannot fail
    let _ = match precision {
        Some(p) => write!(out, "{:.*}", p, value),
        None => write!(out, "{}", value),
    };
}

impl ToField for f64 {
    fn kind(&self) -> FieldKind {
        FieldKind::Float
    }

    fn write_text(&self, out: &mut String, config: &Config) {
        write_float(out, *self, config.float_precision());
    }
}

impl FromField for f64 {
    const KIND: FieldKind = FieldKind::Float;

    fn from_text<C: Converter + ?Sized>(token: &str, conv: &C) -> Option<Self> {
        conv.parse_f64(token)
    }
}

impl ToField for f32 {
    fn kind(&self) -> FieldKind {
        FieldKind::Float
    }

    fn write_text(&self, out: &mut String, config: &Config) {
        let _ = match config.float_precision() {
            Some(p) => write!(out, "{:.*}", p, self),
            None => write!(out, "{}", self),
        };
    }
}

impl FromField for f32 {
    const KIND: FieldKind = FieldKind::Float;

    fn from_text<C: Converter + ?Sized>(token: &str, conv: &C) -> Option<Self> {
        conv.parse_f32(token)
    }
}

impl ToField for bool {
    fn kind(&self) -> FieldKind {
        FieldKind::Bool
    }

    fn write_text(&self, out: &mut String, _config: &Config) {
        out.push_str(if *self { "true" } else { "false" });
    }
}

impl FromField for bool {
    const KIND: FieldKind = FieldKind::Bool;

    fn from_text<C: Converter + ?Sized>(token: &str, _conv: &C) -> Option<Self> {
        match token {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}

impl ToField for char {
    fn kind(&self) -> FieldKind {
        FieldKind::Char
    }

    fn write_text(&self, out: &mut String, _config: &Config) {
        out.push(*self);
    }
}

impl FromField for char {
    const KIND: FieldKind = FieldKind::Char;

    fn from_text<C: Converter + ?Sized>(token: &str, _conv: &C) -> Option<Self> {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Some(ch),
            _ => None,
        }
    }
}

impl ToField for NChar {
    fn kind(&self) -> FieldKind {
        FieldKind::NChar
    }

    fn write_text(&self, out: &mut String, _config: &Config) {
        out.push_str(itoa::Buffer::new().format(self.0));
    }
}

impl FromField for NChar {
    const KIND: FieldKind = FieldKind::NChar;

    fn from_text<C: Converter + ?Sized>(token: &str, conv: &C) -> Option<Self> {
        conv.parse_i64(token)
            .and_then(|v| i8::try_from(v).ok())
            .map(NChar)
    }
}

impl ToField for str {
    fn kind(&self) -> FieldKind {
        FieldKind::Text
    }

    fn write_text(&self, out: &mut String, _config: &Config) {
        out.push_str(self);
    }
}

impl ToField for String {
    fn kind(&self) -> FieldKind {
        FieldKind::Text
    }

    fn write_text(&self, out: &mut String, _config: &Config) {
        out.push_str(self);
    }
}

impl FromField for String {
    const KIND: FieldKind = FieldKind::Text;

    fn from_text<C: Converter + ?Sized>(token: &str, _conv: &C) -> Option<Self> {
        Some(token.to_string())
    }
}

/// An empty field stands for `None`
impl<T: ToField> ToField for Option<T> {
    fn kind(&self) -> FieldKind {
        match self {
            Some(v) => v.kind(),
            None => FieldKind::Text,
        }
    }

    fn write_text(&self, out: &mut String, config: &Config) {
        if let Some(v) = self {
            v.write_text(out, config);
        }
    }
}

impl<T: FromField> FromField for Option<T> {
    const KIND: FieldKind = T::KIND;

    fn from_text<C: Converter + ?Sized>(token: &str, conv: &C) -> Option<Self> {
        if token.is_empty() {
            Some(None)
        } else {
            T::from_text(token, conv).map(Some)
        }
    }
}

/// A dynamically typed field value, for rows built at runtime
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Empty field
    Empty,
    /// Text value
    Text(String),
    /// Signed integer value
    Int(i64),
    /// Unsigned integer value
    UInt(u64),
    /// Float value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Single literal character
    Char(char),
    /// Character written as its numeric code
    NChar(NChar),
}

impl FieldValue {
    /// Check if the value is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }

    /// Try to view the value as a signed integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            FieldValue::UInt(u) => i64::try_from(*u).ok(),
            FieldValue::NChar(c) => Some(i64::from(c.0)),
            FieldValue::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Try to view the value as a float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::UInt(u) => Some(*u as f64),
            FieldValue::Text(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl ToField for FieldValue {
    fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Empty | FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Int(_) => FieldKind::Integer,
            FieldValue::UInt(_) => FieldKind::Unsigned,
            FieldValue::Float(_) => FieldKind::Float,
            FieldValue::Bool(_) => FieldKind::Bool,
            FieldValue::Char(_) => FieldKind::Char,
            FieldValue::NChar(_) => FieldKind::NChar,
        }
    }

    fn write_text(&self, out: &mut String, config: &Config) {
        match self {
            FieldValue::Empty => {}
            FieldValue::Text(s) => s.write_text(out, config),
            FieldValue::Int(i) => i.write_text(out, config),
            FieldValue::UInt(u) => u.write_text(out, config),
            FieldValue::Float(f) => f.write_text(out, config),
            FieldValue::Bool(b) => b.write_text(out, config),
            FieldValue::Char(c) => c.write_text(out, config),
            FieldValue::NChar(c) => c.write_text(out, config),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<u64> for FieldValue {
    fn from(u: u64) -> Self {
        FieldValue::UInt(u)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<char> for FieldValue {
    fn from(c: char) -> Self {
        FieldValue::Char(c)
    }
}

impl From<NChar> for FieldValue {
    fn from(c: NChar) -> Self {
        FieldValue::NChar(c)
    }
}
