//! CSV line codec: escaping, tokenizing and formatting

mod encoder;
pub mod escape;
mod parser;

pub use encoder::CsvEncoder;
pub use escape::EscapePolicy;
pub use parser::{count_delimiters, scan_field, CsvParser, ScannedField};
