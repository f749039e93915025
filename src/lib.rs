//! # csvstream
//!
//! Streaming CSV reading and writing with typed field extraction.
//!
//! A [`CsvReader`] pulls one line at a time from a [`LineSource`] and hands
//! out its fields one by one, converted to the type the caller asks for. A
//! [`CsvWriter`] does the reverse: typed values are appended to a line
//! buffer and the finished line goes to a [`LineSink`].
//!
//! Delimiters, newlines and quotes inside values are replaced by marker
//! texts on write and restored on read, so any value survives a round trip
//! as long as reader and writer share the same [`Config`].
//!
//! ## Quick start
//!
//! ```
//! use csvstream::{CsvReader, CsvWriter};
//!
//! let mut writer = CsvWriter::in_memory();
//! writer.append("Shampoo")?.append(&200)?.append(&15.5)?.end_line()?;
//!
//! let mut reader = CsvReader::from_text(writer.text());
//! while reader.read_line()? {
//!     let name: String = reader.extract()?;
//!     let qty: i32 = reader.extract()?;
//!     let price: f64 = reader.extract()?;
//!     assert_eq!((name.as_str(), qty, price), ("Shampoo", 200, 15.5));
//! }
//! # Ok::<(), csvstream::CsvError>(())
//! ```
//!
//! ## Features
//!
//! - `serde`: `Serialize`/`Deserialize` for [`Config`]
//! - `fast-parse`: [`FastConverter`], SIMD integer and fast float parsing

pub mod config;
pub mod convert;
pub mod csv;
pub mod csv_reader;
pub mod csv_writer;
pub mod error;
pub mod sink;
pub mod source;
pub mod types;

pub use config::Config;
#[cfg(feature = "fast-parse")]
pub use convert::FastConverter;
pub use convert::{Converter, StdConverter};
pub use csv::{CsvEncoder, CsvParser};
pub use csv_reader::{CsvReader, Records};
pub use csv_writer::CsvWriter;
pub use error::{CsvError, Result};
pub use sink::{CachedFileSink, FileSink, LineSink, StringSink};
pub use source::{CachedFileSource, FileSource, LineSource, StrSource};
pub use types::{FieldKind, FieldValue, FromField, NChar, Sep, SepScope, ToField};
