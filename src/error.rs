//! Error types for CSV streams

use crate::types::FieldKind;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, CsvError>;

/// Errors produced by CSV readers, writers and their collaborators
#[derive(Error, Debug)]
pub enum CsvError {
    /// A field token is not a valid lexical form of the requested type
    #[error(
        "conversion error at line no.:{line}, source:{source_name}, token position:{position}, token:{token:?}, kind:{kind}"
    )]
    Conversion {
        /// The offending token, already unescaped
        token: String,
        /// Type that was requested
        kind: FieldKind,
        /// 1-based line number
        line: usize,
        /// 1-based position of the token within the line
        position: usize,
        /// File name, or empty for in-memory input
        source_name: String,
    },

    /// A field was requested but the current line has no more data
    #[error("no more data on line {line} (token position {position})")]
    ExhaustedLine {
        /// 1-based line number (0 when no line was read yet)
        line: usize,
        /// 1-based position of the requested token
        position: usize,
    },

    /// The underlying file could not be opened or created
    #[error("failed to open {path}: {message}")]
    OpenFailure {
        /// Path that was requested
        path: String,
        /// OS error text
        message: String,
    },

    #[error("Read error: {0}")]
    ReadError(String),

    #[error("Write error: {0}")]
    WriteError(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CsvError {
    /// True for the "no more data on this line" condition
    ///
    /// Callers use this to detect rows with fewer fields than expected.
    pub fn is_exhausted_line(&self) -> bool {
        matches!(self, CsvError::ExhaustedLine { .. })
    }

    /// True when a token failed to convert to the requested type
    pub fn is_conversion(&self) -> bool {
        matches!(self, CsvError::Conversion { .. })
    }
}

impl From<std::io::Error> for CsvError {
    fn from(e: std::io::Error) -> Self {
        CsvError::ReadError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_message_carries_token_and_kind() {
        let err = CsvError::Conversion {
            token: "abc".to_string(),
            kind: FieldKind::Integer,
            line: 3,
            position: 2,
            source_name: "products.csv".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line no.:3"));
        assert!(msg.contains("\"abc\""));
        assert!(msg.contains("integer"));
        assert!(msg.contains("products.csv"));
        assert!(err.is_conversion());
        assert!(!err.is_exhausted_line());
    }

    #[test]
    fn test_exhausted_line_predicate() {
        let err = CsvError::ExhaustedLine {
            line: 1,
            position: 4,
        };
        assert!(err.is_exhausted_line());
        assert_eq!(err.to_string(), "no more data on line 1 (token position 4)");
    }
}
