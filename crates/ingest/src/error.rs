//! Error types produced by the ingest crate.
//!
//! Every variant describes why an uploaded file could not be turned into
//! documents. The server reports all of them as a failed upload and echoes the
//! message back to the caller, so messages name the offending line where one
//! exists.
//!
//! ```rust
//! use ingest::IngestError;
//!
//! let err = IngestError::Malformed { line: 3, expected: 2, found: 3 };
//! assert_eq!(
//!     err.to_string(),
//!     "error tokenizing data: expected 2 fields in line 3, saw 3"
//! );
//! ```
use thiserror::Error;

/// Errors that can occur while parsing an uploaded CSV file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IngestError {
    /// The file is empty or has no header row.
    #[error("no columns to parse from file")]
    NoColumns,

    /// The file is not valid UTF-8.
    #[error("invalid utf-8 in upload: {0}")]
    InvalidUtf8(String),

    /// A data row carries more fields than the header declares.
    ///
    /// `line` is 1-based and counts the header line.
    #[error("error tokenizing data: expected {expected} fields in line {line}, saw {found}")]
    Malformed {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// The underlying reader rejected the input (e.g. an unterminated quote).
    #[error("csv read error: {0}")]
    Read(String),

    /// The file has more data rows than [`CsvConfig::max_rows`](crate::CsvConfig::max_rows) allows.
    #[error("upload exceeds row limit of {0}")]
    TooManyRows(usize),
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        match err.kind() {
            csv::ErrorKind::Utf8 { .. } => IngestError::InvalidUtf8(err.to_string()),
            _ => IngestError::Read(err.to_string()),
        }
    }
}
