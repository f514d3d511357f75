//! Configuration for CSV parsing.
//!
//! [`CsvConfig`] is cheap to clone and deserializes from the server's
//! configuration sources, so an operator can change the delimiter or cap
//! upload sizes without a rebuild.
//!
//! ```rust
//! use ingest::CsvConfig;
//!
//! let config = CsvConfig::default().with_delimiter(b';').with_max_rows(10_000);
//! config.validate().expect("valid config");
//! ```
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cell contents treated as a missing value regardless of column type.
pub const DEFAULT_MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A", "<NA>",
];

/// Runtime configuration for turning CSV bytes into documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    /// Field delimiter byte.
    ///
    /// Default: `b','`
    pub delimiter: u8,

    /// Maximum number of data rows accepted per upload. `None` disables the
    /// limit.
    ///
    /// Default: `None`
    pub max_rows: Option<usize>,

    /// Cell values that mean "missing". Compared after trimming surrounding
    /// whitespace.
    ///
    /// Default: [`DEFAULT_MISSING_MARKERS`]
    pub missing_markers: Vec<String>,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            max_rows: None,
            missing_markers: DEFAULT_MISSING_MARKERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl CsvConfig {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    /// Check the configuration can drive a reader.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.delimiter.is_ascii() || matches!(self.delimiter, b'"' | b'\n' | b'\r') {
            return Err(ConfigError::InvalidDelimiter(self.delimiter));
        }
        if self.max_rows == Some(0) {
            return Err(ConfigError::ZeroRowLimit);
        }
        Ok(())
    }

    pub(crate) fn is_missing(&self, cell: &str) -> bool {
        let cell = cell.trim();
        self.missing_markers.iter().any(|m| m == cell)
    }
}

/// Errors produced by [`CsvConfig::validate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("delimiter byte {0:#04x} cannot separate csv fields")]
    InvalidDelimiter(u8),
    #[error("max_rows must be greater than zero when set")]
    ZeroRowLimit,
}
