//! Workspace umbrella crate for docbridge.
//!
//! This crate stitches together CSV ingest and the document store so callers
//! can go from uploaded bytes to stored documents with a single call, and
//! re-exports the model, ingest and store APIs under one name.

pub use document::{doc, sanitize, sanitize_all, sanitize_document, Document, Identifier, Value};
pub use ingest::{parse_csv, ColumnKind, CsvConfig, IngestError};
pub use store::{
    CollectionRef, DocumentStore, FieldMatch, FindQuery, InMemoryStore, SortOrder, SortSpec,
    StoreConfig, StoreError, StoreResult, ID_FIELD,
};

use std::error::Error;
use std::fmt;
use std::time::Instant;

/// Errors that can occur while importing an uploaded CSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    Ingest(IngestError),
    Store(StoreError),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Ingest(err) => write!(f, "{err}"),
            ImportError::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ImportError::Ingest(err) => Some(err),
            ImportError::Store(err) => Some(err),
        }
    }
}

impl From<IngestError> for ImportError {
    fn from(value: IngestError) -> Self {
        ImportError::Ingest(value)
    }
}

impl From<StoreError> for ImportError {
    fn from(value: StoreError) -> Self {
        ImportError::Store(value)
    }
}

/// Parse `bytes` as CSV and insert one document per row into `target`.
///
/// Nothing is inserted when parsing fails. Returns the number of inserted
/// documents.
pub async fn import_csv(
    store: &dyn DocumentStore,
    target: &CollectionRef,
    bytes: &[u8],
    cfg: &CsvConfig,
) -> Result<usize, ImportError> {
    let start = Instant::now();
    let docs = parse_csv(bytes, cfg)?;
    let rows = docs.len();
    let inserted = store.insert_many(target, docs).await?;
    tracing::info!(
        collection = %target,
        rows,
        inserted,
        elapsed_micros = start.elapsed().as_micros(),
        "csv_import_success"
    );
    Ok(inserted)
}
