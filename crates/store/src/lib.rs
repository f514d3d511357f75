//! Backend-agnostic access to a document database.
//!
//! The server never talks to a driver directly. It holds an
//! `Arc<dyn DocumentStore>` built from a [`StoreConfig`] at startup (or
//! injected by tests) and issues exactly one call per request.
//!
//! Two backends ship with the crate:
//! - [`InMemoryStore`]: a `RwLock`-guarded map, used by tests and local runs.
//! - `MongoStore`: MongoDB through the official async driver (feature
//!   `backend-mongo`, enabled by default).
//!
//! ```
//! use document::doc;
//! use store::{CollectionRef, DocumentStore, FindQuery, InMemoryStore, SortOrder};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = InMemoryStore::new();
//! let target = CollectionRef::new("shop", "items");
//! store.insert_many(&target, vec![doc! { "n" => 2i64 }, doc! { "n" => 1i64 }]).await.unwrap();
//!
//! let query = FindQuery::new().with_sort("n", SortOrder::Ascending);
//! let docs = store.find(&target, &query).await.unwrap();
//! assert_eq!(docs.len(), 2);
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use document::{Document, Value};
use serde::{Deserialize, Serialize};

mod compare;
mod memory;
#[cfg(feature = "backend-mongo")]
mod mongo;

pub use crate::compare::compare_values;
pub use crate::memory::InMemoryStore;
#[cfg(feature = "backend-mongo")]
pub use crate::mongo::MongoStore;

/// Name of the identifier field every stored document carries.
pub const ID_FIELD: &str = "_id";

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by a [`DocumentStore`].
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backend failed (unreachable server, driver error, poisoned lock).
    #[error("Backend error: {0}")]
    Backend(String),
    /// The request can never succeed as issued (empty batch, empty name).
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl StoreError {
    pub fn backend<E: fmt::Display>(err: E) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// A `(database, collection)` pair named by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionRef {
    pub database: String,
    pub collection: String,
}

impl CollectionRef {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }

    /// Reject names no backend accepts.
    pub fn validate(&self) -> StoreResult<()> {
        validate_database_name(&self.database)?;
        if self.collection.is_empty() {
            return Err(StoreError::InvalidOperation(
                "collection name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

pub(crate) fn validate_database_name(name: &str) -> StoreResult<()> {
    if name.is_empty() {
        return Err(StoreError::InvalidOperation(
            "database name must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// `"asc"` sorts ascending; every other value sorts descending.
    pub fn from_param(order: &str) -> Self {
        if order == "asc" {
            SortOrder::Ascending
        } else {
            SortOrder::Descending
        }
    }
}

/// Exact text equality on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMatch {
    pub field: String,
    pub value: String,
}

impl FieldMatch {
    /// A field matches when it holds the text itself or an array containing it.
    pub fn matches(&self, doc: &Document) -> bool {
        match doc.get(&self.field) {
            Some(Value::String(s)) => *s == self.value,
            Some(Value::Array(items)) => items
                .iter()
                .any(|item| matches!(item, Value::String(s) if *s == self.value)),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub order: SortOrder,
}

/// Parameters of a single `find` call.
///
/// `limit == 0` means no limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindQuery {
    pub filter: Option<FieldMatch>,
    pub sort: Option<SortSpec>,
    pub skip: u64,
    pub limit: u64,
}

impl FindQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_match(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter = Some(FieldMatch {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some(SortSpec {
            field: field.into(),
            order,
        });
        self
    }

    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }
}

/// Collection-scoped document operations. Implementations must be safe to
/// share across concurrent requests.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert every document; returns how many were inserted. An empty batch
    /// is an error.
    async fn insert_many(&self, target: &CollectionRef, docs: Vec<Document>) -> StoreResult<usize>;
    /// Documents matching `query`, filtered, sorted, skipped and limited in
    /// that order.
    async fn find(&self, target: &CollectionRef, query: &FindQuery) -> StoreResult<Vec<Document>>;
    /// Any one document from the collection, or `None` when it is empty.
    async fn find_one(&self, target: &CollectionRef) -> StoreResult<Option<Document>>;
    async fn list_databases(&self) -> StoreResult<Vec<String>>;
    async fn list_collections(&self, database: &str) -> StoreResult<Vec<String>>;
}

/// Configuration for selecting and building a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreConfig {
    /// MongoDB reachable at `uri`.
    Mongo {
        #[serde(default = "default_mongo_uri")]
        uri: String,
    },
    /// Process-local store; contents are lost on exit.
    InMemory,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Mongo {
            uri: default_mongo_uri(),
        }
    }
}

fn default_mongo_uri() -> String {
    "mongodb://localhost:27017/".to_string()
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        StoreConfig::InMemory
    }

    pub fn mongo<S: Into<String>>(uri: S) -> Self {
        StoreConfig::Mongo { uri: uri.into() }
    }

    /// Build the configured backend. A backend compiled out of this build
    /// yields [`StoreError::Backend`].
    pub async fn build(&self) -> StoreResult<Arc<dyn DocumentStore>> {
        match self {
            StoreConfig::InMemory => Ok(Arc::new(InMemoryStore::new())),
            StoreConfig::Mongo { uri } => {
                #[cfg(feature = "backend-mongo")]
                {
                    Ok(Arc::new(MongoStore::connect(uri).await?))
                }
                #[cfg(not(feature = "backend-mongo"))]
                {
                    let _ = uri;
                    Err(StoreError::backend("mongo backend disabled at compile time"))
                }
            }
        }
    }
}
