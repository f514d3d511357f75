use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use document::{Document, Identifier, Value};

use crate::compare::compare_values;
use crate::{
    validate_database_name, CollectionRef, DocumentStore, FindQuery, SortOrder, StoreError,
    StoreResult, ID_FIELD,
};

type Collections = BTreeMap<String, Vec<Document>>;

/// A process-local store: databases and collections come into existence on
/// first insert, names are listed in sorted order.
#[derive(Default)]
pub struct InMemoryStore {
    databases: RwLock<BTreeMap<String, Collections>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&BTreeMap<String, Collections>) -> T) -> StoreResult<T> {
        let guard = self
            .databases
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(f(&guard))
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn insert_many(&self, target: &CollectionRef, docs: Vec<Document>) -> StoreResult<usize> {
        target.validate()?;
        if docs.is_empty() {
            return Err(StoreError::InvalidOperation(
                "documents must be a non-empty list".to_string(),
            ));
        }

        let count = docs.len();
        // A single write lock is held for the entire batch.
        let mut guard = self
            .databases
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        let collection = guard
            .entry(target.database.clone())
            .or_default()
            .entry(target.collection.clone())
            .or_default();
        for mut doc in docs {
            if !doc.contains_key(ID_FIELD) {
                doc.insert_first(ID_FIELD, Value::Id(Identifier::new()));
            }
            collection.push(doc);
        }
        tracing::debug!(collection = %target, count, "memory_insert");
        Ok(count)
    }

    async fn find(&self, target: &CollectionRef, query: &FindQuery) -> StoreResult<Vec<Document>> {
        target.validate()?;
        let mut docs: Vec<Document> = self.read(|dbs| {
            dbs.get(&target.database)
                .and_then(|colls| colls.get(&target.collection))
                .map(|docs| {
                    docs.iter()
                        .filter(|doc| query.filter.as_ref().map_or(true, |m| m.matches(doc)))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        })?;

        if let Some(sort) = &query.sort {
            docs.sort_by(|a, b| {
                let ord = compare_values(
                    a.get(&sort.field).unwrap_or(&Value::Null),
                    b.get(&sort.field).unwrap_or(&Value::Null),
                );
                match sort.order {
                    SortOrder::Ascending => ord,
                    SortOrder::Descending => ord.reverse(),
                }
            });
        }

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = match query.limit {
            0 => usize::MAX,
            n => usize::try_from(n).unwrap_or(usize::MAX),
        };
        Ok(docs.into_iter().skip(skip).take(limit).collect())
    }

    async fn find_one(&self, target: &CollectionRef) -> StoreResult<Option<Document>> {
        target.validate()?;
        self.read(|dbs| {
            dbs.get(&target.database)
                .and_then(|colls| colls.get(&target.collection))
                .and_then(|docs| docs.first().cloned())
        })
    }

    async fn list_databases(&self) -> StoreResult<Vec<String>> {
        self.read(|dbs| dbs.keys().cloned().collect())
    }

    async fn list_collections(&self, database: &str) -> StoreResult<Vec<String>> {
        validate_database_name(database)?;
        self.read(|dbs| {
            dbs.get(database)
                .map(|colls| colls.keys().cloned().collect())
                .unwrap_or_default()
        })
    }
}
