//! MongoDB backend.
//!
//! The driver's `Client` owns a connection pool and is cheap to clone, so a
//! single `MongoStore` serves every in-flight request.

use async_trait::async_trait;
use document::{Document, Value};
use futures::TryStreamExt;
use mongodb::bson::{self, Bson};
use mongodb::options::FindOptions;
use mongodb::Client;

use crate::{
    validate_database_name, CollectionRef, DocumentStore, FindQuery, SortOrder, StoreError,
    StoreResult,
};

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

#[derive(Clone)]
pub struct MongoStore {
    client: Client,
}

impl MongoStore {
    /// Parse `uri` and set up the connection pool. Connections are opened
    /// lazily, so an unreachable server surfaces on the first request.
    pub async fn connect(uri: &str) -> StoreResult<Self> {
        let client = Client::with_uri_str(uri).await?;
        tracing::info!(uri = %redact(uri), "mongo_client_ready");
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    fn collection(&self, target: &CollectionRef) -> mongodb::Collection<bson::Document> {
        self.client
            .database(&target.database)
            .collection::<bson::Document>(&target.collection)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert_many(&self, target: &CollectionRef, docs: Vec<Document>) -> StoreResult<usize> {
        target.validate()?;
        if docs.is_empty() {
            return Err(StoreError::InvalidOperation(
                "documents must be a non-empty list".to_string(),
            ));
        }
        let docs: Vec<bson::Document> = docs.into_iter().map(to_bson_document).collect();
        let result = self.collection(target).insert_many(docs, None).await?;
        Ok(result.inserted_ids.len())
    }

    async fn find(&self, target: &CollectionRef, query: &FindQuery) -> StoreResult<Vec<Document>> {
        target.validate()?;

        let filter = query.filter.as_ref().map(|m| {
            let mut filter = bson::Document::new();
            filter.insert(m.field.clone(), m.value.clone());
            filter
        });

        let mut options = FindOptions::default();
        if let Some(sort) = &query.sort {
            let direction = match sort.order {
                SortOrder::Ascending => 1,
                SortOrder::Descending => -1,
            };
            let mut sort_doc = bson::Document::new();
            sort_doc.insert(sort.field.clone(), direction);
            options.sort = Some(sort_doc);
        }
        if query.skip > 0 {
            options.skip = Some(query.skip);
        }
        if query.limit > 0 {
            options.limit = Some(i64::try_from(query.limit).unwrap_or(i64::MAX));
        }

        let cursor = self.collection(target).find(filter, options).await?;
        let docs: Vec<bson::Document> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(from_bson_document).collect())
    }

    async fn find_one(&self, target: &CollectionRef) -> StoreResult<Option<Document>> {
        target.validate()?;
        let doc = self.collection(target).find_one(None, None).await?;
        Ok(doc.map(from_bson_document))
    }

    async fn list_databases(&self) -> StoreResult<Vec<String>> {
        Ok(self.client.list_database_names(None, None).await?)
    }

    async fn list_collections(&self, database: &str) -> StoreResult<Vec<String>> {
        validate_database_name(database)?;
        Ok(self
            .client
            .database(database)
            .list_collection_names(None)
            .await?)
    }
}

/// Strip credentials from a connection string before logging it.
fn redact(uri: &str) -> String {
    match (uri.find("://"), uri.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &uri[..scheme_end], &uri[at..])
        }
        _ => uri.to_string(),
    }
}

pub(crate) fn to_bson(value: Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(b),
        Value::Int(i) => Bson::Int64(i),
        Value::Float(f) => Bson::Double(f),
        Value::String(s) => Bson::String(s),
        Value::Array(items) => Bson::Array(items.into_iter().map(to_bson).collect()),
        Value::Object(doc) => Bson::Document(to_bson_document(doc)),
        Value::Id(id) => Bson::ObjectId(id),
    }
}

pub(crate) fn to_bson_document(doc: Document) -> bson::Document {
    doc.into_iter().map(|(k, v)| (k, to_bson(v))).collect()
}

pub(crate) fn from_bson(value: Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(i) => Value::Int(i64::from(i)),
        Bson::Int64(i) => Value::Int(i),
        Bson::Double(f) => Value::Float(f),
        Bson::String(s) => Value::String(s),
        Bson::Array(items) => Value::Array(items.into_iter().map(from_bson).collect()),
        Bson::Document(doc) => Value::Object(from_bson_document(doc)),
        Bson::ObjectId(id) => Value::Id(id),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => Value::String(s),
            Err(_) => Value::from(Bson::DateTime(dt).into_relaxed_extjson()),
        },
        other => Value::from(other.into_relaxed_extjson()),
    }
}

pub(crate) fn from_bson_document(doc: bson::Document) -> Document {
    let mut out = Document::with_capacity(doc.len());
    for (k, v) in doc {
        out.push(k, from_bson(v));
    }
    out
}
