use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use docbridge::{sanitize_all, CollectionRef, FindQuery, SortOrder, Value};
use serde::Deserialize;
use std::sync::Arc;

/// Query parameters naming a collection
#[derive(Debug, Deserialize)]
pub struct CollectionQuery {
    pub database: String,
    pub collection_name: String,
}

impl CollectionQuery {
    pub fn target(&self) -> CollectionRef {
        CollectionRef::new(&self.database, &self.collection_name)
    }
}

/// Query parameters for `/search` and `/filter`
#[derive(Debug, Deserialize)]
pub struct MatchQuery {
    pub database: String,
    pub collection_name: String,
    pub field: String,
    pub value: String,
}

/// Query parameters for `/sort`
#[derive(Debug, Deserialize)]
pub struct SortQuery {
    pub database: String,
    pub collection_name: String,
    pub field: String,
    /// `asc`, anything else sorts descending
    pub order: String,
    pub skip: u64,
    /// `0` returns every remaining document
    pub limit: u64,
}

/// List every document in a collection
pub async fn list_documents(
    State(state): State<Arc<ServerState>>,
    query: Result<Query<CollectionQuery>, QueryRejection>,
) -> ServerResult<Json<Value>> {
    let Query(query) = query?;
    let target = query.target();

    let docs = state
        .store
        .find(&target, &FindQuery::new())
        .await
        .map_err(|e| {
            tracing::error!(collection = %target, error = %e, "Error fetching data");
            ServerError::from(e)
        })?;

    tracing::info!(collection = %target, count = docs.len(), "Fetched documents");
    Ok(Json(sanitize_all(&docs)))
}

/// Field names of one sampled document
pub async fn list_fields(
    State(state): State<Arc<ServerState>>,
    query: Result<Query<CollectionQuery>, QueryRejection>,
) -> ServerResult<Json<Vec<String>>> {
    let Query(query) = query?;
    let target = query.target();

    let sample = state.store.find_one(&target).await.map_err(|e| {
        tracing::error!(collection = %target, error = %e, "Error fetching fields");
        ServerError::from(e)
    })?;

    let Some(sample) = sample else {
        tracing::info!(collection = %target, "No documents to sample fields from");
        return Err(ServerError::NotFound(
            "No documents found in the collection".to_string(),
        ));
    };

    let fields: Vec<String> = sample.keys().map(str::to_string).collect();
    tracing::info!(collection = %target, fields = ?fields, "Fetched fields");
    Ok(Json(fields))
}

/// Exact text match on one field
pub async fn search(
    State(state): State<Arc<ServerState>>,
    query: Result<Query<MatchQuery>, QueryRejection>,
) -> ServerResult<Json<Value>> {
    let Query(query) = query?;
    find_matching(&state, query, "search").await
}

/// Same contract as [`search`], kept as its own route for existing clients
pub async fn filter(
    State(state): State<Arc<ServerState>>,
    query: Result<Query<MatchQuery>, QueryRejection>,
) -> ServerResult<Json<Value>> {
    let Query(query) = query?;
    find_matching(&state, query, "filter").await
}

async fn find_matching(
    state: &ServerState,
    query: MatchQuery,
    operation: &'static str,
) -> ServerResult<Json<Value>> {
    let target = CollectionRef::new(query.database, query.collection_name);
    let find = FindQuery::new().with_match(&query.field, &query.value);

    let docs = state.store.find(&target, &find).await.map_err(|e| {
        tracing::error!(
            operation,
            collection = %target,
            field = %query.field,
            value = %query.value,
            error = %e,
            "Error matching documents"
        );
        ServerError::from(e)
    })?;

    tracing::info!(
        operation,
        collection = %target,
        field = %query.field,
        value = %query.value,
        count = docs.len(),
        "Matched documents"
    );
    Ok(Json(sanitize_all(&docs)))
}

/// Sorted page of a collection.
///
/// Store failures are logged in full but reported to the caller with a
/// generic message only.
pub async fn sort(
    State(state): State<Arc<ServerState>>,
    query: Result<Query<SortQuery>, QueryRejection>,
) -> ServerResult<Json<Value>> {
    let Query(query) = query?;
    let target = CollectionRef::new(&query.database, &query.collection_name);
    let order = SortOrder::from_param(&query.order);
    let find = FindQuery::new()
        .with_sort(&query.field, order)
        .with_skip(query.skip)
        .with_limit(query.limit);

    let docs = state.store.find(&target, &find).await.map_err(|e| {
        tracing::error!(
            collection = %target,
            field = %query.field,
            error = %e,
            "Error sorting data"
        );
        ServerError::generic()
    })?;

    tracing::info!(
        collection = %target,
        field = %query.field,
        order = ?order,
        skip = query.skip,
        limit = query.limit,
        count = docs.len(),
        "Sorted documents"
    );
    Ok(Json(sanitize_all(&docs)))
}
