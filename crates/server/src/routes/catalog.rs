use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

/// Query parameters for `/collections`
#[derive(Debug, Deserialize)]
pub struct DatabaseQuery {
    pub database: String,
}

/// Every database the store knows about
pub async fn list_databases(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<Json<Vec<String>>> {
    let names = state.store.list_databases().await.map_err(|e| {
        tracing::error!(error = %e, "Error fetching databases");
        ServerError::from(e)
    })?;
    Ok(Json(names))
}

/// Every collection in one database
pub async fn list_collections(
    State(state): State<Arc<ServerState>>,
    query: Result<Query<DatabaseQuery>, QueryRejection>,
) -> ServerResult<Json<Vec<String>>> {
    let Query(query) = query?;
    let names = state
        .store
        .list_collections(&query.database)
        .await
        .map_err(|e| {
            tracing::error!(database = %query.database, error = %e, "Error fetching collections");
            ServerError::from(e)
        })?;
    Ok(Json(names))
}
