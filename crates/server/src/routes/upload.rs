use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use docbridge::CollectionRef;
use serde::Serialize;
use std::sync::Arc;

/// Success body for `/upload-csv`
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
}

/// Accept a multipart CSV upload and insert one document per row.
///
/// Form fields: `file` (the CSV bytes), `database` and `collection_name`.
pub async fn upload_csv(
    State(state): State<Arc<ServerState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ServerResult<Json<UploadResponse>> {
    let mut multipart = multipart?;

    let mut file: Option<(Option<String>, Vec<u8>)> = None;
    let mut database: Option<String> = None;
    let mut collection_name: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await?;
                file = Some((file_name, bytes.to_vec()));
            }
            "database" => database = Some(field.text().await?),
            "collection_name" => collection_name = Some(field.text().await?),
            _ => {
                tracing::debug!(field = %name, "Ignoring unknown form field");
            }
        }
    }

    let Some((file_name, bytes)) = file else {
        return Err(ServerError::BadRequest("No file provided".to_string()));
    };

    let (database, collection_name) = match (database, collection_name) {
        (Some(db), Some(coll)) if !db.is_empty() && !coll.is_empty() => (db, coll),
        _ => {
            return Err(ServerError::BadRequest(
                "Database or collection name not provided".to_string(),
            ))
        }
    };

    let target = CollectionRef::new(database, collection_name);
    let inserted = docbridge::import_csv(state.store.as_ref(), &target, &bytes, &state.config.csv)
        .await
        .map_err(|e| {
            tracing::error!(
                collection = %target,
                file_name = file_name.as_deref().unwrap_or(""),
                bytes = bytes.len(),
                error = %e,
                "Error uploading CSV"
            );
            ServerError::from(e)
        })?;

    tracing::info!(
        collection = %target,
        file_name = file_name.as_deref().unwrap_or(""),
        inserted,
        "CSV uploaded"
    );

    Ok(Json(UploadResponse {
        message: "File uploaded successfully".to_string(),
    }))
}
