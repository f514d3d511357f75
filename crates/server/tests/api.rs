//! Integration tests for the HTTP API
//!
//! Requests go through the full router (middleware included) against an
//! in-memory store, so no MongoDB instance is needed.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use docbridge::{
    CollectionRef, Document, DocumentStore, FindQuery, InMemoryStore, StoreError, StoreResult,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use server::{build_router, ServerConfig, ServerState};
use tower::ServiceExt;

const BOUNDARY: &str = "docbridge-test-boundary";

const PEOPLE_CSV: &str = "name,age,city\nAlice,30,Paris\nBob,,Lyon\nCarol,25,Paris\n";

fn create_test_app() -> (Router, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let state = ServerState::new(ServerConfig::default(), store.clone());
    (build_router(Arc::new(state)), store)
}

/// Store whose every operation fails with a backend error.
struct FailingStore;

#[async_trait]
impl DocumentStore for FailingStore {
    async fn insert_many(&self, _: &CollectionRef, _: Vec<Document>) -> StoreResult<usize> {
        Err(StoreError::Backend("boom".into()))
    }

    async fn find(&self, _: &CollectionRef, _: &FindQuery) -> StoreResult<Vec<Document>> {
        Err(StoreError::Backend("boom".into()))
    }

    async fn find_one(&self, _: &CollectionRef) -> StoreResult<Option<Document>> {
        Err(StoreError::Backend("boom".into()))
    }

    async fn list_databases(&self) -> StoreResult<Vec<String>> {
        Err(StoreError::Backend("boom".into()))
    }

    async fn list_collections(&self, _: &str) -> StoreResult<Vec<String>> {
        Err(StoreError::Backend("boom".into()))
    }
}

fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, file_name, content) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match file_name {
            Some(file_name) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: text/csv\r\n\r\n"
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
            }
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload-csv")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

fn csv_upload(csv: &str, database: &str, collection: &str) -> Request<Body> {
    upload_request(&[
        ("file", Some("data.csv"), csv.as_bytes()),
        ("database", None, database.as_bytes()),
        ("collection_name", None, collection.as_bytes()),
    ])
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn seeded_app() -> (Router, Arc<InMemoryStore>) {
    let (app, store) = create_test_app();
    let (status, body) = send(&app, csv_upload(PEOPLE_CSV, "shop", "people")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "File uploaded successfully"}));
    (app, store)
}

fn names(body: &Value) -> Vec<&str> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|doc| doc["name"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_upload_then_list_documents() {
    let (app, _) = seeded_app().await;

    let (status, body) = send(&app, get("/data?database=shop&collection_name=people")).await;
    assert_eq!(status, StatusCode::OK);

    let docs = body.as_array().unwrap();
    assert_eq!(docs.len(), 3);
    assert_eq!(names(&body), vec!["Alice", "Bob", "Carol"]);

    // ids are rendered as 24-char hex strings
    for doc in docs {
        let id = doc["_id"].as_str().unwrap();
        assert_eq!(id.len(), 24);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    // a missing cell in a numeric column is NaN in the store and null on the wire
    assert_eq!(docs[0]["age"], json!(30.0));
    assert_eq!(docs[1]["age"], Value::Null);
    assert_eq!(docs[2]["city"], json!("Paris"));
}

#[tokio::test]
async fn test_integer_columns_stay_integers() {
    let (app, _) = create_test_app();
    let (status, _) = send(&app, csv_upload("a,b\n1,2\n3,4\n", "nums", "pairs")).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, get("/data?database=nums&collection_name=pairs")).await;
    let docs = body.as_array().unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0]["a"], json!(1));
    assert_eq!(docs[0]["b"], json!(2));
    assert_eq!(docs[1]["a"], json!(3));
    assert!(docs[1]["b"].is_i64());
}

#[tokio::test]
async fn test_list_fields() {
    let (app, _) = seeded_app().await;

    let (status, body) = send(&app, get("/fields?database=shop&collection_name=people")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["_id", "name", "age", "city"]));
}

#[tokio::test]
async fn test_fields_of_empty_collection_is_not_found() {
    let (app, _) = create_test_app();

    let (status, body) = send(&app, get("/fields?database=shop&collection_name=nothing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "No documents found in the collection"}));
}

#[tokio::test]
async fn test_search_and_filter_agree() {
    let (app, _) = seeded_app().await;

    let query = "database=shop&collection_name=people&field=city&value=Paris";
    let (status, searched) = send(&app, get(&format!("/search?{query}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&searched), vec!["Alice", "Carol"]);

    let (status, filtered) = send(&app, get(&format!("/filter?{query}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(searched, filtered);
}

#[tokio::test]
async fn test_search_is_exact_text_match() {
    let (app, _) = seeded_app().await;

    // "30" is stored as a number, so a text match never hits it
    let (_, body) = send(
        &app,
        get("/search?database=shop&collection_name=people&field=age&value=30"),
    )
    .await;
    assert_eq!(body, json!([]));

    let (_, body) = send(
        &app,
        get("/search?database=shop&collection_name=people&field=city&value=paris"),
    )
    .await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_sort_orders_and_pages() {
    let (app, _) = seeded_app().await;
    let base = "/sort?database=shop&collection_name=people&field=age";

    let (status, body) = send(&app, get(&format!("{base}&order=asc&skip=0&limit=0"))).await;
    assert_eq!(status, StatusCode::OK);
    // NaN sorts below every number
    assert_eq!(names(&body), vec!["Bob", "Carol", "Alice"]);

    let (_, body) = send(&app, get(&format!("{base}&order=desc&skip=0&limit=0"))).await;
    assert_eq!(names(&body), vec!["Alice", "Carol", "Bob"]);

    let (_, body) = send(&app, get(&format!("{base}&order=asc&skip=1&limit=1"))).await;
    assert_eq!(names(&body), vec!["Carol"]);

    // anything other than "asc" sorts descending
    let (_, body) = send(&app, get(&format!("{base}&order=upward&skip=0&limit=2"))).await;
    assert_eq!(names(&body), vec!["Alice", "Carol"]);

    let (_, body) = send(&app, get(&format!("{base}&order=asc&skip=10&limit=0"))).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_sort_rejects_non_numeric_paging() {
    let (app, _) = seeded_app().await;

    let (status, body) = send(
        &app,
        get("/sort?database=shop&collection_name=people&field=age&order=asc&skip=x&limit=0"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_catalog_listings() {
    let (app, _) = seeded_app().await;
    let (status, _) = send(&app, csv_upload("sku\nA1\n", "shop", "items")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get("/databases")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["shop"]));

    let (status, body) = send(&app, get("/collections?database=shop")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["items", "people"]));

    let (_, body) = send(&app, get("/collections?database=elsewhere")).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_upload_over_body_limit_is_payload_too_large() {
    let store = Arc::new(InMemoryStore::new());
    let config = ServerConfig {
        max_body_size_mb: 1,
        ..ServerConfig::default()
    };
    let app = build_router(Arc::new(ServerState::new(config, store.clone())));

    let mut csv = String::from("n\n");
    while csv.len() < 2 * 1024 * 1024 {
        csv.push_str("123456789\n");
    }
    let (status, body) = send(&app, csv_upload(&csv, "shop", "big")).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["detail"].is_string());
    assert!(store.list_databases().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_without_file_is_bad_request() {
    let (app, store) = create_test_app();

    let request = upload_request(&[
        ("database", None, "shop".as_bytes()),
        ("collection_name", None, "people".as_bytes()),
    ]);
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"detail": "No file provided"}));
    assert!(store.list_databases().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_without_target_is_bad_request() {
    let (app, store) = create_test_app();

    let request = upload_request(&[
        ("file", Some("data.csv"), PEOPLE_CSV.as_bytes()),
        ("collection_name", None, "people".as_bytes()),
    ]);
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"detail": "Database or collection name not provided"})
    );

    let (status, _) = send(&app, csv_upload(PEOPLE_CSV, "shop", "")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(store.list_databases().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_csv_inserts_nothing() {
    let (app, store) = create_test_app();

    let (status, body) = send(&app, csv_upload("a,b\n1,2\n3,4,5\n", "shop", "broken")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("error tokenizing data"));

    let target = CollectionRef::new("shop", "broken");
    assert!(store.find_one(&target).await.unwrap().is_none());
}

#[tokio::test]
async fn test_header_only_csv_is_server_error() {
    let (app, _) = create_test_app();

    let (status, body) = send(&app, csv_upload("a,b\n", "shop", "empty")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().starts_with("Invalid operation"));
}

#[tokio::test]
async fn test_missing_query_parameter_is_bad_request() {
    let (app, _) = create_test_app();

    let (status, body) = send(&app, get("/data?database=shop")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("collection_name"));
}

#[tokio::test]
async fn test_store_failure_detail_except_for_sort() {
    let state = ServerState::new(ServerConfig::default(), Arc::new(FailingStore));
    let app = build_router(Arc::new(state));

    let (status, body) = send(&app, get("/data?database=shop&collection_name=people")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"detail": "Backend error: boom"}));

    let (status, body) = send(
        &app,
        get("/sort?database=shop&collection_name=people&field=age&order=asc&skip=0&limit=0"),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"detail": "Internal Server Error"}));

    let (status, body) = send(&app, get("/databases")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"detail": "Backend error: boom"}));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (app, _) = create_test_app();

    let (status, body) = send(&app, get("/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "Not found"}));
}

#[tokio::test]
async fn test_health_and_request_id() {
    let (app, _) = create_test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "req-42");

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "docbridge-server");
}
