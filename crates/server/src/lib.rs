//! docbridge server - HTTP API over CSV ingest and a document store
//!
//! Uploads CSV files into named collections and serves the stored documents
//! back as JSON: full listings, field discovery, exact-match lookups and
//! sorted pages. Non-finite floats come back as `null` and identifiers as
//! hex strings, so every response is valid JSON.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `POST /upload-csv` - Multipart upload (`file`, `database`, `collection_name`)
//! - `GET /data` - Every document in a collection
//! - `GET /fields` - Field names of one sampled document
//! - `GET /search` - Exact text match on a field
//! - `GET /filter` - Same as `/search`
//! - `GET /sort` - Sorted page (`field`, `order`, `skip`, `limit`)
//! - `GET /databases` - Database names
//! - `GET /collections` - Collection names in a database
//! - `GET /health` - Liveness probe
//!
//! Errors are returned as `{"detail": "..."}` with status 400, 404 or 500.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
