//! API route handlers
//!
//! Routes are organized by functionality:
//!
//! - `health`: Liveness probe
//! - `upload`: CSV upload into a collection
//! - `documents`: Per-collection reads (list, fields, search, filter, sort)
//! - `catalog`: Database and collection listings
//!
//! Every handler issues one store call, sanitizes what comes back and turns
//! failures into a JSON `{"detail": ...}` body at its own boundary.

pub mod catalog;
pub mod documents;
pub mod health;
pub mod upload;

use crate::error::ServerError;

/// 404 Not Found handler
///
/// Returns a standardized error response for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound("Not found".to_string())
}
