//! Document model for docbridge.
//!
//! Stored documents are schema-less, so every field is a [`Value`]: a tagged
//! union over text, numbers, booleans, null, arrays, nested documents and
//! store-generated [`Identifier`]s. [`sanitize`] rewrites a value so it only
//! contains JSON-native types before it leaves the process.
//!
//! ```
//! use document::{doc, sanitize_document, Value};
//!
//! let raw = doc! { "name" => "widget", "price" => f64::NAN };
//! let clean = sanitize_document(&raw);
//! assert_eq!(clean.get("price"), Some(&Value::Null));
//! ```

mod sanitize;
mod value;

pub use crate::sanitize::{sanitize, sanitize_all, sanitize_document};
pub use crate::value::{Document, Identifier, Value};
