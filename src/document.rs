//! Document model for schema-less collections.
//!
//! A [`Document`] is a JSON object mapping field names to scalar or nested
//! values. The only structural requirement is a value at the index's
//! configured identifier field, which is coerced to a string on ingestion
//! (see [`Document::with_string_id`]).
//!
//! The [`value`] module holds the value helpers shared by the filter, facet
//! and sort stages: stringification, numeric coercion and strict equality.
//!
//! # Examples
//!
//! ```
//! use hoplon::document::Document;
//! use serde_json::json;
//!
//! let doc = Document::builder()
//!     .add_field("id", json!(7))
//!     .add_field("title", json!("Dune"))
//!     .build();
//!
//! let doc = doc.with_string_id("id").unwrap();
//! assert_eq!(doc.id("id"), Some("7".to_string()));
//! ```

#[allow(clippy::module_inception)]
pub mod document;
pub mod value;

pub use self::document::{Document, DocumentBuilder};
