//! Document structure for schema-less collections.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::value::stringify_value;
use crate::error::{HoplonError, Result};
use crate::query::StoredFields;

/// A document is a single JSON object stored in an index.
///
/// Fields are added dynamically; which of them are searchable or returned in
/// hits is decided by the index's [`IndexConfig`](crate::schema::IndexConfig).
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct Document {
    fields: Map<String, Value>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Document { fields: Map::new() }
    }

    /// Create a document from an existing JSON object.
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Document { fields }
    }

    /// Create a document from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Document { fields }),
            other => Err(HoplonError::validation(format!(
                "Document must be a JSON object, got: {other}"
            ))),
        }
    }

    /// Set a field value, replacing any previous value.
    pub fn add_field<S: Into<String>>(&mut self, name: S, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// Get a field value.
    pub fn get_field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Check if the document has a field.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Remove a field from the document.
    pub fn remove_field(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Get all field values.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Consume the document and return its fields.
    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    /// Get the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The identifier stored at `id_field`, stringified.
    ///
    /// Returns `None` when the field is missing or null.
    pub fn id(&self, id_field: &str) -> Option<String> {
        match self.fields.get(id_field) {
            None | Some(Value::Null) => None,
            Some(value) => Some(stringify_value(value)),
        }
    }

    /// Coerce the identifier at `id_field` to a string value.
    ///
    /// Fails with a validation error when the identifier is missing or null.
    pub fn with_string_id(mut self, id_field: &str) -> Result<Self> {
        let id = self.id(id_field).ok_or_else(|| {
            HoplonError::validation(format!("Document missing required ID field: {id_field}"))
        })?;
        self.fields.insert(id_field.to_string(), Value::String(id));
        Ok(self)
    }

    /// Create a builder for constructing documents.
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::new()
    }
}

impl From<Map<String, Value>> for Document {
    fn from(fields: Map<String, Value>) -> Self {
        Document::from_map(fields)
    }
}

impl StoredFields for Document {
    fn stored_fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// A builder for constructing documents in a fluent manner.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    document: Document,
}

impl DocumentBuilder {
    /// Create a new document builder.
    pub fn new() -> Self {
        DocumentBuilder {
            document: Document::new(),
        }
    }

    /// Add a field to the document.
    pub fn add_field<S: Into<String>>(mut self, name: S, value: Value) -> Self {
        self.document.add_field(name, value);
        self
    }

    /// Add a text field to the document.
    pub fn add_text<S: Into<String>, T: Into<String>>(self, name: S, value: T) -> Self {
        self.add_field(name, Value::String(value.into()))
    }

    /// Build the final document.
    pub fn build(self) -> Document {
        self.document
    }
}
