//! Repository trait.

use async_trait::async_trait;

use crate::document::Document;
use crate::error::{HoplonError, Result};
use crate::schema::IndexConfig;

/// Durable storage for index configurations and their documents.
///
/// Documents are keyed by the string form of the value at the index's
/// `idField` (`"id"` when no configuration has been saved yet). Saving a
/// document whose identifier already exists replaces it.
#[async_trait]
pub trait Repository: Send + Sync + std::fmt::Debug {
    /// Names of every index with a saved configuration or documents.
    async fn list_indexes(&self) -> Result<Vec<String>>;

    /// The index's configuration, if one has been saved.
    async fn get_index_config(&self, index: &str) -> Result<Option<IndexConfig>>;

    /// Create or replace the index's configuration.
    async fn save_index_config(&self, index: &str, config: &IndexConfig) -> Result<()>;

    /// Every document of the index, in insertion order.
    async fn get_all_documents(&self, index: &str) -> Result<Vec<Document>>;

    /// A single document by identifier.
    async fn get_document(&self, index: &str, id: &str) -> Result<Option<Document>>;

    /// Create or replace a document.
    ///
    /// Fails with a validation error when the document has no identifier.
    async fn save_document(&self, index: &str, document: &Document) -> Result<()>;

    /// Create or replace several documents.
    async fn save_documents(&self, index: &str, documents: &[Document]) -> Result<()> {
        for document in documents {
            self.save_document(index, document).await?;
        }
        Ok(())
    }

    /// Delete a document. Returns `false` if it did not exist.
    async fn delete_document(&self, index: &str, id: &str) -> Result<bool>;

    /// Delete the index's configuration and documents. Returns `false` if
    /// nothing was stored for it.
    async fn delete_index(&self, index: &str) -> Result<bool>;
}

/// Check that an index name is usable as a storage key.
///
/// Names must be non-blank and must not contain path separators or `..`.
pub fn validate_index_name(index: &str) -> Result<()> {
    if index.trim().is_empty() {
        return Err(HoplonError::validation("Index name is required"));
    }
    if index.contains('/') || index.contains('\\') || index.contains("..") {
        return Err(HoplonError::validation(format!(
            "Invalid index name \"{index}\": must not contain path separators or \"..\""
        )));
    }
    Ok(())
}

/// Identifier of `document` under `id_field`, or a validation error.
pub(crate) fn require_id(document: &Document, id_field: &str) -> Result<String> {
    document.id(id_field).ok_or_else(|| {
        HoplonError::validation(format!(
            "Document must have the ID field '{id_field}' defined."
        ))
    })
}
