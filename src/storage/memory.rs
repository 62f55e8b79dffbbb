//! In-memory repository.

use std::collections::BTreeMap;

use ahash::AHashMap;
use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;

use crate::document::Document;
use crate::error::Result;
use crate::schema::{DEFAULT_ID_FIELD, IndexConfig};
use crate::storage::traits::{Repository, require_id};

/// Documents of one index in insertion order, with an id lookup.
#[derive(Debug, Default, Clone)]
struct IndexData {
    config: Option<IndexConfig>,
    documents: Vec<Document>,
    positions: AHashMap<String, usize>,
}

impl IndexData {
    fn id_field(&self) -> &str {
        self.config
            .as_ref()
            .map_or(DEFAULT_ID_FIELD, |config| config.id_field.as_str())
    }

    fn upsert(&mut self, id: String, document: Document) {
        match self.positions.get(&id) {
            Some(&position) => self.documents[position] = document,
            None => {
                self.positions.insert(id, self.documents.len());
                self.documents.push(document);
            }
        }
    }

    fn remove(&mut self, id: &str) -> bool {
        let Some(position) = self.positions.remove(id) else {
            return false;
        };
        self.documents.remove(position);
        for slot in self.positions.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        true
    }
}

/// A [`Repository`] holding everything in process memory.
///
/// Documents keep their insertion order; replacing a document keeps its
/// original position. Index names are listed in lexicographic order.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    indexes: RwLock<BTreeMap<String, IndexData>>,
}

impl InMemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents stored for an index.
    pub fn document_count(&self, index: &str) -> usize {
        self.indexes
            .read()
            .get(index)
            .map_or(0, |data| data.documents.len())
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn list_indexes(&self) -> Result<Vec<String>> {
        Ok(self.indexes.read().keys().cloned().collect())
    }

    async fn get_index_config(&self, index: &str) -> Result<Option<IndexConfig>> {
        Ok(self
            .indexes
            .read()
            .get(index)
            .and_then(|data| data.config.clone()))
    }

    async fn save_index_config(&self, index: &str, config: &IndexConfig) -> Result<()> {
        self.indexes
            .write()
            .entry(index.to_string())
            .or_default()
            .config = Some(config.clone());
        Ok(())
    }

    async fn get_all_documents(&self, index: &str) -> Result<Vec<Document>> {
        Ok(self
            .indexes
            .read()
            .get(index)
            .map(|data| data.documents.clone())
            .unwrap_or_default())
    }

    async fn get_document(&self, index: &str, id: &str) -> Result<Option<Document>> {
        let indexes = self.indexes.read();
        Ok(indexes.get(index).and_then(|data| {
            data.positions
                .get(id)
                .map(|&position| data.documents[position].clone())
        }))
    }

    async fn save_document(&self, index: &str, document: &Document) -> Result<()> {
        let mut indexes = self.indexes.write();
        let data = indexes.entry(index.to_string()).or_default();
        let id = require_id(document, data.id_field())?;
        data.upsert(id, document.clone());
        Ok(())
    }

    async fn save_documents(&self, index: &str, documents: &[Document]) -> Result<()> {
        let mut indexes = self.indexes.write();
        let data = indexes.entry(index.to_string()).or_default();
        let id_field = data.id_field().to_string();
        let ids = documents
            .iter()
            .map(|document| require_id(document, &id_field))
            .collect::<Result<Vec<_>>>()?;
        for (id, document) in ids.into_iter().zip(documents) {
            data.upsert(id, document.clone());
        }
        debug!("Saved {} documents to \"{index}\"", documents.len());
        Ok(())
    }

    async fn delete_document(&self, index: &str, id: &str) -> Result<bool> {
        Ok(self
            .indexes
            .write()
            .get_mut(index)
            .is_some_and(|data| data.remove(id)))
    }

    async fn delete_index(&self, index: &str) -> Result<bool> {
        Ok(self.indexes.write().remove(index).is_some())
    }
}
