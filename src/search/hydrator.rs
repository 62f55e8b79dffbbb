//! Index hydration.
//!
//! The matcher's per-index state is a cache derived from the repository.
//! After a restart the repository may hold configurations and documents
//! while the matcher holds nothing, so every index is in one of three
//! states:
//!
//! | State    | Repository config | Matcher state |
//! |----------|-------------------|---------------|
//! | `Absent` | none              | -             |
//! | `Cold`   | present           | not held      |
//! | `Hot`    | present           | held          |
//!
//! Queries call [`IndexHydrator::ensure`], which turns a cold index hot by
//! rebuilding it from every stored document. An index with no documents
//! stays cold and the query short-circuits to an empty result.

use std::sync::Arc;

use log::{debug, info};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::matcher::Matcher;
use crate::schema::IndexConfig;
use crate::storage::Repository;

/// Hydration state of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexState {
    /// No configuration exists.
    Absent,
    /// Configured, but the matcher does not hold it.
    Cold,
    /// Configured and held by the matcher.
    Hot,
}

/// Outcome of bringing an index up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hydration {
    /// The matcher holds the index.
    Ready,
    /// The repository has no documents for the index.
    Empty,
}

/// Keeps matcher state in step with the repository.
///
/// Every (re)build goes through one async gate, and [`ensure`](Self::ensure)
/// re-checks the matcher after acquiring it, so concurrent first queries
/// trigger a single rebuild.
#[derive(Debug)]
pub struct IndexHydrator {
    repository: Arc<dyn Repository>,
    matcher: Arc<dyn Matcher>,
    gate: Mutex<()>,
}

impl IndexHydrator {
    /// Create a hydrator over a repository and matcher.
    pub fn new(repository: Arc<dyn Repository>, matcher: Arc<dyn Matcher>) -> Self {
        IndexHydrator {
            repository,
            matcher,
            gate: Mutex::new(()),
        }
    }

    /// Current state of an index.
    pub async fn state(&self, index: &str) -> Result<IndexState> {
        if self.repository.get_index_config(index).await?.is_none() {
            return Ok(IndexState::Absent);
        }
        if self.matcher.has_index(index).await {
            Ok(IndexState::Hot)
        } else {
            Ok(IndexState::Cold)
        }
    }

    /// Make sure the matcher holds the index, building it if needed.
    pub async fn ensure(&self, index: &str, config: &IndexConfig) -> Result<Hydration> {
        if self.matcher.has_index(index).await {
            return Ok(Hydration::Ready);
        }

        let _gate = self.gate.lock().await;
        if self.matcher.has_index(index).await {
            debug!("Index \"{index}\" was hydrated while waiting");
            return Ok(Hydration::Ready);
        }
        info!("Index \"{index}\" not loaded in matcher, reloading from repository");
        self.load(index, config).await
    }

    /// Discard and rebuild the index from the repository.
    pub async fn rebuild(&self, index: &str, config: &IndexConfig) -> Result<Hydration> {
        let _gate = self.gate.lock().await;
        let hydration = self.load(index, config).await?;
        if hydration == Hydration::Empty {
            self.matcher.drop_index(index).await?;
        }
        Ok(hydration)
    }

    /// Rebuild the index only if it is hot.
    ///
    /// Used after single-document writes: a hot index must reflect them, a
    /// cold one picks them up on its next hydration.
    pub async fn refresh(&self, index: &str, config: &IndexConfig) -> Result<()> {
        let _gate = self.gate.lock().await;
        if !self.matcher.has_index(index).await {
            debug!("Index \"{index}\" is cold, skipping refresh");
            return Ok(());
        }
        if self.load(index, config).await? == Hydration::Empty {
            self.matcher.drop_index(index).await?;
        }
        Ok(())
    }

    /// Drop the matcher state for an index.
    pub async fn invalidate(&self, index: &str) -> Result<()> {
        let _gate = self.gate.lock().await;
        self.matcher.drop_index(index).await
    }

    async fn load(&self, index: &str, config: &IndexConfig) -> Result<Hydration> {
        let documents = self.repository.get_all_documents(index).await?;
        if documents.is_empty() {
            info!("No documents stored for index \"{index}\"");
            return Ok(Hydration::Empty);
        }
        info!(
            "Rebuilding index \"{index}\" from {} documents",
            documents.len()
        );
        self.matcher.build(index, &documents, config).await?;
        Ok(Hydration::Ready)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::document::Document;
    use crate::matcher::InMemoryMatcher;
    use crate::storage::InMemoryRepository;

    fn config() -> IndexConfig {
        IndexConfig::new(["title"], ["id", "title"])
    }

    async fn setup(docs: usize) -> (Arc<InMemoryRepository>, Arc<InMemoryMatcher>, IndexHydrator) {
        let repository = Arc::new(InMemoryRepository::new());
        repository.save_index_config("idx", &config()).await.unwrap();
        for i in 0..docs {
            let doc = Document::from_value(json!({"id": i.to_string(), "title": "t"})).unwrap();
            repository.save_document("idx", &doc).await.unwrap();
        }
        let matcher = Arc::new(InMemoryMatcher::new());
        let hydrator = IndexHydrator::new(repository.clone(), matcher.clone());
        (repository, matcher, hydrator)
    }

    #[tokio::test]
    async fn test_cold_index_becomes_hot() {
        let (_, matcher, hydrator) = setup(3).await;
        assert_eq!(hydrator.state("idx").await.unwrap(), IndexState::Cold);
        assert_eq!(hydrator.state("other").await.unwrap(), IndexState::Absent);

        assert_eq!(
            hydrator.ensure("idx", &config()).await.unwrap(),
            Hydration::Ready
        );
        assert_eq!(hydrator.state("idx").await.unwrap(), IndexState::Hot);
        assert_eq!(matcher.document_count("idx"), Some(3));
    }

    #[tokio::test]
    async fn test_empty_index_stays_cold() {
        let (_, _, hydrator) = setup(0).await;
        assert_eq!(
            hydrator.ensure("idx", &config()).await.unwrap(),
            Hydration::Empty
        );
        assert_eq!(hydrator.state("idx").await.unwrap(), IndexState::Cold);
    }

    #[tokio::test]
    async fn test_refresh_only_touches_hot_indexes() {
        let (repository, matcher, hydrator) = setup(1).await;
        hydrator.refresh("idx", &config()).await.unwrap();
        assert!(matcher.document_count("idx").is_none());

        hydrator.ensure("idx", &config()).await.unwrap();
        let doc = Document::from_value(json!({"id": "new", "title": "t"})).unwrap();
        repository.save_document("idx", &doc).await.unwrap();
        hydrator.refresh("idx", &config()).await.unwrap();
        assert_eq!(matcher.document_count("idx"), Some(2));

        repository.delete_index("idx").await.unwrap();
        hydrator.refresh("idx", &config()).await.unwrap();
        assert!(matcher.document_count("idx").is_none());
    }

    #[tokio::test]
    async fn test_concurrent_ensure() {
        let (_, matcher, hydrator) = setup(5).await;
        let hydrator = Arc::new(hydrator);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let hydrator = hydrator.clone();
                tokio::spawn(async move { hydrator.ensure("idx", &config()).await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), Hydration::Ready);
        }
        assert_eq!(matcher.document_count("idx"), Some(5));
    }
}
