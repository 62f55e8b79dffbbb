//! The search service façade.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};
use serde_json::{Map, Value};

use crate::config::ServiceConfig;
use crate::document::Document;
use crate::error::{HoplonError, Result};
use crate::matcher::{InMemoryMatcher, MatchOptions, Matcher, RecordPredicate, SuggestOptions};
use crate::query::facet::{FacetAggregator, FacetResults};
use crate::query::filter::Filter;
use crate::query::params::{SearchParams, SuggestParams};
use crate::query::sort::SortSpec;
use crate::schema::IndexConfig;
use crate::search::hydrator::{Hydration, IndexHydrator, IndexState};
use crate::search::response::{ResultAssembler, SearchResponse, SuggestResponse, elapsed_ms};
use crate::storage::{InMemoryRepository, Repository, validate_index_name};
use crate::synonym::{InMemorySynonymRegistry, QueryExpander, SynonymRegistry};

/// Turn a non-empty filter into a matcher predicate.
fn filter_predicate(filter: Option<&Filter>) -> Option<RecordPredicate> {
    let filter = filter.filter(|f| !f.is_empty())?.clone();
    Some(Arc::new(move |fields: &Map<String, Value>| filter.matches(fields)))
}

/// Multi-tenant search over named indexes.
///
/// # Examples
///
/// ```
/// use hoplon::document::Document;
/// use hoplon::query::SearchParams;
/// use hoplon::schema::IndexConfig;
/// use hoplon::search::SearchService;
/// use serde_json::json;
///
/// # tokio_test_block(async {
/// let service = SearchService::in_memory();
/// let docs = vec![Document::from_value(json!({"id": 1, "title": "Rust in Action"})).unwrap()];
/// service
///     .index_documents("books", docs, IndexConfig::new(["title"], ["id", "title"]))
///     .await
///     .unwrap();
///
/// let response = service.search("books", SearchParams::new("rust")).await.unwrap();
/// assert_eq!(response.nb_hits, 1);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug)]
pub struct SearchService {
    repository: Arc<dyn Repository>,
    matcher: Arc<dyn Matcher>,
    synonyms: Arc<dyn SynonymRegistry>,
    expander: QueryExpander,
    hydrator: IndexHydrator,
    config: ServiceConfig,
}

impl SearchService {
    /// Create a service with the default configuration.
    pub fn new(
        repository: Arc<dyn Repository>,
        matcher: Arc<dyn Matcher>,
        synonyms: Arc<dyn SynonymRegistry>,
    ) -> Self {
        Self::with_config(repository, matcher, synonyms, ServiceConfig::default())
    }

    /// Create a service with an explicit configuration.
    pub fn with_config(
        repository: Arc<dyn Repository>,
        matcher: Arc<dyn Matcher>,
        synonyms: Arc<dyn SynonymRegistry>,
        config: ServiceConfig,
    ) -> Self {
        SearchService {
            expander: QueryExpander::new(synonyms.clone()),
            hydrator: IndexHydrator::new(repository.clone(), matcher.clone()),
            repository,
            matcher,
            synonyms,
            config,
        }
    }

    /// A service backed entirely by process memory.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryRepository::new()),
            Arc::new(InMemoryMatcher::new()),
            Arc::new(InMemorySynonymRegistry::new()),
        )
    }

    /// The service configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The underlying repository.
    pub fn repository(&self) -> &Arc<dyn Repository> {
        &self.repository
    }

    /// The synonym registry.
    pub fn synonyms(&self) -> &Arc<dyn SynonymRegistry> {
        &self.synonyms
    }

    /// Parse search parameters, taking the page size from the service
    /// configuration when the request names none.
    pub fn search_params(&self, value: Value) -> Result<SearchParams> {
        SearchParams::from_json_with_limit(value, self.config.default_limit)
    }

    /// Parse suggest parameters, taking the limit from the service
    /// configuration when the request names none.
    pub fn suggest_params(&self, value: Value) -> Result<SuggestParams> {
        SuggestParams::from_json_with_limit(value, self.config.suggest_limit)
    }

    async fn require_config(&self, index: &str) -> Result<IndexConfig> {
        validate_index_name(index)?;
        self.repository
            .get_index_config(index)
            .await?
            .ok_or_else(|| HoplonError::not_found(format!("Index \"{index}\" not found")))
    }

    /// Search an index.
    pub async fn search(&self, index: &str, params: SearchParams) -> Result<SearchResponse> {
        validate_index_name(index)?;
        params.validate()?;
        let config = self.require_config(index).await?;

        if self.hydrator.ensure(index, &config).await? == Hydration::Empty {
            debug!("Index \"{index}\" is empty, returning no hits");
            return Ok(ResultAssembler::empty(
                &params.query,
                params.offset,
                params.limit,
            ));
        }

        let started = Instant::now();
        let expanded = self.expander.expand(&params.query).await?;
        let options = MatchOptions {
            prefix: self.config.prefix_search,
            fuzzy: self.config.fuzzy_tolerance,
            filter: filter_predicate(params.filter.as_ref()),
        };
        let mut candidates = self.matcher.query(index, &expanded, &options).await?;

        let facets = match &params.facets {
            Some(fields) => FacetAggregator::new(&config.store_fields).aggregate(fields, &candidates),
            None => FacetResults::empty(),
        };

        match params
            .sort_by
            .as_deref()
            .and_then(|sort_by| SortSpec::resolve(sort_by, &config.store_fields))
        {
            Some(spec) => spec.sort(&mut candidates),
            None => debug!("No custom sort applied, using relevance order"),
        }

        Ok(ResultAssembler::new(&config.store_fields).assemble(
            &params.query,
            candidates,
            params.offset,
            params.limit,
            facets,
            started,
        ))
    }

    /// Complete a partial query.
    pub async fn suggest(&self, index: &str, params: SuggestParams) -> Result<SuggestResponse> {
        validate_index_name(index)?;
        params.validate()?;
        if params.query.trim().is_empty() {
            return Ok(SuggestResponse::empty(params.query));
        }
        let config = self.require_config(index).await?;
        if self.hydrator.ensure(index, &config).await? == Hydration::Empty {
            return Ok(SuggestResponse::empty(params.query));
        }

        let started = Instant::now();
        let options = SuggestOptions {
            fuzzy: self.config.suggest_fuzzy_tolerance,
            filter: filter_predicate(params.filter.as_ref()),
            limit: params.limit,
        };
        let suggestions = self
            .matcher
            .suggest(index, &params.query, &options)
            .await?
            .into_iter()
            .map(|s| s.suggestion)
            .collect();

        Ok(SuggestResponse {
            suggestions,
            query: params.query,
            processing_time_ms: elapsed_ms(started),
        })
    }

    /// Create or reconfigure an index, store `documents` in it and rebuild.
    ///
    /// Documents already stored under other identifiers are kept. Returns the
    /// number of documents submitted.
    pub async fn index_documents(
        &self,
        index: &str,
        documents: Vec<Document>,
        config: IndexConfig,
    ) -> Result<usize> {
        validate_index_name(index)?;
        let config = config.validate()?;
        if documents.is_empty() {
            warn!("No documents provided for indexing in \"{index}\"");
        }
        let documents = documents
            .into_iter()
            .map(|document| document.with_string_id(&config.id_field))
            .collect::<Result<Vec<_>>>()?;

        self.repository.save_index_config(index, &config).await?;
        self.repository.save_documents(index, &documents).await?;
        self.hydrator.rebuild(index, &config).await?;

        info!("Indexed {} documents into \"{index}\"", documents.len());
        Ok(documents.len())
    }

    /// Add or replace a single document.
    pub async fn add_document(&self, index: &str, document: Document) -> Result<Document> {
        let config = self.require_config(index).await?;
        let document = document.with_string_id(&config.id_field)?;
        self.repository.save_document(index, &document).await?;
        self.hydrator.refresh(index, &config).await?;
        Ok(document)
    }

    /// Replace the document stored under `id`.
    ///
    /// The identifier in the body must match `id`.
    pub async fn update_document(
        &self,
        index: &str,
        id: &str,
        document: Document,
    ) -> Result<Document> {
        let config = self.require_config(index).await?;
        let document = document.with_string_id(&config.id_field)?;
        let body_id = document.id(&config.id_field).unwrap_or_default();
        if body_id != id {
            return Err(HoplonError::validation(format!(
                "Document ID in path ({id}) does not match ID in body ({body_id})."
            )));
        }
        self.repository.save_document(index, &document).await?;
        self.hydrator.refresh(index, &config).await?;
        Ok(document)
    }

    /// Fetch a stored document.
    pub async fn get_document(&self, index: &str, id: &str) -> Result<Option<Document>> {
        validate_index_name(index)?;
        self.repository.get_document(index, id).await
    }

    /// Delete a document. Returns `false` if the index or document does not exist.
    pub async fn delete_document(&self, index: &str, id: &str) -> Result<bool> {
        validate_index_name(index)?;
        let Some(config) = self.repository.get_index_config(index).await? else {
            warn!("Index \"{index}\" configuration not found during delete");
            return Ok(false);
        };
        let deleted = self.repository.delete_document(index, id).await?;
        if deleted {
            self.hydrator.refresh(index, &config).await?;
        }
        Ok(deleted)
    }

    /// Delete an index with its configuration and documents.
    pub async fn delete_index(&self, index: &str) -> Result<bool> {
        validate_index_name(index)?;
        self.hydrator.invalidate(index).await?;
        let deleted = self.repository.delete_index(index).await?;
        if deleted {
            info!("Deleted index \"{index}\"");
        }
        Ok(deleted)
    }

    /// Names of every stored index.
    pub async fn list_indexes(&self) -> Result<Vec<String>> {
        self.repository.list_indexes().await
    }

    /// An index's configuration.
    pub async fn index_config(&self, index: &str) -> Result<IndexConfig> {
        self.require_config(index).await
    }

    /// An index's hydration state.
    pub async fn index_state(&self, index: &str) -> Result<IndexState> {
        validate_index_name(index)?;
        self.hydrator.state(index).await
    }

    /// Register a group of interchangeable words.
    pub async fn add_synonym_group(&self, words: Vec<String>) -> Result<()> {
        if words.len() < 2 {
            return Err(HoplonError::validation(
                "Synonym group must contain at least two words",
            ));
        }
        self.synonyms.save_group(&words).await
    }

    /// Every synonym group.
    pub async fn list_synonym_groups(&self) -> Result<Vec<Vec<String>>> {
        self.synonyms.all_groups().await
    }

    /// Remove a word from its synonym group.
    pub async fn delete_synonym(&self, word: &str) -> Result<bool> {
        if word.trim().is_empty() {
            return Err(HoplonError::validation("Word to delete cannot be empty"));
        }
        self.synonyms.delete_word(word).await
    }
}
