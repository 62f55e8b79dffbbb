//! Matcher trait and the types exchanged with it.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::document::Document;
use crate::error::Result;
use crate::query::StoredFields;
use crate::schema::IndexConfig;

/// Predicate evaluated against a candidate's stored fields during retrieval.
pub type RecordPredicate = Arc<dyn Fn(&Map<String, Value>) -> bool + Send + Sync>;

/// A scored document returned by [`Matcher::query`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    /// Document identifier.
    pub id: String,
    /// Relevance score (higher is better).
    pub score: f64,
    /// Index terms the document matched.
    pub terms: Vec<String>,
    /// The document's stored fields.
    pub fields: Map<String, Value>,
}

impl StoredFields for Candidate {
    fn stored_fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// Options for [`Matcher::query`].
#[derive(Clone, Default)]
pub struct MatchOptions {
    /// Let query terms match index terms they are a prefix of.
    pub prefix: bool,
    /// Fuzzy tolerance: a fraction of the term length below 1, an absolute
    /// edit count at 1 or above, disabled at 0.
    pub fuzzy: f64,
    /// Candidates whose stored fields fail the predicate are dropped.
    pub filter: Option<RecordPredicate>,
}

impl MatchOptions {
    /// Whether a candidate's stored fields pass the filter.
    pub fn accepts(&self, fields: &Map<String, Value>) -> bool {
        self.filter.as_ref().is_none_or(|filter| filter(fields))
    }
}

impl fmt::Debug for MatchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchOptions")
            .field("prefix", &self.prefix)
            .field("fuzzy", &self.fuzzy)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

/// Options for [`Matcher::suggest`].
#[derive(Clone)]
pub struct SuggestOptions {
    /// Fuzzy tolerance, as in [`MatchOptions::fuzzy`].
    pub fuzzy: f64,
    /// Documents whose stored fields fail the predicate do not contribute.
    pub filter: Option<RecordPredicate>,
    /// Maximum number of suggestions.
    pub limit: usize,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        SuggestOptions {
            fuzzy: 0.2,
            filter: None,
            limit: 5,
        }
    }
}

impl fmt::Debug for SuggestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuggestOptions")
            .field("fuzzy", &self.fuzzy)
            .field("filter", &self.filter.is_some())
            .field("limit", &self.limit)
            .finish()
    }
}

/// A query completion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    /// The completed query text.
    pub suggestion: String,
    /// The index terms making up the suggestion.
    pub terms: Vec<String>,
    /// Aggregate relevance of the documents behind the suggestion.
    pub score: f64,
}

/// Full-text retrieval over a named index.
///
/// Implementations hold derived state only: it can be dropped and rebuilt
/// from the repository at any time.
#[async_trait]
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Replace the index's state with one built from `documents`.
    ///
    /// `config.fields` are tokenized for matching; `config.store_fields` are
    /// kept verbatim and returned with each candidate.
    async fn build(&self, index: &str, documents: &[Document], config: &IndexConfig)
    -> Result<()>;

    /// Ranked candidates for `query`, best first.
    ///
    /// An empty query returns every document. Querying an index that is not
    /// held fails with [`HoplonError::Matcher`](crate::error::HoplonError::Matcher).
    async fn query(&self, index: &str, query: &str, options: &MatchOptions)
    -> Result<Vec<Candidate>>;

    /// Completions for a partial query, best first.
    async fn suggest(
        &self,
        index: &str,
        query: &str,
        options: &SuggestOptions,
    ) -> Result<Vec<Suggestion>>;

    /// Whether state for the index is held.
    async fn has_index(&self, index: &str) -> bool;

    /// Discard the index's state. Dropping an unknown index is a no-op.
    async fn drop_index(&self, index: &str) -> Result<()>;
}
