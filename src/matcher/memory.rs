//! In-memory inverted index matcher.
//!
//! Each index is held as a collection: the stored fields of every
//! document in insertion order plus a postings map from term to the
//! documents containing it. Collections are immutable once built and are
//! swapped in whole, so a rebuild never exposes a half-populated index.
//!
//! Scoring is BM25 with OR semantics across query terms. A query term
//! contributes through every index term it reaches:
//!
//! - the identical term, weight `1.0`;
//! - terms it is a prefix of (when enabled), weight `0.375` decaying with the
//!   number of extra characters;
//! - terms within the fuzzy edit budget, weight `0.45` decaying with the edit
//!   distance.

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use async_trait::async_trait;
use log::{debug, info, warn};
use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::analysis::{Tokenizer, UnicodeWordTokenizer};
use crate::document::Document;
use crate::document::value::stringify_value;
use crate::error::{HoplonError, Result};
use crate::matcher::traits::{
    Candidate, MatchOptions, Matcher, RecordPredicate, SuggestOptions, Suggestion,
};
use crate::schema::IndexConfig;
use crate::util::levenshtein::{levenshtein_distance_threshold, max_edits};

const K1: f64 = 1.2;
const B: f64 = 0.7;
const PREFIX_WEIGHT: f64 = 0.375;
const FUZZY_WEIGHT: f64 = 0.45;

#[derive(Debug)]
struct IndexedDocument {
    id: String,
    stored: Map<String, Value>,
    length: usize,
}

#[derive(Debug, Clone, Copy)]
struct Posting {
    doc: usize,
    frequency: u32,
}

/// The built state of one index.
#[derive(Debug, Default)]
struct Collection {
    documents: Vec<IndexedDocument>,
    postings: AHashMap<String, Vec<Posting>>,
    average_length: f64,
}

impl Collection {
    fn build(documents: &[Document], config: &IndexConfig, tokenizer: &dyn Tokenizer) -> Self {
        let mut collection = Collection::default();
        let mut seen: AHashSet<String> = AHashSet::with_capacity(documents.len());
        let mut total_length = 0usize;

        for document in documents {
            let Some(id) = document.id(&config.id_field) else {
                warn!(
                    "Skipping document without \"{}\" while building the index.",
                    config.id_field
                );
                continue;
            };
            if !seen.insert(id.clone()) {
                warn!("Skipping duplicate document id \"{id}\".");
                continue;
            }

            let ordinal = collection.documents.len();
            let mut frequencies: AHashMap<String, u32> = AHashMap::new();
            let mut length = 0usize;
            for field in &config.fields {
                let text = match document.get_field(field) {
                    None | Some(Value::Null) => continue,
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => stringify_value(other),
                };
                for term in tokenizer.terms(&text) {
                    *frequencies.entry(term).or_insert(0) += 1;
                    length += 1;
                }
            }
            for (term, frequency) in frequencies {
                collection.postings.entry(term).or_default().push(Posting {
                    doc: ordinal,
                    frequency,
                });
            }

            let stored = config
                .store_fields
                .iter()
                .filter_map(|field| {
                    document
                        .get_field(field)
                        .map(|value| (field.clone(), value.clone()))
                })
                .collect();

            total_length += length;
            collection.documents.push(IndexedDocument { id, stored, length });
        }

        if !collection.documents.is_empty() {
            collection.average_length = total_length as f64 / collection.documents.len() as f64;
        }
        collection
    }

    /// Index terms reachable from a query term, with their weights.
    fn expand_term<'a>(&'a self, term: &str, prefix: bool, fuzzy: f64) -> Vec<(&'a str, f64)> {
        let term_len = term.chars().count();
        let edits = max_edits(term_len, fuzzy);
        let mut expansions: Vec<(&str, f64)> = Vec::new();

        if let Some((exact, _)) = self.postings.get_key_value(term) {
            expansions.push((exact.as_str(), 1.0));
        }

        if prefix || edits > 0 {
            for index_term in self.postings.keys() {
                if index_term == term {
                    continue;
                }
                let mut weight: f64 = 0.0;
                if prefix && index_term.starts_with(term) {
                    let extra = index_term.chars().count() - term_len;
                    weight = PREFIX_WEIGHT * term_len as f64 / (term_len as f64 + 0.3 * extra as f64);
                }
                if edits > 0 {
                    if let Some(distance) = levenshtein_distance_threshold(term, index_term, edits) {
                        let fuzzy_weight =
                            FUZZY_WEIGHT * term_len as f64 / (term_len + distance) as f64;
                        weight = weight.max(fuzzy_weight);
                    }
                }
                if weight > 0.0 {
                    expansions.push((index_term.as_str(), weight));
                }
            }
        }

        expansions.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        expansions
    }

    /// Score every document reached by `terms`. Each entry carries its own
    /// prefix flag so suggest can restrict prefix matching to the last term.
    ///
    /// With `browse` set, an empty term list returns every document in
    /// insertion order. Otherwise it matches nothing.
    fn search(
        &self,
        terms: &[(String, bool)],
        browse: bool,
        fuzzy: f64,
        filter: Option<&RecordPredicate>,
    ) -> Vec<Candidate> {
        let accepts = |fields: &Map<String, Value>| filter.is_none_or(|f| f(fields));

        if terms.is_empty() {
            if !browse {
                return Vec::new();
            }
            return self
                .documents
                .iter()
                .filter(|doc| accepts(&doc.stored))
                .map(|doc| Candidate {
                    id: doc.id.clone(),
                    score: 0.0,
                    terms: Vec::new(),
                    fields: doc.stored.clone(),
                })
                .collect();
        }

        let total = self.documents.len() as f64;
        let average_length = self.average_length.max(1.0);
        let mut scores: AHashMap<usize, (f64, Vec<String>)> = AHashMap::new();

        for (term, prefix) in terms {
            for (index_term, weight) in self.expand_term(term, *prefix, fuzzy) {
                let Some(postings) = self.postings.get(index_term) else {
                    continue;
                };
                let df = postings.len() as f64;
                let idf = (1.0 + (total - df + 0.5) / (df + 0.5)).ln();
                for posting in postings {
                    let length = self.documents[posting.doc].length as f64;
                    let tf = f64::from(posting.frequency);
                    let saturation =
                        tf * (K1 + 1.0) / (tf + K1 * (1.0 - B + B * length / average_length));

                    let entry = scores
                        .entry(posting.doc)
                        .or_insert_with(|| (0.0, Vec::new()));
                    entry.0 += weight * idf * saturation;
                    if !entry.1.iter().any(|t| t == index_term) {
                        entry.1.push(index_term.to_string());
                    }
                }
            }
        }

        let mut ranked: Vec<(usize, f64, Vec<String>)> = scores
            .into_iter()
            .filter(|(doc, _)| accepts(&self.documents[*doc].stored))
            .map(|(doc, (score, terms))| (doc, score, terms))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        ranked
            .into_iter()
            .map(|(doc, score, terms)| {
                let document = &self.documents[doc];
                Candidate {
                    id: document.id.clone(),
                    score,
                    terms,
                    fields: document.stored.clone(),
                }
            })
            .collect()
    }
}

/// A [`Matcher`] keeping every index in process memory.
#[derive(Debug)]
pub struct InMemoryMatcher {
    tokenizer: Arc<dyn Tokenizer>,
    collections: RwLock<AHashMap<String, Arc<Collection>>>,
}

impl Default for InMemoryMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMatcher {
    /// Create a matcher using Unicode word tokenization.
    pub fn new() -> Self {
        Self::with_tokenizer(Arc::new(UnicodeWordTokenizer::new()))
    }

    /// Create a matcher with a custom tokenizer.
    pub fn with_tokenizer(tokenizer: Arc<dyn Tokenizer>) -> Self {
        InMemoryMatcher {
            tokenizer,
            collections: RwLock::new(AHashMap::new()),
        }
    }

    /// Number of documents held for an index.
    pub fn document_count(&self, index: &str) -> Option<usize> {
        self.collections
            .read()
            .get(index)
            .map(|collection| collection.documents.len())
    }

    fn collection(&self, index: &str) -> Result<Arc<Collection>> {
        self.collections
            .read()
            .get(index)
            .cloned()
            .ok_or_else(|| HoplonError::matcher(format!("Index \"{index}\" is not loaded")))
    }
}

#[async_trait]
impl Matcher for InMemoryMatcher {
    async fn build(
        &self,
        index: &str,
        documents: &[Document],
        config: &IndexConfig,
    ) -> Result<()> {
        let collection = Collection::build(documents, config, self.tokenizer.as_ref());
        info!(
            "Built index \"{index}\": {} documents, {} terms",
            collection.documents.len(),
            collection.postings.len()
        );
        self.collections
            .write()
            .insert(index.to_string(), Arc::new(collection));
        Ok(())
    }

    async fn query(
        &self,
        index: &str,
        query: &str,
        options: &MatchOptions,
    ) -> Result<Vec<Candidate>> {
        let collection = self.collection(index)?;
        let mut terms: Vec<(String, bool)> = Vec::new();
        for term in self.tokenizer.terms(query) {
            if !terms.iter().any(|(t, _)| *t == term) {
                terms.push((term, options.prefix));
            }
        }
        // Only a blank query browses; one that tokenizes to nothing matches nothing.
        let browse = query.trim().is_empty();
        let candidates =
            collection.search(&terms, browse, options.fuzzy, options.filter.as_ref());
        debug!(
            "Matched {} candidates in \"{index}\" for \"{query}\"",
            candidates.len()
        );
        Ok(candidates)
    }

    async fn suggest(
        &self,
        index: &str,
        query: &str,
        options: &SuggestOptions,
    ) -> Result<Vec<Suggestion>> {
        let collection = self.collection(index)?;
        let tokens = self.tokenizer.terms(query);
        if tokens.is_empty() || options.limit == 0 {
            return Ok(Vec::new());
        }
        let last = tokens.len() - 1;
        let terms: Vec<(String, bool)> = tokens
            .into_iter()
            .enumerate()
            .map(|(i, term)| (term, i == last))
            .collect();

        let mut suggestions: Vec<Suggestion> = Vec::new();
        let mut positions: AHashMap<String, usize> = AHashMap::new();
        for candidate in collection.search(&terms, false, options.fuzzy, options.filter.as_ref()) {
            let phrase = candidate.terms.join(" ");
            match positions.get(&phrase) {
                Some(&position) => suggestions[position].score += candidate.score,
                None => {
                    positions.insert(phrase.clone(), suggestions.len());
                    suggestions.push(Suggestion {
                        suggestion: phrase,
                        terms: candidate.terms,
                        score: candidate.score,
                    });
                }
            }
        }

        suggestions.sort_by(|a, b| b.score.total_cmp(&a.score));
        suggestions.truncate(options.limit);
        Ok(suggestions)
    }

    async fn has_index(&self, index: &str) -> bool {
        self.collections.read().contains_key(index)
    }

    async fn drop_index(&self, index: &str) -> Result<()> {
        if self.collections.write().remove(index).is_some() {
            info!("Dropped matcher state for index \"{index}\"");
        }
        Ok(())
    }
}
