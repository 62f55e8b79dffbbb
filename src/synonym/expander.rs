//! Synonym-aware query rewriting.

use std::sync::Arc;

use log::debug;

use crate::error::Result;
use crate::synonym::registry::{SynonymRegistry, normalize_word};

/// Rewrites query strings by replacing each term with its synonym group.
///
/// Expansion is purely additive: every normalized user term stays in the
/// rewritten query, and terms are deduplicated in first-seen order.
/// Whitespace-only queries are returned untouched so they are matched as
/// browse-all queries.
#[derive(Debug, Clone)]
pub struct QueryExpander {
    registry: Arc<dyn SynonymRegistry>,
}

impl QueryExpander {
    /// Create an expander over a synonym registry.
    pub fn new(registry: Arc<dyn SynonymRegistry>) -> Self {
        QueryExpander { registry }
    }

    /// Expand `query` into a space-separated list of terms.
    pub async fn expand(&self, query: &str) -> Result<String> {
        if query.trim().is_empty() {
            return Ok(query.to_string());
        }

        let mut expanded: Vec<String> = Vec::new();
        for term in query.split_whitespace() {
            let term = normalize_word(term);
            if term.is_empty() {
                continue;
            }
            match self.registry.find_synonyms(&term).await? {
                Some(synonyms) => {
                    for synonym in synonyms {
                        if !expanded.contains(&synonym) {
                            expanded.push(synonym);
                        }
                    }
                }
                None => {
                    if !expanded.contains(&term) {
                        expanded.push(term);
                    }
                }
            }
        }

        let rewritten = expanded.join(" ");
        debug!("Expanded query: \"{query}\" -> \"{rewritten}\"");
        Ok(rewritten)
    }
}
