//! Response types and result assembly.

use std::time::Instant;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::matcher::Candidate;
use crate::query::facet::{FacetDistribution, FacetResults, FacetStats};

/// A single search hit.
///
/// Serializes as a flat object: the stored fields, then `id`, `score` and
/// `terms` unless a stored field of the same name already occupies the key.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    /// Document identifier.
    pub id: String,
    /// Relevance score.
    pub score: f64,
    /// Index terms the document matched.
    pub terms: Vec<String>,
    /// Every stored field of the index, `null` where the document has none.
    pub fields: Map<String, Value>,
}

impl Hit {
    /// A stored field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

impl Serialize for Hit {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        if !self.fields.contains_key("id") {
            map.serialize_entry("id", &self.id)?;
        }
        if !self.fields.contains_key("score") {
            map.serialize_entry("score", &self.score)?;
        }
        if !self.fields.contains_key("terms") {
            map.serialize_entry("terms", &self.terms)?;
        }
        map.end()
    }
}

/// Response to a search request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Hits of the requested page.
    pub hits: Vec<Hit>,
    /// Total number of hits after filtering.
    pub nb_hits: usize,
    /// The query as submitted by the caller.
    pub query: String,
    /// Page size.
    pub limit: usize,
    /// Number of hits skipped.
    pub offset: usize,
    /// Query evaluation time in milliseconds.
    pub processing_time_ms: u64,
    /// `ceil(nb_hits / limit)`.
    pub total_pages: usize,
    /// 1-based page number of `offset`.
    pub page: usize,
    /// Categorical facet counts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet_distribution: Option<FacetDistribution>,
    /// Numeric facet statistics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet_stats: Option<FacetStats>,
    /// Whether `nb_hits` is exact. Always true.
    pub exhaustive_nb_hits: bool,
}

/// Response to a suggest request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestResponse {
    /// Completed queries, best first.
    pub suggestions: Vec<String>,
    /// The query as submitted by the caller.
    pub query: String,
    /// Evaluation time in milliseconds.
    pub processing_time_ms: u64,
}

impl SuggestResponse {
    /// A response without suggestions.
    pub fn empty<S: Into<String>>(query: S) -> Self {
        SuggestResponse {
            suggestions: Vec::new(),
            query: query.into(),
            processing_time_ms: 0,
        }
    }
}

/// Number of pages needed for `nb_hits` at `limit` per page.
pub fn total_pages(nb_hits: usize, limit: usize) -> usize {
    nb_hits.div_ceil(limit.max(1))
}

/// 1-based page containing `offset`.
pub fn page_number(offset: usize, limit: usize) -> usize {
    (offset / limit.max(1)).saturating_add(1)
}

/// Milliseconds since `started`, rounded to the nearest integer.
pub fn elapsed_ms(started: Instant) -> u64 {
    (started.elapsed().as_secs_f64() * 1000.0).round() as u64
}

/// Paginates sorted candidates and shapes them into a [`SearchResponse`].
#[derive(Debug, Clone, Copy)]
pub struct ResultAssembler<'a> {
    store_fields: &'a [String],
}

impl<'a> ResultAssembler<'a> {
    /// Create an assembler for an index's stored fields.
    pub fn new(store_fields: &'a [String]) -> Self {
        ResultAssembler { store_fields }
    }

    /// Shape a candidate into a hit carrying every stored field.
    pub fn shape(&self, candidate: Candidate) -> Hit {
        let Candidate {
            id,
            score,
            terms,
            mut fields,
        } = candidate;
        for field in self.store_fields {
            fields.entry(field.clone()).or_insert(Value::Null);
        }
        Hit {
            id,
            score,
            terms,
            fields,
        }
    }

    /// Build the response for one page of `candidates`.
    pub fn assemble(
        &self,
        query: &str,
        candidates: Vec<Candidate>,
        offset: usize,
        limit: usize,
        facets: FacetResults,
        started: Instant,
    ) -> SearchResponse {
        let nb_hits = candidates.len();
        let hits = candidates
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|candidate| self.shape(candidate))
            .collect();

        SearchResponse {
            hits,
            nb_hits,
            query: query.to_string(),
            limit,
            offset,
            processing_time_ms: elapsed_ms(started),
            total_pages: total_pages(nb_hits, limit),
            page: page_number(offset, limit),
            facet_distribution: facets.distribution,
            facet_stats: facets.stats,
            exhaustive_nb_hits: true,
        }
    }

    /// The response for an index without documents.
    pub fn empty(query: &str, offset: usize, limit: usize) -> SearchResponse {
        SearchResponse {
            hits: Vec::new(),
            nb_hits: 0,
            query: query.to_string(),
            limit,
            offset,
            processing_time_ms: 0,
            total_pages: 0,
            page: page_number(offset, limit),
            facet_distribution: None,
            facet_stats: None,
            exhaustive_nb_hits: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn candidates(n: usize) -> Vec<Candidate> {
        (0..n)
            .map(|i| Candidate {
                id: i.to_string(),
                score: (n - i) as f64,
                terms: vec!["term".to_string()],
                fields: json!({"id": i.to_string()}).as_object().cloned().unwrap(),
            })
            .collect()
    }

    fn store() -> Vec<String> {
        vec!["id".to_string(), "title".to_string()]
    }

    #[test]
    fn test_pagination_metadata() {
        let store = store();
        let assembler = ResultAssembler::new(&store);

        let first = assembler.assemble("q", candidates(25), 0, 10, FacetResults::empty(), Instant::now());
        assert_eq!(first.nb_hits, 25);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.page, 1);
        assert_eq!(first.hits.len(), 10);

        let last = assembler.assemble("q", candidates(25), 20, 10, FacetResults::empty(), Instant::now());
        assert_eq!(last.page, 3);
        assert_eq!(last.hits.len(), 5);
        assert_eq!(last.hits[0].id, "20");

        let past = assembler.assemble("q", candidates(25), 40, 10, FacetResults::empty(), Instant::now());
        assert!(past.hits.is_empty());
        assert_eq!(past.nb_hits, 25);
        assert_eq!(past.page, 5);
    }

    #[test]
    fn test_page_number_at_offset_bounds() {
        assert_eq!(page_number(0, 10), 1);
        assert_eq!(page_number(9, 10), 1);
        assert_eq!(page_number(10, 10), 2);
        assert_eq!(page_number(usize::MAX, 1), usize::MAX);
        assert_eq!(page_number(usize::MAX, 10), usize::MAX / 10 + 1);

        let response = ResultAssembler::empty("q", usize::MAX, 1);
        assert_eq!(response.page, usize::MAX);
        assert_eq!(response.offset, usize::MAX);
    }

    #[test]
    fn test_hits_carry_every_stored_field() {
        let store = store();
        let response = ResultAssembler::new(&store).assemble(
            "q",
            candidates(1),
            0,
            10,
            FacetResults::empty(),
            Instant::now(),
        );
        assert_eq!(response.hits[0].get("title"), Some(&Value::Null));

        let value = serde_json::to_value(&response.hits[0]).unwrap();
        assert_eq!(
            value,
            json!({"id": "0", "title": null, "score": 1.0, "terms": ["term"]})
        );
    }

    #[test]
    fn test_stored_fields_win_on_collision() {
        let hit = Hit {
            id: "1".to_string(),
            score: 2.5,
            terms: vec![],
            fields: json!({"score": "five stars"}).as_object().cloned().unwrap(),
        };
        let value = serde_json::to_value(&hit).unwrap();
        assert_eq!(value["score"], json!("five stars"));
        assert_eq!(value["id"], json!("1"));
    }

    #[test]
    fn test_empty_response_shape() {
        let response = ResultAssembler::empty("shoes", 20, 10);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "hits": [],
                "nbHits": 0,
                "query": "shoes",
                "limit": 10,
                "offset": 20,
                "processingTimeMs": 0,
                "totalPages": 0,
                "page": 3,
                "exhaustiveNbHits": true
            })
        );
    }
}
