//! Request parameters for search and suggest.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{HoplonError, Result};
use crate::query::filter::Filter;

fn default_limit() -> usize {
    10
}

fn default_suggest_limit() -> usize {
    5
}

/// Fill in `limit` on a JSON object that leaves it out.
fn with_default_limit(mut value: Value, limit: usize) -> Value {
    if let Value::Object(map) = &mut value {
        map.entry("limit").or_insert_with(|| Value::from(limit));
    }
    value
}

/// Parameters of a search request.
///
/// Deserializes from the camelCase JSON form:
///
/// ```json
/// {
///   "query": "laptop",
///   "offset": 0,
///   "limit": 10,
///   "filter": {"price": {"gte": 10, "lte": 20}, "brand": "acme"},
///   "sortBy": ["price:asc", "title"],
///   "facets": ["brand", "price"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Free-text query. Empty or whitespace-only means browse all.
    #[serde(default)]
    pub query: String,
    /// Number of hits to skip.
    #[serde(default)]
    pub offset: usize,
    /// Maximum number of hits to return.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Conditions every hit must satisfy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    /// Sort criteria as `"field[:asc|desc]"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<Vec<String>>,
    /// Fields to aggregate facets for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<Vec<String>>,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            query: String::new(),
            offset: 0,
            limit: default_limit(),
            filter: None,
            sort_by: None,
            facets: None,
        }
    }
}

impl SearchParams {
    /// Create parameters for a query with default paging.
    pub fn new<S: Into<String>>(query: S) -> Self {
        SearchParams {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Parse parameters from a JSON value.
    pub fn from_json(value: Value) -> Result<Self> {
        Self::from_json_with_limit(value, default_limit())
    }

    /// Parse parameters from a JSON value, using `limit` when the value
    /// names none.
    pub fn from_json_with_limit(value: Value, limit: usize) -> Result<Self> {
        serde_json::from_value(with_default_limit(value, limit))
            .map_err(|e| HoplonError::validation(format!("Invalid search parameters: {e}")))
    }

    /// Set the offset.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Set the limit.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the filter.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Set the sort criteria.
    pub fn sort_by<I, S>(mut self, criteria: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sort_by = Some(criteria.into_iter().map(Into::into).collect());
        self
    }

    /// Set the facet fields.
    pub fn facets<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.facets = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Check the parameters.
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(HoplonError::validation("limit must be greater than 0"));
        }
        Ok(())
    }
}

/// Parameters of a suggest (autocomplete) request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestParams {
    /// Partial query to complete.
    #[serde(default)]
    pub query: String,
    /// Maximum number of suggestions.
    #[serde(default = "default_suggest_limit")]
    pub limit: usize,
    /// Conditions the underlying documents must satisfy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
}

impl Default for SuggestParams {
    fn default() -> Self {
        SuggestParams {
            query: String::new(),
            limit: default_suggest_limit(),
            filter: None,
        }
    }
}

impl SuggestParams {
    /// Create parameters for a partial query.
    pub fn new<S: Into<String>>(query: S) -> Self {
        SuggestParams {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Parse parameters from a JSON value.
    pub fn from_json(value: Value) -> Result<Self> {
        Self::from_json_with_limit(value, default_suggest_limit())
    }

    /// Parse parameters from a JSON value, using `limit` when the value
    /// names none.
    pub fn from_json_with_limit(value: Value, limit: usize) -> Result<Self> {
        serde_json::from_value(with_default_limit(value, limit))
            .map_err(|e| HoplonError::validation(format!("Invalid suggest parameters: {e}")))
    }

    /// Set the limit.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the filter.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Check the parameters.
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(HoplonError::validation("limit must be greater than 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_defaults() {
        let params = SearchParams::from_json(json!({})).unwrap();
        assert_eq!(params, SearchParams::default());
        assert_eq!(params.limit, 10);
        assert_eq!(params.offset, 0);
        assert!(params.query.is_empty());

        let suggest = SuggestParams::from_json(json!({"query": "lap"})).unwrap();
        assert_eq!(suggest.limit, 5);
    }

    #[test]
    fn test_fallback_limit_applies_only_when_absent() {
        let params = SearchParams::from_json_with_limit(json!({"query": "x"}), 25).unwrap();
        assert_eq!(params.limit, 25);
        let params = SearchParams::from_json_with_limit(json!({"limit": 3}), 25).unwrap();
        assert_eq!(params.limit, 3);

        let suggest = SuggestParams::from_json_with_limit(json!({"query": "x"}), 8).unwrap();
        assert_eq!(suggest.limit, 8);
        assert!(SuggestParams::from_json_with_limit(json!("x"), 8).is_err());
    }

    #[test]
    fn test_camel_case_fields() {
        let params = SearchParams::from_json(json!({
            "query": "laptop",
            "limit": 3,
            "filter": {"price": {"lt": 100}},
            "sortBy": ["price:desc"],
            "facets": ["brand"]
        }))
        .unwrap();

        assert_eq!(params.limit, 3);
        assert_eq!(params.sort_by, Some(vec!["price:desc".to_string()]));
        assert_eq!(params.facets, Some(vec!["brand".to_string()]));
        assert_eq!(params.filter.unwrap().conditions().len(), 1);
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let params = SearchParams::new("x").limit(0);
        assert!(matches!(params.validate(), Err(HoplonError::Validation(_))));
        assert!(SuggestParams::new("x").limit(0).validate().is_err());
        assert!(SearchParams::new("x").validate().is_ok());
    }

    #[test]
    fn test_bad_filter_operator_is_validation_error() {
        let result = SearchParams::from_json(json!({"filter": {"price": {"near": 5}}}));
        assert!(matches!(result, Err(HoplonError::Validation(_))));

        let result = SearchParams::from_json(json!({"offset": -1}));
        assert!(matches!(result, Err(HoplonError::Validation(_))));
    }
}
