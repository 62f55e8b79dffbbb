//! Faceted aggregation over filtered search results.
//!
//! Facets are computed over the complete filtered candidate set, before
//! sorting and pagination, so counts reflect every match rather than the
//! current page. Each requested field is scanned once and yields:
//!
//! - a categorical distribution: stringified value → number of occurrences;
//! - numeric statistics (`min`, `max`, `sum`, `avg`, `count`), emitted only
//!   while every observed value is a number. The first non-numeric value
//!   disables statistics for that field; categorical counting continues.
//!
//! Null and missing values are excluded from both. Only fields listed in the
//! index's `storeFields` can be faceted; other requests are skipped.

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::value::{as_number, stringify_value};
use crate::query::StoredFields;

/// Per-field categorical counts.
pub type FacetDistribution = BTreeMap<String, BTreeMap<String, u64>>;

/// Per-field numeric statistics.
pub type FacetStats = BTreeMap<String, NumericFacetStats>;

/// Summary statistics for a purely numeric facet field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericFacetStats {
    /// Smallest observed value.
    pub min: f64,
    /// Largest observed value.
    pub max: f64,
    /// Sum of observed values.
    pub sum: f64,
    /// `sum / count`.
    pub avg: f64,
    /// Number of numeric observations.
    pub count: u64,
}

/// Result of facet aggregation. Empty maps are represented as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacetResults {
    /// Categorical distributions keyed by field.
    pub distribution: Option<FacetDistribution>,
    /// Numeric statistics keyed by field.
    pub stats: Option<FacetStats>,
}

impl FacetResults {
    /// No facet output.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Running numeric statistics for one field.
#[derive(Debug, Clone, Copy)]
struct NumericTracker {
    min: f64,
    max: f64,
    sum: f64,
    count: u64,
    numeric: bool,
}

impl NumericTracker {
    fn new() -> Self {
        NumericTracker {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sum: 0.0,
            count: 0,
            numeric: true,
        }
    }

    fn observe(&mut self, value: &Value) {
        if !self.numeric {
            return;
        }
        match as_number(value) {
            Some(n) => {
                self.min = self.min.min(n);
                self.max = self.max.max(n);
                self.sum += n;
                self.count += 1;
            }
            None => self.numeric = false,
        }
    }

    fn finish(self) -> Option<NumericFacetStats> {
        if !self.numeric || self.count == 0 {
            return None;
        }
        Some(NumericFacetStats {
            min: self.min,
            max: self.max,
            sum: self.sum,
            avg: self.sum / self.count as f64,
            count: self.count,
        })
    }
}

/// Computes facet distributions and statistics for an index.
#[derive(Debug, Clone, Copy)]
pub struct FacetAggregator<'a> {
    store_fields: &'a [String],
}

impl<'a> FacetAggregator<'a> {
    /// Create an aggregator restricted to the given stored fields.
    pub fn new(store_fields: &'a [String]) -> Self {
        FacetAggregator { store_fields }
    }

    /// Aggregate the requested facet fields over `records`.
    pub fn aggregate<T>(&self, facets: &[String], records: &[T]) -> FacetResults
    where
        T: StoredFields,
    {
        if facets.is_empty() || records.is_empty() {
            return FacetResults::empty();
        }

        let mut distribution = FacetDistribution::new();
        let mut stats = FacetStats::new();

        for field in facets {
            if distribution.contains_key(field) || stats.contains_key(field) {
                continue;
            }
            if !self.store_fields.iter().any(|f| f == field) {
                warn!("Faceting skipped for field \"{field}\": Not included in index's storeFields.");
                continue;
            }

            let mut counts: BTreeMap<String, u64> = BTreeMap::new();
            let mut tracker = NumericTracker::new();

            for record in records {
                let value = match record.stored_fields().get(field) {
                    None | Some(Value::Null) => continue,
                    Some(value) => value,
                };
                tracker.observe(value);
                *counts.entry(stringify_value(value)).or_insert(0) += 1;
            }

            if let Some(field_stats) = tracker.finish() {
                stats.insert(field.clone(), field_stats);
            }
            if !counts.is_empty() {
                distribution.insert(field.clone(), counts);
            }
        }

        FacetResults {
            distribution: (!distribution.is_empty()).then_some(distribution),
            stats: (!stats.is_empty()).then_some(stats),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn records(values: Vec<Value>) -> Vec<Map<String, Value>> {
        values
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_categorical_distribution() {
        let store = fields(&["id", "color"]);
        let docs = records(vec![
            json!({"color": "red"}),
            json!({"color": "red"}),
            json!({"color": "blue"}),
            json!({"color": null}),
        ]);

        let results = FacetAggregator::new(&store).aggregate(&fields(&["color"]), &docs);
        let distribution = results.distribution.unwrap();
        assert_eq!(distribution["color"].len(), 2);
        assert_eq!(distribution["color"]["red"], 2);
        assert_eq!(distribution["color"]["blue"], 1);
        assert!(results.stats.is_none());
    }

    #[test]
    fn test_numeric_stats() {
        let store = fields(&["rating"]);
        let docs = records(vec![json!({"rating": 3}), json!({"rating": 5})]);

        let results = FacetAggregator::new(&store).aggregate(&fields(&["rating"]), &docs);
        let stats = results.stats.unwrap();
        assert_eq!(
            stats["rating"],
            NumericFacetStats {
                min: 3.0,
                max: 5.0,
                sum: 8.0,
                avg: 4.0,
                count: 2
            }
        );
        let distribution = results.distribution.unwrap();
        assert_eq!(distribution["rating"]["3"], 1);
        assert_eq!(distribution["rating"]["5"], 1);
    }

    #[test]
    fn test_mixed_values_disable_stats() {
        let store = fields(&["size"]);
        let docs = records(vec![
            json!({"size": 10}),
            json!({"size": "large"}),
            json!({"size": 12}),
        ]);

        let results = FacetAggregator::new(&store).aggregate(&fields(&["size"]), &docs);
        assert!(results.stats.is_none());
        assert_eq!(results.distribution.unwrap()["size"].len(), 3);
    }

    #[test]
    fn test_ineligible_and_empty_fields_are_skipped() {
        let store = fields(&["color", "brand"]);
        let docs = records(vec![json!({"color": "red", "secret": "x"})]);

        let results =
            FacetAggregator::new(&store).aggregate(&fields(&["secret", "brand", "color"]), &docs);
        let distribution = results.distribution.unwrap();
        assert!(!distribution.contains_key("secret"));
        assert!(!distribution.contains_key("brand"));
        assert!(distribution.contains_key("color"));
    }

    #[test]
    fn test_no_records_yields_nothing() {
        let store = fields(&["color"]);
        let docs: Vec<Map<String, Value>> = Vec::new();
        let results = FacetAggregator::new(&store).aggregate(&fields(&["color"]), &docs);
        assert_eq!(results, FacetResults::empty());
    }
}
