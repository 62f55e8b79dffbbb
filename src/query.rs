//! Post-retrieval query stages.
//!
//! Once the matcher has produced scored candidates for an index, the search
//! pipeline narrows, summarizes and orders them with the stages defined here:
//!
//! - [`filter`] - exact-match and range predicates over stored fields
//! - [`facet`] - categorical distributions and numeric statistics
//! - [`sort`] - multi-key stable ordering with explicit null placement
//!
//! [`params`] holds the request types that carry these stages' inputs.
//!
//! Every stage works on stored-field maps, so any type implementing
//! [`StoredFields`] (such as [`Candidate`](crate::matcher::Candidate)) can
//! flow through them.

use serde_json::{Map, Value};

pub mod facet;
pub mod filter;
pub mod params;
pub mod sort;

pub use self::facet::{FacetAggregator, FacetDistribution, FacetResults, FacetStats, NumericFacetStats};
pub use self::filter::{Condition, FieldFilter, Filter, RangeOperator};
pub use self::params::{SearchParams, SuggestParams};
pub use self::sort::{SortCriterion, SortDirection, SortSpec};

/// Access to the stored fields of a record flowing through the query stages.
pub trait StoredFields {
    /// The record's stored fields.
    fn stored_fields(&self) -> &Map<String, Value>;
}

impl StoredFields for Map<String, Value> {
    fn stored_fields(&self) -> &Map<String, Value> {
        self
    }
}
