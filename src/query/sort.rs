//! Multi-key ordering of search results.
//!
//! Sort criteria are written as `"field"` or `"field:direction"`, where the
//! direction is `asc` or `desc` (case-insensitive; anything other than `desc`
//! sorts ascending). Criteria are applied in order, the first non-equal
//! comparison deciding. The sort is stable, so records that compare equal on
//! every criterion keep their relevance order.
//!
//! Null or missing values sort after present values when ascending and before
//! them when descending. Two absent values compare equal and the next
//! criterion decides.

use std::cmp::Ordering;
use std::fmt;

use log::{debug, warn};
use serde_json::Value;

use crate::document::value::{as_number, stringify_value};
use crate::query::StoredFields;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

impl SortDirection {
    /// Parse a direction token. Only `desc` selects descending order.
    pub fn parse(token: &str) -> Self {
        if token.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    /// Orient an ascending ordering for this direction.
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

/// A single sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortCriterion {
    /// Stored field to sort on.
    pub field: String,
    /// Direction for this field.
    pub direction: SortDirection,
}

impl SortCriterion {
    /// Create a criterion.
    pub fn new<S: Into<String>>(field: S, direction: SortDirection) -> Self {
        SortCriterion {
            field: field.into(),
            direction,
        }
    }

    /// Parse `"field[:direction]"`. Returns `None` for a blank field name.
    pub fn parse(spec: &str) -> Option<Self> {
        let (field, direction) = match spec.split_once(':') {
            Some((field, direction)) => (field.trim(), SortDirection::parse(direction)),
            None => (spec.trim(), SortDirection::Asc),
        };
        if field.is_empty() {
            return None;
        }
        Some(SortCriterion::new(field, direction))
    }

    /// Compare two records on this criterion.
    pub fn compare<T: StoredFields>(&self, a: &T, b: &T) -> Ordering {
        let left = present(a.stored_fields().get(&self.field));
        let right = present(b.stored_fields().get(&self.field));

        match (left, right) {
            (None, None) => Ordering::Equal,
            // Absent values go last ascending and first descending.
            (None, Some(_)) => self.direction.apply(Ordering::Greater),
            (Some(_), None) => self.direction.apply(Ordering::Less),
            (Some(left), Some(right)) => self.direction.apply(compare_values(left, right)),
        }
    }
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.direction)
    }
}

/// An ordered list of sort criteria restricted to sortable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    criteria: Vec<SortCriterion>,
}

impl SortSpec {
    /// Resolve raw `sortBy` entries against the index's stored fields.
    ///
    /// Entries naming a field outside `store_fields` are dropped with a
    /// warning. Returns `None` when nothing usable remains, in which case the
    /// caller keeps relevance order.
    pub fn resolve(sort_by: &[String], store_fields: &[String]) -> Option<Self> {
        let mut criteria = Vec::with_capacity(sort_by.len());
        for raw in sort_by {
            let Some(criterion) = SortCriterion::parse(raw) else {
                warn!("Ignoring empty sort criterion \"{raw}\".");
                continue;
            };
            if !store_fields.iter().any(|f| *f == criterion.field) {
                warn!(
                    "Sorting skipped for field \"{}\": Not included in index's storeFields.",
                    criterion.field
                );
                continue;
            }
            criteria.push(criterion);
        }

        if criteria.is_empty() {
            return None;
        }
        debug!(
            "Sorting by {}",
            criteria
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
        Some(SortSpec { criteria })
    }

    /// Build a spec directly from criteria.
    pub fn from_criteria(criteria: Vec<SortCriterion>) -> Option<Self> {
        (!criteria.is_empty()).then_some(SortSpec { criteria })
    }

    /// The criteria in priority order.
    pub fn criteria(&self) -> &[SortCriterion] {
        &self.criteria
    }

    /// Compare two records on every criterion in order.
    pub fn compare<T: StoredFields>(&self, a: &T, b: &T) -> Ordering {
        for criterion in &self.criteria {
            let ordering = criterion.compare(a, b);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Stable in-place sort.
    pub fn sort<T: StoredFields>(&self, records: &mut [T]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Ascending comparison of two present values.
///
/// Two numbers compare numerically; any other pairing compares the
/// stringified forms with [`collate`].
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    collate(&stringify_value(a), &stringify_value(b))
}

/// Locale-style string collation.
///
/// Case-insensitive comparison first, then lowercase before uppercase at the
/// first differing character, then code-point order.
pub fn collate(a: &str, b: &str) -> Ordering {
    let primary = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    if primary != Ordering::Equal {
        return primary;
    }

    for (x, y) in a.chars().zip(b.chars()) {
        if x == y {
            continue;
        }
        match (x.is_lowercase(), y.is_lowercase()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => return x.cmp(&y),
        }
    }
    a.cmp(b)
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, json};

    use super::*;

    fn records(values: Vec<Value>) -> Vec<Map<String, Value>> {
        values
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn column(records: &[Map<String, Value>], field: &str) -> Vec<Value> {
        records
            .iter()
            .map(|r| r.get(field).cloned().unwrap_or(Value::Null))
            .collect()
    }

    #[test]
    fn test_parse_criterion() {
        assert_eq!(
            SortCriterion::parse("price:DESC"),
            Some(SortCriterion::new("price", SortDirection::Desc))
        );
        assert_eq!(
            SortCriterion::parse("price"),
            Some(SortCriterion::new("price", SortDirection::Asc))
        );
        assert_eq!(
            SortCriterion::parse("price:sideways"),
            Some(SortCriterion::new("price", SortDirection::Asc))
        );
        assert_eq!(SortCriterion::parse(":desc"), None);
    }

    #[test]
    fn test_multi_key_sort() {
        let store = strings(&["year", "title"]);
        let spec = SortSpec::resolve(&strings(&["year:desc", "title:asc"]), &store).unwrap();

        let mut docs = records(vec![
            json!({"year": 2000, "title": "B"}),
            json!({"year": 2000, "title": "A"}),
            json!({"year": 1999, "title": "Z"}),
        ]);
        spec.sort(&mut docs);

        assert_eq!(column(&docs, "title"), vec![json!("A"), json!("B"), json!("Z")]);
        assert_eq!(column(&docs, "year"), vec![json!(2000), json!(2000), json!(1999)]);
    }

    #[test]
    fn test_nulls_placement() {
        let store = strings(&["price"]);
        let base = records(vec![
            json!({"price": null}),
            json!({"price": 5}),
            json!({}),
            json!({"price": 1}),
        ]);

        let mut asc = base.clone();
        SortSpec::resolve(&strings(&["price"]), &store)
            .unwrap()
            .sort(&mut asc);
        assert_eq!(
            column(&asc, "price"),
            vec![json!(1), json!(5), Value::Null, Value::Null]
        );

        let mut desc = base;
        SortSpec::resolve(&strings(&["price:desc"]), &store)
            .unwrap()
            .sort(&mut desc);
        assert_eq!(
            column(&desc, "price"),
            vec![Value::Null, Value::Null, json!(5), json!(1)]
        );
    }

    #[test]
    fn test_null_ties_fall_through_to_next_criterion() {
        let store = strings(&["price", "name"]);
        let spec = SortSpec::resolve(&strings(&["price", "name"]), &store).unwrap();

        let mut docs = records(vec![json!({"name": "b"}), json!({"name": "a"})]);
        spec.sort(&mut docs);
        assert_eq!(column(&docs, "name"), vec![json!("a"), json!("b")]);
    }

    #[test]
    fn test_unknown_fields_are_dropped() {
        let store = strings(&["title"]);
        assert!(SortSpec::resolve(&strings(&["secret:desc"]), &store).is_none());

        let spec = SortSpec::resolve(&strings(&["secret", "title:desc"]), &store).unwrap();
        assert_eq!(
            spec.criteria(),
            &[SortCriterion::new("title", SortDirection::Desc)]
        );
    }

    #[test]
    fn test_stable_for_equal_keys() {
        let store = strings(&["group"]);
        let spec = SortSpec::resolve(&strings(&["group"]), &store).unwrap();

        let mut docs = records(vec![
            json!({"group": 1, "rank": 0}),
            json!({"group": 0, "rank": 1}),
            json!({"group": 1, "rank": 2}),
            json!({"group": 0, "rank": 3}),
        ]);
        spec.sort(&mut docs);
        assert_eq!(
            column(&docs, "rank"),
            vec![json!(1), json!(3), json!(0), json!(2)]
        );
    }

    #[test]
    fn test_mixed_types_compare_as_strings() {
        assert_eq!(compare_values(&json!(10), &json!(9)), Ordering::Greater);
        assert_eq!(compare_values(&json!("10"), &json!(9)), Ordering::Less);
        assert_eq!(compare_values(&json!(true), &json!("apple")), Ordering::Greater);
    }

    #[test]
    fn test_collation() {
        assert_eq!(collate("apple", "Banana"), Ordering::Less);
        assert_eq!(collate("Zebra", "apple"), Ordering::Greater);
        assert_eq!(collate("a", "A"), Ordering::Less);
        assert_eq!(collate("same", "same"), Ordering::Equal);
        assert_eq!(collate("ab", "abc"), Ordering::Less);
    }
}
