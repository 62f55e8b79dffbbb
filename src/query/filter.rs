//! Filter evaluation over stored fields.
//!
//! A [`Filter`] maps field names to conditions. A condition is either a
//! scalar, matched with strict type+value equality, or an object of range
//! operators (`gt`, `gte`, `lt`, `lte`) compared numerically. All conditions
//! must hold for a record to pass.
//!
//! # Missing fields
//!
//! A filter field that is absent from a record's stored fields does **not**
//! exclude the record; the condition is skipped with a warning. This leniency
//! mirrors how the service has always behaved and callers rely on it, so it is
//! kept as an explicit policy. Filters are only reliable on fields listed in
//! the index's `storeFields`.
//!
//! # Examples
//!
//! ```
//! use hoplon::query::filter::{Filter, RangeOperator};
//! use serde_json::{json, Map, Value};
//!
//! let filter = Filter::new()
//!     .range("price", RangeOperator::Gte, json!(10))
//!     .range("price", RangeOperator::Lte, json!(20));
//!
//! let record: Map<String, Value> = json!({"price": 15}).as_object().unwrap().clone();
//! assert!(filter.matches(&record));
//! ```

use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::value::{coerce_number, values_equal};
use crate::error::{HoplonError, Result};

/// Numeric comparison operator used in range conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeOperator {
    /// Strictly greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Strictly less than.
    Lt,
    /// Less than or equal.
    Lte,
}

impl RangeOperator {
    /// The operator's wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            RangeOperator::Gt => "gt",
            RangeOperator::Gte => "gte",
            RangeOperator::Lt => "lt",
            RangeOperator::Lte => "lte",
        }
    }

    /// Apply the operator as `value <op> operand`.
    pub fn compare(&self, value: f64, operand: f64) -> bool {
        match self {
            RangeOperator::Gt => value > operand,
            RangeOperator::Gte => value >= operand,
            RangeOperator::Lt => value < operand,
            RangeOperator::Lte => value <= operand,
        }
    }
}

impl FromStr for RangeOperator {
    type Err = HoplonError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "gt" => Ok(RangeOperator::Gt),
            "gte" => Ok(RangeOperator::Gte),
            "lt" => Ok(RangeOperator::Lt),
            "lte" => Ok(RangeOperator::Lte),
            other => Err(HoplonError::validation(format!(
                "Unsupported filter operator: {other}"
            ))),
        }
    }
}

impl fmt::Display for RangeOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Strict equality with a value.
    Equals(Value),
    /// Every operator must hold against the stored value.
    Range(Vec<(RangeOperator, Value)>),
}

impl Condition {
    /// Parse a condition from its JSON form.
    pub fn parse(value: &Value) -> Result<Self> {
        match value {
            Value::Object(ops) => {
                if ops.is_empty() {
                    return Err(HoplonError::validation(
                        "Range filter must contain at least one operator",
                    ));
                }
                let mut bounds = Vec::with_capacity(ops.len());
                for (op, operand) in ops {
                    bounds.push((op.parse::<RangeOperator>()?, operand.clone()));
                }
                Ok(Condition::Range(bounds))
            }
            other => Ok(Condition::Equals(other.clone())),
        }
    }

    /// Evaluate the condition against a present stored value.
    pub fn matches(&self, field: &str, stored: &Value) -> bool {
        match self {
            Condition::Equals(expected) => values_equal(stored, expected),
            Condition::Range(bounds) => bounds.iter().all(|(op, operand)| {
                let Some(value) = coerce_number(stored) else {
                    warn!(
                        "Field \"{field}\" (value: {stored}) is not a number, cannot apply range operator \"{op}\"."
                    );
                    return false;
                };
                let Some(operand) = coerce_number(operand) else {
                    warn!(
                        "Filter value {operand} for operator \"{op}\" on field \"{field}\" is not a valid number."
                    );
                    return false;
                };
                op.compare(value, operand)
            }),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Condition::Equals(value) => value.clone(),
            Condition::Range(bounds) => Value::Object(
                bounds
                    .iter()
                    .map(|(op, operand)| (op.as_str().to_string(), operand.clone()))
                    .collect(),
            ),
        }
    }
}

/// A condition bound to a field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    /// Stored field the condition applies to.
    pub field: String,
    /// The condition.
    pub condition: Condition,
}

/// A conjunction of field conditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Filter {
    conditions: Vec<FieldFilter>,
}

impl Filter {
    /// Create an empty filter, which matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a filter from a JSON object of `field -> condition`.
    pub fn parse(map: &Map<String, Value>) -> Result<Self> {
        let mut conditions = Vec::with_capacity(map.len());
        for (field, condition) in map {
            conditions.push(FieldFilter {
                field: field.clone(),
                condition: Condition::parse(condition)?,
            });
        }
        Ok(Filter { conditions })
    }

    /// Add an equality condition.
    pub fn eq<S: Into<String>>(mut self, field: S, value: Value) -> Self {
        self.conditions.push(FieldFilter {
            field: field.into(),
            condition: Condition::Equals(value),
        });
        self
    }

    /// Add a range bound, merging with an existing range on the same field.
    pub fn range<S: Into<String>>(mut self, field: S, op: RangeOperator, operand: Value) -> Self {
        let field = field.into();
        let existing = self
            .conditions
            .iter_mut()
            .find(|c| c.field == field && matches!(c.condition, Condition::Range(_)));
        match existing {
            Some(FieldFilter {
                condition: Condition::Range(bounds),
                ..
            }) => {
                bounds.retain(|(existing_op, _)| *existing_op != op);
                bounds.push((op, operand));
            }
            _ => self.conditions.push(FieldFilter {
                field,
                condition: Condition::Range(vec![(op, operand)]),
            }),
        }
        self
    }

    /// The field conditions in evaluation order.
    pub fn conditions(&self) -> &[FieldFilter] {
        &self.conditions
    }

    /// Whether the filter has no conditions.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Check whether a record's stored fields satisfy every condition.
    pub fn matches(&self, stored: &Map<String, Value>) -> bool {
        self.conditions.iter().all(|FieldFilter { field, condition }| {
            match stored.get(field) {
                Some(value) => condition.matches(field, value),
                None => {
                    warn!(
                        "Filter field \"{field}\" is not present in stored fields, skipping this condition."
                    );
                    true
                }
            }
        })
    }
}

impl TryFrom<Map<String, Value>> for Filter {
    type Error = HoplonError;

    fn try_from(map: Map<String, Value>) -> Result<Self> {
        Filter::parse(&map)
    }
}

impl From<Filter> for Map<String, Value> {
    fn from(filter: Filter) -> Self {
        filter
            .conditions
            .iter()
            .map(|c| (c.field.clone(), c.condition.to_value()))
            .collect()
    }
}
