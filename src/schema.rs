//! Index configuration.
//!
//! An [`IndexConfig`] declares which document fields are searchable
//! (`fields`), which are returned in hits and usable for filtering, faceting
//! and sorting (`store_fields`), and which field identifies a document
//! (`id_field`, default `"id"`). It is the source of truth for what the
//! matcher indexes.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{HoplonError, Result};

/// Default identifier field.
pub const DEFAULT_ID_FIELD: &str = "id";

fn default_id_field() -> String {
    DEFAULT_ID_FIELD.to_string()
}

/// Configuration of a named index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexConfig {
    /// Field holding the unique document identifier.
    #[serde(default = "default_id_field")]
    pub id_field: String,
    /// Fields indexed for full-text search, in declaration order.
    pub fields: Vec<String>,
    /// Fields returned in hits, in declaration order.
    pub store_fields: Vec<String>,
}

impl IndexConfig {
    /// Create a config with the default identifier field.
    pub fn new<I, J, S, T>(fields: I, store_fields: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        IndexConfig {
            id_field: default_id_field(),
            fields: fields.into_iter().map(Into::into).collect(),
            store_fields: store_fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Set the identifier field.
    pub fn with_id_field<S: Into<String>>(mut self, id_field: S) -> Self {
        self.id_field = id_field.into();
        self
    }

    /// Check whether `field` is a stored field.
    pub fn is_stored(&self, field: &str) -> bool {
        self.store_fields.iter().any(|f| f == field)
    }

    /// Validate and normalize the configuration.
    ///
    /// Both field lists must be non-empty and contain no blank names.
    /// Duplicate entries are removed, keeping the first occurrence.
    pub fn validate(mut self) -> Result<Self> {
        if self.id_field.trim().is_empty() {
            return Err(HoplonError::invalid_config("idField must not be empty"));
        }
        self.fields = dedup_fields(self.fields, "fields")?;
        self.store_fields = dedup_fields(self.store_fields, "storeFields")?;

        if !self.is_stored(&self.id_field) {
            warn!(
                "ID field \"{}\" is not listed in storeFields; hits will not carry it as a stored field.",
                self.id_field
            );
        }
        Ok(self)
    }
}

fn dedup_fields(fields: Vec<String>, what: &str) -> Result<Vec<String>> {
    if fields.is_empty() {
        return Err(HoplonError::invalid_config(format!("{what} must not be empty")));
    }
    let mut seen = Vec::with_capacity(fields.len());
    for field in fields {
        if field.trim().is_empty() {
            return Err(HoplonError::invalid_config(format!(
                "{what} must not contain blank field names"
            )));
        }
        if !seen.contains(&field) {
            seen.push(field);
        }
    }
    Ok(seen)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_default_id_field_on_deserialize() {
        let config: IndexConfig =
            serde_json::from_value(json!({"fields": ["title"], "storeFields": ["id", "title"]}))
                .unwrap();
        assert_eq!(config.id_field, "id");
        assert!(config.is_stored("title"));
        assert!(!config.is_stored("year"));
    }

    #[test]
    fn test_validate_rejects_empty_lists() {
        let config = IndexConfig::new(Vec::<String>::new(), ["id"]);
        assert!(matches!(config.validate(), Err(HoplonError::Validation(_))));

        let config = IndexConfig::new(["title"], Vec::<String>::new());
        assert!(config.validate().is_err());

        let config = IndexConfig::new(["title", " "], ["id"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_dedups_preserving_order() {
        let config = IndexConfig::new(["title", "body", "title"], ["id", "title", "id"])
            .validate()
            .unwrap();
        assert_eq!(config.fields, vec!["title", "body"]);
        assert_eq!(config.store_fields, vec!["id", "title"]);
    }

    #[test]
    fn test_serializes_camel_case() {
        let config = IndexConfig::new(["title"], ["sku"]).with_id_field("sku");
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(
            value,
            json!({"idField": "sku", "fields": ["title"], "storeFields": ["sku"]})
        );
    }
}
