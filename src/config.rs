//! Service-level configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HoplonError, Result};

/// Tuning knobs for [`SearchService`](crate::search::SearchService).
///
/// Every field has a default, so a partial JSON file only overrides what it
/// names:
///
/// ```json
/// { "fuzzyTolerance": 0.1, "suggestLimit": 8 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Whether query terms also match index terms they are a prefix of.
    pub prefix_search: bool,
    /// Fuzzy tolerance for search (fraction of term length).
    pub fuzzy_tolerance: f64,
    /// Page size used when a request does not specify one. Applied by
    /// [`SearchService::search_params`](crate::search::SearchService::search_params)
    /// and the CLI. [`SearchParams::new`](crate::query::SearchParams::new)
    /// keeps its own default of 10.
    pub default_limit: usize,
    /// Number of suggestions used when a request does not specify one.
    /// Applied by
    /// [`SearchService::suggest_params`](crate::search::SearchService::suggest_params)
    /// and the CLI.
    pub suggest_limit: usize,
    /// Fuzzy tolerance for suggestions.
    pub suggest_fuzzy_tolerance: f64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            prefix_search: true,
            fuzzy_tolerance: 0.2,
            default_limit: 10,
            suggest_limit: 5,
            suggest_fuzzy_tolerance: 0.2,
        }
    }
}

impl ServiceConfig {
    /// Load a configuration from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            HoplonError::invalid_config(format!("failed to read '{}': {e}", path.display()))
        })?;
        let config: ServiceConfig = serde_json::from_str(&content).map_err(|e| {
            HoplonError::invalid_config(format!("failed to parse '{}': {e}", path.display()))
        })?;
        config.validate()
    }

    /// Check value ranges.
    pub fn validate(self) -> Result<Self> {
        if self.default_limit == 0 || self.suggest_limit == 0 {
            return Err(HoplonError::invalid_config("limits must be greater than 0"));
        }
        if !(self.fuzzy_tolerance >= 0.0 && self.suggest_fuzzy_tolerance >= 0.0) {
            return Err(HoplonError::invalid_config(
                "fuzzy tolerances must be non-negative numbers",
            ));
        }
        Ok(self)
    }
}
