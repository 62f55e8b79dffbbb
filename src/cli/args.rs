//! Command line argument parsing for the Hoplon CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{HoplonError, Result};
use crate::query::filter::{Filter, RangeOperator};

/// Hoplon - multi-tenant full-text search
#[derive(Parser, Debug, Clone)]
#[command(name = "hoplon")]
#[command(about = "Multi-tenant full-text search with synonyms, filters, facets and sorting")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct HoplonArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Directory holding index data and synonyms
    #[arg(short, long, env = "HOPLON_DATA_DIR", default_value = "hoplon-data")]
    pub data_dir: PathBuf,

    /// Service configuration file (JSON)
    #[arg(short, long, env = "HOPLON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl HoplonArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }

    /// Path of the persisted synonym groups.
    pub fn synonyms_file(&self) -> PathBuf {
        self.data_dir.join("synonyms.json")
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create or reconfigure an index, optionally loading documents
    #[command(name = "create-index")]
    CreateIndex(CreateIndexArgs),

    /// Add documents to an existing index
    #[command(name = "add-documents")]
    AddDocuments(AddDocumentsArgs),

    /// Search an index
    Search(SearchArgs),

    /// Suggest query completions
    Suggest(SuggestArgs),

    /// Print a stored document
    #[command(name = "get-document")]
    GetDocument(DocumentArgs),

    /// Delete a stored document
    #[command(name = "delete-document")]
    DeleteDocument(DocumentArgs),

    /// Delete an index with all its documents
    #[command(name = "delete-index")]
    DeleteIndex(IndexArgs),

    /// List all indexes
    List,

    /// Manage synonym groups
    #[command(subcommand)]
    Synonyms(SynonymCommand),
}

/// Arguments for creating an index
#[derive(Parser, Debug, Clone)]
pub struct CreateIndexArgs {
    /// Index name
    #[arg(value_name = "INDEX")]
    pub index: String,

    /// Searchable fields (comma-separated)
    #[arg(long, value_delimiter = ',', required = true)]
    pub fields: Vec<String>,

    /// Fields returned with hits and usable for filters, facets and sorting (comma-separated)
    #[arg(long, value_delimiter = ',', required = true)]
    pub store_fields: Vec<String>,

    /// Field holding the document identifier
    #[arg(long, default_value = "id")]
    pub id_field: String,

    /// Document file to load (JSON array, JSON object or JSONL)
    #[arg(long, value_name = "DOCUMENT_FILE")]
    pub documents: Option<PathBuf>,
}

/// Arguments for adding documents
#[derive(Parser, Debug, Clone)]
pub struct AddDocumentsArgs {
    /// Index name
    #[arg(value_name = "INDEX")]
    pub index: String,

    /// Document file path (JSON array, JSON object or JSONL)
    #[arg(value_name = "DOCUMENT_FILE")]
    pub document_file: PathBuf,
}

/// Arguments for searching
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Index name
    #[arg(value_name = "INDEX")]
    pub index: String,

    /// Query string (empty lists every document)
    #[arg(value_name = "QUERY", default_value = "")]
    pub query: String,

    /// Maximum number of results to return
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Offset for pagination
    #[arg(short, long, default_value = "0")]
    pub offset: usize,

    /// Filter conditions: `field=value` or `field:op=value` with op one of gt, gte, lt, lte
    #[arg(long = "filter", value_name = "CONDITION")]
    pub filters: Vec<String>,

    /// Sort criteria (comma-separated `field[:asc|desc]`)
    #[arg(long, value_delimiter = ',')]
    pub sort: Vec<String>,

    /// Facet fields to collect (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub facets: Vec<String>,
}

/// Arguments for suggestions
#[derive(Parser, Debug, Clone)]
pub struct SuggestArgs {
    /// Index name
    #[arg(value_name = "INDEX")]
    pub index: String,

    /// Partial query
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Maximum number of suggestions
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Filter conditions, as for `search`
    #[arg(long = "filter", value_name = "CONDITION")]
    pub filters: Vec<String>,
}

/// Arguments naming a single document
#[derive(Parser, Debug, Clone)]
pub struct DocumentArgs {
    /// Index name
    #[arg(value_name = "INDEX")]
    pub index: String,

    /// Document identifier
    #[arg(value_name = "ID")]
    pub id: String,
}

/// Arguments naming an index
#[derive(Parser, Debug, Clone)]
pub struct IndexArgs {
    /// Index name
    #[arg(value_name = "INDEX")]
    pub index: String,
}

/// Synonym management commands
#[derive(Subcommand, Debug, Clone)]
pub enum SynonymCommand {
    /// Add a group of interchangeable words
    Add {
        /// Words of the group (at least two)
        #[arg(value_name = "WORD", num_args = 2.., required = true)]
        words: Vec<String>,
    },

    /// List every synonym group
    List,

    /// Remove a word from its group
    Delete {
        /// Word to remove
        #[arg(value_name = "WORD")]
        word: String,
    },
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Parse a filter value: JSON literals (`10`, `true`, `"quoted"`) keep their
/// type, anything else is a string.
fn parse_filter_value(raw: &str) -> Value {
    serde_json::from_str::<Value>(raw)
        .ok()
        .filter(|value| !value.is_object() && !value.is_array())
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

/// Build a [`Filter`] from `field=value` / `field:op=value` conditions.
pub fn parse_filters(conditions: &[String]) -> Result<Option<Filter>> {
    if conditions.is_empty() {
        return Ok(None);
    }
    let mut filter = Filter::new();
    for condition in conditions {
        let Some((target, raw)) = condition.split_once('=') else {
            return Err(HoplonError::validation(format!(
                "Invalid filter \"{condition}\": expected field=value or field:op=value"
            )));
        };
        let value = parse_filter_value(raw.trim());
        filter = match target.split_once(':') {
            Some((field, op)) => filter.range(field.trim(), op.trim().parse::<RangeOperator>()?, value),
            None => filter.eq(target.trim(), value),
        };
    }
    Ok(Some(filter))
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, json};

    use super::*;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_filters() {
        let filter = parse_filters(&[
            "price:gte=10".to_string(),
            "price:lt=20".to_string(),
            "color=red".to_string(),
            "in_stock=true".to_string(),
        ])
        .unwrap()
        .unwrap();

        assert_eq!(filter.conditions().len(), 3);
        assert!(filter.matches(&record(json!({"price": 15, "color": "red", "in_stock": true}))));
        assert!(!filter.matches(&record(json!({"price": 25, "color": "red", "in_stock": true}))));
        assert!(!filter.matches(&record(json!({"price": 15, "color": "blue", "in_stock": true}))));
    }

    #[test]
    fn test_parse_filter_errors() {
        assert!(parse_filters(&[]).unwrap().is_none());
        assert!(parse_filters(&["price".to_string()]).is_err());
        assert!(matches!(
            parse_filters(&["price:near=3".to_string()]),
            Err(HoplonError::Validation(_))
        ));
    }

    #[test]
    fn test_cli_parsing() {
        let args = HoplonArgs::try_parse_from([
            "hoplon",
            "-vv",
            "--data-dir",
            "/tmp/data",
            "search",
            "shop",
            "red shirt",
            "--filter",
            "price:lte=20",
            "--sort",
            "price:desc,title",
            "--facets",
            "color",
        ])
        .unwrap();

        assert_eq!(args.verbosity(), 2);
        assert_eq!(args.synonyms_file(), PathBuf::from("/tmp/data/synonyms.json"));
        match args.command {
            Command::Search(search) => {
                assert_eq!(search.query, "red shirt");
                assert_eq!(search.sort, vec!["price:desc", "title"]);
                assert_eq!(search.filters, vec!["price:lte=20"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_synonym_add_requires_two_words() {
        assert!(HoplonArgs::try_parse_from(["hoplon", "synonyms", "add", "one"]).is_err());
        assert!(HoplonArgs::try_parse_from(["hoplon", "synonyms", "add", "tv", "television"]).is_ok());
    }
}
