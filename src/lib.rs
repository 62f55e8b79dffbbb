//! # Hoplon
//!
//! The core of a multi-tenant full-text search service.
//!
//! Each named index has its own configuration and documents, kept by a
//! pluggable [`Repository`](storage::Repository). A pluggable
//! [`Matcher`](matcher::Matcher) performs text matching and relevance
//! scoring. Around them Hoplon runs a query pipeline:
//!
//! 1. synonym expansion of the query string
//! 2. candidate retrieval with prefix and fuzzy matching
//! 3. filtering on stored fields
//! 4. facet aggregation
//! 5. multi-key sorting
//! 6. pagination and response shaping
//!
//! Matcher state is rebuilt from the repository on demand, so a restarted
//! process serves queries against every persisted index.
//!
//! ## Features
//!
//! - Global synonym groups with transitive merging
//! - Exact and range filters with numeric string coercion
//! - Categorical facet counts and numeric facet statistics
//! - Stable multi-key sorting with explicit null placement
//! - Lazy, single-flight index hydration
//! - In-memory and JSON file repositories
//! - BM25 in-memory matcher with prefix and fuzzy expansion

pub mod analysis;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod matcher;
pub mod query;
pub mod schema;
pub mod search;
pub mod storage;
pub mod synonym;
pub mod util;

pub mod prelude {
    pub use crate::config::ServiceConfig;
    pub use crate::document::Document;
    pub use crate::error::{HoplonError, Result};
    pub use crate::matcher::{InMemoryMatcher, Matcher};
    pub use crate::query::{Filter, SearchParams, SuggestParams};
    pub use crate::schema::IndexConfig;
    pub use crate::search::{SearchResponse, SearchService, SuggestResponse};
    pub use crate::storage::{FileRepository, InMemoryRepository, Repository};
    pub use crate::synonym::{InMemorySynonymRegistry, SynonymRegistry};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
