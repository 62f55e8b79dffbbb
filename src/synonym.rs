//! Synonym groups and synonym-aware query rewriting.
//!
//! A synonym group is a set of at least two normalized words that are
//! interchangeable at query time. Each group is keyed by a *canonical* word;
//! an inverse map resolves any member to its canonical in O(1).
//!
//! # Components
//!
//! - [`registry`] - the [`SynonymRegistry`] trait and word normalization
//! - [`memory`] - [`InMemorySynonymRegistry`], the dual-map implementation
//! - [`expander`] - [`QueryExpander`], which rewrites query strings
//!
//! # Examples
//!
//! ```
//! use hoplon::synonym::SynonymTable;
//!
//! let mut table = SynonymTable::new();
//! table.save_group(&["Quick", "fast"]);
//! table.save_group(&["fast", "rapid"]);
//!
//! // Groups sharing a word are merged.
//! let members = table.find_synonyms("rapid").unwrap();
//! assert_eq!(members, vec!["quick", "fast", "rapid"]);
//! ```

pub mod expander;
pub mod memory;
pub mod registry;

pub use self::expander::QueryExpander;
pub use self::memory::{InMemorySynonymRegistry, SynonymTable};
pub use self::registry::{SynonymRegistry, normalize_word};
