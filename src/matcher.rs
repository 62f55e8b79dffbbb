//! Token matching and relevance scoring.
//!
//! The search pipeline treats matching as a collaborator: a [`Matcher`] owns
//! the derived, rebuildable per-index state (tokenized postings) and answers
//! ranked candidate queries. Everything after retrieval (filter, facets,
//! sort, pagination) happens in [`crate::search`].

pub mod memory;
pub mod traits;

pub use self::memory::InMemoryMatcher;
pub use self::traits::{
    Candidate, MatchOptions, Matcher, RecordPredicate, SuggestOptions, Suggestion,
};
