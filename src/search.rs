//! The search pipeline and its service façade.
//!
//! A search request flows through these stages in order:
//!
//! 1. the index configuration is loaded and the [`IndexHydrator`] makes sure
//!    the matcher holds the index (or reports that it has no documents);
//! 2. the [`QueryExpander`](crate::synonym::QueryExpander) rewrites the query
//!    with synonyms;
//! 3. the [`Matcher`](crate::matcher::Matcher) retrieves scored candidates,
//!    applying the filter to stored fields;
//! 4. facets are aggregated over every filtered candidate;
//! 5. candidates are sorted;
//! 6. the [`ResultAssembler`] paginates and shapes the response.
//!
//! [`SearchService`] wires the stages together and also exposes index,
//! document and synonym management.

pub mod hydrator;
pub mod response;
pub mod service;

pub use self::hydrator::{Hydration, IndexHydrator, IndexState};
pub use self::response::{Hit, ResultAssembler, SearchResponse, SuggestResponse};
pub use self::service::SearchService;
