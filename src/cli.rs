//! Command Line Interface for the Hoplon search service.
//!
//! Indexes live under a data directory backed by a
//! [`FileRepository`](crate::storage::FileRepository); synonym groups are
//! kept in `synonyms.json` next to them.

pub mod args;
pub mod commands;
pub mod output;

// Re-export commonly used types
pub use args::*;
pub use commands::*;
pub use output::*;
