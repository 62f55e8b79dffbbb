//! Persistence of index configurations and documents.
//!
//! The [`Repository`] is the source of truth for an index: matcher state is
//! always rebuilt from what it returns. Two backends are provided:
//!
//! - [`InMemoryRepository`]: process-local maps, for tests and embedding;
//! - [`FileRepository`]: one directory per index under a root directory,
//!   surviving restarts.

pub mod file;
pub mod memory;
pub mod traits;

pub use self::file::FileRepository;
pub use self::memory::InMemoryRepository;
pub use self::traits::{Repository, validate_index_name};
