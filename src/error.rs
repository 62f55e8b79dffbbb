//! Error types for the Hoplon library.
//!
//! All errors are represented by the [`HoplonError`] enum. Variants fall into
//! two groups:
//!
//! - client errors ([`HoplonError::Validation`], [`HoplonError::NotFound`]),
//!   which are surfaced immediately and never retried;
//! - internal errors (everything else), which include failures reported by a
//!   [`Repository`](crate::storage::Repository) or
//!   [`Matcher`](crate::matcher::Matcher) and are propagated unchanged.
//!
//! Unknown fields in filters, sort criteria or facet requests are not errors:
//! the offending criterion is dropped and a warning is logged.
//!
//! # Examples
//!
//! ```
//! use hoplon::error::{HoplonError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(HoplonError::validation("Index name is required"))
//! }
//!
//! let err = example_operation().unwrap_err();
//! assert!(err.is_client_error());
//! assert_eq!(err.status_code(), 400);
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Hoplon operations.
#[derive(Error, Debug)]
pub enum HoplonError {
    /// Invalid caller input (missing index name, malformed parameters, bad config).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A named resource (usually an index configuration) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failure reported by a repository backend.
    #[error("Repository error: {0}")]
    Repository(String),

    /// Failure reported by a matcher backend.
    #[error("Matcher error: {0}")]
    Matcher(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with HoplonError.
pub type Result<T> = std::result::Result<T, HoplonError>;

impl HoplonError {
    /// Create a new validation error.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        HoplonError::Validation(msg.into())
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        HoplonError::NotFound(msg.into())
    }

    /// Create a new repository error.
    pub fn repository<S: Into<String>>(msg: S) -> Self {
        HoplonError::Repository(msg.into())
    }

    /// Create a new matcher error.
    pub fn matcher<S: Into<String>>(msg: S) -> Self {
        HoplonError::Matcher(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        HoplonError::Other(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        HoplonError::Validation(format!("Invalid configuration: {}", msg.into()))
    }

    /// Whether this error is the caller's fault (4xx-equivalent).
    pub fn is_client_error(&self) -> bool {
        matches!(self, HoplonError::Validation(_) | HoplonError::NotFound(_))
    }

    /// HTTP-style status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            HoplonError::Validation(_) => 400,
            HoplonError::NotFound(_) => 404,
            _ => 500,
        }
    }
}
