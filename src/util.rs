//! Small algorithms shared across modules.

pub mod levenshtein;
