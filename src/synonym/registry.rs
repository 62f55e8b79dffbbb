//! Synonym registry abstraction.

use async_trait::async_trait;

use crate::error::Result;

/// Normalize a word for synonym comparison: trim and lowercase.
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

/// A store of synonym groups.
///
/// Implementations must keep the forward (canonical → members) and inverse
/// (word → canonical) mappings consistent across every mutation, and must
/// treat `save_group` and `delete_word` as critical sections.
#[async_trait]
pub trait SynonymRegistry: Send + Sync + std::fmt::Debug {
    /// Save a group of interchangeable words.
    ///
    /// Words are normalized first. If fewer than two distinct words remain the
    /// call is a no-op. Every existing group touched by one of the words is
    /// merged into a single group.
    async fn save_group(&self, words: &[String]) -> Result<()>;

    /// All members of the group containing `word` (including `word`), or
    /// `None` if it belongs to no group.
    async fn find_synonyms(&self, word: &str) -> Result<Option<Vec<String>>>;

    /// Remove `word` from its group. Returns `false` if it was in no group.
    async fn delete_word(&self, word: &str) -> Result<bool>;

    /// Every group currently defined.
    async fn all_groups(&self) -> Result<Vec<Vec<String>>>;
}
