//! In-memory synonym registry.
//!
//! [`SynonymTable`] holds the two mappings and implements the merge and
//! delete algorithms synchronously. [`InMemorySynonymRegistry`] wraps a table
//! in a single `RwLock` so each mutation runs as one write critical section.
//!
//! Groups can be loaded from and saved to a JSON file holding an array of
//! groups:
//!
//! ```json
//! [
//!   ["laptop", "notebook"],
//!   ["tv", "television"]
//! ]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use ahash::AHashMap;
use async_trait::async_trait;
use log::{debug, warn};
use parking_lot::RwLock;

use crate::error::{HoplonError, Result};
use crate::synonym::registry::{SynonymRegistry, normalize_word};

/// The dual-map representation of all synonym groups.
#[derive(Debug, Clone, Default)]
pub struct SynonymTable {
    /// canonical word -> members in insertion order (includes the canonical)
    groups: BTreeMap<String, Vec<String>>,
    /// word -> canonical word
    canonical_of: AHashMap<String, String>,
}

fn push_unique(target: &mut Vec<String>, word: String) {
    if !target.contains(&word) {
        target.push(word);
    }
}

impl SynonymTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table by saving each group in order.
    pub fn from_groups<I, G, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for group in groups {
            let words: Vec<S> = group.into_iter().collect();
            table.save_group(words.as_slice());
        }
        table
    }

    /// Save a group, merging every existing group it touches.
    ///
    /// Returns `false` when fewer than two distinct normalized words remain.
    pub fn save_group<S: AsRef<str>>(&mut self, words: &[S]) -> bool {
        let mut normalized = Vec::with_capacity(words.len());
        for word in words {
            let word = normalize_word(word.as_ref());
            if !word.is_empty() {
                push_unique(&mut normalized, word);
            }
        }
        if normalized.len() < 2 {
            warn!("Synonym group must contain at least two distinct words: {normalized:?}");
            return false;
        }

        let mut canonical: Option<String> = None;
        let mut target: Vec<String> = Vec::new();

        for word in &normalized {
            let Some(existing) = self.canonical_of.get(word).cloned() else {
                continue;
            };
            match &canonical {
                None => {
                    target = self.groups.get(&existing).cloned().unwrap_or_default();
                    canonical = Some(existing);
                }
                Some(current) if *current != existing => {
                    if let Some(group) = self.groups.remove(&existing) {
                        for member in group {
                            push_unique(&mut target, member);
                        }
                    }
                }
                Some(_) => {}
            }
        }

        let canonical = canonical.unwrap_or_else(|| normalized[0].clone());
        for word in normalized {
            push_unique(&mut target, word);
        }
        for word in &target {
            self.canonical_of.insert(word.clone(), canonical.clone());
        }

        debug!("Saved synonym group (canonical: {canonical}): {target:?}");
        self.groups.insert(canonical, target);
        true
    }

    /// All members of the group containing `word`.
    pub fn find_synonyms(&self, word: &str) -> Option<Vec<String>> {
        let canonical = self.canonical_of.get(&normalize_word(word))?;
        self.groups.get(canonical).cloned()
    }

    /// The canonical word of the group containing `word`.
    pub fn canonical(&self, word: &str) -> Option<&str> {
        self.canonical_of
            .get(&normalize_word(word))
            .map(String::as_str)
    }

    /// Remove a word from its group.
    ///
    /// A group left with fewer than two members is deleted entirely. If the
    /// canonical word was removed, the first remaining member is promoted.
    pub fn delete_word(&mut self, word: &str) -> bool {
        let normalized = normalize_word(word);
        let Some(canonical) = self.canonical_of.remove(&normalized) else {
            return false;
        };
        let Some(mut group) = self.groups.remove(&canonical) else {
            return false;
        };
        group.retain(|member| *member != normalized);

        if group.len() < 2 {
            debug!("Synonym group for canonical \"{canonical}\" is now too small, deleting group.");
            for member in &group {
                self.canonical_of.remove(member);
            }
        } else if normalized == canonical {
            let promoted = group[0].clone();
            for member in &group {
                self.canonical_of.insert(member.clone(), promoted.clone());
            }
            debug!("Promoted \"{promoted}\" to canonical word for the group.");
            self.groups.insert(promoted, group);
        } else {
            self.groups.insert(canonical, group);
        }
        true
    }

    /// Every group, ordered by canonical word.
    pub fn all_groups(&self) -> Vec<Vec<String>> {
        self.groups.values().cloned().collect()
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no groups are defined.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// A [`SynonymRegistry`] backed by an in-memory [`SynonymTable`].
#[derive(Debug, Default)]
pub struct InMemorySynonymRegistry {
    table: RwLock<SynonymTable>,
}

impl InMemorySynonymRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from a prepared table.
    pub fn from_table(table: SynonymTable) -> Self {
        InMemorySynonymRegistry {
            table: RwLock::new(table),
        }
    }

    /// Load groups from a JSON file containing an array of word arrays.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            HoplonError::other(format!(
                "Failed to read synonym file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let groups: Vec<Vec<String>> = serde_json::from_str(&content).map_err(|e| {
            HoplonError::validation(format!(
                "Failed to parse synonym JSON from '{}': {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self::from_table(SynonymTable::from_groups(groups)))
    }

    /// Write all groups to a JSON file, replacing it atomically.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let groups = self.table.read().all_groups();
        let content = serde_json::to_string_pretty(&groups)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// A copy of the current table.
    pub fn snapshot(&self) -> SynonymTable {
        self.table.read().clone()
    }
}

#[async_trait]
impl SynonymRegistry for InMemorySynonymRegistry {
    async fn save_group(&self, words: &[String]) -> Result<()> {
        self.table.write().save_group(words);
        Ok(())
    }

    async fn find_synonyms(&self, word: &str) -> Result<Option<Vec<String>>> {
        Ok(self.table.read().find_synonyms(word))
    }

    async fn delete_word(&self, word: &str) -> Result<bool> {
        Ok(self.table.write().delete_word(word))
    }

    async fn all_groups(&self) -> Result<Vec<Vec<String>>> {
        Ok(self.table.read().all_groups())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut words: Vec<String>) -> Vec<String> {
        words.sort();
        words
    }

    #[test]
    fn test_save_and_find() {
        let mut table = SynonymTable::new();
        assert!(table.save_group(&["Laptop", " notebook "]));

        assert_eq!(
            table.find_synonyms("NOTEBOOK"),
            Some(vec!["laptop".to_string(), "notebook".to_string()])
        );
        assert_eq!(table.canonical("notebook"), Some("laptop"));
        assert_eq!(table.find_synonyms("desktop"), None);
    }

    #[test]
    fn test_small_groups_are_ignored() {
        let mut table = SynonymTable::new();
        assert!(!table.save_group(&["only"]));
        assert!(!table.save_group(&["Same", "same ", "  "]));
        assert!(table.is_empty());
    }

    #[test]
    fn test_merge_with_existing_group() {
        let mut table = SynonymTable::new();
        table.save_group(&["quick", "fast"]);
        table.save_group(&["rapid", "fast"]);

        assert_eq!(table.len(), 1);
        assert_eq!(table.canonical("rapid"), Some("quick"));
        assert_eq!(
            sorted(table.find_synonyms("quick").unwrap()),
            vec!["fast", "quick", "rapid"]
        );
    }

    #[test]
    fn test_merge_is_transitive_across_groups() {
        let mut table = SynonymTable::new();
        table.save_group(&["tv", "television"]);
        table.save_group(&["screen", "display"]);
        table.save_group(&["monitor", "display", "tv"]);

        assert_eq!(table.len(), 1);
        // "display" is the first touched word, so its group's canonical wins.
        assert_eq!(table.canonical("tv"), Some("screen"));
        assert_eq!(
            sorted(table.find_synonyms("television").unwrap()),
            vec!["display", "monitor", "screen", "television", "tv"]
        );
        for word in ["tv", "television", "screen", "display", "monitor"] {
            assert_eq!(table.canonical(word), Some("screen"));
        }
    }

    #[test]
    fn test_delete_non_canonical_word() {
        let mut table = SynonymTable::new();
        table.save_group(&["a", "b", "c"]);

        assert!(table.delete_word("B"));
        assert_eq!(table.find_synonyms("a"), Some(vec!["a".into(), "c".into()]));
        assert_eq!(table.find_synonyms("b"), None);
        assert!(!table.delete_word("b"));
    }

    #[test]
    fn test_delete_canonical_promotes_member() {
        let mut table = SynonymTable::new();
        table.save_group(&["a", "b", "c"]);

        assert!(table.delete_word("a"));
        assert_eq!(table.canonical("b"), Some("b"));
        assert_eq!(table.canonical("c"), Some("b"));
        assert_eq!(table.all_groups(), vec![vec!["b".to_string(), "c".to_string()]]);
    }

    #[test]
    fn test_delete_last_but_one_removes_group() {
        let mut table = SynonymTable::new();
        table.save_group(&["couch", "sofa"]);

        assert!(table.delete_word("sofa"));
        assert!(table.is_empty());
        assert_eq!(table.find_synonyms("couch"), None);
        assert_eq!(table.canonical("couch"), None);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("synonyms.json");

        let registry = InMemorySynonymRegistry::from_table(SynonymTable::from_groups([
            vec!["laptop", "notebook"],
            vec!["tv", "television"],
        ]));
        registry.save_to_file(&path).unwrap();

        let loaded = InMemorySynonymRegistry::load_from_file(&path).unwrap();
        assert_eq!(loaded.snapshot().all_groups(), registry.snapshot().all_groups());
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            InMemorySynonymRegistry::load_from_file(&path),
            Err(HoplonError::Validation(_))
        ));
    }
}
