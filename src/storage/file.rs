//! File-based repository.
//!
//! Layout under the root directory:
//!
//! ```text
//! <root>/
//!   <index>/
//!     config.json      IndexConfig (camelCase)
//!     documents.json   array of documents in insertion order
//! ```
//!
//! Every write goes to a temporary sibling file which is then renamed over
//! the target, so readers never observe a partially written file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, info};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tokio::sync::Mutex;

use crate::document::Document;
use crate::error::{HoplonError, Result};
use crate::schema::{DEFAULT_ID_FIELD, IndexConfig};
use crate::storage::traits::{Repository, require_id, validate_index_name};

const CONFIG_FILE: &str = "config.json";
const DOCUMENTS_FILE: &str = "documents.json";

/// A [`Repository`] persisting each index as JSON files in its own directory.
#[derive(Debug)]
pub struct FileRepository {
    /// The root directory for storage.
    directory: PathBuf,
    /// Serializes read-modify-write cycles on document files.
    write_lock: Mutex<()>,
}

impl FileRepository {
    /// Open a repository rooted at `directory`, creating it if needed.
    pub async fn open<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();

        fs::create_dir_all(&directory).await.map_err(|e| {
            HoplonError::repository(format!(
                "Failed to create directory {}: {e}",
                directory.display()
            ))
        })?;
        let metadata = fs::metadata(&directory).await?;
        if !metadata.is_dir() {
            return Err(HoplonError::repository(format!(
                "Path is not a directory: {}",
                directory.display()
            )));
        }

        Ok(FileRepository {
            directory,
            write_lock: Mutex::new(()),
        })
    }

    /// The root directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn index_dir(&self, index: &str) -> Result<PathBuf> {
        validate_index_name(index)?;
        Ok(self.directory.join(index))
    }

    async fn id_field(&self, index: &str) -> Result<String> {
        Ok(self
            .get_index_config(index)
            .await?
            .map_or_else(|| DEFAULT_ID_FIELD.to_string(), |config| config.id_field))
    }

    async fn load_documents(&self, index: &str) -> Result<Vec<Document>> {
        let path = self.index_dir(index)?.join(DOCUMENTS_FILE);
        Ok(read_json(&path).await?.unwrap_or_default())
    }

    async fn store_documents(&self, index: &str, documents: &[Document]) -> Result<()> {
        let dir = self.index_dir(index)?;
        fs::create_dir_all(&dir).await?;
        write_json(&dir.join(DOCUMENTS_FILE), &documents).await
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(HoplonError::repository(format!(
                "Failed to read {}: {e}",
                path.display()
            )));
        }
    };
    serde_json::from_slice(&content).map(Some).map_err(|e| {
        HoplonError::repository(format!("Corrupt data in {}: {e}", path.display()))
    })
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content).await.map_err(|e| {
        HoplonError::repository(format!("Failed to write {}: {e}", tmp.display()))
    })?;
    fs::rename(&tmp, path).await.map_err(|e| {
        HoplonError::repository(format!("Failed to replace {}: {e}", path.display()))
    })?;
    Ok(())
}

fn position_of(documents: &[Document], id_field: &str, id: &str) -> Option<usize> {
    documents
        .iter()
        .position(|document| document.id(id_field).as_deref() == Some(id))
}

#[async_trait]
impl Repository for FileRepository {
    async fn list_indexes(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.directory).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let path = entry.path();
            let has_data = fs::try_exists(path.join(CONFIG_FILE)).await?
                || fs::try_exists(path.join(DOCUMENTS_FILE)).await?;
            if has_data {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    async fn get_index_config(&self, index: &str) -> Result<Option<IndexConfig>> {
        read_json(&self.index_dir(index)?.join(CONFIG_FILE)).await
    }

    async fn save_index_config(&self, index: &str, config: &IndexConfig) -> Result<()> {
        let dir = self.index_dir(index)?;
        let _guard = self.write_lock.lock().await;
        fs::create_dir_all(&dir).await?;
        write_json(&dir.join(CONFIG_FILE), config).await?;
        debug!("Saved configuration for \"{index}\" to {}", dir.display());
        Ok(())
    }

    async fn get_all_documents(&self, index: &str) -> Result<Vec<Document>> {
        self.load_documents(index).await
    }

    async fn get_document(&self, index: &str, id: &str) -> Result<Option<Document>> {
        let id_field = self.id_field(index).await?;
        let mut documents = self.load_documents(index).await?;
        Ok(position_of(&documents, &id_field, id).map(|position| documents.swap_remove(position)))
    }

    async fn save_document(&self, index: &str, document: &Document) -> Result<()> {
        self.save_documents(index, std::slice::from_ref(document))
            .await
    }

    async fn save_documents(&self, index: &str, documents: &[Document]) -> Result<()> {
        let id_field = self.id_field(index).await?;
        let ids = documents
            .iter()
            .map(|document| require_id(document, &id_field))
            .collect::<Result<Vec<_>>>()?;

        let _guard = self.write_lock.lock().await;
        let mut stored = self.load_documents(index).await?;
        for (id, document) in ids.iter().zip(documents) {
            match position_of(&stored, &id_field, id) {
                Some(position) => stored[position] = document.clone(),
                None => stored.push(document.clone()),
            }
        }
        self.store_documents(index, &stored).await?;
        debug!("Saved {} documents to \"{index}\"", documents.len());
        Ok(())
    }

    async fn delete_document(&self, index: &str, id: &str) -> Result<bool> {
        let id_field = self.id_field(index).await?;
        let _guard = self.write_lock.lock().await;
        let mut stored = self.load_documents(index).await?;
        let Some(position) = position_of(&stored, &id_field, id) else {
            return Ok(false);
        };
        stored.remove(position);
        self.store_documents(index, &stored).await?;
        Ok(true)
    }

    async fn delete_index(&self, index: &str) -> Result<bool> {
        let dir = self.index_dir(index)?;
        let _guard = self.write_lock.lock().await;
        match fs::remove_dir_all(&dir).await {
            Ok(()) => {
                info!("Deleted index data at {}", dir.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(HoplonError::repository(format!(
                "Failed to delete {}: {e}",
                dir.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn doc(value: serde_json::Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let config = IndexConfig::new(["title"], ["id", "title"]);

        {
            let repo = FileRepository::open(temp_dir.path()).await.unwrap();
            repo.save_index_config("books", &config).await.unwrap();
            repo.save_documents(
                "books",
                &[
                    doc(json!({"id": "1", "title": "Dune"})),
                    doc(json!({"id": "2", "title": "Emma"})),
                ],
            )
            .await
            .unwrap();
        }

        let repo = FileRepository::open(temp_dir.path()).await.unwrap();
        assert_eq!(repo.list_indexes().await.unwrap(), vec!["books"]);
        assert_eq!(repo.get_index_config("books").await.unwrap(), Some(config));
        let all = repo.get_all_documents("books").await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].get_field("title"), Some(&json!("Emma")));
    }

    #[tokio::test]
    async fn test_replace_and_delete_document() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileRepository::open(temp_dir.path()).await.unwrap();

        repo.save_document("idx", &doc(json!({"id": "a", "v": 1})))
            .await
            .unwrap();
        repo.save_document("idx", &doc(json!({"id": "b", "v": 2})))
            .await
            .unwrap();
        repo.save_document("idx", &doc(json!({"id": "a", "v": 3})))
            .await
            .unwrap();

        let a = repo.get_document("idx", "a").await.unwrap().unwrap();
        assert_eq!(a.get_field("v"), Some(&json!(3)));
        assert_eq!(repo.get_all_documents("idx").await.unwrap().len(), 2);

        assert!(repo.delete_document("idx", "a").await.unwrap());
        assert!(!repo.delete_document("idx", "a").await.unwrap());
        assert!(repo.get_document("idx", "a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_index_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileRepository::open(temp_dir.path()).await.unwrap();

        assert!(repo.get_index_config("nope").await.unwrap().is_none());
        assert!(repo.get_all_documents("nope").await.unwrap().is_empty());
        assert!(!repo.delete_index("nope").await.unwrap());
        assert!(repo.list_indexes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_path_like_names() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileRepository::open(temp_dir.path()).await.unwrap();

        let err = repo.get_index_config("../escape").await.unwrap_err();
        assert!(matches!(err, HoplonError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_index_removes_directory() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileRepository::open(temp_dir.path()).await.unwrap();
        repo.save_index_config("gone", &IndexConfig::new(["t"], ["id"]))
            .await
            .unwrap();

        assert!(repo.delete_index("gone").await.unwrap());
        assert!(!temp_dir.path().join("gone").exists());
    }
}
