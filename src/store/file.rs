//! File-backed key-value backend
//!
//! All entries live in one JSON object on disk. Writes replace the whole
//! document through a temp file and rename, so readers never observe a
//! half-written file.

use super::KeyValueStore;
use crate::error::{DexError, DexResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

const STORE_NAME: &str = "storage";

/// Durable backend stored as a single JSON document
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open (or lazily create) the document at `path`
    ///
    /// Creates the parent directory. Existing contents are never touched.
    pub async fn open(path: impl Into<PathBuf>) -> DexResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DexError::unavailable(STORE_NAME, format!("{}: {}", parent.display(), e)))?;
        }
        if path.is_dir() {
            return Err(DexError::unavailable(
                STORE_NAME,
                format!("{} is a directory", path.display()),
            ));
        }
        debug!("Opened file store at {}", path.display());
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> DexResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| DexError::unavailable(STORE_NAME, format!("reading {}: {}", self.path.display(), e)))?;

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    async fn write_document(&self, document: &BTreeMap<String, String>) -> DexResult<()> {
        let content = serde_json::to_string_pretty(document)?;
        let tmp = self.path.with_extension("json.tmp");

        fs::write(&tmp, content)
            .await
            .map_err(|e| DexError::unavailable(STORE_NAME, format!("writing {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| DexError::unavailable(STORE_NAME, format!("replacing {}: {}", self.path.display(), e)))?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> DexResult<Option<String>> {
        Ok(self.read_document().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> DexResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        document.insert(key.to_string(), value.to_string());
        self.write_document(&document).await
    }

    async fn remove(&self, key: &str) -> DexResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        if document.remove(key).is_some() {
            self.write_document(&document).await?;
        }
        Ok(())
    }

    async fn clear(&self) -> DexResult<()> {
        let _guard = self.write_lock.lock().await;
        if self.path.exists() {
            fs::remove_file(&self.path)
                .await
                .map_err(|e| DexError::io(format!("removing {}", self.path.display()), e))?;
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn persists_across_instances() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("storage.json");

        let store = FileStore::open(&path).await.unwrap();
        store.set("install_consent", "yes").await.unwrap();
        drop(store);

        let reopened = FileStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.get("install_consent").await.unwrap().as_deref(),
            Some("yes")
        );
    }

    #[tokio::test]
    async fn missing_document_reads_empty() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path().join("storage.json")).await.unwrap();
        assert!(store.get("anything").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_deletes_document() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path().join("storage.json")).await.unwrap();
        store.set("a", "1").await.unwrap();
        assert!(store.path().exists());

        store.clear().await.unwrap();
        assert!(!store.path().exists());
        assert!(store.get("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn directory_path_is_unavailable() {
        let temp = TempDir::new().unwrap();
        let err = FileStore::open(temp.path()).await.err().unwrap();
        assert!(matches!(err, DexError::StoreUnavailable { .. }));
    }
}
