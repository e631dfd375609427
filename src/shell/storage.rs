//! Named response caches on disk
//!
//! Layout: `<root>/<cache name>/<sha256(key)>.{json,body}`. The JSON
//! sidecar is written last and acts as the commit marker for an entry.

use super::request::ShellResponse;
use crate::error::{DexError, DexResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

const STORE_NAME: &str = "caches";

/// Sidecar metadata for a cached response
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntryMeta {
    key: String,
    status: u16,
    content_type: Option<String>,
    stored_at: DateTime<Utc>,
}

/// Collection of named caches
#[derive(Debug, Clone)]
pub struct CacheStorage {
    root: PathBuf,
}

impl CacheStorage {
    /// Open the cache root, creating it if absent
    pub async fn open(root: impl Into<PathBuf>) -> DexResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| DexError::unavailable(STORE_NAME, format!("{}: {}", root.display(), e)))?;
        Ok(Self { root })
    }

    /// Cache root left as is; directories appear on the first `put`
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store a response under `key`, replacing any previous entry
    pub async fn put(&self, cache: &str, key: &str, response: &ShellResponse) -> DexResult<()> {
        let dir = self.cache_dir(cache)?;
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| DexError::io(format!("creating cache {}", dir.display()), e))?;

        let (body_path, meta_path) = entry_paths(&dir, key);
        fs::write(&body_path, &response.body)
            .await
            .map_err(|e| DexError::io(format!("writing {}", body_path.display()), e))?;

        let meta = EntryMeta {
            key: key.to_string(),
            status: response.status,
            content_type: response.content_type.clone(),
            stored_at: Utc::now(),
        };
        fs::write(&meta_path, serde_json::to_vec_pretty(&meta)?)
            .await
            .map_err(|e| DexError::io(format!("writing {}", meta_path.display()), e))?;

        debug!("Cached {} in {}", key, cache);
        Ok(())
    }

    /// Exact-key lookup within one cache
    pub async fn lookup(&self, cache: &str, key: &str) -> DexResult<Option<ShellResponse>> {
        let dir = self.cache_dir(cache)?;
        let (body_path, meta_path) = entry_paths(&dir, key);

        let content = match fs::read(&meta_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(DexError::io(format!("reading {}", meta_path.display()), e)),
        };
        let meta: EntryMeta = serde_json::from_slice(&content)?;
        if meta.key != key {
            return Ok(None);
        }

        let body = fs::read(&body_path)
            .await
            .map_err(|e| DexError::io(format!("reading {}", body_path.display()), e))?;

        Ok(Some(ShellResponse {
            status: meta.status,
            content_type: meta.content_type,
            body,
        }))
    }

    /// Whether a named cache exists
    pub async fn has(&self, cache: &str) -> bool {
        self.cache_dir(cache).map(|dir| dir.is_dir()).unwrap_or(false)
    }

    /// Names of all caches, sorted
    pub async fn keys(&self) -> DexResult<Vec<String>> {
        if !self.root.exists() {
            return Ok(vec![]);
        }

        let mut names = vec![];
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| DexError::io("reading cache root", e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DexError::io("reading cache entry", e))?
        {
            if entry.path().is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }

    /// Delete a named cache; returns whether it existed
    pub async fn delete(&self, cache: &str) -> DexResult<bool> {
        let dir = self.cache_dir(cache)?;
        if !dir.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&dir)
            .await
            .map_err(|e| DexError::io(format!("deleting cache {}", dir.display()), e))?;
        debug!("Deleted cache {}", cache);
        Ok(true)
    }

    /// Delete every named cache; returns how many were removed
    pub async fn delete_all(&self) -> DexResult<usize> {
        let mut removed = 0;
        for name in self.keys().await? {
            if self.delete(&name).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn cache_dir(&self, cache: &str) -> DexResult<PathBuf> {
        let valid = !cache.is_empty()
            && cache != "."
            && cache != ".."
            && !cache.contains(['/', '\\']);
        if !valid {
            return Err(DexError::PathInvalid {
                path: PathBuf::from(cache),
                reason: "cache name must be a single path component".to_string(),
            });
        }
        Ok(self.root.join(cache))
    }
}

fn entry_paths(dir: &Path, key: &str) -> (PathBuf, PathBuf) {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let stem = hex::encode(hasher.finalize());
    (
        dir.join(format!("{}.body", stem)),
        dir.join(format!("{}.json", stem)),
    )
}
