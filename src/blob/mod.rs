//! Append-only blob store for image assets
//!
//! Each record is keyed by the image's logical path and stored as two files
//! named by the SHA256 of the id:
//!
//! | File | Contents |
//! |------|----------|
//! | `<hash>.blob` | Raw bytes |
//! | `<hash>.json` | [`RecordMeta`] sidecar |
//!
//! The blob file is created with create-new semantics, which makes `put`
//! the single point of conflict: a second writer for the same id gets
//! [`DexError::AlreadyExists`] and the first record is kept. The sidecar is
//! the commit marker. A blob left without one by an interrupted `put` is an
//! abandoned claim, and the next `put` for that id reclaims it. Writers in
//! one process are serialized per id so a claim in progress is never taken
//! for an abandoned one.

use crate::error::{DexError, DexResult};
use crate::store::KeyLocks;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Collection name used for image assets
pub const IMAGES_COLLECTION: &str = "images";

/// A stored image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// Logical path or URL of the image
    pub id: String,
    /// Raw image bytes
    pub blob: Vec<u8>,
    /// When the record was created (ms since epoch)
    pub timestamp: i64,
}

/// Sidecar metadata for a stored blob
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RecordMeta {
    id: String,
    timestamp: i64,
    size: u64,
}

/// Durable id → blob store
#[derive(Debug, Clone)]
pub struct BlobStore {
    dir: PathBuf,
    collection: String,
    writers: Arc<KeyLocks>,
}

impl BlobStore {
    /// Open a collection under `root`, creating it if absent
    ///
    /// Idempotent: existing records are left untouched.
    pub async fn open(root: &Path, collection: &str) -> DexResult<Self> {
        let dir = root.join(collection);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| DexError::unavailable(collection, format!("{}: {}", dir.display(), e)))?;

        let meta = fs::metadata(&dir)
            .await
            .map_err(|e| DexError::unavailable(collection, format!("{}: {}", dir.display(), e)))?;
        if meta.permissions().readonly() {
            return Err(DexError::unavailable(
                collection,
                format!("{} is read-only", dir.display()),
            ));
        }

        debug!("Opened blob collection {} at {}", collection, dir.display());
        Ok(Self {
            dir,
            collection: collection.to_string(),
            writers: Arc::new(KeyLocks::default()),
        })
    }

    /// Collection name
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Insert a new record; never overwrites
    pub async fn put(&self, id: &str, blob: &[u8]) -> DexResult<()> {
        let (blob_path, meta_path) = self.paths(id);
        let _writer = self.writers.acquire(id).await;

        let mut file = match claim(&blob_path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if committed(&meta_path).await {
                    return Err(DexError::AlreadyExists(id.to_string()));
                }
                warn!("Reclaiming abandoned blob for {}", id);
                fs::remove_file(&blob_path)
                    .await
                    .map_err(|e| self.unavailable(&blob_path, e))?;
                match claim(&blob_path).await {
                    Ok(file) => file,
                    Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                        return Err(DexError::AlreadyExists(id.to_string()));
                    }
                    Err(e) => return Err(self.unavailable(&blob_path, e)),
                }
            }
            Err(e) => return Err(self.unavailable(&blob_path, e)),
        };

        let written = async {
            file.write_all(blob).await?;
            file.flush().await?;
            let meta = RecordMeta {
                id: id.to_string(),
                timestamp: Utc::now().timestamp_millis(),
                size: blob.len() as u64,
            };
            let content = serde_json::to_vec_pretty(&meta).map_err(std::io::Error::other)?;
            let tmp = meta_path.with_extension("json.tmp");
            fs::write(&tmp, content).await?;
            fs::rename(&tmp, &meta_path).await
        }
        .await;

        if let Err(e) = written {
            // Release the claim so a later attempt can succeed
            if let Err(cleanup) = fs::remove_file(&blob_path).await {
                warn!("Failed to remove partial blob {}: {}", blob_path.display(), cleanup);
            }
            return Err(self.unavailable(&blob_path, e));
        }

        debug!("Stored blob {} ({} bytes)", id, blob.len());
        Ok(())
    }

    /// Look up a record by exact id
    pub async fn get(&self, id: &str) -> DexResult<Option<ImageRecord>> {
        let (blob_path, meta_path) = self.paths(id);

        let content = match fs::read(&meta_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.unavailable(&meta_path, e)),
        };

        let meta: RecordMeta = serde_json::from_slice(&content).map_err(|e| DexError::CorruptRecord {
            id: id.to_string(),
            reason: e.to_string(),
        })?;
        if meta.id != id {
            return Err(DexError::CorruptRecord {
                id: id.to_string(),
                reason: format!("sidecar belongs to {}", meta.id),
            });
        }

        let blob = fs::read(&blob_path)
            .await
            .map_err(|e| self.unavailable(&blob_path, e))?;

        Ok(Some(ImageRecord {
            id: meta.id,
            blob,
            timestamp: meta.timestamp,
        }))
    }

    /// Drop every record, leaving an empty collection behind
    pub(crate) async fn destroy(&self) -> DexResult<()> {
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir)
                .await
                .map_err(|e| DexError::io(format!("removing {}", self.dir.display()), e))?;
        }
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| self.unavailable(&self.dir, e))?;
        debug!("Destroyed blob collection {}", self.collection);
        Ok(())
    }

    fn paths(&self, id: &str) -> (PathBuf, PathBuf) {
        let stem = record_stem(id);
        (
            self.dir.join(format!("{}.blob", stem)),
            self.dir.join(format!("{}.json", stem)),
        )
    }

    fn unavailable(&self, path: &Path, e: std::io::Error) -> DexError {
        DexError::unavailable(&self.collection, format!("{}: {}", path.display(), e))
    }
}

async fn claim(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path).await
}

/// Whether the sidecar exists; unreadable counts as present
async fn committed(meta_path: &Path) -> bool {
    !matches!(fs::metadata(meta_path).await, Err(e) if e.kind() == ErrorKind::NotFound)
}

/// File stem for a record id
fn record_stem(id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(id.as_bytes());
    hex::encode(hasher.finalize())
}
