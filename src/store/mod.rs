//! Durable key-value persistence
//!
//! Every piece of small persisted state (the discovery ledger, consent flags,
//! the visited marker) goes through one injected [`Persistence`] service.
//! Mutations follow an explicit load-mutate-save contract, serialized per
//! logical key with [`Persistence::lock`].
//!
//! | Backend | Use |
//! |---------|-----|
//! | [`FileStore`] | One JSON document on disk |
//! | [`MemoryStore`] | Tests and ephemeral runs |

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::DexResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Abstract string key-value backend
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when absent
    async fn get(&self, key: &str) -> DexResult<Option<String>>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &str, value: &str) -> DexResult<()>;

    /// Remove a value; absent keys are not an error
    async fn remove(&self, key: &str) -> DexResult<()>;

    /// Remove every value
    async fn clear(&self) -> DexResult<()>;

    /// Human-readable backend name for diagnostics
    fn backend_name(&self) -> &'static str;
}

/// One async mutex per logical key
#[derive(Debug, Default)]
pub(crate) struct KeyLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    pub(crate) async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(
                locks
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        lock.lock_owned().await
    }
}

/// Shared persistence service; clones share the backend and the key locks
#[derive(Clone)]
pub struct Persistence {
    backend: Arc<dyn KeyValueStore>,
    locks: Arc<KeyLocks>,
}

impl Persistence {
    /// Wrap a backend
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            locks: Arc::new(KeyLocks::default()),
        }
    }

    /// In-memory persistence
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Take exclusive access to a logical key for a load-mutate-save cycle
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        self.locks.acquire(key).await
    }

    pub async fn get(&self, key: &str) -> DexResult<Option<String>> {
        self.backend.get(key).await
    }

    pub async fn set(&self, key: &str, value: &str) -> DexResult<()> {
        self.backend.set(key, value).await
    }

    pub async fn remove(&self, key: &str) -> DexResult<()> {
        self.backend.remove(key).await
    }

    pub async fn clear(&self) -> DexResult<()> {
        self.backend.clear().await
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn clones_share_state() {
        let a = Persistence::in_memory();
        let b = a.clone();

        a.set("k", "v").await.unwrap();
        assert_eq!(b.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn lock_serializes_same_key() {
        let persistence = Persistence::in_memory();
        persistence.set("counter", "0").await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let p = persistence.clone();
            handles.push(tokio::spawn(async move {
                let _guard = p.lock("counter").await;
                let n: u32 = p.get("counter").await.unwrap().unwrap().parse().unwrap();
                tokio::time::sleep(Duration::from_millis(2)).await;
                p.set("counter", &(n + 1).to_string()).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(persistence.get("counter").await.unwrap().as_deref(), Some("8"));
    }

    #[tokio::test]
    async fn different_keys_do_not_block() {
        let persistence = Persistence::in_memory();
        let _a = persistence.lock("a").await;
        let acquired = tokio::time::timeout(Duration::from_millis(100), persistence.lock("b")).await;
        assert!(acquired.is_ok());
    }
}
