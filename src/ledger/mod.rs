//! Discovery ledger
//!
//! Durable map of item key → [`DiscoveryRecord`], stored as one JSON
//! document under [`LEDGER_KEY`]. Every call loads the whole ledger, applies
//! its change and writes it back before returning, holding the key lock
//! for the full cycle.
//!
//! Repeat scans inside the cooldown window are absorbed: the record is
//! left exactly as it was.

mod record;

pub use record::{key_of, DiscoveryRecord, Item};

use crate::error::{DexError, DexResult};
use crate::store::Persistence;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Persistence key holding the serialized ledger
pub const LEDGER_KEY: &str = "discoveries";

/// Persistence key set once anything has been saved
pub const VISITED_KEY: &str = "visited";

/// Default minimum gap between two counted scans
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5 * 60);

type Ledger = BTreeMap<String, DiscoveryRecord>;

/// Result of recording a discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub is_new: bool,
    pub record: DiscoveryRecord,
}

/// Discovery ledger over the shared persistence service
#[derive(Clone)]
pub struct DiscoveryLedger {
    store: Persistence,
    cooldown_ms: i64,
}

impl DiscoveryLedger {
    /// Ledger with the default five minute cooldown
    pub fn new(store: Persistence) -> Self {
        Self::with_cooldown(store, DEFAULT_COOLDOWN)
    }

    /// Ledger with a custom cooldown
    pub fn with_cooldown(store: Persistence, cooldown: Duration) -> Self {
        Self {
            store,
            cooldown_ms: i64::try_from(cooldown.as_millis()).unwrap_or(i64::MAX),
        }
    }

    /// Record a scan of `item` under `key` at `now` (ms since epoch)
    pub async fn record_discovery(&self, key: &str, item: &Item, now: i64) -> DexResult<Discovery> {
        if key.is_empty() {
            warn!("Missing id or name; discovery not saved");
            return Err(DexError::InvalidKey);
        }

        let _guard = self.store.lock(LEDGER_KEY).await;
        let mut ledger = self.load().await?;

        let discovery = match ledger.get_mut(key) {
            None => {
                let record = DiscoveryRecord::first(key, item, now);
                ledger.insert(key.to_string(), record.clone());
                info!("New discovery: {}", key);
                Discovery {
                    is_new: true,
                    record,
                }
            }
            Some(record) => {
                if now - record.last_scanned > self.cooldown_ms {
                    record.scans += 1;
                    record.last_scanned = now;
                    debug!("Repeat scan of {} counted ({} scans)", key, record.scans);
                } else {
                    debug!("Repeat scan of {} inside cooldown, ignored", key);
                }
                Discovery {
                    is_new: false,
                    record: record.clone(),
                }
            }
        };

        self.save(&ledger).await?;
        self.store.set(VISITED_KEY, "true").await?;
        Ok(discovery)
    }

    /// Look up a discovery without side effects
    pub async fn get_discovery(&self, key: &str) -> DexResult<Option<DiscoveryRecord>> {
        Ok(self.load().await?.remove(key))
    }

    /// All discoveries, most recently found first
    pub async fn list(&self) -> DexResult<Vec<DiscoveryRecord>> {
        let mut records: Vec<_> = self.load().await?.into_values().collect();
        records.sort_by(|a, b| {
            b.first_found
                .cmp(&a.first_found)
                .then_with(|| a.key.cmp(&b.key))
        });
        Ok(records)
    }

    /// Number of distinct discoveries
    pub async fn len(&self) -> DexResult<usize> {
        Ok(self.load().await?.len())
    }

    pub async fn is_empty(&self) -> DexResult<bool> {
        Ok(self.len().await? == 0)
    }

    /// Whether anything has ever been recorded
    pub async fn has_visited(&self) -> DexResult<bool> {
        Ok(self.store.get(VISITED_KEY).await?.as_deref() == Some("true"))
    }

    /// Drop the entire ledger
    pub async fn reset_all(&self) -> DexResult<()> {
        let _guard = self.store.lock(LEDGER_KEY).await;
        self.store.remove(LEDGER_KEY).await?;
        info!("Ledger cleared");
        Ok(())
    }

    async fn load(&self) -> DexResult<Ledger> {
        match self.store.get(LEDGER_KEY).await? {
            Some(content) if !content.trim().is_empty() => Ok(serde_json::from_str(&content)?),
            _ => Ok(Ledger::new()),
        }
    }

    async fn save(&self, ledger: &Ledger) -> DexResult<()> {
        let content = serde_json::to_string(ledger)?;
        self.store.set(LEDGER_KEY, &content).await
    }
}
