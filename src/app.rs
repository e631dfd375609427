//! Wiring of stores, shell, and flows for one data directory

use crate::blob::{BlobStore, IMAGES_COLLECTION};
use crate::card::{first_found_text, render_card, Card, CardOptions};
use crate::catalog::{Catalog, ScanParams};
use crate::config::Config;
use crate::consent::ConsentFlags;
use crate::error::{DexError, DexResult};
use crate::ledger::{key_of, DiscoveryLedger, DiscoveryRecord, Item};
use crate::orchestrator::CacheOrchestrator;
use crate::reset::{self, ResetReport};
use crate::shell::{CacheStorage, Fetcher, HttpFetcher, Scope, ShellCache, ShellManifest};
use crate::store::{FileStore, Persistence};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

const STORAGE_FILE: &str = "storage.json";
const CACHES_DIR: &str = "caches";
const REGISTRATION_FILE: &str = "shell.json";

/// Where a discovered item's image stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageStatus {
    /// The item has no image
    None,
    /// Image caching is off; the image loads from the network
    Remote(String),
    /// Served from the blob store
    Cached { id: String, bytes: usize },
    /// Caching is on but the image is missing; show the placeholder
    Placeholder(String),
}

/// Outcome of one scan
#[derive(Debug, Clone)]
pub struct DiscoverOutcome {
    pub item: Item,
    /// `None` when the item has no usable key and was not saved
    pub key: Option<String>,
    pub is_new: bool,
    pub card: Card,
    pub image: ImageStatus,
}

/// Everything bound to one data directory
pub struct App {
    config: Config,
    data_dir: PathBuf,
    store: Persistence,
    blobs: Option<BlobStore>,
    ledger: DiscoveryLedger,
    consent: ConsentFlags,
    fetcher: Arc<dyn Fetcher>,
    shell: Arc<ShellCache>,
    catalog: Catalog,
}

impl App {
    /// Open the app over `data_dir` with the HTTP fetcher
    pub async fn open(config: Config, data_dir: PathBuf) -> DexResult<Self> {
        let timeout = Duration::from_secs(config.shell.fetch_timeout_secs);
        Self::with_fetcher(config, data_dir, Arc::new(HttpFetcher::new(timeout))).await
    }

    /// Open the app with an injected network
    pub async fn with_fetcher(
        config: Config,
        data_dir: PathBuf,
        fetcher: Arc<dyn Fetcher>,
    ) -> DexResult<Self> {
        debug!("Opening data directory {}", data_dir.display());

        let store = match FileStore::open(data_dir.join(STORAGE_FILE)).await {
            Ok(file) => Persistence::new(Arc::new(file)),
            Err(e) if e.is_soft() => {
                warn!("Storage unavailable, nothing will be saved this run: {}", e);
                Persistence::in_memory()
            }
            Err(e) => return Err(e),
        };

        let blobs = match BlobStore::open(&data_dir, IMAGES_COLLECTION).await {
            Ok(blobs) => Some(blobs),
            Err(e) => {
                warn!("Image store unavailable, continuing without it: {}", e);
                None
            }
        };

        let ledger = DiscoveryLedger::with_cooldown(
            store.clone(),
            Duration::from_secs(config.ledger.cooldown_secs),
        );
        let consent = ConsentFlags::new(store.clone());

        let scope = Scope::new(&config.shell.origin, &config.shell.detail_route)?;
        let caches = data_dir.join(CACHES_DIR);
        let storage = match CacheStorage::open(&caches).await {
            Ok(storage) => storage,
            Err(e) if e.is_soft() => {
                warn!("Cache root not ready, offline shell disabled for now: {}", e);
                CacheStorage::at(caches)
            }
            Err(e) => return Err(e),
        };
        let shell = ShellCache::new(
            storage,
            fetcher.clone(),
            scope,
            ShellManifest::from_config(&config.shell),
            data_dir.join(REGISTRATION_FILE),
        )
        .with_fetch_timeout(Duration::from_secs(config.shell.fetch_timeout_secs));

        let catalog = Catalog::new(config.catalog.clone());

        Ok(Self {
            config,
            data_dir,
            store,
            blobs,
            ledger,
            consent,
            fetcher,
            shell: Arc::new(shell),
            catalog,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn store(&self) -> &Persistence {
        &self.store
    }

    pub fn blobs(&self) -> Option<&BlobStore> {
        self.blobs.as_ref()
    }

    pub fn ledger(&self) -> &DiscoveryLedger {
        &self.ledger
    }

    pub fn consent(&self) -> &ConsentFlags {
        &self.consent
    }

    pub fn shell(&self) -> &ShellCache {
        &self.shell
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn orchestrator(&self) -> CacheOrchestrator {
        CacheOrchestrator::new(
            self.consent.clone(),
            self.blobs.clone(),
            self.fetcher.clone(),
            self.shell.clone(),
            self.config.images.assets.clone(),
        )
    }

    /// Resolve a scan, record it, and build its card
    ///
    /// Returns `None` when the scan names no known item. The card shows the
    /// stats as they stood before this scan. Storage failures are logged and
    /// the card still renders.
    pub async fn discover(&self, params: &ScanParams) -> Option<DiscoverOutcome> {
        let item = self.catalog.resolve(params)?;
        let key = key_of(&item);
        let now = Utc::now().timestamp_millis();

        let previous = match key.as_deref() {
            Some(key) => {
                let previous = match self.ledger.get_discovery(key).await {
                    Ok(previous) => previous,
                    Err(e) => {
                        log_boundary_error(&format!("Discovery of {} unreadable", key), &e);
                        None
                    }
                };
                if let Err(e) = self.ledger.record_discovery(key, &item, now).await {
                    log_boundary_error(&format!("Discovery of {} not saved", key), &e);
                }
                previous
            }
            None => {
                warn!("Item has no id or name; discovery not saved");
                None
            }
        };
        let is_new = previous.is_none();

        let card = render_card(&item, &card_options(is_new, previous.as_ref()));
        let image = self.image_status(&item).await;

        Some(DiscoverOutcome {
            item,
            key,
            is_new,
            card,
            image,
        })
    }

    /// Card with stats for a stored discovery
    pub async fn show(&self, key: &str) -> DexResult<Option<Card>> {
        Ok(self
            .ledger
            .get_discovery(key)
            .await?
            .map(|record| render_card(&record.item(), &card_options(false, Some(&record)))))
    }

    /// Wipe everything under the data directory's stores
    pub async fn reset(&self) -> DexResult<ResetReport> {
        reset::reset_all(&self.shell, &self.store, self.blobs.as_ref()).await
    }

    async fn image_status(&self, item: &Item) -> ImageStatus {
        let Some(image) = item.image.as_deref().filter(|i| !i.is_empty()) else {
            return ImageStatus::None;
        };

        let caching = match self.consent.images().await {
            Ok(consent) => consent.is_yes(),
            Err(e) => {
                warn!("Image consent unreadable: {}", e);
                false
            }
        };
        if !caching {
            return ImageStatus::Remote(image.to_string());
        }

        let placeholder = || ImageStatus::Placeholder(self.config.images.placeholder.clone());
        let Some(blobs) = &self.blobs else {
            return placeholder();
        };
        match blobs.get(image).await {
            Ok(Some(record)) => ImageStatus::Cached {
                id: record.id,
                bytes: record.blob.len(),
            },
            Ok(None) => {
                debug!("Image {} not cached, showing placeholder", image);
                placeholder()
            }
            Err(e) => {
                warn!("Image {} unreadable: {}", image, e);
                placeholder()
            }
        }
    }
}

/// Expected storage trouble is a warning; anything else is an error. Neither
/// stops the card from rendering.
fn log_boundary_error(context: &str, e: &DexError) {
    if e.is_soft() {
        warn!("{}: {}", context, e);
    } else {
        error!("{}: {}", context, e);
    }
}

fn card_options(is_new: bool, record: Option<&DiscoveryRecord>) -> CardOptions {
    CardOptions {
        show_stats: true,
        first_found: first_found_text(is_new, record.map_or(0, |r| r.first_found)),
        scans: record.map_or(1, |r| r.scans),
        is_new,
    }
}
