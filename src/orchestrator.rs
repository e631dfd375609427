//! One-time consent flow that turns on offline support
//!
//! The first activation asks whether to install the offline shell and,
//! on yes, whether to cache images. Both answers are persisted and never
//! asked again. Asset failures while seeding images are counted, not raised,
//! and a failed shell install is reported in the outcome. A later activation
//! after a yes retries the install until the shell is active.

use crate::blob::BlobStore;
use crate::consent::{Consent, ConsentFlags};
use crate::error::{DexError, DexResult};
use crate::shell::{Fetcher, InstallReport, ShellCache, ShellState};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Source of the user's answers
#[async_trait]
pub trait ConsentPrompt: Send + Sync {
    /// Whether to make the app available offline
    async fn offer_install(&self) -> DexResult<bool>;

    /// Whether to also cache images
    async fn offer_image_cache(&self) -> DexResult<bool>;
}

/// How one image asset fared while seeding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Stored,
    /// Already in the blob store
    Skipped,
    Failed,
}

/// Progress hooks for image seeding
pub trait SeedObserver: Send + Sync {
    fn started(&self, _total: usize) {}
    fn asset_done(&self, _id: &str, _outcome: SeedOutcome) {}
    fn finished(&self, _report: &SeedReport) {}
}

impl SeedObserver for () {}

/// Counts from one seeding pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub stored: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl SeedReport {
    fn record(&mut self, outcome: SeedOutcome) {
        match outcome {
            SeedOutcome::Stored => self.stored += 1,
            SeedOutcome::Skipped => self.skipped += 1,
            SeedOutcome::Failed => self.failed += 1,
        }
    }
}

/// Result of the shell install step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellOutcome {
    Installed(InstallReport),
    Failed(String),
}

/// What `maybe_activate` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Install consent was already recorded and nothing is left to do
    AlreadyDecided(Consent),
    /// User said no
    Declined,
    /// User said yes
    Activated {
        /// `None` when image caching was declined
        images: Option<SeedReport>,
        shell: ShellOutcome,
    },
    /// Consent was yes but the shell never became active; retried without asking
    Resumed {
        images: Option<SeedReport>,
        shell: ShellOutcome,
    },
}

pub struct CacheOrchestrator {
    consent: ConsentFlags,
    blobs: Option<BlobStore>,
    fetcher: Arc<dyn Fetcher>,
    shell: Arc<ShellCache>,
    image_assets: Vec<String>,
}

impl CacheOrchestrator {
    pub fn new(
        consent: ConsentFlags,
        blobs: Option<BlobStore>,
        fetcher: Arc<dyn Fetcher>,
        shell: Arc<ShellCache>,
        image_assets: Vec<String>,
    ) -> Self {
        Self {
            consent,
            blobs,
            fetcher,
            shell,
            image_assets,
        }
    }

    /// Ask for offline consent once, then seed images and install the shell
    pub async fn maybe_activate(
        &self,
        prompt: &dyn ConsentPrompt,
        observer: &dyn SeedObserver,
    ) -> DexResult<Activation> {
        let install = self.consent.install().await?;
        if install.is_yes() {
            let state = self.shell.state().await;
            if state != ShellState::Active {
                info!("Offline mode enabled but shell is {}; installing again", state);
                let (images, shell) = self.enable(prompt, observer).await?;
                return Ok(Activation::Resumed { images, shell });
            }
        }
        if install.is_set() {
            debug!("Install consent already {}", install);
            return Ok(Activation::AlreadyDecided(install));
        }

        if !prompt.offer_install().await? {
            self.consent.set_install(Consent::No).await?;
            info!("Offline install declined");
            return Ok(Activation::Declined);
        }
        self.consent.set_install(Consent::Yes).await?;

        let (images, shell) = self.enable(prompt, observer).await?;
        Ok(Activation::Activated { images, shell })
    }

    /// Settle image consent, seed if wanted, then install the shell
    async fn enable(
        &self,
        prompt: &dyn ConsentPrompt,
        observer: &dyn SeedObserver,
    ) -> DexResult<(Option<SeedReport>, ShellOutcome)> {
        let mut images = self.consent.images().await?;
        if !images.is_set() {
            images = Consent::from_bool(prompt.offer_image_cache().await?);
            self.consent.set_images(images).await?;
        }

        let seeded = if images.is_yes() {
            Some(self.seed_images(observer).await)
        } else {
            None
        };

        let shell = match self.shell.install().await {
            Ok(report) => ShellOutcome::Installed(report),
            Err(e) => {
                warn!("Offline shell not installed: {}", e);
                ShellOutcome::Failed(e.to_string())
            }
        };

        Ok((seeded, shell))
    }

    /// Fetch every configured image into the blob store
    pub async fn seed_images(&self, observer: &dyn SeedObserver) -> SeedReport {
        let mut report = SeedReport::default();
        observer.started(self.image_assets.len());

        for id in &self.image_assets {
            let outcome = match self.seed_one(id).await {
                Ok(()) => SeedOutcome::Stored,
                Err(DexError::AlreadyExists(_)) => {
                    debug!("Image {} already cached", id);
                    SeedOutcome::Skipped
                }
                Err(e) if e.is_soft() => {
                    warn!("Failed to cache image {}: {}", id, e);
                    SeedOutcome::Failed
                }
                Err(e) => {
                    error!("Image {} could not be stored: {}", id, e);
                    SeedOutcome::Failed
                }
            };
            report.record(outcome);
            observer.asset_done(id, outcome);
        }

        info!(
            "Image seeding: {} stored, {} skipped, {} failed",
            report.stored, report.skipped, report.failed
        );
        observer.finished(&report);
        report
    }

    async fn seed_one(&self, id: &str) -> DexResult<()> {
        let blobs = self
            .blobs
            .as_ref()
            .ok_or_else(|| DexError::unavailable("images", "blob store not open"))?;

        let url = self.shell.scope().resolve(id)?;
        let timeout = self.shell.fetch_timeout();
        let response = tokio::time::timeout(timeout, self.fetcher.fetch(url.as_str()))
            .await
            .map_err(|_| DexError::FetchTimeout {
                url: url.to_string(),
                secs: timeout.as_secs(),
            })??;

        if !response.is_ok() {
            return Err(DexError::fetch_failed(
                url.as_str(),
                format!("HTTP {}", response.status),
            ));
        }

        blobs.put(id, &response.body).await
    }
}
