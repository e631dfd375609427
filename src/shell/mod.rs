//! Offline application shell
//!
//! Serves the application's own static assets cache-first from a versioned
//! named cache, falling back to the network and then to an offline page.
//!
//! # Lifecycle
//!
//! | State | Meaning |
//! |-------|---------|
//! | Uninstalled | No generation registered; requests pass straight through |
//! | Installing | Manifest fetch in progress |
//! | Active | One generation serves requests |
//!
//! Installation is all-or-nothing: every manifest resource is fetched before
//! anything is written, and a failure leaves the previous registration in
//! place. Activating a generation deletes every other generation.
//!
//! # Intercept order
//!
//! 1. Cache hit on the normalized key
//! 2. Network fetch of the original URL
//! 3. Navigation only: cached offline page, else a synthesized placeholder
//! 4. Anything else: no response

pub mod fetch;
pub mod request;
pub mod storage;

pub use fetch::{Fetcher, HttpFetcher};
pub use request::{RequestMode, Scope, ShellRequest, ShellResponse, OFFLINE_PLACEHOLDER};
pub use storage::CacheStorage;

use crate::config::schema::ShellConfig;
use crate::error::{DexError, DexResult};
use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info, warn};

/// Default per-resource timeout while installing
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Lifecycle state of the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellState {
    #[default]
    Uninstalled,
    Installing,
    Active,
}

impl fmt::Display for ShellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninstalled => write!(f, "uninstalled"),
            Self::Installing => write!(f, "installing"),
            Self::Active => write!(f, "active"),
        }
    }
}

/// Persisted registration record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub state: ShellState,
    pub generation: Option<String>,
    pub activated_at: Option<DateTime<Utc>>,
}

impl Registration {
    /// The generation serving requests, if any
    pub fn active_generation(&self) -> Option<&str> {
        match self.state {
            ShellState::Active => self.generation.as_deref(),
            _ => None,
        }
    }
}

/// Resources that make up one shell generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellManifest {
    pub generation: String,
    pub resources: Vec<String>,
    pub offline_page: String,
}

impl ShellManifest {
    pub fn from_config(config: &ShellConfig) -> Self {
        Self {
            generation: config.generation.clone(),
            resources: config.resources.clone(),
            offline_page: config.offline_page.clone(),
        }
    }
}

/// Summary of a successful install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub generation: String,
    pub resources: usize,
    /// Older generations deleted on activation
    pub reaped: Vec<String>,
}

/// The offline shell cache
pub struct ShellCache {
    storage: CacheStorage,
    fetcher: Arc<dyn Fetcher>,
    scope: Scope,
    manifest: ShellManifest,
    registration_path: PathBuf,
    fetch_timeout: Duration,
}

impl ShellCache {
    pub fn new(
        storage: CacheStorage,
        fetcher: Arc<dyn Fetcher>,
        scope: Scope,
        manifest: ShellManifest,
        registration_path: PathBuf,
    ) -> Self {
        Self {
            storage,
            fetcher,
            scope,
            manifest,
            registration_path,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Override the per-resource install timeout
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    pub fn manifest(&self) -> &ShellManifest {
        &self.manifest
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    /// Current registration (default when never installed)
    pub async fn registration(&self) -> DexResult<Registration> {
        match fs::read_to_string(&self.registration_path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Registration::default()),
            Err(e) => Err(DexError::io(
                format!("reading {}", self.registration_path.display()),
                e,
            )),
        }
    }

    /// Current lifecycle state; unreadable registrations count as uninstalled
    pub async fn state(&self) -> ShellState {
        match self.registration().await {
            Ok(registration) => registration.state,
            Err(e) => {
                warn!("Shell registration unreadable: {}", e);
                ShellState::Uninstalled
            }
        }
    }

    /// Fetch the whole manifest into its generation and activate it
    pub async fn install(&self) -> DexResult<InstallReport> {
        let generation = self.manifest.generation.clone();
        let previous = self.registration().await.unwrap_or_default();

        self.write_registration(&Registration {
            state: ShellState::Installing,
            generation: Some(generation.clone()),
            activated_at: None,
        })
        .await?;
        info!("Installing shell {} ({} resources)", generation, self.manifest.resources.len());

        let fetched = match try_join_all(
            self.manifest
                .resources
                .iter()
                .map(|resource| self.fetch_for_install(resource)),
        )
        .await
        {
            Ok(fetched) => fetched,
            Err(e) => return Err(self.abort_install(&previous, &generation, e, false).await),
        };

        for (key, response) in &fetched {
            if let Err(e) = self.storage.put(&generation, key, response).await {
                return Err(self.abort_install(&previous, &generation, e, true).await);
            }
        }

        let reaped = self.activate(&generation).await?;
        info!("Shell {} active", generation);

        Ok(InstallReport {
            generation,
            resources: fetched.len(),
            reaped,
        })
    }

    /// Resolve one request through the cache-first fallback chain
    pub async fn intercept(&self, request: &ShellRequest) -> Option<ShellResponse> {
        let url = match self.scope.resolve(&request.url) {
            Ok(url) => url,
            Err(e) => {
                warn!("Rejecting request: {}", e);
                return None;
            }
        };

        let registration = match self.registration().await {
            Ok(registration) => registration,
            Err(e) => {
                warn!("Shell registration unreadable, passing through: {}", e);
                Registration::default()
            }
        };
        let Some(generation) = registration.active_generation() else {
            return self.pass_through(url.as_str()).await;
        };

        let key = self.scope.cache_key(&url);
        match self.storage.lookup(generation, &key).await {
            Ok(Some(cached)) => {
                debug!("Cache hit: {}", key);
                return Some(cached);
            }
            Ok(None) => debug!("Cache miss: {}", key),
            Err(e) => warn!("Cache lookup for {} failed, treating as miss: {}", key, e),
        }

        match self.fetcher.fetch(url.as_str()).await {
            Ok(response) => Some(response),
            Err(e) => {
                debug!("Network fetch failed for {}: {}", url, e);
                if request.is_navigation() {
                    Some(self.offline_response(generation).await)
                } else {
                    None
                }
            }
        }
    }

    /// Drop the registration; cached generations stay until deleted
    pub async fn unregister(&self) -> DexResult<()> {
        match fs::remove_file(&self.registration_path).await {
            Ok(()) => {
                info!("Shell unregistered");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DexError::io(
                format!("removing {}", self.registration_path.display()),
                e,
            )),
        }
    }

    async fn fetch_for_install(&self, resource: &str) -> DexResult<(String, ShellResponse)> {
        let url = self.scope.resolve(resource)?;
        let key = self.scope.cache_key(&url);

        let response = tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(url.as_str()))
            .await
            .map_err(|_| DexError::FetchTimeout {
                url: url.to_string(),
                secs: self.fetch_timeout.as_secs(),
            })?
            .map_err(|e| DexError::fetch_failed(url.as_str(), e.to_string()))?;

        if !response.is_ok() {
            return Err(DexError::fetch_failed(
                url.as_str(),
                format!("HTTP {}", response.status),
            ));
        }

        debug!("Fetched {} for install", key);
        Ok((key, response))
    }

    async fn abort_install(
        &self,
        previous: &Registration,
        generation: &str,
        cause: DexError,
        discard_generation: bool,
    ) -> DexError {
        warn!("Shell install of {} failed: {}", generation, cause);

        // Only discard a generation this install created
        if discard_generation && previous.active_generation() != Some(generation) {
            if let Err(e) = self.storage.delete(generation).await {
                warn!("Failed to discard partial cache {}: {}", generation, e);
            }
        }

        let restored = if previous.state == ShellState::Installing {
            Registration::default()
        } else {
            previous.clone()
        };
        if let Err(e) = self.write_registration(&restored).await {
            warn!("Failed to restore shell registration: {}", e);
        }

        DexError::InstallFailed {
            generation: generation.to_string(),
            reason: cause.to_string(),
        }
    }

    async fn activate(&self, generation: &str) -> DexResult<Vec<String>> {
        self.write_registration(&Registration {
            state: ShellState::Active,
            generation: Some(generation.to_string()),
            activated_at: Some(Utc::now()),
        })
        .await?;

        let mut reaped = vec![];
        for name in self.storage.keys().await? {
            if name == generation {
                continue;
            }
            match self.storage.delete(&name).await {
                Ok(_) => {
                    info!("Reaped stale shell generation {}", name);
                    reaped.push(name);
                }
                Err(e) => warn!("Failed to reap generation {}: {}", name, e),
            }
        }
        Ok(reaped)
    }

    async fn pass_through(&self, url: &str) -> Option<ShellResponse> {
        match self.fetcher.fetch(url).await {
            Ok(response) => Some(response),
            Err(e) => {
                debug!("Pass-through fetch failed for {}: {}", url, e);
                None
            }
        }
    }

    async fn offline_response(&self, generation: &str) -> ShellResponse {
        let cached = match self.scope.normalize(&self.manifest.offline_page) {
            Ok(key) => self.storage.lookup(generation, &key).await.unwrap_or_else(|e| {
                warn!("Offline page lookup failed: {}", e);
                None
            }),
            Err(e) => {
                warn!("Offline page path invalid: {}", e);
                None
            }
        };
        cached.unwrap_or_else(ShellResponse::offline_placeholder)
    }

    async fn write_registration(&self, registration: &Registration) -> DexResult<()> {
        if let Some(parent) = self.registration_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DexError::io(format!("creating {}", parent.display()), e))?;
        }
        let content = serde_json::to_string_pretty(registration)?;
        fs::write(&self.registration_path, content).await.map_err(|e| {
            DexError::io(
                format!("writing {}", self.registration_path.display()),
                e,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::fetch::fake::FakeFetcher;
    use super::*;
    use tempfile::TempDir;

    const ORIGIN: &str = "http://localhost:8080";

    struct Harness {
        shell: ShellCache,
        fetcher: Arc<FakeFetcher>,
        _temp: TempDir,
    }

    fn manifest(generation: &str) -> ShellManifest {
        ShellManifest {
            generation: generation.to_string(),
            resources: vec![
                "/".to_string(),
                "/duck.html".to_string(),
                "/app.js".to_string(),
                "/offline.html".to_string(),
            ],
            offline_page: "/offline.html".to_string(),
        }
    }

    fn serve_all(fetcher: &FakeFetcher) {
        fetcher
            .serve(&format!("{ORIGIN}/"), 200, "home")
            .serve(&format!("{ORIGIN}/duck.html"), 200, "detail")
            .serve(&format!("{ORIGIN}/app.js"), 200, "js")
            .serve(&format!("{ORIGIN}/offline.html"), 200, "you are offline");
    }

    async fn harness_with(temp: TempDir, fetcher: Arc<FakeFetcher>, generation: &str) -> Harness {
        let storage = CacheStorage::open(temp.path().join("caches")).await.unwrap();
        let scope = Scope::new(ORIGIN, "/duck.html").unwrap();
        let shell = ShellCache::new(
            storage,
            fetcher.clone(),
            scope,
            manifest(generation),
            temp.path().join("shell.json"),
        );
        Harness {
            shell,
            fetcher,
            _temp: temp,
        }
    }

    async fn harness() -> Harness {
        harness_with(TempDir::new().unwrap(), Arc::new(FakeFetcher::new()), "duck-cache-v1").await
    }

    #[tokio::test]
    async fn starts_uninstalled() {
        let h = harness().await;
        assert_eq!(h.shell.state().await, ShellState::Uninstalled);
    }

    #[tokio::test]
    async fn install_activates_generation() {
        let h = harness().await;
        serve_all(&h.fetcher);

        let report = h.shell.install().await.unwrap();

        assert_eq!(report.generation, "duck-cache-v1");
        assert_eq!(report.resources, 4);
        assert_eq!(h.shell.state().await, ShellState::Active);
        let hit = h.shell.storage().lookup("duck-cache-v1", "/app.js").await.unwrap();
        assert_eq!(hit.unwrap().text(), "js");
    }

    #[tokio::test]
    async fn install_is_all_or_nothing() {
        let h = harness().await;
        serve_all(&h.fetcher);
        h.fetcher.serve(&format!("{ORIGIN}/app.js"), 404, "missing");

        let err = h.shell.install().await.unwrap_err();

        assert!(matches!(err, DexError::InstallFailed { .. }));
        assert_eq!(h.shell.state().await, ShellState::Uninstalled);
        for key in ["/", "/duck.html", "/app.js", "/offline.html"] {
            assert!(h.shell.storage().lookup("duck-cache-v1", key).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn install_fails_on_unreachable_resource() {
        let h = harness().await;
        h.fetcher.serve(&format!("{ORIGIN}/"), 200, "home");

        assert!(h.shell.install().await.is_err());
        assert!(!h.shell.storage().has("duck-cache-v1").await);
    }

    #[tokio::test]
    async fn hung_fetch_times_out_install() {
        let temp = TempDir::new().unwrap();
        let fetcher = Arc::new(FakeFetcher::new());
        serve_all(&fetcher);
        fetcher.hang(&format!("{ORIGIN}/app.js"));
        let mut h = harness_with(temp, fetcher, "duck-cache-v1").await;
        h.shell = h.shell.with_fetch_timeout(Duration::from_millis(50));

        let err = h.shell.install().await.unwrap_err();

        match err {
            DexError::InstallFailed { reason, .. } => assert!(reason.contains("timed out")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(h.shell.state().await, ShellState::Uninstalled);
    }

    #[tokio::test]
    async fn failed_upgrade_keeps_previous_generation() {
        let temp = TempDir::new().unwrap();
        let fetcher = Arc::new(FakeFetcher::new());
        serve_all(&fetcher);
        let v1 = harness_with(temp, fetcher.clone(), "duck-cache-v1").await;
        v1.shell.install().await.unwrap();

        fetcher.set_offline(true);
        let v2 = ShellCache::new(
            v1.shell.storage().clone(),
            fetcher.clone(),
            v1.shell.scope().clone(),
            manifest("duck-cache-v2"),
            v1._temp.path().join("shell.json"),
        );
        assert!(v2.install().await.is_err());

        let registration = v2.registration().await.unwrap();
        assert_eq!(registration.active_generation(), Some("duck-cache-v1"));
    }

    #[tokio::test]
    async fn activation_reaps_old_generations() {
        let temp = TempDir::new().unwrap();
        let fetcher = Arc::new(FakeFetcher::new());
        serve_all(&fetcher);
        let v1 = harness_with(temp, fetcher.clone(), "duck-cache-v1").await;
        v1.shell.install().await.unwrap();

        let v2 = ShellCache::new(
            v1.shell.storage().clone(),
            fetcher,
            v1.shell.scope().clone(),
            manifest("duck-cache-v2"),
            v1._temp.path().join("shell.json"),
        );
        let report = v2.install().await.unwrap();

        assert_eq!(report.reaped, vec!["duck-cache-v1"]);
        assert_eq!(v2.storage().keys().await.unwrap(), vec!["duck-cache-v2"]);
    }

    #[tokio::test]
    async fn detail_requests_share_one_entry() {
        let h = harness().await;
        serve_all(&h.fetcher);
        h.shell.install().await.unwrap();
        h.fetcher.set_offline(true);
        let calls = h.fetcher.calls();

        let a = h.shell.intercept(&ShellRequest::navigate("/duck.html?x=1")).await.unwrap();
        let b = h.shell.intercept(&ShellRequest::navigate("/duck.html?x=2")).await.unwrap();

        assert_eq!(a.text(), "detail");
        assert_eq!(a, b);
        assert_eq!(h.fetcher.calls(), calls, "cache hits must not touch the network");
    }

    #[tokio::test]
    async fn miss_goes_to_network() {
        let h = harness().await;
        serve_all(&h.fetcher);
        h.shell.install().await.unwrap();
        h.fetcher.serve(&format!("{ORIGIN}/images/duck_hat.png"), 200, "png");

        let response = h
            .shell
            .intercept(&ShellRequest::subresource("/images/duck_hat.png"))
            .await
            .unwrap();
        assert_eq!(response.text(), "png");
    }

    #[tokio::test]
    async fn offline_navigation_gets_offline_page() {
        let h = harness().await;
        serve_all(&h.fetcher);
        h.shell.install().await.unwrap();
        h.fetcher.set_offline(true);

        let response = h
            .shell
            .intercept(&ShellRequest::navigate("/myducks.html"))
            .await
            .unwrap();
        assert_eq!(response.text(), "you are offline");
    }

    #[tokio::test]
    async fn offline_subresource_gets_nothing() {
        let h = harness().await;
        serve_all(&h.fetcher);
        h.shell.install().await.unwrap();
        h.fetcher.set_offline(true);

        let response = h
            .shell
            .intercept(&ShellRequest::subresource("/images/duck_hat.png"))
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn offline_navigation_without_offline_page_gets_placeholder() {
        let h = harness().await;
        serve_all(&h.fetcher);
        h.shell.install().await.unwrap();
        h.shell
            .storage()
            .delete("duck-cache-v1")
            .await
            .unwrap();
        h.fetcher.set_offline(true);

        let response = h
            .shell
            .intercept(&ShellRequest::navigate("/myducks.html"))
            .await
            .unwrap();
        assert_eq!(response.text(), OFFLINE_PLACEHOLDER);
    }

    #[tokio::test]
    async fn inactive_shell_passes_through() {
        let h = harness().await;
        h.fetcher.serve(&format!("{ORIGIN}/index.html"), 200, "live");

        let response = h
            .shell
            .intercept(&ShellRequest::navigate("/index.html"))
            .await
            .unwrap();
        assert_eq!(response.text(), "live");

        h.fetcher.set_offline(true);
        assert!(h
            .shell
            .intercept(&ShellRequest::navigate("/index.html"))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn unregister_returns_to_uninstalled() {
        let h = harness().await;
        serve_all(&h.fetcher);
        h.shell.install().await.unwrap();

        h.shell.unregister().await.unwrap();
        h.shell.unregister().await.unwrap();

        assert_eq!(h.shell.state().await, ShellState::Uninstalled);
    }
}
