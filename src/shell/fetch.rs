//! Network access
//!
//! The network is a black box behind [`Fetcher`]. [`HttpFetcher`] runs the
//! blocking `ureq` client on the blocking thread pool.

use super::request::ShellResponse;
use crate::error::{DexError, DexResult};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Largest body accepted from the network
const MAX_BODY_BYTES: u64 = 32 * 1024 * 1024;

/// Abstract network fetch
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch an absolute URL
    ///
    /// Transport failures are `NetworkUnavailable`. HTTP error statuses are
    /// returned as responses; callers decide whether they count as failures.
    async fn fetch(&self, url: &str) -> DexResult<ShellResponse>;
}

/// HTTP fetcher backed by `ureq`
#[derive(Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// Fetcher whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> DexResult<ShellResponse> {
        let agent = self.agent.clone();
        let target = url.to_string();
        tokio::task::spawn_blocking(move || fetch_blocking(&agent, &target))
            .await
            .map_err(|e| DexError::Internal(format!("Fetch task failed: {}", e)))?
    }
}

fn fetch_blocking(agent: &ureq::Agent, url: &str) -> DexResult<ShellResponse> {
    debug!("GET {}", url);
    let mut response = agent
        .get(url)
        .call()
        .map_err(|e| DexError::NetworkUnavailable(format!("{}: {}", url, e)))?;

    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response
        .body_mut()
        .with_config()
        .limit(MAX_BODY_BYTES)
        .read_to_vec()
        .map_err(|e| DexError::NetworkUnavailable(format!("{}: reading body: {}", url, e)))?;

    debug!("GET {} -> {} ({} bytes)", url, status, body.len());
    Ok(ShellResponse {
        status,
        content_type,
        body,
    })
}

/// Scripted fetcher for tests
#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct FakeFetcher {
        responses: Mutex<HashMap<String, ShellResponse>>,
        hanging: Mutex<HashSet<String>>,
        offline: AtomicBool,
        calls: AtomicUsize,
    }

    impl FakeFetcher {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn serve(&self, url: &str, status: u16, body: &str) -> &Self {
            self.responses.lock().unwrap().insert(
                url.to_string(),
                ShellResponse {
                    status,
                    content_type: Some("text/html".to_string()),
                    body: body.as_bytes().to_vec(),
                },
            );
            self
        }

        pub(crate) fn hang(&self, url: &str) -> &Self {
            self.hanging.lock().unwrap().insert(url.to_string());
            self
        }

        pub(crate) fn set_offline(&self, offline: bool) {
            self.offline.store(offline, Ordering::SeqCst);
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Fetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> DexResult<ShellResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.offline.load(Ordering::SeqCst) {
                return Err(DexError::NetworkUnavailable(format!("{}: offline", url)));
            }
            let hangs = self.hanging.lock().unwrap().contains(url);
            if hangs {
                std::future::pending::<()>().await;
            }
            let response = self.responses.lock().unwrap().get(url).cloned();
            response.ok_or_else(|| DexError::NetworkUnavailable(format!("{}: unreachable", url)))
        }
    }
}
