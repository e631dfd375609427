//! Full application reset
//!
//! Every step runs even when an earlier one fails; the first failure is
//! returned once all steps have been attempted.

use crate::blob::BlobStore;
use crate::error::{DexError, DexResult};
use crate::shell::ShellCache;
use crate::store::Persistence;
use tracing::{info, warn};

/// What a successful reset removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetReport {
    /// Named caches deleted
    pub caches_deleted: usize,
    /// Whether the blob collection was destroyed
    pub images_cleared: bool,
}

/// Unregister the shell and wipe caches, persisted state, and blobs
pub async fn reset_all(
    shell: &ShellCache,
    store: &Persistence,
    blobs: Option<&BlobStore>,
) -> DexResult<ResetReport> {
    let mut report = ResetReport::default();
    let mut failures: Vec<String> = vec![];

    if let Err(e) = shell.unregister().await {
        warn!("Reset: unregistering shell failed: {}", e);
        failures.push(e.to_string());
    }

    match shell.storage().delete_all().await {
        Ok(count) => report.caches_deleted = count,
        Err(e) => {
            warn!("Reset: deleting caches failed: {}", e);
            failures.push(e.to_string());
        }
    }

    if let Err(e) = store.clear().await {
        warn!("Reset: clearing storage failed: {}", e);
        failures.push(e.to_string());
    }

    if let Some(blobs) = blobs {
        match blobs.destroy().await {
            Ok(()) => report.images_cleared = true,
            Err(e) => {
                warn!("Reset: clearing images failed: {}", e);
                failures.push(e.to_string());
            }
        }
    }

    if let Some(first) = failures.into_iter().next() {
        return Err(DexError::ResetFailed(first));
    }

    info!(
        "Reset complete: {} caches deleted, images cleared: {}",
        report.caches_deleted, report.images_cleared
    );
    Ok(report)
}
