//! # Sync State
//!
//! Tracks whether the local catalog must be fetched before browsing, and
//! exposes the engine's list sync status.
//!
//! ## Flow
//! ```text
//! startup ──► needs_sync = (species rows == 0)
//!                │
//!          true  ▼
//!        start_sync() ──► Syncing ──► Synced(count) ──► needs_sync = false
//!                                 └─► Failed(message)   (needs_sync unchanged,
//!                                                        offer retry)
//! ```

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

use pokedex_sync::{CatalogSyncEngine, SyncStatus};

use crate::error::AppResult;

/// Sync state for the catalog screen.
#[derive(Clone)]
pub struct SyncController {
    engine: CatalogSyncEngine,

    /// Cached "catalog is empty" flag
    needs_sync: Arc<RwLock<bool>>,
}

impl SyncController {
    /// Creates the controller and checks whether the catalog is empty.
    pub async fn new(engine: CatalogSyncEngine) -> AppResult<Self> {
        let needs_sync = engine.needs_sync().await?;
        Ok(SyncController {
            engine,
            needs_sync: Arc::new(RwLock::new(needs_sync)),
        })
    }

    /// True until a list sync has succeeded against an empty catalog.
    pub fn needs_sync(&self) -> bool {
        self.needs_sync.read().map(|n| *n).unwrap_or(true)
    }

    fn set_needs_sync(&self, value: bool) {
        if let Ok(mut n) = self.needs_sync.write() {
            *n = value;
        }
    }

    pub fn status(&self) -> SyncStatus {
        self.engine.status()
    }

    /// Observes status transitions of the underlying engine.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.engine.subscribe_status()
    }

    pub fn engine(&self) -> &CatalogSyncEngine {
        &self.engine
    }

    /// Runs a list sync. `needs_sync` is recomputed from the stored rows
    /// after it succeeds.
    pub async fn start_sync(&self) -> AppResult<usize> {
        match self.engine.sync_catalog_list().await {
            Ok(count) => {
                let needs_sync = self.engine.needs_sync().await?;
                self.set_needs_sync(needs_sync);
                if needs_sync {
                    warn!("Remote catalog returned no species");
                } else {
                    info!(count, "Catalog ready");
                }
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, retryable = e.is_retryable(), "Catalog sync failed");
                Err(e.into())
            }
        }
    }

    /// Drops the local catalog; the next start will sync again.
    pub async fn invalidate(&self) -> AppResult<u64> {
        let removed = self.engine.invalidate_catalog().await?;
        self.set_needs_sync(true);
        Ok(removed)
    }

    pub fn snapshot(&self) -> SyncStatusDto {
        SyncStatusDto::new(&self.status(), self.needs_sync())
    }
}

/// DTO for sync status in JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusDto {
    /// idle | syncing | synced | failed
    pub state: String,

    /// Entries written by the last successful sync
    pub count: Option<usize>,

    /// Last error message if any
    pub error_message: Option<String>,

    pub needs_sync: bool,
}

impl SyncStatusDto {
    pub fn new(status: &SyncStatus, needs_sync: bool) -> Self {
        let (state, count, error_message) = match status {
            SyncStatus::Idle => ("idle", None, None),
            SyncStatus::Syncing => ("syncing", None, None),
            SyncStatus::Synced { count } => ("synced", Some(*count), None),
            SyncStatus::Failed { message } => ("failed", None, Some(message.clone())),
        };

        SyncStatusDto {
            state: state.to_string(),
            count,
            error_message,
            needs_sync,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use crate::error::ErrorCode;
    use crate::state::test_support::{engine_with, StubApi};

    #[tokio::test]
    async fn test_needs_sync_flips_after_success() {
        let (engine, _api, _db) = engine_with(StubApi::default()).await;
        let controller = SyncController::new(engine).await.unwrap();
        assert!(controller.needs_sync());
        assert_eq!(controller.status(), SyncStatus::Idle);

        assert_eq!(controller.start_sync().await.unwrap(), 4);

        assert!(!controller.needs_sync());
        assert_eq!(
            controller.snapshot(),
            SyncStatusDto {
                state: "synced".into(),
                count: Some(4),
                error_message: None,
                needs_sync: false,
            }
        );
    }

    #[tokio::test]
    async fn test_failure_keeps_needs_sync() {
        let (engine, api, _db) = engine_with(StubApi::default()).await;
        api.fail.store(true, Ordering::SeqCst);
        let controller = SyncController::new(engine).await.unwrap();

        let err = controller.start_sync().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NetworkError);
        assert!(err.retryable);
        assert!(controller.needs_sync());

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.state, "failed");
        assert!(snapshot.error_message.unwrap().contains("offline"));

        // Retry succeeds once the remote is back.
        api.fail.store(false, Ordering::SeqCst);
        controller.start_sync().await.unwrap();
        assert!(!controller.needs_sync());
    }

    #[tokio::test]
    async fn test_empty_remote_list_still_needs_sync() {
        let (engine, api, _db) = engine_with(StubApi::default()).await;
        api.empty_list.store(true, Ordering::SeqCst);
        let controller = SyncController::new(engine.clone()).await.unwrap();

        assert_eq!(controller.start_sync().await.unwrap(), 0);
        assert_eq!(controller.status(), SyncStatus::Synced { count: 0 });
        assert!(controller.needs_sync());
        assert!(engine.needs_sync().await.unwrap());

        api.empty_list.store(false, Ordering::SeqCst);
        assert_eq!(controller.start_sync().await.unwrap(), 4);
        assert!(!controller.needs_sync());
    }

    #[tokio::test]
    async fn test_existing_catalog_needs_no_sync() {
        let (engine, _api, _db) = engine_with(StubApi::default()).await;
        engine.sync_catalog_list().await.unwrap();

        let controller = SyncController::new(engine).await.unwrap();
        assert!(!controller.needs_sync());

        assert_eq!(controller.invalidate().await.unwrap(), 4);
        assert!(controller.needs_sync());
        assert_eq!(controller.status(), SyncStatus::Idle);
    }
}
