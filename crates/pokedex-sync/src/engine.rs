//! # Catalog Sync Engine
//!
//! Two-phase catalog synchronization against the remote API.
//!
//! ## Phases
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Catalog Sync Phases                               │
//! │                                                                         │
//! │  1. LIST SYNC (bulk, explicit)                                         │
//! │     GET pokemon?limit=N ──► skeletons ──► one upsert transaction       │
//! │     Status: Idle ──► Syncing ──► Synced(count) | Failed(message)       │
//! │                                                                         │
//! │  2. HYDRATION (lazy, per species)                                      │
//! │     ensure_details_loaded(id)       types + image                      │
//! │     ensure_full_details_loaded(id)  height, weight, stats, abilities   │
//! │                                                                         │
//! │     local row has tier? ──yes──► return it (no network)                │
//! │            │ no                                                         │
//! │            ▼                                                            │
//! │     SingleFlight::claim(id)                                            │
//! │       Leader   ──► GET pokemon/{id} ──► UPDATE ──► land                │
//! │       Follower ──► wait for leader ──► read row                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here retries on its own. Failures are returned to the caller,
//! which decides whether to offer a retry (see [`SyncError::is_retryable`]).

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use pokedex_core::{Species, SpeciesId};
use pokedex_db::{Database, SpeciesRepository};

use crate::client::CatalogApi;
use crate::config::CatalogConfig;
use crate::error::{SyncError, SyncResult};
use crate::single_flight::{Claim, SingleFlight};

// =============================================================================
// Sync Status
// =============================================================================

/// Progress of the bulk list sync.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncStatus {
    #[default]
    Idle,
    Syncing,
    Synced {
        count: usize,
    },
    Failed {
        message: String,
    },
}

impl SyncStatus {
    pub fn is_syncing(&self) -> bool {
        matches!(self, SyncStatus::Syncing)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SyncStatus::Failed { .. })
    }
}

/// Detail tier requested by a hydration call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Basic,
    Full,
}

impl Tier {
    fn is_satisfied_by(self, species: &Species) -> bool {
        match self {
            Tier::Basic => species.has_basic_details(),
            Tier::Full => species.has_full_details(),
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Keeps the local catalog in step with the remote API.
///
/// Cloning is cheap; clones share status, locks and in-flight sets.
#[derive(Clone)]
pub struct CatalogSyncEngine {
    api: Arc<dyn CatalogApi>,
    species: SpeciesRepository,
    config: CatalogConfig,
    status_tx: Arc<watch::Sender<SyncStatus>>,
    list_lock: Arc<Mutex<()>>,
    basic_flights: SingleFlight<SpeciesId>,
    full_flights: SingleFlight<SpeciesId>,
}

impl CatalogSyncEngine {
    pub fn new(api: Arc<dyn CatalogApi>, db: &Database, config: CatalogConfig) -> Self {
        let (status_tx, _) = watch::channel(SyncStatus::Idle);

        CatalogSyncEngine {
            api,
            species: db.species(),
            config,
            status_tx: Arc::new(status_tx),
            list_lock: Arc::new(Mutex::new(())),
            basic_flights: SingleFlight::new(),
            full_flights: SingleFlight::new(),
        }
    }

    /// Current list sync status.
    pub fn status(&self) -> SyncStatus {
        self.status_tx.borrow().clone()
    }

    /// Receiver that observes every status transition.
    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.status_tx.subscribe()
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// True while the local catalog holds no species.
    pub async fn needs_sync(&self) -> SyncResult<bool> {
        Ok(self.species.count().await? == 0)
    }

    // =========================================================================
    // Phase 1: List Sync
    // =========================================================================

    /// Fetches the species list and upserts one skeleton per entry.
    ///
    /// Concurrent calls run one after another. The batch is written in a
    /// single transaction, so on failure no entry of it is persisted, and
    /// detail columns of existing rows survive a re-sync.
    ///
    /// ## Returns
    /// Number of entries written.
    pub async fn sync_catalog_list(&self) -> SyncResult<usize> {
        let _guard = self.list_lock.lock().await;

        self.status_tx.send_replace(SyncStatus::Syncing);
        info!(limit = self.config.api.list_limit, "Starting catalog list sync");

        match self.run_list_sync().await {
            Ok(count) => {
                info!(count, "Catalog list sync complete");
                self.status_tx.send_replace(SyncStatus::Synced { count });
                Ok(count)
            }
            Err(e) => {
                error!(error = %e, "Catalog list sync failed");
                self.status_tx.send_replace(SyncStatus::Failed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run_list_sync(&self) -> SyncResult<usize> {
        let list = self.api.list_species(self.config.api.list_limit, 0).await?;

        if list.results.len() < list.count as usize {
            debug!(
                received = list.results.len(),
                remote_total = list.count,
                "Remote catalog is larger than the requested page"
            );
        }

        let skeletons = list
            .results
            .iter()
            .map(|entry| entry.to_skeleton())
            .collect::<SyncResult<Vec<_>>>()?;

        Ok(self.species.upsert_skeletons(&skeletons).await?)
    }

    // =========================================================================
    // Phase 2: Hydration
    // =========================================================================

    /// Returns the species with types and image, fetching them once if
    /// they are not stored yet.
    pub async fn ensure_details_loaded(&self, id: SpeciesId) -> SyncResult<Species> {
        self.ensure_tier(id, Tier::Basic).await
    }

    /// Returns the species with height, weight, stats and abilities,
    /// fetching them once if they are not stored yet.
    pub async fn ensure_full_details_loaded(&self, id: SpeciesId) -> SyncResult<Species> {
        self.ensure_tier(id, Tier::Full).await
    }

    async fn ensure_tier(&self, id: SpeciesId, tier: Tier) -> SyncResult<Species> {
        let cached = self
            .species
            .get(id)
            .await?
            .ok_or(SyncError::NotFound { id })?;
        if tier.is_satisfied_by(&cached) {
            return Ok(cached);
        }

        let flights = match tier {
            Tier::Basic => &self.basic_flights,
            Tier::Full => &self.full_flights,
        };

        match flights.claim(id) {
            Claim::Leader(ticket) => {
                // A flight may have landed between the read above and the claim.
                if let Some(species) = self.species.get(id).await? {
                    if tier.is_satisfied_by(&species) {
                        ticket.land();
                        return Ok(species);
                    }
                }

                match self.fetch_and_store(id, tier).await {
                    Ok(species) => {
                        ticket.land();
                        Ok(species)
                    }
                    Err(e) => {
                        warn!(species_id = id, ?tier, error = %e, "Hydration failed");
                        ticket.fail(e.to_string());
                        Err(e)
                    }
                }
            }
            Claim::Follower(waiter) => {
                debug!(species_id = id, ?tier, "Joining in-flight hydration");
                waiter
                    .wait()
                    .await
                    .map_err(|message| SyncError::HydrationFailed { id, message })?;
                self.species
                    .get(id)
                    .await?
                    .ok_or(SyncError::NotFound { id })
            }
        }
    }

    async fn fetch_and_store(&self, id: SpeciesId, tier: Tier) -> SyncResult<Species> {
        debug!(species_id = id, ?tier, "Fetching species details");
        let detail = self.api.species_detail(id).await?;
        let sprite_base = &self.config.sprites.base_url;

        let updated = match tier {
            Tier::Basic => {
                let image = detail.image_url(sprite_base);
                self.species
                    .update_basic_details(id, &detail.type_names(), Some(&image))
                    .await?
            }
            Tier::Full => {
                let mut hydrated = detail.into_species(sprite_base);
                // The row is keyed by the requested id.
                hydrated.id = id;
                self.species.update_full_details(&hydrated).await?
            }
        };

        if !updated {
            return Err(SyncError::NotFound { id });
        }

        self.species
            .get(id)
            .await?
            .ok_or(SyncError::NotFound { id })
    }

    // =========================================================================
    // Invalidation
    // =========================================================================

    /// Drops the whole local catalog so the next launch re-syncs.
    ///
    /// Waits for a running list sync to finish first.
    pub async fn invalidate_catalog(&self) -> SyncResult<u64> {
        let _guard = self.list_lock.lock().await;

        let removed = self.species.delete_all().await?;
        self.basic_flights.clear();
        self.full_flights.clear();
        self.status_tx.send_replace(SyncStatus::Idle);

        info!(removed, "Catalog invalidated");
        Ok(removed)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use pokedex_db::DbConfig;

    use crate::protocol::{
        AbilitySlot, NamedResource, SpeciesDetailResponse, SpeciesListEntry,
        SpeciesListResponse, Sprites, StatEntry, TypeSlot,
    };

    /// Call-counting catalog with canned responses.
    #[derive(Default)]
    struct StubApi {
        list_calls: AtomicUsize,
        detail_calls: AtomicUsize,
        fail_list: AtomicBool,
        fail_detail: AtomicBool,
        detail_delay_ms: u64,
        /// Appended to the canned list on every call.
        extra_entries: std::sync::Mutex<Vec<SpeciesListEntry>>,
    }

    const ENTRIES: [(u32, &str); 3] = [(1, "bulbasaur"), (4, "charmander"), (7, "squirtle")];

    fn named(name: &str) -> NamedResource {
        NamedResource {
            name: name.to_string(),
            url: None,
        }
    }

    fn detail_for(id: SpeciesId) -> SpeciesDetailResponse {
        let (name, kinds): (&str, &[&str]) = match id {
            1 => ("bulbasaur", &["grass", "poison"]),
            4 => ("charmander", &["fire"]),
            _ => ("squirtle", &["water"]),
        };
        SpeciesDetailResponse {
            id,
            name: name.to_string(),
            height: 7,
            weight: 69,
            types: kinds
                .iter()
                .enumerate()
                .map(|(i, k)| TypeSlot {
                    slot: i as u32 + 1,
                    kind: named(k),
                })
                .collect(),
            stats: vec![
                StatEntry {
                    base_stat: 45,
                    effort: 0,
                    stat: named("hp"),
                },
                StatEntry {
                    base_stat: 49,
                    effort: 0,
                    stat: named("attack"),
                },
            ],
            abilities: vec![AbilitySlot {
                ability: named("overgrow"),
                is_hidden: false,
                slot: 1,
            }],
            sprites: Sprites::default(),
        }
    }

    #[async_trait]
    impl CatalogApi for StubApi {
        async fn list_species(&self, _limit: u32, _offset: u32) -> SyncResult<SpeciesListResponse> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(SyncError::NetworkFailure("connection reset".into()));
            }
            let mut results: Vec<SpeciesListEntry> = ENTRIES
                .iter()
                .map(|(id, name)| SpeciesListEntry {
                    name: name.to_string(),
                    url: format!("https://pokeapi.co/api/v2/pokemon/{}/", id),
                })
                .collect();
            results.extend(self.extra_entries.lock().unwrap().iter().cloned());
            Ok(SpeciesListResponse {
                count: results.len() as u32,
                results,
            })
        }

        async fn species_detail(&self, id: SpeciesId) -> SyncResult<SpeciesDetailResponse> {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            if self.detail_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.detail_delay_ms)).await;
            }
            if self.fail_detail.load(Ordering::SeqCst) {
                return Err(SyncError::HttpStatus {
                    status: 503,
                    url: format!("pokemon/{}", id),
                });
            }
            Ok(detail_for(id))
        }
    }

    async fn setup(api: StubApi) -> (CatalogSyncEngine, Arc<StubApi>, Database) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let api = Arc::new(api);
        let engine = CatalogSyncEngine::new(api.clone(), &db, CatalogConfig::default());
        (engine, api, db)
    }

    #[tokio::test]
    async fn test_list_sync_persists_skeletons() {
        let (engine, api, db) = setup(StubApi::default()).await;
        assert!(engine.needs_sync().await.unwrap());
        assert_eq!(engine.status(), SyncStatus::Idle);

        let count = engine.sync_catalog_list().await.unwrap();

        assert_eq!(count, 3);
        assert_eq!(engine.status(), SyncStatus::Synced { count: 3 });
        assert!(!engine.needs_sync().await.unwrap());
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 1);

        let catalog = db.species().list_all().await.unwrap();
        let names: Vec<_> = catalog.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Bulbasaur", "Charmander", "Squirtle"]);
        assert!(catalog.iter().all(|s| !s.has_basic_details()));
    }

    #[tokio::test]
    async fn test_failed_list_sync_then_retry() {
        let (engine, api, _db) = setup(StubApi::default()).await;
        api.fail_list.store(true, Ordering::SeqCst);

        let err = engine.sync_catalog_list().await.unwrap_err();
        assert!(err.is_retryable());
        assert!(engine.status().is_failed());
        assert!(engine.needs_sync().await.unwrap());

        api.fail_list.store(false, Ordering::SeqCst);
        assert_eq!(engine.sync_catalog_list().await.unwrap(), 3);
        assert_eq!(engine.status(), SyncStatus::Synced { count: 3 });
    }

    #[tokio::test]
    async fn test_rejected_batch_leaves_catalog_untouched() {
        let (engine, api, db) = setup(StubApi::default()).await;
        engine.sync_catalog_list().await.unwrap();
        let before = engine.ensure_full_details_loaded(1).await.unwrap();
        assert!(before.has_full_details());

        api.extra_entries.lock().unwrap().extend([
            SpeciesListEntry {
                name: "pikachu".into(),
                url: "https://pokeapi.co/api/v2/pokemon/25/".into(),
            },
            SpeciesListEntry {
                name: "missingno".into(),
                url: "https://pokeapi.co/api/v2/pokemon/".into(),
            },
        ]);

        let err = engine.sync_catalog_list().await.unwrap_err();
        assert!(matches!(err, SyncError::InvalidListEntry { ref name, .. } if name == "missingno"));
        assert!(engine.status().is_failed());

        // Existing rows and their details survive; nothing from the batch lands.
        assert_eq!(db.species().count().await.unwrap(), 3);
        assert_eq!(db.species().get(1).await.unwrap(), Some(before));
        assert!(db.species().get(25).await.unwrap().is_none());
        assert!(!engine.needs_sync().await.unwrap());
    }

    #[tokio::test]
    async fn test_status_transitions_are_published() {
        let (engine, _api, _db) = setup(StubApi::default()).await;
        let mut rx = engine.subscribe_status();

        engine.sync_catalog_list().await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SyncStatus::Synced { count: 3 });
    }

    #[tokio::test]
    async fn test_basic_hydration_is_cached() {
        let (engine, api, _db) = setup(StubApi::default()).await;
        engine.sync_catalog_list().await.unwrap();

        let bulbasaur = engine.ensure_details_loaded(1).await.unwrap();
        assert_eq!(bulbasaur.types, vec!["Grass", "Poison"]);
        assert_eq!(
            bulbasaur.image_url.as_deref(),
            Some("https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/1.png")
        );
        // Basic hydration leaves the full tier alone.
        assert!(!bulbasaur.has_full_details());

        engine.ensure_details_loaded(1).await.unwrap();
        assert_eq!(api.detail_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_hydration_makes_one_request() {
        let (engine, api, _db) = setup(StubApi {
            detail_delay_ms: 50,
            ..StubApi::default()
        })
        .await;
        engine.sync_catalog_list().await.unwrap();

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let engine = engine.clone();
                tokio::spawn(async move { engine.ensure_details_loaded(4).await })
            })
            .collect();

        for handle in handles {
            let charmander = handle.await.unwrap().unwrap();
            assert_eq!(charmander.types, vec!["Fire"]);
        }
        assert_eq!(api.detail_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_hydration_writes_nothing_and_can_retry() {
        let (engine, api, db) = setup(StubApi::default()).await;
        engine.sync_catalog_list().await.unwrap();
        api.fail_detail.store(true, Ordering::SeqCst);

        let err = engine.ensure_details_loaded(7).await.unwrap_err();
        assert!(err.is_network_error());
        let row = db.species().get_required(7).await.unwrap();
        assert!(!row.has_basic_details());
        assert!(row.image_url.is_none());

        api.fail_detail.store(false, Ordering::SeqCst);
        let squirtle = engine.ensure_details_loaded(7).await.unwrap();
        assert_eq!(squirtle.types, vec!["Water"]);
        assert_eq!(api.detail_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_full_hydration() {
        let (engine, api, _db) = setup(StubApi::default()).await;
        engine.sync_catalog_list().await.unwrap();

        let full = engine.ensure_full_details_loaded(1).await.unwrap();
        assert!(full.has_full_details());
        assert_eq!(full.name, "Bulbasaur");
        assert_eq!(full.stat("hp"), Some(45));
        assert_eq!(full.abilities, Some(vec!["overgrow".to_string()]));

        // Full hydration also satisfies the basic tier.
        engine.ensure_details_loaded(1).await.unwrap();
        engine.ensure_full_details_loaded(1).await.unwrap();
        assert_eq!(api.detail_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_resync_keeps_hydrated_details() {
        let (engine, _api, _db) = setup(StubApi::default()).await;
        engine.sync_catalog_list().await.unwrap();
        engine.ensure_full_details_loaded(4).await.unwrap();

        engine.sync_catalog_list().await.unwrap();

        let charmander = engine.ensure_full_details_loaded(4).await.unwrap();
        assert!(charmander.has_full_details());
        assert_eq!(charmander.types, vec!["Fire"]);
    }

    #[tokio::test]
    async fn test_unknown_species_is_not_found_without_request() {
        let (engine, api, _db) = setup(StubApi::default()).await;
        engine.sync_catalog_list().await.unwrap();

        let err = engine.ensure_details_loaded(999).await.unwrap_err();
        assert!(matches!(err, SyncError::NotFound { id: 999 }));
        assert_eq!(api.detail_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalidate_catalog() {
        let (engine, api, _db) = setup(StubApi::default()).await;
        engine.sync_catalog_list().await.unwrap();
        engine.ensure_details_loaded(1).await.unwrap();

        assert_eq!(engine.invalidate_catalog().await.unwrap(), 3);
        assert!(engine.needs_sync().await.unwrap());
        assert_eq!(engine.status(), SyncStatus::Idle);

        // Details are fetched again after a fresh sync.
        engine.sync_catalog_list().await.unwrap();
        let bulbasaur = engine.ensure_details_loaded(1).await.unwrap();
        assert!(bulbasaur.has_basic_details());
        assert_eq!(api.detail_calls.load(Ordering::SeqCst), 2);
    }
}
