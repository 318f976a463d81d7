//! # State Module
//!
//! Controllers holding the screen-level state of the Pokédex.
//!
//! ## Why Multiple Controllers?
//! Each controller owns one concern, so a command only builds what it
//! needs and tests can drive one controller in isolation.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐ ┌────────────────────┐ ┌──────────────────────┐  │
//! │  │  SyncController  │ │ PokedexController  │ │   TeamController     │  │
//! │  │                  │ │                    │ │                      │  │
//! │  │  needs_sync      │ │  query + mode      │ │  selected team id    │  │
//! │  │  status          │ │  loading_details   │ │  analytics           │  │
//! │  │                  │ │  selected species  │ │                      │  │
//! │  └────────┬─────────┘ └─────────┬──────────┘ └──────────┬───────────┘  │
//! │           │                     │                       │              │
//! │           └─────────────────────┼───────────────────────┘              │
//! │                                 ▼                                       │
//! │           CatalogSyncEngine (shared clone) + Database (shared clone)    │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • Engine and Database are cheap clones over shared pools and locks    │
//! │  • Controller fields live behind Arc<RwLock<T>> / Arc<Mutex<T>>        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod pokedex;
mod sync;
mod team;

pub use pokedex::PokedexController;
pub use sync::{SyncController, SyncStatusDto};
pub use team::{TeamAnalysis, TeamController};

#[cfg(test)]
pub(crate) mod test_support {
    //! Stub catalog shared by the controller tests.

    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use pokedex_core::SpeciesId;
    use pokedex_db::{Database, DbConfig};
    use pokedex_sync::protocol::{
        NamedResource, SpeciesDetailResponse, SpeciesListEntry, SpeciesListResponse, Sprites,
        StatEntry, TypeSlot,
    };
    use pokedex_sync::{CatalogApi, CatalogConfig, CatalogSyncEngine, SyncError, SyncResult};

    pub const CATALOG: [(SpeciesId, &str, &[&str]); 4] = [
        (1, "bulbasaur", &["grass", "poison"]),
        (4, "charmander", &["fire"]),
        (25, "pikachu", &["electric"]),
        (50, "diglett", &["ground"]),
    ];

    #[derive(Default)]
    pub struct StubApi {
        pub detail_calls: AtomicUsize,
        pub fail: AtomicBool,
        /// When set, the list endpoint answers with no entries.
        pub empty_list: AtomicBool,
        /// When set, detail calls block until notified.
        pub gate: Option<Arc<Notify>>,
        /// Simulated latency of each detail call.
        pub delay_ms: u64,
        pub in_flight: AtomicUsize,
        pub peak_in_flight: AtomicUsize,
    }

    fn named(name: &str) -> NamedResource {
        NamedResource {
            name: name.to_string(),
            url: None,
        }
    }

    #[async_trait]
    impl CatalogApi for StubApi {
        async fn list_species(&self, _limit: u32, _offset: u32) -> SyncResult<SpeciesListResponse> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(SyncError::NetworkFailure("offline".into()));
            }
            if self.empty_list.load(Ordering::SeqCst) {
                return Ok(SpeciesListResponse {
                    count: 0,
                    results: Vec::new(),
                });
            }
            Ok(SpeciesListResponse {
                count: CATALOG.len() as u32,
                results: CATALOG
                    .iter()
                    .map(|(id, name, _)| SpeciesListEntry {
                        name: name.to_string(),
                        url: format!("https://pokeapi.co/api/v2/pokemon/{}/", id),
                    })
                    .collect(),
            })
        }

        async fn species_detail(&self, id: SpeciesId) -> SyncResult<SpeciesDetailResponse> {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
            let result = self.detail(id).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    impl StubApi {
        async fn detail(&self, id: SpeciesId) -> SyncResult<SpeciesDetailResponse> {
            if self.delay_ms > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
            }
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(SyncError::Timeout(30));
            }

            let (_, name, kinds) = CATALOG
                .iter()
                .find(|(candidate, _, _)| *candidate == id)
                .ok_or(SyncError::HttpStatus {
                    status: 404,
                    url: format!("pokemon/{}", id),
                })?;

            Ok(SpeciesDetailResponse {
                id,
                name: name.to_string(),
                height: 10,
                weight: 100,
                types: kinds
                    .iter()
                    .enumerate()
                    .map(|(i, k)| TypeSlot {
                        slot: i as u32 + 1,
                        kind: named(k),
                    })
                    .collect(),
                stats: ["hp", "attack", "defense", "special-attack", "special-defense", "speed"]
                    .iter()
                    .map(|stat| StatEntry {
                        base_stat: id * 2,
                        effort: 0,
                        stat: named(stat),
                    })
                    .collect(),
                abilities: Vec::new(),
                sprites: Sprites::default(),
            })
        }
    }

    pub async fn engine_with(api: StubApi) -> (CatalogSyncEngine, Arc<StubApi>, Database) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let api = Arc::new(api);
        let engine = CatalogSyncEngine::new(api.clone(), &db, CatalogConfig::default());
        (engine, api, db)
    }

    /// Engine over a database whose catalog list is already synced.
    pub async fn synced_engine(api: StubApi) -> (CatalogSyncEngine, Arc<StubApi>, Database) {
        let (engine, api, db) = engine_with(api).await;
        engine.sync_catalog_list().await.unwrap();
        (engine, api, db)
    }
}
