//! # Pokédex State
//!
//! Browse list, search and species selection.
//!
//! ## Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  update_search_query("pika") ──► species_list() ──► [Pikachu]          │
//! │  update_search_mode(Id)      ──► query cleared   ──► whole catalog     │
//! │                                                                         │
//! │  row becomes visible ──► fetch_details_if_needed(id)                   │
//! │                            id ∈ loading_details while the fetch runs   │
//! │                                                                         │
//! │  select_species(id) ──► selected = stored row                          │
//! │                          └─► full details missing? hydrate, reselect   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use pokedex_core::search::filter_species;
use pokedex_core::validation::validate_search_query;
use pokedex_core::{SearchMode, Species, SpeciesId};
use pokedex_db::Database;
use pokedex_sync::CatalogSyncEngine;

use crate::error::{AppError, AppResult};

#[derive(Debug, Default)]
struct BrowseState {
    query: String,
    mode: SearchMode,
    /// Callers currently waiting on basic details, per id.
    loading_details: HashMap<SpeciesId, usize>,
    selected: Option<Species>,
    loading_full_details: bool,
}

/// Keeps an id in `loading_details` until every caller waiting on it is done.
struct LoadingGuard {
    state: Arc<Mutex<BrowseState>>,
    id: SpeciesId,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(waiting) = state.loading_details.get_mut(&self.id) {
            *waiting -= 1;
            if *waiting == 0 {
                state.loading_details.remove(&self.id);
            }
        }
    }
}

/// Browse and detail state for the catalog.
#[derive(Clone)]
pub struct PokedexController {
    db: Database,
    engine: CatalogSyncEngine,
    state: Arc<Mutex<BrowseState>>,
}

impl PokedexController {
    pub fn new(db: Database, engine: CatalogSyncEngine) -> Self {
        PokedexController {
            db,
            engine,
            state: Arc::new(Mutex::new(BrowseState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, BrowseState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Search
    // =========================================================================

    pub fn search_query(&self) -> String {
        self.state().query.clone()
    }

    pub fn search_mode(&self) -> SearchMode {
        self.state().mode
    }

    /// Stores a new query. Over-long queries are rejected.
    pub fn update_search_query(&self, query: &str) -> AppResult<()> {
        let query = validate_search_query(query)?;
        self.state().query = query;
        Ok(())
    }

    /// Switches the search mode and clears the query.
    pub fn update_search_mode(&self, mode: SearchMode) {
        let mut state = self.state();
        state.mode = mode;
        state.query.clear();
    }

    /// Catalog filtered by the current query and mode, in id order.
    pub async fn species_list(&self) -> AppResult<Vec<Species>> {
        let catalog = self.db.species().list_all().await?;
        let (query, mode) = {
            let state = self.state();
            (state.query.clone(), state.mode)
        };

        Ok(filter_species(&catalog, &query, mode)
            .into_iter()
            .cloned()
            .collect())
    }

    // =========================================================================
    // Detail Hydration
    // =========================================================================

    /// Ids whose basic details are being fetched right now.
    pub fn loading_details(&self) -> HashSet<SpeciesId> {
        self.state().loading_details.keys().copied().collect()
    }

    fn mark_loading(&self, id: SpeciesId) -> LoadingGuard {
        *self.state().loading_details.entry(id).or_insert(0) += 1;
        LoadingGuard {
            state: Arc::clone(&self.state),
            id,
        }
    }

    /// Ensures types and image are stored for `id`.
    pub async fn fetch_details_if_needed(&self, id: SpeciesId) -> AppResult<Species> {
        if let Some(species) = self.db.species().get(id).await? {
            if species.has_basic_details() {
                return Ok(species);
            }
        }

        let _loading = self.mark_loading(id);
        Ok(self.engine.ensure_details_loaded(id).await?)
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn selected(&self) -> Option<Species> {
        self.state().selected.clone()
    }

    pub fn is_loading_full_details(&self) -> bool {
        self.state().loading_full_details
    }

    /// Selects a species, hydrating its full details when missing.
    ///
    /// On a failed hydration the stored row stays selected and the error
    /// is returned.
    pub async fn select_species(&self, id: SpeciesId) -> AppResult<Species> {
        let species = self
            .db
            .species()
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found("Species", id))?;

        self.state().selected = Some(species.clone());
        if species.has_full_details() {
            return Ok(species);
        }

        debug!(species_id = id, "Selected species lacks full details");
        self.state().loading_full_details = true;
        let result = self.engine.ensure_full_details_loaded(id).await;

        let mut state = self.state();
        state.loading_full_details = false;
        let full = result?;
        // Keep a newer selection made while the fetch ran.
        if state.selected.as_ref().map(|s| s.id) == Some(id) {
            state.selected = Some(full.clone());
        }
        Ok(full)
    }

    pub fn clear_selection(&self) {
        self.state().selected = None;
    }
}
