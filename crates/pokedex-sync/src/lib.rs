//! # pokedex-sync: Catalog Sync Engine for the Pokédex
//!
//! This crate keeps the local species catalog in step with the remote
//! catalog API. The catalog arrives in two phases: a bulk list of
//! skeletons, then per-species details fetched lazily when first needed.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Catalog Sync Architecture                        │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                CatalogSyncEngine (engine.rs)                     │  │
//! │  │                                                                  │  │
//! │  │  sync_catalog_list()          status: watch<SyncStatus>         │  │
//! │  │  ensure_details_loaded(id)    needs_sync()                      │  │
//! │  │  ensure_full_details_loaded(id)                                 │  │
//! │  │  invalidate_catalog()                                           │  │
//! │  └───────────┬───────────────────────┬───────────────────┬──────────┘  │
//! │              ▼                       ▼                   ▼             │
//! │  ┌────────────────────┐  ┌─────────────────────┐  ┌──────────────────┐ │
//! │  │ CatalogApi         │  │ SingleFlight        │  │ SpeciesRepository│ │
//! │  │ (client.rs)        │  │ (single_flight.rs)  │  │ (pokedex-db)     │ │
//! │  │                    │  │                     │  │                  │ │
//! │  │ PokeApiClient over │  │ One fetch per id in │  │ Skeleton upserts │ │
//! │  │ reqwest + JSON DTOs│  │ flight; waiters     │  │ Detail updates   │ │
//! │  │ (protocol.rs)      │  │ share the outcome   │  │                  │ │
//! │  └────────────────────┘  └─────────────────────┘  └──────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`engine`] - `CatalogSyncEngine` and `SyncStatus`
//! - [`client`] - `CatalogApi` trait and the reqwest client
//! - [`protocol`] - Remote response bodies and their normalization
//! - [`single_flight`] - In-flight request tracking
//! - [`config`] - Catalog configuration (TOML + environment)
//! - [`error`] - Sync error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pokedex_sync::{CatalogConfig, CatalogSyncEngine, PokeApiClient};
//!
//! let config = CatalogConfig::load_or_default(None);
//! let api = Arc::new(PokeApiClient::new(config.clone())?);
//! let engine = CatalogSyncEngine::new(api, &database, config);
//!
//! if engine.needs_sync().await? {
//!     engine.sync_catalog_list().await?;
//! }
//! let pikachu = engine.ensure_details_loaded(25).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod single_flight;

// =============================================================================
// Re-exports
// =============================================================================

pub use client::{CatalogApi, PokeApiClient};
pub use config::{ApiConfig, CatalogConfig, SpriteConfig};
pub use engine::{CatalogSyncEngine, SyncStatus};
pub use error::{SyncError, SyncResult};
pub use single_flight::{Claim, SingleFlight};
