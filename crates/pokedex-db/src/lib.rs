//! # pokedex-db: Database Layer for the Pokédex
//!
//! This crate provides local persistence for the species catalog and the
//! user's teams. It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pokédex Data Flow                                │
//! │                                                                         │
//! │  CatalogSyncEngine / state controllers                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    pokedex-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ SpeciesRepo   │    │ 001_species  │  │   │
//! │  │   │ SqlitePool    │◄───│ TeamRepo      │    │ 002_teams    │  │   │
//! │  │   │ Notifiers     │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │                                │   │
//! │  │                        Feed (live queries)                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (platform data dir)/pokedex.db                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`repository`] - Species and team repositories
//! - [`feed`] - Change notification and live queries
//! - [`encoding`] - Delimited encodings of list columns
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pokedex_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("pokedex.db")).await?;
//!
//! let team = db.teams().create("Rain Team").await?;
//! db.teams().add_member(team.id, 7).await?;
//!
//! let mut feed = db.teams().watch_by_id(team.id);
//! let snapshot = feed.current().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod encoding;
pub mod error;
pub mod feed;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use feed::{ChangeNotifier, Feed, FeedQuery};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::species::{CatalogQuery, SpeciesRepository};
pub use repository::team::{TeamListQuery, TeamQuery, TeamRepository};
