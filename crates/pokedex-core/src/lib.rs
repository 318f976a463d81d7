//! # pokedex-core: Pure Domain Logic for the Pokédex
//!
//! This crate is the **heart** of the Pokédex. It contains the species and
//! team model, the type chart, team analytics and roster rules as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pokédex Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              State Controllers / CLI (apps/pokedex-cli)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             pokedex-sync (catalog sync + hydration)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ pokedex-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │type_chart │  │ analytics │  │  roster   │  │   │
//! │  │   │  Species  │  │ weak/res/ │  │ coverage  │  │ add/remove│  │   │
//! │  │   │  Team     │  │ immune    │  │ team stats│  │ reorder   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 pokedex-db (Database Layer)                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Species, Roster, Team)
//! - [`type_chart`] - Static type effectiveness table
//! - [`analytics`] - Type coverage and team stat aggregation
//! - [`roster`] - Bounded roster mutation rules
//! - [`search`] - Catalog filtering by name or id
//! - [`share`] - Plain-text team summary for sharing
//! - [`validation`] - Input normalization and validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use pokedex_core::analytics::compute_type_coverage;
//!
//! let coverage = compute_type_coverage(["Ground"]);
//! assert_eq!(coverage.weaknesses.get("Water"), Some(&1));
//! assert!(coverage.immunities.contains("Electric"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analytics;
pub mod error;
pub mod roster;
pub mod search;
pub mod share;
pub mod type_chart;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use analytics::{compute_team_stats, compute_type_coverage, TeamStats, TypeCoverage};
pub use error::{CoreError, CoreResult, ValidationError};
pub use search::SearchMode;
pub use share::format_team_for_sharing;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of members in a single team.
pub const MAX_TEAM_SIZE: usize = 6;

/// Name given to a team created or renamed with a blank name.
pub const DEFAULT_TEAM_NAME: &str = "My Team";

/// Maximum length of a team name after trimming.
pub const MAX_TEAM_NAME_LEN: usize = 50;

/// Base URL of the sprite used when the remote catalog provides no image.
///
/// The species id and `.png` are appended to it.
pub const DEFAULT_SPRITE_BASE_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";
