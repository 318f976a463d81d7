//! # Repository Module
//!
//! Database repository implementations for the Pokédex.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Sync engine / state controller                                         │
//! │       │                                                                 │
//! │       │  db.teams().add_member(team_id, 25)                             │
//! │       ▼                                                                 │
//! │  TeamRepository                                                         │
//! │  ├── create / rename / delete                                           │
//! │  ├── add_member / remove_member_at / reorder_members                    │
//! │  └── get / list_all / watch_all / watch_by_id                           │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SpeciesRepository`](species::SpeciesRepository) - Catalog rows and detail tiers
//! - [`TeamRepository`](team::TeamRepository) - Rosters and resolved teams

pub mod species;
pub mod team;
