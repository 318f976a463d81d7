//! # Domain Types
//!
//! Core domain types used throughout the Pokédex.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Species      │   │     Roster      │   │      Team       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (catalog)   │   │  id (auto)      │   │  id             │       │
//! │  │  name           │   │  name           │   │  name           │       │
//! │  │  types          │   │  member_ids     │   │  members        │       │
//! │  │  stats?         │   │  (ordered, ≤6)  │   │  (resolved)     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Detail Tiers
//! A species row is created by list sync with only `id` + `name`. Hydration
//! fills it in two tiers:
//! - **basic**: `types` and `image_url`
//! - **full**: `height`, `weight`, `stats` and `abilities`

use serde::{Deserialize, Serialize};

use crate::analytics::{compute_team_stats, compute_type_coverage, TeamStats, TypeCoverage};
use crate::{DEFAULT_SPRITE_BASE_URL, MAX_TEAM_SIZE};

/// Catalog key of a species (matches the remote catalog id).
pub type SpeciesId = u32;

/// Auto-assigned key of a persisted team.
pub type TeamId = i64;

// =============================================================================
// Stat
// =============================================================================

/// One base stat of a species, in the order the remote catalog lists them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStat {
    /// Remote stat name, e.g. `hp` or `special-attack`.
    pub name: String,
    pub value: u32,
}

impl BaseStat {
    pub fn new(name: impl Into<String>, value: u32) -> Self {
        BaseStat {
            name: name.into(),
            value,
        }
    }
}

// =============================================================================
// Species
// =============================================================================

/// A catalog entry with optional layered detail tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Species {
    pub id: SpeciesId,

    /// Display name (capitalized).
    pub name: String,

    /// Type tags in slot order. Empty until basic hydration.
    pub types: Vec<String>,

    pub image_url: Option<String>,

    /// Height in decimetres.
    pub height: Option<u32>,

    /// Weight in hectograms.
    pub weight: Option<u32>,

    pub stats: Option<Vec<BaseStat>>,

    pub abilities: Option<Vec<String>>,
}

impl Species {
    /// Creates a skeleton record as produced by list sync.
    pub fn skeleton(id: SpeciesId, name: impl Into<String>) -> Self {
        Species {
            id,
            name: name.into(),
            types: Vec::new(),
            image_url: None,
            height: None,
            weight: None,
            stats: None,
            abilities: None,
        }
    }

    /// True once types have been hydrated.
    #[inline]
    pub fn has_basic_details(&self) -> bool {
        !self.types.is_empty()
    }

    /// True once height, weight and stats have been hydrated.
    #[inline]
    pub fn has_full_details(&self) -> bool {
        self.height.is_some() && self.weight.is_some() && self.stats.is_some()
    }

    /// Catalog number padded to three digits, e.g. `#025`.
    pub fn formatted_id(&self) -> String {
        format!("#{:03}", self.id)
    }

    /// Hydrated image url, or the default sprite for this id.
    pub fn display_image_url(&self) -> String {
        self.image_url
            .clone()
            .unwrap_or_else(|| default_sprite_url(DEFAULT_SPRITE_BASE_URL, self.id))
    }

    /// Looks up a base stat by remote name.
    pub fn stat(&self, name: &str) -> Option<u32> {
        self.stats
            .as_ref()?
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.value)
    }
}

/// Builds the deterministic sprite url for a species id.
pub fn default_sprite_url(base_url: &str, id: SpeciesId) -> String {
    format!("{}/{}.png", base_url.trim_end_matches('/'), id)
}

/// Uppercases the first character, leaving the rest untouched.
///
/// Remote names arrive lowercase (`bulbasaur`, `grass`).
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// =============================================================================
// Roster
// =============================================================================

/// Persisted form of a team: ordered member ids only.
///
/// Mutations go through [`crate::roster`] which returns new values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    pub id: TeamId,
    pub name: String,
    pub member_ids: Vec<SpeciesId>,
}

impl Roster {
    pub fn new(id: TeamId, name: impl Into<String>) -> Self {
        Roster {
            id,
            name: name.into(),
            member_ids: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.member_ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.member_ids.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.member_ids.len() >= MAX_TEAM_SIZE
    }

    pub fn contains(&self, species_id: SpeciesId) -> bool {
        self.member_ids.contains(&species_id)
    }
}

// =============================================================================
// Team
// =============================================================================

/// A roster with its members resolved to catalog entries.
///
/// Members whose ids no longer resolve are skipped, so `members` may be
/// shorter than the persisted roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub members: Vec<Species>,
}

impl Team {
    #[inline]
    pub fn size(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.members.len() >= MAX_TEAM_SIZE
    }

    pub fn contains(&self, species_id: SpeciesId) -> bool {
        self.members.iter().any(|s| s.id == species_id)
    }

    /// Number of members carrying each type tag.
    pub fn type_count(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for tag in self.members.iter().flat_map(|s| s.types.iter()) {
            match counts.iter_mut().find(|(t, _)| t == tag) {
                Some((_, n)) => *n += 1,
                None => counts.push((tag.clone(), 1)),
            }
        }
        counts
    }

    /// Weakness/resistance/immunity profile of all member types combined.
    pub fn type_coverage(&self) -> TypeCoverage {
        compute_type_coverage(self.members.iter().flat_map(|s| s.types.iter()))
    }

    /// Aggregate base stats of members with full details.
    pub fn total_stats(&self) -> TeamStats {
        compute_team_stats(&self.members)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
