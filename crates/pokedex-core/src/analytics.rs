//! # Team Analytics
//!
//! Derived, never persisted: recomputed whenever a team's composition
//! changes.
//!
//! ## Type Coverage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Input: every type tag of every member (with repetition)               │
//! │                                                                         │
//! │    ["Ghost", "Normal"]                                                  │
//! │        │                                                                │
//! │        ▼  look up each tag in the type chart (unknown tags skipped)     │
//! │                                                                         │
//! │    weak_to       Σ  →  Ghost:1 Dark:1 Fighting:1                        │
//! │    resistant_to  Σ  →  Poison:1 Bug:1                                   │
//! │    immune_to     ∪  →  {Ghost, Normal, Fighting}                        │
//! │        │                                                                │
//! │        ▼  drop every weakness that is also an immunity                  │
//! │                                                                         │
//! │    weaknesses = {Dark:1}                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Team Stats
//! Totals and integer-truncated averages of the six base stats over members
//! that carry stats.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::type_chart;
use crate::types::Species;

// =============================================================================
// Type Coverage
// =============================================================================

/// Aggregate weakness / resistance / immunity profile of a set of types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeCoverage {
    /// Resistances: attacking type → number of member types resisting it.
    pub strengths: HashMap<String, u32>,

    /// Attacking type → number of member types weak to it.
    /// Never contains a key present in `immunities`.
    pub weaknesses: HashMap<String, u32>,

    /// Attacking types at least one member type is immune to.
    pub immunities: HashSet<String>,
}

impl TypeCoverage {
    /// Weaknesses sorted by count descending, then by name.
    pub fn weaknesses_by_count(&self) -> Vec<(&str, u32)> {
        sorted_by_count(&self.weaknesses)
    }

    /// Resistances sorted by count descending, then by name.
    pub fn strengths_by_count(&self) -> Vec<(&str, u32)> {
        sorted_by_count(&self.strengths)
    }

    /// Immunities in name order.
    pub fn sorted_immunities(&self) -> Vec<&str> {
        let mut immunities: Vec<&str> = self.immunities.iter().map(String::as_str).collect();
        immunities.sort_unstable();
        immunities
    }
}

fn sorted_by_count(counts: &HashMap<String, u32>) -> Vec<(&str, u32)> {
    let mut entries: Vec<(&str, u32)> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    entries.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries
}

/// Computes the combined type coverage of `types`.
///
/// Counts reflect multiplicity: two Grass members contribute twice to every
/// Grass weakness. Unknown tags are skipped silently.
///
/// ## Example
/// ```rust
/// use pokedex_core::analytics::compute_type_coverage;
///
/// let coverage = compute_type_coverage(["Ghost", "Normal"]);
/// assert!(coverage.immunities.contains("Ghost"));
/// assert!(!coverage.weaknesses.contains_key("Ghost"));
/// assert_eq!(coverage.weaknesses.get("Dark"), Some(&1));
/// ```
pub fn compute_type_coverage<I, S>(types: I) -> TypeCoverage
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut weaknesses: HashMap<String, u32> = HashMap::new();
    let mut strengths: HashMap<String, u32> = HashMap::new();
    let mut immunities: HashSet<String> = HashSet::new();

    for tag in types {
        let Some(row) = type_chart::lookup(tag.as_ref()) else {
            continue;
        };

        for weak in row.weak_to {
            *weaknesses.entry((*weak).to_string()).or_insert(0) += 1;
        }
        for resisted in row.resistant_to {
            *strengths.entry((*resisted).to_string()).or_insert(0) += 1;
        }
        immunities.extend(row.immune_to.iter().map(|t| (*t).to_string()));
    }

    weaknesses.retain(|attacking, _| !immunities.contains(attacking));

    TypeCoverage {
        strengths,
        weaknesses,
        immunities,
    }
}

// =============================================================================
// Team Stats
// =============================================================================

/// Totals and averages of the six base stats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    pub total_hp: u32,
    pub total_attack: u32,
    pub total_defense: u32,
    pub total_sp_atk: u32,
    pub total_sp_def: u32,
    pub total_speed: u32,
    pub average_hp: u32,
    pub average_attack: u32,
    pub average_defense: u32,
    pub average_sp_atk: u32,
    pub average_sp_def: u32,
    pub average_speed: u32,
}

/// Aggregates base stats over the members that carry stats.
///
/// Members without hydrated stats are excluded from both the totals and the
/// divisor. No member with stats yields the zero record. Averages truncate:
/// 100 over 3 members is 33.
pub fn compute_team_stats(members: &[Species]) -> TeamStats {
    let mut stats = TeamStats::default();
    let mut counted: u32 = 0;

    for member in members {
        let Some(member_stats) = member.stats.as_ref() else {
            continue;
        };
        counted += 1;

        for stat in member_stats {
            match stat.name.as_str() {
                "hp" => stats.total_hp += stat.value,
                "attack" => stats.total_attack += stat.value,
                "defense" => stats.total_defense += stat.value,
                "special-attack" => stats.total_sp_atk += stat.value,
                "special-defense" => stats.total_sp_def += stat.value,
                "speed" => stats.total_speed += stat.value,
                _ => {}
            }
        }
    }

    if counted == 0 {
        return TeamStats::default();
    }

    stats.average_hp = stats.total_hp / counted;
    stats.average_attack = stats.total_attack / counted;
    stats.average_defense = stats.total_defense / counted;
    stats.average_sp_atk = stats.total_sp_atk / counted;
    stats.average_sp_def = stats.total_sp_def / counted;
    stats.average_speed = stats.total_speed / counted;
    stats
}

// =============================================================================
// Unit Tests
// =============================================================================
