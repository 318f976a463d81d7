//! # Type Effectiveness Table
//!
//! Static defensive profile of each of the 18 canonical type tags.
//!
//! ```text
//!   Ground ──► weak to:      Water, Grass, Ice
//!              resistant to: Poison, Rock
//!              immune to:    Electric
//! ```
//!
//! Lookups take the display form of the tag (`"Fire"`). Anything else,
//! including tags introduced by newer catalog versions, has no entry and
//! contributes nothing to coverage.

/// Defensive profile of one type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeEffectiveness {
    /// Attacking types this type takes bonus damage from.
    pub weak_to: &'static [&'static str],
    /// Attacking types this type takes reduced damage from.
    pub resistant_to: &'static [&'static str],
    /// Attacking types this type takes no damage from.
    pub immune_to: &'static [&'static str],
}

const fn row(
    weak_to: &'static [&'static str],
    resistant_to: &'static [&'static str],
    immune_to: &'static [&'static str],
) -> TypeEffectiveness {
    TypeEffectiveness {
        weak_to,
        resistant_to,
        immune_to,
    }
}

/// The 18 canonical type tags.
pub const ALL_TYPES: [&str; 18] = [
    "Normal", "Fire", "Water", "Electric", "Grass", "Ice", "Fighting", "Poison", "Ground",
    "Flying", "Psychic", "Bug", "Rock", "Ghost", "Dragon", "Dark", "Steel", "Fairy",
];

/// Returns the defensive profile of `tag`, or `None` for unknown tags.
pub fn lookup(tag: &str) -> Option<&'static TypeEffectiveness> {
    const NORMAL: TypeEffectiveness = row(&["Fighting"], &[], &["Ghost"]);
    const FIRE: TypeEffectiveness = row(
        &["Water", "Ground", "Rock"],
        &["Fire", "Grass", "Ice", "Bug", "Steel", "Fairy"],
        &[],
    );
    const WATER: TypeEffectiveness =
        row(&["Electric", "Grass"], &["Fire", "Water", "Ice", "Steel"], &[]);
    const ELECTRIC: TypeEffectiveness = row(&["Ground"], &["Electric", "Flying", "Steel"], &[]);
    const GRASS: TypeEffectiveness = row(
        &["Fire", "Ice", "Poison", "Flying", "Bug"],
        &["Water", "Electric", "Grass", "Ground"],
        &[],
    );
    const ICE: TypeEffectiveness = row(&["Fire", "Fighting", "Rock", "Steel"], &["Ice"], &[]);
    const FIGHTING: TypeEffectiveness =
        row(&["Flying", "Psychic", "Fairy"], &["Bug", "Rock", "Dark"], &[]);
    const POISON: TypeEffectiveness = row(
        &["Ground", "Psychic"],
        &["Grass", "Fighting", "Poison", "Bug", "Fairy"],
        &[],
    );
    const GROUND: TypeEffectiveness =
        row(&["Water", "Grass", "Ice"], &["Poison", "Rock"], &["Electric"]);
    const FLYING: TypeEffectiveness = row(
        &["Electric", "Ice", "Rock"],
        &["Grass", "Fighting", "Bug"],
        &["Ground"],
    );
    const PSYCHIC: TypeEffectiveness = row(&["Bug", "Ghost", "Dark"], &["Fighting", "Psychic"], &[]);
    const BUG: TypeEffectiveness =
        row(&["Fire", "Flying", "Rock"], &["Grass", "Fighting", "Ground"], &[]);
    const ROCK: TypeEffectiveness = row(
        &["Water", "Grass", "Fighting", "Ground", "Steel"],
        &["Normal", "Fire", "Poison", "Flying"],
        &[],
    );
    const GHOST: TypeEffectiveness =
        row(&["Ghost", "Dark"], &["Poison", "Bug"], &["Normal", "Fighting"]);
    const DRAGON: TypeEffectiveness = row(
        &["Ice", "Dragon", "Fairy"],
        &["Fire", "Water", "Electric", "Grass"],
        &[],
    );
    const DARK: TypeEffectiveness =
        row(&["Fighting", "Bug", "Fairy"], &["Ghost", "Dark"], &["Psychic"]);
    const STEEL: TypeEffectiveness = row(
        &["Fire", "Fighting", "Ground"],
        &[
            "Normal", "Grass", "Ice", "Flying", "Psychic", "Bug", "Rock", "Dragon", "Steel",
            "Fairy",
        ],
        &["Poison"],
    );
    const FAIRY: TypeEffectiveness =
        row(&["Poison", "Steel"], &["Fighting", "Bug", "Dark"], &["Dragon"]);

    let effectiveness = match tag {
        "Normal" => &NORMAL,
        "Fire" => &FIRE,
        "Water" => &WATER,
        "Electric" => &ELECTRIC,
        "Grass" => &GRASS,
        "Ice" => &ICE,
        "Fighting" => &FIGHTING,
        "Poison" => &POISON,
        "Ground" => &GROUND,
        "Flying" => &FLYING,
        "Psychic" => &PSYCHIC,
        "Bug" => &BUG,
        "Rock" => &ROCK,
        "Ghost" => &GHOST,
        "Dragon" => &DRAGON,
        "Dark" => &DARK,
        "Steel" => &STEEL,
        "Fairy" => &FAIRY,
        _ => return None,
    };
    Some(effectiveness)
}
