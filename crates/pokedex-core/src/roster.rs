//! # Roster Rules
//!
//! Bounded mutations of a team's member list. Every function returns a new
//! [`Roster`]; out-of-bounds requests return the input unchanged so callers
//! detect a rejected mutation by comparing before and after.
//!
//! ```text
//!   with_reordered([A, B, C, D], from: 0, to: 2)
//!
//!     remove A      →  [B, C, D]
//!     insert at 2   →  [B, C, A, D]
//! ```

use crate::types::{Roster, SpeciesId};

/// Appends `species_id` at the tail.
///
/// No-op when the roster is full or already contains the id.
///
/// ## Example
/// ```rust
/// use pokedex_core::{roster::with_added, Roster};
///
/// let roster = with_added(&Roster::new(1, "Starters"), 25);
/// assert_eq!(roster.member_ids, vec![25]);
/// assert_eq!(with_added(&roster, 25), roster);
/// ```
pub fn with_added(roster: &Roster, species_id: SpeciesId) -> Roster {
    if roster.is_full() || roster.contains(species_id) {
        return roster.clone();
    }

    let mut next = roster.clone();
    next.member_ids.push(species_id);
    next
}

/// Removes the member at `index`, shifting later members down by one.
pub fn with_removed_at(roster: &Roster, index: usize) -> Roster {
    if index >= roster.len() {
        return roster.clone();
    }

    let mut next = roster.clone();
    next.member_ids.remove(index);
    next
}

/// Moves the member at `from` so that it ends up at `to`.
pub fn with_reordered(roster: &Roster, from: usize, to: usize) -> Roster {
    let len = roster.len();
    if from >= len || to >= len {
        return roster.clone();
    }

    let mut next = roster.clone();
    let moved = next.member_ids.remove(from);
    next.member_ids.insert(to, moved);
    next
}
