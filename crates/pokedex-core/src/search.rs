//! Catalog filtering for the browse list.

use serde::{Deserialize, Serialize};

use crate::types::Species;

/// What a search query is matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Case-insensitive substring of the display name.
    #[default]
    Name,
    /// Substring of the decimal catalog id.
    Id,
}

impl SearchMode {
    /// Whether `species` matches an already-trimmed, non-blank query.
    pub fn matches(self, species: &Species, query: &str) -> bool {
        match self {
            SearchMode::Name => species
                .name
                .to_lowercase()
                .contains(&query.to_lowercase()),
            SearchMode::Id => species.id.to_string().contains(query),
        }
    }
}

/// Filters `catalog` by `query`, keeping catalog order.
///
/// A blank query returns every entry.
pub fn filter_species<'a>(catalog: &'a [Species], query: &str, mode: SearchMode) -> Vec<&'a Species> {
    let query = query.trim();
    if query.is_empty() {
        return catalog.iter().collect();
    }

    catalog.iter().filter(|s| mode.matches(s, query)).collect()
}
