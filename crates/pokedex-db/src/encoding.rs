//! Flat column encodings for ordered lists.
//!
//! ```text
//!   types       ["Grass", "Poison"]            ⇄  "Grass,Poison"
//!   stats       [hp 45, attack 49]             ⇄  "hp:45,attack:49"
//!   member_ids  [1, 4, 7]                      ⇄  "1,4,7"
//!   (empty)     []                             ⇄  ""
//! ```
//!
//! Type tags, ability names and stat names never contain `,` or `:`.

use pokedex_core::{BaseStat, SpeciesId};

use crate::error::{DbError, DbResult};

const ITEM_SEPARATOR: char = ',';
const PAIR_SEPARATOR: char = ':';

/// Joins names in order.
pub fn encode_names<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(",")
}

/// Splits a name column. A blank column decodes to an empty list.
pub fn decode_names(column: &str) -> Vec<String> {
    if column.trim().is_empty() {
        return Vec::new();
    }
    column
        .split(ITEM_SEPARATOR)
        .map(|s| s.trim().to_string())
        .collect()
}

pub fn encode_stats(stats: &[BaseStat]) -> String {
    stats
        .iter()
        .map(|s| format!("{}{}{}", s.name, PAIR_SEPARATOR, s.value))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn decode_stats(column: &str) -> DbResult<Vec<BaseStat>> {
    if column.trim().is_empty() {
        return Ok(Vec::new());
    }

    column
        .split(ITEM_SEPARATOR)
        .map(|pair| -> DbResult<BaseStat> {
            let (name, value) = pair
                .split_once(PAIR_SEPARATOR)
                .ok_or_else(|| DbError::decode("stats", column))?;
            let value: u32 = value
                .trim()
                .parse()
                .map_err(|_| DbError::decode("stats", column))?;
            Ok(BaseStat::new(name.trim(), value))
        })
        .collect()
}

pub fn encode_ids(ids: &[SpeciesId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

pub fn decode_ids(column: &str) -> DbResult<Vec<SpeciesId>> {
    if column.trim().is_empty() {
        return Ok(Vec::new());
    }

    column
        .split(ITEM_SEPARATOR)
        .map(|id| {
            id.trim()
                .parse::<SpeciesId>()
                .map_err(|_| DbError::decode("member_ids", column))
        })
        .collect()
}
