//! # Remote Catalog Wire Format
//!
//! Response bodies of the remote catalog API and their projection onto
//! [`Species`].
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Remote Catalog Endpoints                           │
//! │                                                                         │
//! │  LIST                                                                  │
//! │  ────                                                                  │
//! │  GET {base}/pokemon?limit=1500&offset=0                                │
//! │  ◄── { count, results: [{ name, url }] }                               │
//! │                 url = ".../pokemon/25/"  ──► id 25                     │
//! │                                                                         │
//! │  DETAIL                                                                │
//! │  ──────                                                                │
//! │  GET {base}/pokemon/{id}                                               │
//! │  ◄── { id, name, height, weight,                                       │
//! │        types:     [{ slot, type: { name } }],                          │
//! │        stats:     [{ base_stat, effort, stat: { name } }],             │
//! │        abilities: [{ ability: { name }, is_hidden, slot }],            │
//! │        sprites:   { front_default } }                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unknown fields are ignored; the detail endpoint returns far more than is
//! kept locally.

use serde::{Deserialize, Serialize};

use pokedex_core::{capitalize, default_sprite_url, BaseStat, Species, SpeciesId};

use crate::error::{SyncError, SyncResult};

// =============================================================================
// List Endpoint
// =============================================================================

/// Body of `GET pokemon?limit=&offset=`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesListResponse {
    /// Total number of species known to the remote.
    pub count: u32,

    #[serde(default)]
    pub results: Vec<SpeciesListEntry>,
}

/// A named resource reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesListEntry {
    pub name: String,
    pub url: String,
}

impl SpeciesListEntry {
    /// Extracts the species id from the last non-empty path segment.
    ///
    /// Works on absolute and relative urls alike; any query or fragment is
    /// ignored.
    pub fn species_id(&self) -> SyncResult<SpeciesId> {
        let path = self.url.split(|c| c == '?' || c == '#').next().unwrap_or("");

        path.split('/')
            .filter(|segment| !segment.is_empty())
            .last()
            .and_then(|segment| segment.parse::<SpeciesId>().ok())
            .filter(|id| *id > 0)
            .ok_or_else(|| SyncError::InvalidListEntry {
                name: self.name.clone(),
                url: self.url.clone(),
            })
    }

    /// Projects the entry onto a skeleton record with a display name.
    pub fn to_skeleton(&self) -> SyncResult<Species> {
        Ok(Species::skeleton(self.species_id()?, capitalize(&self.name)))
    }
}

// =============================================================================
// Detail Endpoint
// =============================================================================

/// Body of `GET pokemon/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesDetailResponse {
    pub id: SpeciesId,
    pub name: String,
    pub height: u32,
    pub weight: u32,

    #[serde(default)]
    pub types: Vec<TypeSlot>,

    #[serde(default)]
    pub stats: Vec<StatEntry>,

    #[serde(default)]
    pub abilities: Vec<AbilitySlot>,

    #[serde(default)]
    pub sprites: Sprites,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSlot {
    pub slot: u32,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatEntry {
    pub base_stat: u32,
    #[serde(default)]
    pub effort: u32,
    pub stat: NamedResource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilitySlot {
    pub ability: NamedResource,
    #[serde(default)]
    pub is_hidden: bool,
    pub slot: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sprites {
    #[serde(default)]
    pub front_default: Option<String>,
}

impl SpeciesDetailResponse {
    /// Type tags ordered by slot, capitalized (`grass` becomes `Grass`).
    pub fn type_names(&self) -> Vec<String> {
        let mut slots: Vec<&TypeSlot> = self.types.iter().collect();
        slots.sort_by_key(|t| t.slot);
        slots.into_iter().map(|t| capitalize(&t.kind.name)).collect()
    }

    /// Remote sprite, or the deterministic fallback under `sprite_base_url`.
    pub fn image_url(&self, sprite_base_url: &str) -> String {
        self.sprites
            .front_default
            .clone()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| default_sprite_url(sprite_base_url, self.id))
    }

    /// Base stats in remote order, keyed by remote stat name.
    pub fn base_stats(&self) -> Vec<BaseStat> {
        self.stats
            .iter()
            .map(|s| BaseStat::new(s.stat.name.clone(), s.base_stat))
            .collect()
    }

    /// Ability names ordered by slot, hidden abilities included.
    pub fn ability_names(&self) -> Vec<String> {
        let mut slots: Vec<&AbilitySlot> = self.abilities.iter().collect();
        slots.sort_by_key(|a| a.slot);
        slots.into_iter().map(|a| a.ability.name.clone()).collect()
    }

    /// Fully hydrated record for this response.
    pub fn into_species(self, sprite_base_url: &str) -> Species {
        Species {
            id: self.id,
            name: capitalize(&self.name),
            types: self.type_names(),
            image_url: Some(self.image_url(sprite_base_url)),
            height: Some(self.height),
            weight: Some(self.weight),
            stats: Some(self.base_stats()),
            abilities: Some(self.ability_names()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokedex_core::DEFAULT_SPRITE_BASE_URL;

    const BULBASAUR: &str = r#"{
        "id": 1,
        "name": "bulbasaur",
        "height": 7,
        "weight": 69,
        "base_experience": 64,
        "types": [
            { "slot": 2, "type": { "name": "poison", "url": "https://pokeapi.co/api/v2/type/4/" } },
            { "slot": 1, "type": { "name": "grass", "url": "https://pokeapi.co/api/v2/type/12/" } }
        ],
        "stats": [
            { "base_stat": 45, "effort": 0, "stat": { "name": "hp" } },
            { "base_stat": 49, "effort": 0, "stat": { "name": "attack" } },
            { "base_stat": 65, "effort": 1, "stat": { "name": "special-attack" } }
        ],
        "abilities": [
            { "ability": { "name": "chlorophyll" }, "is_hidden": true, "slot": 3 },
            { "ability": { "name": "overgrow" }, "is_hidden": false, "slot": 1 }
        ],
        "sprites": { "front_default": "https://img.example/1.png", "back_default": null }
    }"#;

    fn entry(name: &str, url: &str) -> SpeciesListEntry {
        SpeciesListEntry {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_list_entry_id_from_trailing_segment() {
        let pikachu = entry("pikachu", "https://pokeapi.co/api/v2/pokemon/25/");
        assert_eq!(pikachu.species_id().unwrap(), 25);

        let no_slash = entry("mew", "https://pokeapi.co/api/v2/pokemon/151");
        assert_eq!(no_slash.species_id().unwrap(), 151);

        let relative = entry("pikachu", "pokemon/25/");
        assert_eq!(relative.species_id().unwrap(), 25);

        let rooted = entry("pikachu", "/api/v2/pokemon/25/");
        assert_eq!(rooted.species_id().unwrap(), 25);

        let with_query = entry("eevee", "/api/v2/pokemon/133/?lang=en#top");
        assert_eq!(with_query.species_id().unwrap(), 133);

        let skeleton = pikachu.to_skeleton().unwrap();
        assert_eq!(skeleton.name, "Pikachu");
        assert!(!skeleton.has_basic_details());
    }

    #[test]
    fn test_list_entry_without_id_is_rejected() {
        for url in [
            "https://pokeapi.co/api/v2/pokemon/",
            "https://pokeapi.co/api/v2/pokemon/pikachu/",
            "https://pokeapi.co/api/v2/pokemon/0/",
            "not a url",
            "",
            "/",
            "pokemon/-4/",
        ] {
            let err = entry("pikachu", url).species_id().unwrap_err();
            assert!(matches!(err, SyncError::InvalidListEntry { .. }), "{url}");
        }
    }

    #[test]
    fn test_list_response_parses() {
        let body = r#"{
            "count": 1302,
            "next": null,
            "previous": null,
            "results": [
                { "name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/" },
                { "name": "ivysaur", "url": "https://pokeapi.co/api/v2/pokemon/2/" }
            ]
        }"#;
        let list: SpeciesListResponse = serde_json::from_str(body).unwrap();
        assert_eq!(list.count, 1302);
        assert_eq!(list.results.len(), 2);
        assert_eq!(list.results[1].species_id().unwrap(), 2);
    }

    #[test]
    fn test_detail_normalization() {
        let detail: SpeciesDetailResponse = serde_json::from_str(BULBASAUR).unwrap();

        assert_eq!(detail.type_names(), vec!["Grass", "Poison"]);
        assert_eq!(detail.ability_names(), vec!["overgrow", "chlorophyll"]);
        assert_eq!(detail.image_url(DEFAULT_SPRITE_BASE_URL), "https://img.example/1.png");

        let species = detail.into_species(DEFAULT_SPRITE_BASE_URL);
        assert_eq!(species.name, "Bulbasaur");
        assert_eq!(species.height, Some(7));
        assert_eq!(species.weight, Some(69));
        assert_eq!(species.stat("special-attack"), Some(65));
        assert!(species.has_full_details());
    }

    #[test]
    fn test_missing_sprite_uses_fallback() {
        let body = r#"{ "id": 10001, "name": "deoxys-attack", "height": 17, "weight": 608,
                        "types": [], "stats": [], "abilities": [],
                        "sprites": { "front_default": null } }"#;
        let detail: SpeciesDetailResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            detail.image_url(DEFAULT_SPRITE_BASE_URL),
            "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/10001.png"
        );
        assert!(detail.type_names().is_empty());
    }
}
