//! # Catalog Configuration
//!
//! Configuration for the remote catalog client and the sync engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     POKEDEX_API_BASE_URL=http://localhost:8000/api/v2                  │
//! │     POKEDEX_LIST_LIMIT=151                                             │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pokedex/catalog.toml (Linux)                             │
//! │     ~/Library/Application Support/dev.pokedex.pokedex/catalog.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     https://pokeapi.co/api/v2, limit 1500, 30 second timeout           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # catalog.toml
//! [api]
//! base_url = "https://pokeapi.co/api/v2"
//! list_limit = 1500
//! request_timeout_secs = 30
//!
//! [sprites]
//! base_url = "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use pokedex_core::DEFAULT_SPRITE_BASE_URL;

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Remote API Configuration
// =============================================================================

/// Remote catalog API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base url of the catalog API, without a trailing resource path.
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// Number of entries requested by the bulk list call.
    /// The catalog is fetched in one page.
    #[serde(default = "default_list_limit")]
    pub list_limit: u32,

    /// Connect and read timeout for each request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Upper bound on detail requests issued at once for a page of rows.
    #[serde(default = "default_max_concurrent_details")]
    pub max_concurrent_details: usize,
}

fn default_api_base_url() -> String {
    "https://pokeapi.co/api/v2".to_string()
}

fn default_list_limit() -> u32 {
    1500
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_concurrent_details() -> usize {
    4
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_api_base_url(),
            list_limit: default_list_limit(),
            request_timeout_secs: default_request_timeout_secs(),
            max_concurrent_details: default_max_concurrent_details(),
        }
    }
}

// =============================================================================
// Sprite Configuration
// =============================================================================

/// Where fallback artwork is served from when the remote record has none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteConfig {
    #[serde(default = "default_sprite_base_url")]
    pub base_url: String,
}

fn default_sprite_base_url() -> String {
    DEFAULT_SPRITE_BASE_URL.to_string()
}

impl Default for SpriteConfig {
    fn default() -> Self {
        SpriteConfig {
            base_url: default_sprite_base_url(),
        }
    }
}

// =============================================================================
// Main Catalog Configuration
// =============================================================================

/// Complete catalog configuration.
///
/// ## Loading Configuration
/// ```rust,ignore
/// // Load from default location with env overrides
/// let config = CatalogConfig::load(None)?;
///
/// // Load from specific file
/// let config = CatalogConfig::load(Some("/path/to/catalog.toml".into()))?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub sprites: SpriteConfig,
}

impl CatalogConfig {
    /// Loads configuration from file and environment.
    ///
    /// ## Loading Order
    /// 1. Start with defaults
    /// 2. Load from config file (if exists)
    /// 3. Override with environment variables
    /// 4. Validate
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading catalog config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load catalog config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Catalog config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        for (field, value) in [
            ("api.base_url", &self.api.base_url),
            ("sprites.base_url", &self.sprites.base_url),
        ] {
            let url = Url::parse(value)?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(SyncError::InvalidUrl(format!(
                    "{} must start with http:// or https://, got: {}",
                    field, value
                )));
            }
        }

        if self.api.list_limit == 0 {
            return Err(SyncError::InvalidConfig(
                "list_limit must be greater than 0".into(),
            ));
        }

        if self.api.request_timeout_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.api.max_concurrent_details == 0 {
            return Err(SyncError::InvalidConfig(
                "max_concurrent_details must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("POKEDEX_API_BASE_URL") {
            debug!(url = %url, "Overriding API base url from environment");
            self.api.base_url = url;
        }

        if let Ok(limit) = std::env::var("POKEDEX_LIST_LIMIT") {
            match limit.parse::<u32>() {
                Ok(l) => self.api.list_limit = l,
                Err(_) => warn!(value = %limit, "Ignoring non-numeric POKEDEX_LIST_LIMIT"),
            }
        }

        if let Ok(timeout) = std::env::var("POKEDEX_REQUEST_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(t) => self.api.request_timeout_secs = t,
                Err(_) => {
                    warn!(value = %timeout, "Ignoring non-numeric POKEDEX_REQUEST_TIMEOUT_SECS")
                }
            }
        }

        if let Ok(max) = std::env::var("POKEDEX_MAX_CONCURRENT_DETAILS") {
            match max.parse::<usize>() {
                Ok(m) => self.api.max_concurrent_details = m,
                Err(_) => {
                    warn!(value = %max, "Ignoring non-numeric POKEDEX_MAX_CONCURRENT_DETAILS")
                }
            }
        }

        if let Ok(url) = std::env::var("POKEDEX_SPRITE_BASE_URL") {
            self.sprites.base_url = url;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "pokedex", "pokedex")
            .map(|dirs| dirs.config_dir().join("catalog.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    /// Builds an absolute endpoint url from a path relative to the API base.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
