//! # Sync Error Types
//!
//! Error types for catalog sync and hydration.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Network      │  │     Protocol            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  NetworkFailure │  │  DeserializationFailed  │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  InvalidListEntry       │ │
//! │  │  ConfigLoad/Save│  │  HttpStatus     │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────────────────────────────────┐  │
//! │  │   Persistence   │  │                Hydration                    │  │
//! │  │                 │  │                                             │  │
//! │  │  Persistence    │  │  NotFound         (row absent after fetch)  │  │
//! │  │                 │  │  HydrationFailed  (shared in-flight failure)│  │
//! │  └─────────────────┘  └─────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use pokedex_core::SpeciesId;
use pokedex_db::DbError;
use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering all possible sync failures.
///
/// None of these are retried by the engine itself. Callers use
/// [`SyncError::is_retryable`] to decide whether to offer a retry.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid catalog configuration.
    #[error("Invalid catalog configuration: {0}")]
    InvalidConfig(String),

    /// Invalid API base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Network Errors
    // =========================================================================
    /// Transport failure (DNS, connect, TLS, reset).
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Remote answered with a non-success status.
    #[error("Remote catalog returned HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    // =========================================================================
    // Protocol Errors
    // =========================================================================
    /// Response body did not match the expected shape.
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// A list entry whose url carries no numeric id.
    #[error("List entry '{name}' has no species id in url '{url}'")]
    InvalidListEntry { name: String, url: String },

    // =========================================================================
    // Persistence / Hydration Errors
    // =========================================================================
    /// Local store read or write failed.
    #[error("Persistence failure: {0}")]
    Persistence(#[from] DbError),

    /// Species absent after a hydration that should have produced it.
    #[error("Species {id} not found")]
    NotFound { id: SpeciesId },

    /// Hydration failed in a concurrent call this call was waiting on.
    #[error("Hydration of species {id} failed: {message}")]
    HydrationFailed { id: SpeciesId, message: String },
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return SyncError::Timeout(0);
        }
        if err.is_decode() {
            return SyncError::DeserializationFailed(err.to_string());
        }
        if let Some(status) = err.status() {
            return SyncError::HttpStatus {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            };
        }
        SyncError::NetworkFailure(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::DeserializationFailed(err.to_string())
    }
}

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization (for retry affordances)
// =============================================================================

impl SyncError {
    /// Returns true if a later attempt may succeed.
    ///
    /// ## Retryable Errors
    /// - Network failures and timeouts
    /// - 5xx and 429 responses
    /// - Shared hydration failures (the id is released for retry)
    ///
    /// ## Non-Retryable Errors
    /// - Configuration errors
    /// - Malformed responses
    /// - Local store failures
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::NetworkFailure(_)
            | SyncError::Timeout(_)
            | SyncError::HydrationFailed { .. } => true,
            SyncError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Returns true if the remote catalog could not be reached or answered
    /// with an error status.
    pub fn is_network_error(&self) -> bool {
        matches!(
            self,
            SyncError::NetworkFailure(_) | SyncError::Timeout(_) | SyncError::HttpStatus { .. }
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::InvalidUrl(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
        )
    }
}
