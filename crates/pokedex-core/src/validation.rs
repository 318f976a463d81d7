//! # Validation Module
//!
//! Input normalization for values entering from the CLI or controllers.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI argument parsing (clap)                                  │
//! │  └── Type validation (numbers, flags)                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Trimming and defaults (team names)                                │
//! │  └── Length limits (names, search queries)                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── NOT NULL / PRIMARY KEY constraints                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pokedex_core::validation::{normalize_team_name, parse_species_id};
//!
//! assert_eq!(normalize_team_name("  Rain Team ").unwrap(), "Rain Team");
//! assert_eq!(normalize_team_name("").unwrap(), "My Team");
//! assert_eq!(parse_species_id("25").unwrap(), 25);
//! ```

use crate::error::ValidationError;
use crate::types::SpeciesId;
use crate::{DEFAULT_TEAM_NAME, MAX_TEAM_NAME_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of a search query after trimming.
pub const MAX_SEARCH_QUERY_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Normalizes a team name.
///
/// ## Rules
/// - Surrounding whitespace is trimmed
/// - Blank input falls back to [`DEFAULT_TEAM_NAME`]
/// - At most [`MAX_TEAM_NAME_LEN`] characters
pub fn normalize_team_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Ok(DEFAULT_TEAM_NAME.to_string());
    }

    if name.chars().count() > MAX_TEAM_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "team name".to_string(),
            max: MAX_TEAM_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (returns the whole catalog)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_SEARCH_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Parses a species id typed by the user.
///
/// ## Rules
/// - Must be a decimal integer, optionally prefixed with `#` (as displayed)
/// - Must be positive (> 0)
pub fn parse_species_id(input: &str) -> ValidationResult<SpeciesId> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

    if digits.is_empty() {
        return Err(ValidationError::Required {
            field: "species id".to_string(),
        });
    }

    let id: SpeciesId = digits.parse().map_err(|_| ValidationError::InvalidFormat {
        field: "species id".to_string(),
        reason: format!("'{input}' is not a number"),
    })?;

    if id == 0 {
        return Err(ValidationError::MustBePositive {
            field: "species id".to_string(),
        });
    }

    Ok(id)
}

// =============================================================================
// Unit Tests
// =============================================================================
