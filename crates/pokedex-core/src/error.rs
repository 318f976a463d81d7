//! # Error Types
//!
//! Domain-specific error types for pokedex-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pokedex-core errors (this file)                                       │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  pokedex-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  pokedex-sync errors (separate crate)                                  │
//! │  └── SyncError        - Network / hydration failures                   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → SyncError → AppError    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Roster Bounds Are Not Errors
//! Adding to a full team or removing at an out-of-range index is a defined
//! no-op (see [`crate::roster`]). No variant here represents those cases.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Species id is not a positive integer or cannot be parsed.
    #[error("Invalid species id: {0}")]
    InvalidSpeciesId(String),

    /// Species is not present in the catalog.
    #[error("Species not found: {0}")]
    SpeciesNotFound(u32),

    /// Team is not present.
    #[error("Team not found: {0}")]
    TeamNotFound(i64),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., non-numeric id).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(CoreError::SpeciesNotFound(25).to_string(), "Species not found: 25");
        assert_eq!(CoreError::TeamNotFound(3).to_string(), "Team not found: 3");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "query".to_string(),
        };
        assert_eq!(err.to_string(), "query is required");

        let err = ValidationError::TooLong {
            field: "name".to_string(),
            max: 50,
        };
        assert_eq!(err.to_string(), "name must be at most 50 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
