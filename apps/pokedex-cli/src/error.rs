//! # App Error Type
//!
//! Unified error type for CLI commands and state controllers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Pokédex CLI                        │
//! │                                                                         │
//! │  pokedex team add 3 25                                                 │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Controller method                                               │  │
//! │  │  AppResult<T>                                                    │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error? ─── DbError::QueryFailed("...") ───┐           │  │
//! │  │         │                                           │           │  │
//! │  │         ▼                                           ▼           │  │
//! │  │  Network Error? ──── SyncError::Timeout(30) ─────── AppError ──►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  stderr:  error[NETWORK_ERROR]: Request timed out after 30 seconds     │
//! │           (the command can be retried)                                 │
//! │  --json:  {"code":"NETWORK_ERROR","message":"...","retryable":true}    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use pokedex_core::{CoreError, ValidationError};
use pokedex_db::DbError;
use pokedex_sync::SyncError;

/// Result type alias for CLI operations.
pub type AppResult<T> = Result<T, AppError>;

/// Error surfaced to the user.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Team not found: 12",
///   "retryable": false
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Whether repeating the same command may succeed
    pub retryable: bool,
}

/// Error codes for CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Species or team does not exist
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Database operation failed
    DatabaseError,

    /// Remote catalog unreachable or answered with an error
    NetworkError,

    /// Remote catalog answered with an unexpected body
    RemoteDataError,

    /// Configuration could not be loaded or is invalid
    ConfigError,

    /// Internal error
    Internal,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::RemoteDataError => "REMOTE_DATA_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::Internal => "INTERNAL",
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorCode::ValidationError => 2,
            ErrorCode::NotFound => 3,
            ErrorCode::NetworkError | ErrorCode::RemoteDataError => 4,
            ErrorCode::ConfigError => 5,
            ErrorCode::DatabaseError | ErrorCode::Internal => 1,
        }
    }
}

impl AppError {
    /// Creates a new error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
            retryable: false,
        }
    }

    /// Marks the error as retryable.
    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        AppError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to app errors.
impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => AppError::not_found(&entity, id),
            DbError::Validation(e) => AppError::validation(e.to_string()),
            DbError::Decode { column, value } => {
                tracing::error!(%column, %value, "Stored value could not be decoded");
                AppError::new(
                    ErrorCode::DatabaseError,
                    format!("Stored {} value is corrupt", column),
                )
            }
            DbError::ConnectionFailed(_) => {
                AppError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                AppError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                AppError::new(ErrorCode::DatabaseError, "Database pool exhausted").retryable(true)
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts sync errors to app errors.
impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        let retryable = err.is_retryable();

        match err {
            SyncError::Persistence(db) => AppError::from(db),
            SyncError::NotFound { id } => AppError::not_found("Species", id),
            e if e.is_config_error() => AppError::new(ErrorCode::ConfigError, e.to_string()),
            e @ (SyncError::DeserializationFailed(_) | SyncError::InvalidListEntry { .. }) => {
                AppError::new(ErrorCode::RemoteDataError, e.to_string())
            }
            e => AppError::new(ErrorCode::NetworkError, e.to_string()).retryable(retryable),
        }
    }
}

/// Converts core errors to app errors.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SpeciesNotFound(id) => AppError::not_found("Species", id),
            CoreError::TeamNotFound(id) => AppError::not_found("Team", id),
            CoreError::InvalidSpeciesId(input) => {
                AppError::validation(format!("Invalid species id: {}", input))
            }
            CoreError::Validation(e) => AppError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "error[{}]: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_not_found_maps_to_not_found() {
        let err = AppError::from(DbError::not_found("Team", 12));
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Team not found: 12");
        assert_eq!(err.code.exit_code(), 3);
    }

    #[test]
    fn test_sync_errors_keep_retry_hint() {
        let timeout = AppError::from(SyncError::Timeout(30));
        assert_eq!(timeout.code, ErrorCode::NetworkError);
        assert!(timeout.retryable);

        let missing = AppError::from(SyncError::HttpStatus {
            status: 404,
            url: "pokemon/0".into(),
        });
        assert_eq!(missing.code, ErrorCode::NetworkError);
        assert!(!missing.retryable);

        let config = AppError::from(SyncError::InvalidUrl("bad".into()));
        assert_eq!(config.code, ErrorCode::ConfigError);

        let body = AppError::from(SyncError::DeserializationFailed("eof".into()));
        assert_eq!(body.code, ErrorCode::RemoteDataError);
    }

    #[test]
    fn test_validation_maps_to_validation_error() {
        let err = AppError::from(DbError::Validation(ValidationError::TooLong {
            field: "team name".into(),
            max: 50,
        }));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "team name must be at most 50 characters");
    }

    #[test]
    fn test_serialization() {
        let err = AppError::not_found("Species", 999);
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(
            json,
            r#"{"code":"NOT_FOUND","message":"Species not found: 999","retryable":false}"#
        );
        assert_eq!(err.to_string(), "error[NOT_FOUND]: Species not found: 999");
    }
}
