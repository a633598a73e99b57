//! Core error types for habitrack-core.
//!
//! The streak engine itself is total and never fails; everything around it
//! (storage, configuration, validation, lookups) reports through [`CoreError`].

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for habitrack-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No user with the given id or email
    #[error("User with {0} not found")]
    UserNotFound(UserLookup),

    /// Email is already registered
    #[error("User with email {0} already exists")]
    EmailAlreadyExists(String),

    /// Habit missing, or owned by someone else
    #[error("Habit with id={habit_id} not found for user with id={user_id}")]
    HabitNotFound { habit_id: i64, user_id: i64 },

    #[error("Habit with ID {habit_id} is already completed for {date}")]
    HabitAlreadyCompleted { habit_id: i64, date: NaiveDate },

    #[error("No completion found for habit with ID {habit_id} on {date}")]
    CompletionNotFound { habit_id: i64, date: NaiveDate },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// How a missing user was looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    Id(i64),
    Email(String),
}

impl std::fmt::Display for UserLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserLookup::Id(id) => write!(f, "id {id}"),
            UserLookup::Email(email) => write!(f, "email {email}"),
        }
    }
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Unique or foreign key constraint rejected the write
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("Unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Date string was not `YYYY-MM-DD`
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
}

impl ValidationError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => match code.code {
                rusqlite::ErrorCode::DatabaseLocked | rusqlite::ErrorCode::DatabaseBusy => {
                    DatabaseError::Locked
                }
                rusqlite::ErrorCode::ConstraintViolation => {
                    DatabaseError::ConstraintViolation(err.to_string())
                }
                _ => DatabaseError::QueryFailed(err.to_string()),
            },
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_lookup_wording() {
        let err = CoreError::HabitNotFound {
            habit_id: 4,
            user_id: 1,
        };
        assert_eq!(
            err.to_string(),
            "Habit with id=4 not found for user with id=1"
        );

        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let err = CoreError::HabitAlreadyCompleted { habit_id: 4, date };
        assert_eq!(
            err.to_string(),
            "Habit with ID 4 is already completed for 2026-10-18"
        );

        let err = CoreError::UserNotFound(UserLookup::Email("a@b.io".into()));
        assert_eq!(err.to_string(), "User with email a@b.io not found");
    }

    #[test]
    fn rusqlite_no_rows_maps_to_query_failed() {
        let err: DatabaseError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, DatabaseError::QueryFailed(_)));
    }
}
