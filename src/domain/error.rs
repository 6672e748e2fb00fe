//! Application error types with proper error chaining.

use thiserror::Error;

/// Failures raised by the persistence adapters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Query execution failed: {0}")]
    Query(String),
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Duplicate record: {0}")]
    Duplicate(String),
    #[error("Referenced record: {0}")]
    ForeignKey(String),
    #[error("Insufficient funds on account {0}")]
    InsufficientFunds(String),
    #[error("Pool exhausted: {0}")]
    PoolExhausted(String),
    #[error("Migration failed: {0}")]
    Migration(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Error kinds surfaced by the service layer.
///
/// The HTTP layer is the only place that turns these into status codes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Error not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("Failed to validate request")]
    Validation(Vec<String>),
    #[error("Not authorized! {0}")]
    Unauthorized(String),
    #[error("Internal failure: {0}")]
    Internal(String),
}

impl AppError {
    /// Classifies a persistence error at the service boundary.
    ///
    /// `not_found` is the message reported when the store found no rows,
    /// e.g. `"Customers not found"`.
    pub fn from_database(err: DatabaseError, not_found: impl Into<String>) -> Self {
        match err {
            DatabaseError::NotFound(_) => AppError::NotFound(not_found.into()),
            DatabaseError::Duplicate(msg) => AppError::BadRequest(format!("Duplicate record: {msg}")),
            DatabaseError::ForeignKey(msg) => AppError::BadRequest(format!("Referenced record: {msg}")),
            DatabaseError::InsufficientFunds(_) => AppError::BadRequest("insufficient funds".to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }

    /// Returns the violation list carried by a validation error.
    #[must_use]
    pub fn violations(&self) -> Option<&[String]> {
        match self {
            AppError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Row not found".to_string()),
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted("Pool timed out".to_string()),
            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.code().as_deref() {
                    Some("23505") => DatabaseError::Duplicate(message),
                    Some("23503") => DatabaseError::ForeignKey(message),
                    _ => DatabaseError::Query(message),
                }
            }
            _ => DatabaseError::Query(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DatabaseError::Migration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_error_conversions() {
        let not_found = DatabaseError::from(sqlx::Error::RowNotFound);
        assert!(matches!(not_found, DatabaseError::NotFound(_)));

        let pool_timeout = DatabaseError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(pool_timeout, DatabaseError::PoolExhausted(_)));

        let generic = DatabaseError::from(sqlx::Error::WorkerCrashed);
        assert!(matches!(generic, DatabaseError::Query(_)));
    }

    #[test]
    fn test_migrate_error_conversion() {
        let err = DatabaseError::from(sqlx::migrate::MigrateError::VersionMissing(1));
        match err {
            DatabaseError::Migration(msg) => assert!(msg.contains("migration 1")),
            other => panic!("Expected DatabaseError::Migration, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_not_found_uses_entity_message() {
        let err = AppError::from_database(
            DatabaseError::NotFound("Row not found".to_string()),
            "Customers not found",
        );
        assert_eq!(err, AppError::NotFound("Customers not found".to_string()));
        assert_eq!(err.to_string(), "Error not found: Customers not found");
    }

    #[test]
    fn test_classify_insufficient_funds_is_bad_request() {
        let err = AppError::from_database(
            DatabaseError::InsufficientFunds("acc".to_string()),
            "Account not found",
        );
        assert_eq!(err, AppError::BadRequest("insufficient funds".to_string()));
    }

    #[test]
    fn test_classify_duplicate_is_bad_request() {
        let err = AppError::from_database(
            DatabaseError::Duplicate("token".to_string()),
            "Customer not found",
        );
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_classify_foreign_key_is_bad_request() {
        let err = AppError::from_database(
            DatabaseError::ForeignKey("account is referenced by transactions".to_string()),
            "Account not found",
        );
        assert_eq!(
            err,
            AppError::BadRequest(
                "Referenced record: account is referenced by transactions".to_string()
            )
        );
    }

    #[test]
    fn test_classify_unexpected_errors_are_internal() {
        for db_err in [
            DatabaseError::Connection("refused".to_string()),
            DatabaseError::Query("syntax".to_string()),
            DatabaseError::PoolExhausted("busy".to_string()),
        ] {
            let err = AppError::from_database(db_err, "unused");
            assert!(matches!(err, AppError::Internal(_)));
        }
    }

    #[test]
    fn test_violations_accessor() {
        let err = AppError::Validation(vec!["first name is required".to_string()]);
        assert_eq!(err.violations(), Some(&["first name is required".to_string()][..]));
        assert!(AppError::Internal("x".to_string()).violations().is_none());
    }

    #[test]
    fn test_database_error_display() {
        let err = DatabaseError::Connection("timeout".to_string());
        assert_eq!(err.to_string(), "Connection failed: timeout");

        let err = DatabaseError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "Query execution failed: syntax error");

        let err = DatabaseError::NotFound("customer".to_string());
        assert_eq!(err.to_string(), "Record not found: customer");

        let err = DatabaseError::InsufficientFunds("acc_1".to_string());
        assert_eq!(err.to_string(), "Insufficient funds on account acc_1");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingEnvVar("DATABASE_URL".to_string());
        assert_eq!(
            err.to_string(),
            "Missing environment variable: DATABASE_URL"
        );

        let err = ConfigError::InvalidValue {
            key: "PORT".to_string(),
            message: "not a number".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value for 'PORT': not a number");
    }

    #[test]
    fn test_app_error_display() {
        assert_eq!(
            AppError::Unauthorized("Bad credentials".to_string()).to_string(),
            "Not authorized! Bad credentials"
        );
        assert_eq!(
            AppError::Validation(vec![]).to_string(),
            "Failed to validate request"
        );
        assert_eq!(
            AppError::BadRequest("Failed to parse UUID".to_string()).to_string(),
            "Failed to parse UUID"
        );
    }
}
