//! # Database Layer Error Types
//!
//! Error types for dialect resolution, context construction and repository
//! dispatch.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  CoreError (metamodel)     sqlx::Error (probe / pool)                  │
//! │       │                         │                                       │
//! │       └──────────┬──────────────┘                                       │
//! │                  ▼                                                      │
//! │  DbError (this module) ← Adds context and categorization               │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │  Caller (repository user, probe binary)                                │
//! │                                                                         │
//! │  Engine errors raised by a StatementExecutor pass through untouched.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use batis_core::CoreError;
use thiserror::Error;

/// Errors raised by the engine-facing layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// No registered dialect provider recognised the database.
    ///
    /// ## When This Occurs
    /// - The product name matches no known fragment
    /// - Every provider failed to acquire a connection
    /// - The provider list is empty
    ///
    /// Fatal to mapping context construction.
    #[error("Cannot determine a dialect for {environment}. Please provide an effective dialect.")]
    NoDialect { environment: String },

    /// A repository precondition failed before any dispatch.
    ///
    /// ## When This Occurs
    /// - Deleting an entity that has no identity value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is deliberately not implemented.
    ///
    /// ## When This Occurs
    /// - Query-by-example repository methods
    #[error("Operation not supported: {0}")]
    Unsupported(String),

    /// The entity metamodel could not be built.
    #[error("Mapping error: {0}")]
    Mapping(#[from] CoreError),

    /// An entity or parameter map could not be converted to or from JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Unreachable host or bad URL
    /// - Pool closed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Configuration file could not be read or parsed.
    #[error("Failed to load configuration: {0}")]
    ConfigLoadFailed(String),

    /// Configuration values are inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NoDialect error for an environment id.
    pub fn no_dialect(environment: impl Into<String>) -> Self {
        DbError::NoDialect {
            environment: environment.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        DbError::InvalidArgument(message.into())
    }

    pub fn unsupported(operation: impl Into<String>) -> Self {
        DbError::Unsupported(operation.into())
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database       → DbError::QueryFailed
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::PoolClosed     → DbError::ConnectionFailed
/// sqlx::Error::Io / Tls       → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => DbError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),
            sqlx::Error::Io(io) => DbError::ConnectionFailed(io.to_string()),
            sqlx::Error::Tls(tls) => DbError::ConnectionFailed(tls.to_string()),
            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<std::io::Error> for DbError {
    fn from(err: std::io::Error) -> Self {
        DbError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for DbError {
    fn from(err: toml::de::Error) -> Self {
        DbError::ConfigLoadFailed(err.to_string())
    }
}

/// Result type for database layer operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_dialect_message() {
        let err = DbError::no_dialect("unknownDB-env");
        assert_eq!(
            err.to_string(),
            "Cannot determine a dialect for unknownDB-env. Please provide an effective dialect."
        );
    }

    #[test]
    fn test_sqlx_pool_errors() {
        assert!(matches!(
            DbError::from(sqlx::Error::PoolTimedOut),
            DbError::PoolExhausted
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::PoolClosed),
            DbError::ConnectionFailed(_)
        ));
    }

    #[test]
    fn test_core_error_wraps() {
        let err: DbError = CoreError::InvalidTable {
            entity: "app::User".to_string(),
        }
        .into();
        assert!(matches!(err, DbError::Mapping(_)));
    }
}
