//! Database-specific error types and conversions.

use storeroom_core::error::StoreroomError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    /// The database rejected a statement at runtime.
    #[error("Query failed: {0}")]
    Query(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Malformed record: {0}")]
    Decode(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("no database connection configured")]
    NotConfigured,
}

impl From<DbError> for StoreroomError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => StoreroomError::NotFound { entity, id },
            DbError::NotConfigured => StoreroomError::Configuration(err.to_string()),
            DbError::InvalidValue(message) => StoreroomError::Validation { message },
            other => StoreroomError::Database(other.to_string()),
        }
    }
}
