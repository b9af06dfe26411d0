//! Database-specific error types and conversions.

use lessons_core::error::LessonsError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Corrupt record: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for LessonsError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => LessonsError::NotFound { entity, id },
            other => LessonsError::Database(other.to_string()),
        }
    }
}
