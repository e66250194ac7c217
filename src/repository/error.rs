// ==========================================
// Shift Engine - Repository Error Types
// ==========================================
// thiserror derive macros; repositories never panic on
// database failures.
// ==========================================

use thiserror::Error;

/// Repository-layer error type.
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== Lookup errors =====
    #[error("record not found: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    // ===== Database errors =====
    #[error("database connection failed: {0}")]
    DatabaseConnectionError(String),

    #[error("database lock acquisition failed: {0}")]
    LockError(String),

    #[error("database transaction failed: {0}")]
    DatabaseTransactionError(String),

    #[error("database query failed: {0}")]
    DatabaseQueryError(String),

    #[error("unique constraint violated: {0}")]
    UniqueConstraintViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    // ===== Payload errors =====
    #[error("invalid stored payload: {0}")]
    InvalidPayload(String),

    #[error("invalid availability rule payload: {0}")]
    InvalidRulePayload(String),
}

/// Repository-layer result alias.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, message) => match code.code {
                rusqlite::ErrorCode::ConstraintViolation => {
                    let detail = message.clone().unwrap_or_else(|| code.to_string());
                    if detail.contains("FOREIGN KEY") {
                        RepositoryError::ForeignKeyViolation(detail)
                    } else {
                        RepositoryError::UniqueConstraintViolation(detail)
                    }
                }
                rusqlite::ErrorCode::CannotOpen => {
                    RepositoryError::DatabaseConnectionError(err.to_string())
                }
                _ => RepositoryError::DatabaseQueryError(err.to_string()),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::InvalidPayload(err.to_string())
    }
}
