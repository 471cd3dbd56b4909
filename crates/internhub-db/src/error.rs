use rusqlite::ffi;
use thiserror::Error;

/// Failures surfaced by the store, already sorted into the buckets callers
/// map onto responses.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No row matched the key, or a referenced row does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// A unique constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),
    /// A NOT NULL or CHECK constraint rejected the write, or the caller
    /// asked for something the store will not do.
    #[error("invalid data: {0}")]
    Invalid(String),
    #[error("sqlite error: {0}")]
    Sqlite(rusqlite::Error),
    #[error("connection lock poisoned: {0}")]
    Poisoned(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, msg) = &err {
            if code.code == rusqlite::ErrorCode::ConstraintViolation {
                let detail = msg.clone().unwrap_or_else(|| code.to_string());
                return match code.extended_code {
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        StoreError::Conflict(detail)
                    }
                    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => StoreError::NotFound("referenced record"),
                    _ => StoreError::Invalid(detail),
                };
            }
        }
        StoreError::Sqlite(err)
    }
}
