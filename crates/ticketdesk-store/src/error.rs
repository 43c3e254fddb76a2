//! Error types for the settings store.

use thiserror::Error;

/// Settings store errors.
///
/// Any of these means the write (or read) did not happen; callers must not
/// assume otherwise.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database locked error (retryable)
    #[error("database is locked (retry {retry_count}/{max_retries}): {message}")]
    DatabaseLocked {
        /// Retry attempt number
        retry_count: u32,
        /// Maximum retries allowed
        max_retries: u32,
        /// Human-readable message
        message: String,
    },

    /// JSON encoding of a column failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Stored row could not be decoded
    #[error("corrupt settings row for tenant {tenant_id}: {message}")]
    CorruptRow { tenant_id: u64, message: String },

    /// Stored primary key is not a valid tenant id
    #[error("corrupt tenant key {0} in settings table")]
    CorruptTenantKey(i64),

    /// Snowflake does not fit the storage integer type
    #[error("identifier {0} is out of range for storage")]
    IdOutOfRange(u64),

    /// Connection mutex was poisoned by a panicking writer
    #[error("connection lock poisoned: {0}")]
    LockPoisoned(String),

    /// Blocking database task failed to complete
    #[error("database task failed: {0}")]
    Task(String),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(String),

    /// Store is unavailable (used by alternative backends and tests)
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Check if this error is retryable (e.g., database locked).
    pub fn is_retryable(&self) -> bool {
        is_database_locked_error(self) || matches!(self, StoreError::Unavailable(_))
    }

    /// Create a user-friendly message for this error.
    pub fn friendly_message(&self) -> String {
        match self {
            StoreError::DatabaseLocked { .. } => {
                "Settings database is busy. Please try again.".to_string()
            }
            StoreError::Database(_) if is_database_locked_error(self) => {
                "Settings database is temporarily locked. Please try again.".to_string()
            }
            StoreError::Database(_) => "Settings could not be saved. Please try again.".to_string(),
            StoreError::Unavailable(_) => {
                "Settings storage is unavailable. Please try again.".to_string()
            }
            _ => format!("Settings storage error: {}", self),
        }
    }
}

/// Check if a StoreError indicates a database lock.
pub fn is_database_locked_error(error: &StoreError) -> bool {
    match error {
        StoreError::DatabaseLocked { .. } => true,
        StoreError::Database(rusqlite::Error::SqliteFailure(e, _)) => {
            e.code == rusqlite::ErrorCode::DatabaseBusy
                || e.code == rusqlite::ErrorCode::DatabaseLocked
        }
        _ => false,
    }
}

/// Result type for settings store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
