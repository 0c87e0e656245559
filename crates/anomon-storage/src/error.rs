/// Errors raised by the rule and analysis store.
///
/// # Examples
///
/// ```rust
/// use anomon_storage::error::StorageError;
///
/// let err = StorageError::NotFound {
///     entity: "rule",
///     id: 42,
/// };
/// assert!(err.to_string().contains("rule"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No row carries the requested id.
    #[error("Storage: {entity} not found (id={id})")]
    NotFound { entity: &'static str, id: i64 },

    /// A unique column (the rule name) already holds the submitted value.
    #[error("Storage: {entity} conflicts with an existing row: {message}")]
    Conflict {
        entity: &'static str,
        message: String,
    },

    /// Sort field or order outside the per-entity whitelist.
    #[error("Storage: invalid sort: {0}")]
    InvalidSort(String),

    /// Page window the database cannot address.
    #[error("Storage: invalid page: {0}")]
    InvalidPage(String),

    #[error("Storage: database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Convenience `Result` alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
