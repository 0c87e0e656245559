use anomon_detector::DetectorError;
use anomon_storage::StorageError;

/// Which rule check failed. Checks run in declaration order and stop at the
/// first failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidRule {
    #[error("name must be 1 to 64 characters of [A-Za-z0-9_]")]
    Name,

    #[error("expression is not valid PromQL: {0}")]
    Expression(String),

    #[error("subhealth threshold must be a finite number")]
    SubhealthThreshold,

    #[error("fault threshold must be a finite number")]
    FaultThreshold,

    #[error("severity must be one of warning, error, critical")]
    Severity,

    #[error("duration must be a positive interval such as 5m: {0}")]
    Duration(String),
}

/// Errors surfaced by the rule service and the analysis accessor.
///
/// # Examples
///
/// ```rust
/// use anomon_engine::{EngineError, InvalidRule};
///
/// let err = EngineError::from(InvalidRule::Severity);
/// assert!(err.to_string().contains("severity"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Rejected before reaching the store.
    #[error("Engine: invalid rule: {0}")]
    InvalidRule(#[from] InvalidRule),

    #[error("Engine: invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Engine: {entity} not found (id={id})")]
    NotFound { entity: &'static str, id: i64 },

    /// A unique field (the rule name) is already taken.
    #[error("Engine: conflict: {0}")]
    Conflict(String),

    /// Detector or metrics backend unreachable, or answered non-success.
    #[error("Engine: detector unavailable: {0}")]
    DetectorUnavailable(#[source] DetectorError),

    /// The detector answered with a payload that could not be decoded.
    #[error("Engine: detector payload could not be decoded: {0}")]
    Decode(#[source] DetectorError),

    /// The mutation of `rule_id` is persisted but the detector was not told.
    #[error("Engine: rule {rule_id} saved but the detector was not notified: {source}")]
    NotifyFailed {
        rule_id: i64,
        #[source]
        source: DetectorError,
    },

    #[error("Engine: storage error: {0}")]
    Store(#[source] StorageError),
}

impl From<StorageError> for EngineError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, id } => EngineError::NotFound { entity, id },
            StorageError::Conflict { entity, message } => {
                EngineError::Conflict(format!("{entity} already exists: {message}"))
            }
            StorageError::InvalidSort(msg) | StorageError::InvalidPage(msg) => {
                EngineError::InvalidArgument(msg)
            }
            other => EngineError::Store(other),
        }
    }
}

impl From<DetectorError> for EngineError {
    fn from(err: DetectorError) -> Self {
        if err.is_decode() {
            EngineError::Decode(err)
        } else {
            EngineError::DetectorUnavailable(err)
        }
    }
}

/// Convenience `Result` alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
