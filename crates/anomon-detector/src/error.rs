/// Errors raised while talking to the detector.
///
/// # Examples
///
/// ```rust
/// use anomon_detector::error::DetectorError;
///
/// let err = DetectorError::Status {
///     endpoint: "/api/v1/rule_updated".to_string(),
///     status: 500,
///     message: String::new(),
/// };
/// assert!(err.to_string().contains("500"));
/// assert!(!err.is_decode());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    /// Transport failure, including connect errors and timeouts.
    #[error("Detector: HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The envelope carried a status other than 200.
    #[error("Detector: {endpoint} answered status={status} {message}")]
    Status {
        endpoint: String,
        status: i64,
        message: String,
    },

    /// The body was not a `{status, data}` envelope.
    #[error("Detector: malformed response from {endpoint}: {source}")]
    Malformed {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// The envelope's `data` did not match the endpoint's record shape.
    #[error("Detector: cannot decode data from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl DetectorError {
    /// True when the detector acknowledged success but its `data` did not
    /// fit the expected shape. A body that is not an envelope at all counts
    /// as no acknowledgment.
    pub fn is_decode(&self) -> bool {
        matches!(self, DetectorError::Decode { .. })
    }
}

/// Convenience `Result` alias for detector calls.
pub type Result<T> = std::result::Result<T, DetectorError>;
