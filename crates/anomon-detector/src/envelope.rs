use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{DetectorError, Result};

/// Status the detector uses to acknowledge success.
pub const STATUS_OK: i64 = 200;

/// Decoded `{status, message?, data?}` wrapper.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Success(Value),
    Failure { status: i64, message: String },
}

#[derive(Deserialize)]
struct RawEnvelope {
    /// Integral only; a fractional status is not an acknowledgment.
    status: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Value,
}

impl Envelope {
    pub fn parse(endpoint: &str, body: &[u8]) -> Result<Self> {
        let raw: RawEnvelope =
            serde_json::from_slice(body).map_err(|source| DetectorError::Malformed {
                endpoint: endpoint.to_string(),
                source,
            })?;
        let status = raw.status;
        if status == STATUS_OK {
            Ok(Envelope::Success(raw.data))
        } else {
            Ok(Envelope::Failure {
                status,
                message: raw.message.unwrap_or_default(),
            })
        }
    }

    /// Success payload, or `Status` for a failure envelope.
    pub fn into_success(self, endpoint: &str) -> Result<Value> {
        match self {
            Envelope::Success(data) => Ok(data),
            Envelope::Failure { status, message } => Err(DetectorError::Status {
                endpoint: endpoint.to_string(),
                status,
                message,
            }),
        }
    }
}

/// Decodes `data` into `T`. A `null` payload yields `T::default()`, so list
/// endpoints with nothing to report return an empty list.
pub fn decode_data<T>(endpoint: &str, data: Value) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if data.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(data).map_err(|source| DetectorError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}
