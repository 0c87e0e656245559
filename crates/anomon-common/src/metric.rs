use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Raw time-series result returned by a metric backend, passed through
/// without interpretation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct MetricSeries(pub serde_json::Value);

/// `[timestamp, "value"]` pair as emitted by Prometheus-compatible backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplePair(pub f64, pub String);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct MetricSample {
    #[serde(default)]
    pub metric: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub value: Option<SamplePair>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[schema(value_type = Object)]
    pub values: Vec<SamplePair>,
}

/// Closed time window with a resolution step, all in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
    pub step: i64,
}

impl TimeRange {
    /// Window covering `[start, end]` split into roughly 250 points.
    ///
    /// ```
    /// use anomon_common::metric::TimeRange;
    ///
    /// assert_eq!(TimeRange::for_episode(0, 2500).step, 10);
    /// assert_eq!(TimeRange::for_episode(1000, 1010).step, 1);
    /// ```
    pub fn for_episode(start: i64, end: i64) -> Self {
        let step = ((end - start) / 250).max(1);
        Self { start, end, step }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.step <= 0 {
            return Err("step must be positive".to_string());
        }
        if self.end < self.start {
            return Err("end must not be before start".to_string());
        }
        Ok(())
    }
}
