use anomon_common::metric::{MetricSeries, TimeRange};
use async_trait::async_trait;

use crate::client::DetectorClient;
use crate::error::Result;

/// Checks `expr` against the PromQL grammar without evaluating it.
///
/// ```
/// use anomon_detector::validate_expression;
///
/// assert!(validate_expression("sum(rate(http_requests_total[5m])) > 10").is_ok());
/// assert!(validate_expression("cpu_usage >").is_err());
/// assert!(validate_expression("   ").is_err());
/// ```
pub fn validate_expression(expr: &str) -> std::result::Result<(), String> {
    if expr.trim().is_empty() {
        return Err("expression is empty".to_string());
    }
    promql_parser::parser::parse(expr).map(|_| ())
}

/// Ranged metric queries, as needed to rebuild the window behind an
/// analysis result.
#[async_trait]
pub trait MetricSource: Send + Sync {
    async fn query_range(&self, expr: &str, range: TimeRange) -> Result<MetricSeries>;
}

/// Metric queries proxied through the detector. Expressions are forwarded
/// verbatim.
impl DetectorClient {
    /// Instant query at `time` (epoch seconds).
    pub async fn query(&self, expr: &str, time: i64) -> Result<MetricSeries> {
        self.get_data(
            "/api/v1/prometheus/query",
            &[("query", expr.to_string()), ("time", time.to_string())],
        )
        .await
    }

    pub async fn query_range(&self, expr: &str, range: TimeRange) -> Result<MetricSeries> {
        self.get_data(
            "/api/v1/prometheus/query_range",
            &[
                ("query", expr.to_string()),
                ("start_time", range.start.to_string()),
                ("end_time", range.end.to_string()),
                ("step", range.step.to_string()),
            ],
        )
        .await
    }
}

#[async_trait]
impl MetricSource for DetectorClient {
    async fn query_range(&self, expr: &str, range: TimeRange) -> Result<MetricSeries> {
        DetectorClient::query_range(self, expr, range).await
    }
}
