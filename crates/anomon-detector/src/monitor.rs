use anomon_common::metric::{MetricSample, TimeRange};
use anomon_common::monitor::{MonitorTargets, NodeInfo, NodeStatus};

use crate::client::DetectorClient;
use crate::error::Result;

fn range_params(range: TimeRange) -> [(&'static str, String); 3] {
    [
        ("start_time", range.start.to_string()),
        ("end_time", range.end.to_string()),
        ("step", range.step.to_string()),
    ]
}

fn instance_param(instance: Option<&str>) -> Vec<(&'static str, String)> {
    instance
        .filter(|i| !i.is_empty())
        .map(|i| vec![("instance", i.to_string())])
        .unwrap_or_default()
}

/// Monitoring views. Each call fails as a whole if any record in the
/// payload does not decode.
impl DetectorClient {
    pub async fn targets(&self) -> Result<MonitorTargets> {
        self.get_data("/api/v1/monitor/targets", &[]).await
    }

    /// All nodes, or only `instance` when given.
    pub async fn node_info(&self, instance: Option<&str>) -> Result<Vec<NodeInfo>> {
        self.get_data("/api/v1/monitor/node_info", &instance_param(instance))
            .await
    }

    pub async fn node_status(&self, instance: Option<&str>) -> Result<Vec<NodeStatus>> {
        self.get_data("/api/v1/monitor/node_status", &instance_param(instance))
            .await
    }

    pub async fn node_resources(
        &self,
        instance: &str,
        range: TimeRange,
    ) -> Result<Vec<MetricSample>> {
        let mut params = vec![("instance", instance.to_string())];
        params.extend(range_params(range));
        self.get_data("/api/v1/monitor/node_resources", &params).await
    }

    pub async fn node_container_status(&self, instance: &str) -> Result<Vec<MetricSample>> {
        self.get_data(
            "/api/v1/monitor/node_container_status",
            &[("instance", instance.to_string())],
        )
        .await
    }

    pub async fn cluster_resources(&self, range: TimeRange) -> Result<Vec<MetricSample>> {
        self.get_data("/api/v1/monitor/cluster_resources", &range_params(range))
            .await
    }

    pub async fn cluster_container_status(&self, range: TimeRange) -> Result<Vec<MetricSample>> {
        self.get_data(
            "/api/v1/monitor/cluster_container_status",
            &range_params(range),
        )
        .await
    }
}
