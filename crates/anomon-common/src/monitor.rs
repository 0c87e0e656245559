//! Infrastructure views reported by the detector. Missing numeric fields
//! decode as zero; a field of the wrong type fails the whole payload.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct MonitorTarget {
    pub instance: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct MonitorTargets {
    pub targets: Vec<MonitorTarget>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct NodeInfo {
    pub instance: String,
    pub arch: String,
    /// Also accepted as `kernal_version`, which older detectors emit.
    #[serde(alias = "kernal_version")]
    pub kernel_version: String,
    pub os_version: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ContainerCount {
    pub running: i64,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CpuUsage {
    pub usage: f64,
    pub used_core: f64,
    pub total_core: f64,
    pub number_cores: i64,
}

/// Byte-denominated usage, shared by memory and disk.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CapacityUsage {
    pub usage: f64,
    pub used_bytes: f64,
    pub total_bytes: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct NodeStatus {
    pub instance: String,
    pub container: ContainerCount,
    pub cpu: CpuUsage,
    pub memory: CapacityUsage,
    pub disk: CapacityUsage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn node_info_accepts_legacy_kernel_field() {
        let info: NodeInfo = serde_json::from_value(json!({
            "instance": "n1",
            "arch": "x86_64",
            "kernal_version": "6.1.0",
            "os_version": "debian 12"
        }))
        .unwrap();
        assert_eq!(info.kernel_version, "6.1.0");
    }

    #[test]
    fn node_status_rejects_wrong_types() {
        let bad = json!({"instance": "n1", "cpu": {"usage": "lots"}});
        assert!(serde_json::from_value::<NodeStatus>(bad).is_err());
    }

    #[test]
    fn node_status_missing_fields_are_zero() {
        let status: NodeStatus =
            serde_json::from_value(json!({"instance": "n1", "memory": {"usage": 0.5}})).unwrap();
        assert_eq!(status.memory.usage, 0.5);
        assert_eq!(status.disk.total_bytes, 0.0);
    }
}
