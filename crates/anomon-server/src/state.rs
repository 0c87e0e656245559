use std::sync::Arc;
use std::time::Duration;

use anomon_detector::DetectorClient;
use anomon_engine::{AnalysisAccessor, RuleService};
use anomon_storage::Store;
use chrono::{DateTime, Utc};

use crate::config::ServerConfig;

/// Handles shared by every request handler. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub rules: RuleService,
    pub analyses: AnalysisAccessor,
    pub detector: DetectorClient,
    pub start_time: DateTime<Utc>,
}

impl AppState {
    /// Connects the store (running migrations) and wires the services to a
    /// single detector client.
    pub async fn build(config: ServerConfig) -> anyhow::Result<Self> {
        let store = Arc::new(Store::connect(&config.database.url).await?);
        let detector = DetectorClient::new(
            &config.detector.host,
            config.detector.port,
            Duration::from_secs(config.detector.timeout_secs),
        )?;
        let shared = Arc::new(detector.clone());

        Ok(Self {
            rules: RuleService::new(store.clone(), shared.clone()),
            analyses: AnalysisAccessor::new(store.clone(), shared),
            store,
            detector,
            start_time: Utc::now(),
        })
    }
}
