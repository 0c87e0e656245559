use async_trait::async_trait;

use crate::client::DetectorClient;
use crate::error::Result;

const RULE_UPDATED_PATH: &str = "/api/v1/rule_updated";

/// Tells the detector that the stored rule set changed so it reloads it.
///
/// A single attempt per call; callers decide whether to retry.
#[async_trait]
pub trait RuleSetNotifier: Send + Sync {
    async fn notify_rule_set_changed(&self) -> Result<()>;
}

#[async_trait]
impl RuleSetNotifier for DetectorClient {
    async fn notify_rule_set_changed(&self) -> Result<()> {
        self.get_envelope(RULE_UPDATED_PATH, &[])
            .await?
            .into_success(RULE_UPDATED_PATH)?;
        Ok(())
    }
}
