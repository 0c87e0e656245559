use std::sync::Arc;

use anomon_common::types::{Rule, RuleChanges, RuleDraft};
use anomon_detector::RuleSetNotifier;
use anomon_storage::{PageRequest, RuleFilter, RuleSortField, Sort, Store};

use crate::error::{EngineError, Result};
use crate::validator::validate;

/// Rule lifecycle: each mutation is validated, persisted, then announced
/// to the detector.
///
/// Validation failures never reach the store. A notify failure after a
/// successful write returns [`EngineError::NotifyFailed`] and leaves the
/// write in place.
#[derive(Clone)]
pub struct RuleService {
    store: Arc<Store>,
    notifier: Arc<dyn RuleSetNotifier>,
}

impl RuleService {
    pub fn new(store: Arc<Store>, notifier: Arc<dyn RuleSetNotifier>) -> Self {
        Self { store, notifier }
    }

    /// Reads straight from the store; the total counts every matching row.
    pub async fn list(
        &self,
        filter: &RuleFilter,
        sort: Sort<RuleSortField>,
        page: PageRequest,
    ) -> Result<(Vec<Rule>, u64)> {
        Ok(self.store.list_rules(filter, sort, page).await?)
    }

    pub async fn get(&self, id: i64) -> Result<Rule> {
        self.store
            .get_rule_by_id(id)
            .await?
            .ok_or(EngineError::NotFound { entity: "rule", id })
    }

    pub async fn create(&self, draft: RuleDraft) -> Result<Rule> {
        let draft = draft.normalize();
        validate(&draft)?;
        let rule = self.store.insert_rule(&draft).await?;
        tracing::info!(rule_id = rule.id, name = %rule.name, "Rule created");
        self.notify(rule.id).await?;
        Ok(rule)
    }

    /// Validates the rule as it would look after `changes`, then writes only
    /// the supplied fields, with the values that were validated.
    pub async fn update(&self, id: i64, changes: RuleChanges) -> Result<Rule> {
        let current = self.get(id).await?;
        let merged = current.merged(&changes);
        validate(&merged)?;
        let rule = self.store.update_rule(id, &changes, &merged).await?;
        tracing::info!(rule_id = rule.id, name = %rule.name, "Rule updated");
        self.notify(rule.id).await?;
        Ok(rule)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.store.delete_rule(id).await?;
        tracing::info!(rule_id = id, "Rule deleted");
        self.notify(id).await
    }

    async fn notify(&self, rule_id: i64) -> Result<()> {
        match self.notifier.notify_rule_set_changed().await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(rule_id, error = %e, "Rule saved but detector notification failed");
                Err(EngineError::NotifyFailed { rule_id, source: e })
            }
        }
    }
}
