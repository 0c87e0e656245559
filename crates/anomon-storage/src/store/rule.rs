use anomon_common::types::{Rule, RuleChanges, RuleDraft};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select,
};

use crate::entities::rule::{self, Column, Entity};
use crate::error::{Result, StorageError};
use crate::sort::{RuleSortField, Sort};
use crate::store::{contains_ignore_case, now_secs, write_error, PageRequest, Store};

const ENTITY: &str = "rule";

/// Rule listing filter
#[derive(Debug, Clone, Default)]
pub struct RuleFilter {
    /// Case-insensitive substring of the rule name
    pub name_contains: Option<String>,
}

impl RuleFilter {
    fn apply(&self, q: Select<Entity>) -> Select<Entity> {
        match self.name_contains.as_deref().filter(|s| !s.is_empty()) {
            Some(needle) => q.filter(contains_ignore_case(Column::Name, needle)),
            None => q,
        }
    }
}

fn to_rule(m: rule::Model) -> Rule {
    Rule {
        id: m.id,
        name: m.name,
        expression: m.expression,
        subhealth_condition_type: m.subhealth_condition_type,
        subhealth_threshold: m.subhealth_threshold,
        fault_condition_type: m.fault_condition_type,
        fault_threshold: m.fault_threshold,
        severity: m.severity,
        duration: m.duration,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

/// True when a partial update names either half of a condition pair.
fn touches_condition(kind: &Option<String>, threshold: Option<f64>) -> bool {
    kind.is_some() || threshold.is_some()
}

impl Store {
    /// Inserts a rule, stamping `created_at` and `updated_at` with the same
    /// instant.
    pub async fn insert_rule(&self, draft: &RuleDraft) -> Result<Rule> {
        let now = now_secs();
        let am = rule::ActiveModel {
            name: Set(draft.name.clone()),
            expression: Set(draft.expression.clone()),
            subhealth_condition_type: Set(draft.subhealth_condition_type.clone()),
            subhealth_threshold: Set(draft.subhealth_threshold),
            fault_condition_type: Set(draft.fault_condition_type.clone()),
            fault_threshold: Set(draft.fault_threshold),
            severity: Set(draft.severity.clone()),
            duration: Set(draft.duration.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let model = am
            .insert(self.db())
            .await
            .map_err(|e| write_error(ENTITY, e))?;
        Ok(to_rule(model))
    }

    pub async fn get_rule_by_id(&self, id: i64) -> Result<Option<Rule>> {
        let model = Entity::find_by_id(id).one(self.db()).await?;
        Ok(model.map(to_rule))
    }

    /// One page of rules plus the total number of rows matching `filter`.
    pub async fn list_rules(
        &self,
        filter: &RuleFilter,
        sort: Sort<RuleSortField>,
        page: PageRequest,
    ) -> Result<(Vec<Rule>, u64)> {
        let rows = filter
            .apply(Entity::find())
            .order_by(sort.field.column(), sort.order.into())
            .order_by_asc(Column::Id)
            .limit(page.limit())
            .offset(page.checked_offset()?)
            .all(self.db())
            .await?;
        let total = self.count_rules(filter).await?;
        Ok((rows.into_iter().map(to_rule).collect(), total))
    }

    pub async fn count_rules(&self, filter: &RuleFilter) -> Result<u64> {
        Ok(filter.apply(Entity::find()).count(self.db()).await?)
    }

    /// Writes the columns named by `changes`, taking every value from
    /// `merged`, and re-stamps `updated_at` even when nothing else differs.
    ///
    /// `merged` is `changes` applied over the row the caller validated. A
    /// condition pair is written whole from it, so the stored type and
    /// threshold always match what was validated, whatever landed in the row
    /// in between.
    pub async fn update_rule(
        &self,
        id: i64,
        changes: &RuleChanges,
        merged: &RuleDraft,
    ) -> Result<Rule> {
        let model = Entity::find_by_id(id)
            .one(self.db())
            .await?
            .ok_or(StorageError::NotFound { entity: ENTITY, id })?;

        let mut am: rule::ActiveModel = model.into();
        if changes.name.is_some() {
            am.name = Set(merged.name.clone());
        }
        if changes.expression.is_some() {
            am.expression = Set(merged.expression.clone());
        }
        if touches_condition(&changes.subhealth_condition_type, changes.subhealth_threshold) {
            am.subhealth_condition_type = Set(merged.subhealth_condition_type.clone());
            am.subhealth_threshold = Set(merged.subhealth_threshold);
        }
        if touches_condition(&changes.fault_condition_type, changes.fault_threshold) {
            am.fault_condition_type = Set(merged.fault_condition_type.clone());
            am.fault_threshold = Set(merged.fault_threshold);
        }
        if changes.severity.is_some() {
            am.severity = Set(merged.severity.clone());
        }
        if changes.duration.is_some() {
            am.duration = Set(merged.duration.clone());
        }
        am.updated_at = Set(now_secs());

        match am.update(self.db()).await {
            Ok(updated) => Ok(to_rule(updated)),
            Err(DbErr::RecordNotUpdated) => Err(StorageError::NotFound { entity: ENTITY, id }),
            Err(e) => Err(write_error(ENTITY, e)),
        }
    }

    /// Fails with `NotFound` when no row was removed.
    pub async fn delete_rule(&self, id: i64) -> Result<()> {
        let res = Entity::delete_by_id(id).exec(self.db()).await?;
        if res.rows_affected == 0 {
            return Err(StorageError::NotFound { entity: ENTITY, id });
        }
        Ok(())
    }
}
