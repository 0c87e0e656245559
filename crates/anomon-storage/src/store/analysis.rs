use anomon_common::types::AnalysisResult;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select,
};

use crate::entities::analysis::{self, Column, Entity};
use crate::error::{Result, StorageError};
use crate::sort::{AnalysisSortField, Sort};
use crate::store::{contains_ignore_case, PageRequest, Store};

const ENTITY: &str = "analysis";

/// Analysis listing filter
#[derive(Debug, Clone, Default)]
pub struct AnalysisFilter {
    /// Case-insensitive substring of the rule name snapshot
    pub rule_name_contains: Option<String>,
}

impl AnalysisFilter {
    fn apply(&self, q: Select<Entity>) -> Select<Entity> {
        match self.rule_name_contains.as_deref().filter(|s| !s.is_empty()) {
            Some(needle) => q.filter(contains_ignore_case(Column::RuleName, needle)),
            None => q,
        }
    }
}

/// Episode as recorded by the detector.
#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub rule_id: i64,
    pub rule_name: String,
    pub status: String,
    pub count: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

fn to_result(m: analysis::Model) -> AnalysisResult {
    AnalysisResult {
        id: m.id,
        rule_id: m.rule_id,
        rule_name: m.rule_name,
        status: m.status,
        count: m.count,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

impl Store {
    /// Records an episode. The detector normally owns these writes; the
    /// server itself only reads and deletes.
    pub async fn insert_analysis(&self, new: &NewAnalysis) -> Result<AnalysisResult> {
        let am = analysis::ActiveModel {
            rule_id: Set(new.rule_id),
            rule_name: Set(new.rule_name.clone()),
            status: Set(new.status.clone()),
            count: Set(new.count),
            created_at: Set(new.created_at),
            updated_at: Set(new.updated_at),
            ..Default::default()
        };
        Ok(to_result(am.insert(self.db()).await?))
    }

    pub async fn get_analysis_by_id(&self, id: i64) -> Result<Option<AnalysisResult>> {
        let model = Entity::find_by_id(id).one(self.db()).await?;
        Ok(model.map(to_result))
    }

    pub async fn list_analyses(
        &self,
        filter: &AnalysisFilter,
        sort: Sort<AnalysisSortField>,
        page: PageRequest,
    ) -> Result<(Vec<AnalysisResult>, u64)> {
        let rows = filter
            .apply(Entity::find())
            .order_by(sort.field.column(), sort.order.into())
            .order_by_asc(Column::Id)
            .limit(page.limit())
            .offset(page.checked_offset()?)
            .all(self.db())
            .await?;
        let total = self.count_analyses(filter).await?;
        Ok((rows.into_iter().map(to_result).collect(), total))
    }

    pub async fn count_analyses(&self, filter: &AnalysisFilter) -> Result<u64> {
        Ok(filter.apply(Entity::find()).count(self.db()).await?)
    }

    pub async fn delete_analysis(&self, id: i64) -> Result<()> {
        let res = Entity::delete_by_id(id).exec(self.db()).await?;
        if res.rows_affected == 0 {
            return Err(StorageError::NotFound { entity: ENTITY, id });
        }
        Ok(())
    }
}
