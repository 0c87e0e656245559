use std::sync::Arc;

use anomon_common::metric::{MetricSeries, TimeRange};
use anomon_common::types::AnalysisResult;
use anomon_detector::MetricSource;
use anomon_storage::{AnalysisFilter, AnalysisSortField, PageRequest, Sort, Store};

use crate::error::{EngineError, Result};

/// Read and delete access to detection results.
#[derive(Clone)]
pub struct AnalysisAccessor {
    store: Arc<Store>,
    metrics: Arc<dyn MetricSource>,
}

impl AnalysisAccessor {
    pub fn new(store: Arc<Store>, metrics: Arc<dyn MetricSource>) -> Self {
        Self { store, metrics }
    }

    pub async fn list(
        &self,
        filter: &AnalysisFilter,
        sort: Sort<AnalysisSortField>,
        page: PageRequest,
    ) -> Result<(Vec<AnalysisResult>, u64)> {
        Ok(self.store.list_analyses(filter, sort, page).await?)
    }

    pub async fn get(&self, id: i64) -> Result<AnalysisResult> {
        self.store
            .get_analysis_by_id(id)
            .await?
            .ok_or(EngineError::NotFound {
                entity: "analysis",
                id,
            })
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.store.delete_analysis(id).await?;
        tracing::info!(analysis_id = id, "Analysis result deleted");
        Ok(())
    }

    /// Metric window behind a result: the originating rule's expression
    /// over `[created_at, updated_at]`, sampled at about 250 points.
    ///
    /// Fails with `NotFound` when either the result or its rule is gone.
    pub async fn raw_data(&self, id: i64) -> Result<MetricSeries> {
        let result = self.get(id).await?;
        let rule = self
            .store
            .get_rule_by_id(result.rule_id)
            .await?
            .ok_or(EngineError::NotFound {
                entity: "rule",
                id: result.rule_id,
            })?;

        let range = TimeRange::for_episode(result.created_at, result.updated_at);
        tracing::debug!(
            analysis_id = id,
            rule_id = rule.id,
            start = range.start,
            end = range.end,
            step = range.step,
            "Querying metric window"
        );
        Ok(self.metrics.query_range(&rule.expression, range).await?)
    }
}
