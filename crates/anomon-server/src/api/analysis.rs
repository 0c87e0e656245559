use anomon_common::metric::MetricSeries;
use anomon_common::types::AnalysisResult;
use anomon_storage::{AnalysisFilter, AnalysisSortField};
use axum::extract::{Extension, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::api::pagination::ListParams;
use crate::api::{
    engine_error_response, error_response, success_paginated_response, success_response,
    ErrorCode, IdBody, IdQuery,
};
use crate::logging::TraceId;
use crate::state::AppState;

/// Metric window behind one analysis result
#[derive(Serialize, ToSchema)]
pub struct RawDataResponse {
    pub records: MetricSeries,
}

/// Lists analysis results; `filter` matches the rule name.
/// Default order: `rule_name` ascending.
#[utoipa::path(
    get,
    path = "/api/v1/analysis/result",
    tag = "Analysis",
    params(ListParams),
    responses(
        (status = 200, description = "One page of analysis results", body = Vec<AnalysisResult>),
        (status = 400, description = "Bad paging or sort parameters", body = crate::api::ApiError)
    )
)]
async fn list_results(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    let page = match params.page() {
        Ok(p) => p,
        Err(msg) => return error_response(ErrorCode::BadRequest, &trace_id, &msg),
    };
    let sort = match params.sort::<AnalysisSortField>() {
        Ok(s) => s,
        Err(msg) => return error_response(ErrorCode::BadRequest, &trace_id, &msg),
    };
    let filter = AnalysisFilter {
        rule_name_contains: params.filter(),
    };

    match state.analyses.list(&filter, sort, page).await {
        Ok((rows, total)) => {
            success_paginated_response(&trace_id, rows, total, page.page_no, page.page_size)
        }
        Err(e) => engine_error_response(&trace_id, e),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/analysis/result/delete",
    tag = "Analysis",
    request_body = IdBody,
    responses(
        (status = 200, description = "Result deleted", body = IdBody),
        (status = 404, description = "No such result", body = crate::api::ApiError)
    )
)]
async fn delete_result(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Json(body): Json<IdBody>,
) -> impl IntoResponse {
    match state.analyses.delete(body.id).await {
        Ok(()) => success_response(&trace_id, IdBody { id: body.id }),
        Err(e) => engine_error_response(&trace_id, e),
    }
}

/// Re-queries the metric window of a result using its rule's expression.
/// Fails with 404 once the originating rule has been deleted.
#[utoipa::path(
    get,
    path = "/api/v1/analysis/result/raw_data",
    tag = "Analysis",
    params(IdQuery),
    responses(
        (status = 200, description = "Metric window", body = RawDataResponse),
        (status = 404, description = "No such result or rule", body = crate::api::ApiError),
        (status = 503, description = "Metrics backend unavailable", body = crate::api::ApiError)
    )
)]
async fn raw_data(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> impl IntoResponse {
    match state.analyses.raw_data(query.id).await {
        Ok(records) => success_response(&trace_id, RawDataResponse { records }),
        Err(e) => engine_error_response(&trace_id, e),
    }
}

pub fn analysis_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_results))
        .routes(routes!(delete_result))
        .routes(routes!(raw_data))
}
