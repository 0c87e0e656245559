use anomon_common::metric::MetricSeries;
use anomon_detector::validate_expression;
use anomon_engine::EngineError;
use axum::extract::{Extension, Query, State};
use axum::response::IntoResponse;
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::api::monitor::time_range;
use crate::api::{
    engine_error_response, error_response, success_empty_response, success_response, ErrorCode,
};
use crate::logging::TraceId;
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InstantQueryParams {
    /// PromQL expression
    pub query: String,
    /// Evaluation time in epoch seconds (default now)
    #[param(required = false)]
    #[serde(default)]
    pub time: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RangeQueryParams {
    /// PromQL expression
    pub query: String,
    pub start_time: i64,
    pub end_time: i64,
    /// Resolution in seconds
    pub step: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ValidateParams {
    /// PromQL expression
    pub query: String,
}

/// Instant query, forwarded through the detector once the expression parses.
#[utoipa::path(
    get,
    path = "/api/v1/prometheus/query",
    tag = "Prometheus",
    params(InstantQueryParams),
    responses(
        (status = 200, description = "Query result", body = MetricSeries),
        (status = 400, description = "Expression does not parse", body = crate::api::ApiError),
        (status = 503, description = "Detector unavailable", body = crate::api::ApiError)
    )
)]
async fn query(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(params): Query<InstantQueryParams>,
) -> impl IntoResponse {
    if let Err(msg) = validate_expression(&params.query) {
        return error_response(
            ErrorCode::BadRequest,
            &trace_id,
            &format!("invalid expression: {msg}"),
        );
    }
    let time = params.time.unwrap_or_else(|| Utc::now().timestamp());
    match state.detector.query(&params.query, time).await {
        Ok(series) => success_response(&trace_id, series),
        Err(e) => engine_error_response(&trace_id, EngineError::from(e)),
    }
}

/// Range query, forwarded through the detector once the expression parses.
#[utoipa::path(
    get,
    path = "/api/v1/prometheus/query_range",
    tag = "Prometheus",
    params(RangeQueryParams),
    responses(
        (status = 200, description = "Query result", body = MetricSeries),
        (status = 400, description = "Expression or range invalid", body = crate::api::ApiError),
        (status = 503, description = "Detector unavailable", body = crate::api::ApiError)
    )
)]
async fn query_range(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(params): Query<RangeQueryParams>,
) -> impl IntoResponse {
    if let Err(msg) = validate_expression(&params.query) {
        return error_response(
            ErrorCode::BadRequest,
            &trace_id,
            &format!("invalid expression: {msg}"),
        );
    }
    let range = match time_range(params.start_time, params.end_time, params.step) {
        Ok(r) => r,
        Err(msg) => return error_response(ErrorCode::BadRequest, &trace_id, &msg),
    };
    match state.detector.query_range(&params.query, range).await {
        Ok(series) => success_response(&trace_id, series),
        Err(e) => engine_error_response(&trace_id, EngineError::from(e)),
    }
}

/// Checks an expression against the PromQL grammar without running it.
#[utoipa::path(
    get,
    path = "/api/v1/prometheus/query_validate",
    tag = "Prometheus",
    params(ValidateParams),
    responses(
        (status = 200, description = "Expression parses"),
        (status = 400, description = "Expression does not parse", body = crate::api::ApiError)
    )
)]
async fn query_validate(
    Extension(trace_id): Extension<TraceId>,
    Query(params): Query<ValidateParams>,
) -> impl IntoResponse {
    match validate_expression(&params.query) {
        Ok(()) => success_empty_response(&trace_id, "expression is valid"),
        Err(msg) => error_response(
            ErrorCode::BadRequest,
            &trace_id,
            &format!("invalid expression: {msg}"),
        ),
    }
}

pub fn prometheus_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(query))
        .routes(routes!(query_range))
        .routes(routes!(query_validate))
}
