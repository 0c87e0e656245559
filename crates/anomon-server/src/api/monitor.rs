use anomon_common::metric::{MetricSample, TimeRange};
use anomon_common::monitor::{MonitorTargets, NodeInfo, NodeStatus};
use anomon_engine::EngineError;
use axum::extract::{Extension, Query, State};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::api::{engine_error_response, error_response, success_response, ErrorCode};
use crate::logging::TraceId;
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InstanceParams {
    /// Node address such as `10.0.0.1:9100`; all nodes when omitted
    #[param(required = false)]
    #[serde(default)]
    pub instance: Option<String>,
}

/// Epoch-second window with a step in seconds.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RangeParams {
    pub start_time: i64,
    pub end_time: i64,
    pub step: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NodeRangeParams {
    pub instance: String,
    pub start_time: i64,
    pub end_time: i64,
    pub step: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RequiredInstanceParams {
    pub instance: String,
}

pub(crate) fn time_range(start: i64, end: i64, step: i64) -> Result<TimeRange, String> {
    let range = TimeRange { start, end, step };
    range.validate()?;
    Ok(range)
}

fn respond<T: Serialize>(trace_id: &str, result: anomon_detector::Result<T>) -> Response {
    match result {
        Ok(data) => success_response(trace_id, data),
        Err(e) => engine_error_response(trace_id, EngineError::from(e)),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/monitor/targets",
    tag = "Monitor",
    responses(
        (status = 200, description = "Scrape targets and their health", body = MonitorTargets),
        (status = 503, description = "Detector unavailable", body = crate::api::ApiError)
    )
)]
async fn targets(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    respond(&trace_id, state.detector.targets().await)
}

#[utoipa::path(
    get,
    path = "/api/v1/monitor/node_info",
    tag = "Monitor",
    params(InstanceParams),
    responses(
        (status = 200, description = "Node platform details", body = Vec<NodeInfo>),
        (status = 503, description = "Detector unavailable", body = crate::api::ApiError)
    )
)]
async fn node_info(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(params): Query<InstanceParams>,
) -> impl IntoResponse {
    respond(
        &trace_id,
        state.detector.node_info(params.instance.as_deref()).await,
    )
}

#[utoipa::path(
    get,
    path = "/api/v1/monitor/node_status",
    tag = "Monitor",
    params(InstanceParams),
    responses(
        (status = 200, description = "Node container, cpu, memory and disk usage", body = Vec<NodeStatus>),
        (status = 503, description = "Detector unavailable", body = crate::api::ApiError)
    )
)]
async fn node_status(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(params): Query<InstanceParams>,
) -> impl IntoResponse {
    respond(
        &trace_id,
        state.detector.node_status(params.instance.as_deref()).await,
    )
}

#[utoipa::path(
    get,
    path = "/api/v1/monitor/node_resources",
    tag = "Monitor",
    params(NodeRangeParams),
    responses(
        (status = 200, description = "Resource series for one node", body = Vec<MetricSample>),
        (status = 400, description = "Bad time range", body = crate::api::ApiError),
        (status = 503, description = "Detector unavailable", body = crate::api::ApiError)
    )
)]
async fn node_resources(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(params): Query<NodeRangeParams>,
) -> impl IntoResponse {
    let range = match time_range(params.start_time, params.end_time, params.step) {
        Ok(r) => r,
        Err(msg) => return error_response(ErrorCode::BadRequest, &trace_id, &msg),
    };
    respond(
        &trace_id,
        state.detector.node_resources(&params.instance, range).await,
    )
}

#[utoipa::path(
    get,
    path = "/api/v1/monitor/node_container_status",
    tag = "Monitor",
    params(RequiredInstanceParams),
    responses(
        (status = 200, description = "Container states on one node", body = Vec<MetricSample>),
        (status = 503, description = "Detector unavailable", body = crate::api::ApiError)
    )
)]
async fn node_container_status(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(params): Query<RequiredInstanceParams>,
) -> impl IntoResponse {
    respond(
        &trace_id,
        state.detector.node_container_status(&params.instance).await,
    )
}

#[utoipa::path(
    get,
    path = "/api/v1/monitor/cluster_resources",
    tag = "Monitor",
    params(RangeParams),
    responses(
        (status = 200, description = "Cluster-wide resource series", body = Vec<MetricSample>),
        (status = 400, description = "Bad time range", body = crate::api::ApiError),
        (status = 503, description = "Detector unavailable", body = crate::api::ApiError)
    )
)]
async fn cluster_resources(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> impl IntoResponse {
    let range = match time_range(params.start_time, params.end_time, params.step) {
        Ok(r) => r,
        Err(msg) => return error_response(ErrorCode::BadRequest, &trace_id, &msg),
    };
    respond(&trace_id, state.detector.cluster_resources(range).await)
}

#[utoipa::path(
    get,
    path = "/api/v1/monitor/cluster_container_status",
    tag = "Monitor",
    params(RangeParams),
    responses(
        (status = 200, description = "Cluster-wide container series", body = Vec<MetricSample>),
        (status = 400, description = "Bad time range", body = crate::api::ApiError),
        (status = 503, description = "Detector unavailable", body = crate::api::ApiError)
    )
)]
async fn cluster_container_status(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> impl IntoResponse {
    let range = match time_range(params.start_time, params.end_time, params.step) {
        Ok(r) => r,
        Err(msg) => return error_response(ErrorCode::BadRequest, &trace_id, &msg),
    };
    respond(
        &trace_id,
        state.detector.cluster_container_status(range).await,
    )
}

pub fn monitor_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(targets))
        .routes(routes!(node_info))
        .routes(routes!(node_status))
        .routes(routes!(node_resources))
        .routes(routes!(node_container_status))
        .routes(routes!(cluster_resources))
        .routes(routes!(cluster_container_status))
}
