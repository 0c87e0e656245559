pub mod analysis;
pub mod monitor;
pub mod pagination;
pub mod prometheus;
pub mod rules;

use anomon_common::types::deserialize_id;
use anomon_engine::EngineError;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::logging::TraceId;
use crate::state::AppState;

/// Error envelope
#[derive(Serialize, ToSchema)]
pub struct ApiError {
    /// Error code, never 0
    pub code: i32,
    pub message: String,
    /// Trace id, also sent as `X-Trace-Id`
    pub trace_id: String,
}

/// Response envelope shared by every endpoint.
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    /// 0 on success
    pub code: i32,
    pub message: String,
    pub trace_id: String,
    pub data: Option<T>,
}

/// One page of a listing. `page_total` counts every matching row.
#[derive(Serialize, ToSchema)]
pub struct PageData<T>
where
    T: Serialize,
{
    pub records: Vec<T>,
    pub page_total: u64,
    pub page_no: u64,
    pub page_size: u64,
}

/// Body carrying only a row id.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IdBody {
    #[serde(deserialize_with = "deserialize_id")]
    #[schema(value_type = i64)]
    pub id: i64,
}

/// Query carrying only a row id.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IdQuery {
    pub id: i64,
}

/// Client-facing error classes and their code and HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    BadRequest,
    NotFound,
    Conflict,
    PayloadTooLarge,
    InvalidRule,
    /// Mutation applied but the detector was not told
    NotifyFailed,
    StorageError,
    DetectorUnavailable,
    DetectorDecode,
}

impl ErrorCode {
    pub fn code(self) -> i32 {
        match self {
            ErrorCode::BadRequest => 1001,
            ErrorCode::NotFound => 1004,
            ErrorCode::Conflict => 1005,
            ErrorCode::PayloadTooLarge => 1013,
            ErrorCode::InvalidRule => 1101,
            ErrorCode::NotifyFailed => 1201,
            ErrorCode::StorageError => 1501,
            ErrorCode::DetectorUnavailable => 1502,
            ErrorCode::DetectorDecode => 1503,
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::BadRequest | ErrorCode::InvalidRule => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCode::NotifyFailed => StatusCode::ACCEPTED,
            ErrorCode::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::DetectorUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::DetectorDecode => StatusCode::BAD_GATEWAY,
        }
    }
}

pub fn success_response<T>(trace_id: &str, data: T) -> Response
where
    T: Serialize,
{
    (
        StatusCode::OK,
        Json(ApiResponse {
            code: 0,
            message: "success".to_string(),
            trace_id: trace_id.to_string(),
            data: Some(data),
        }),
    )
        .into_response()
}

pub fn success_empty_response(trace_id: &str, msg: &str) -> Response {
    (
        StatusCode::OK,
        Json(ApiResponse::<Value> {
            code: 0,
            message: msg.to_string(),
            trace_id: trace_id.to_string(),
            data: None,
        }),
    )
        .into_response()
}

pub fn success_paginated_response<T>(
    trace_id: &str,
    records: Vec<T>,
    page_total: u64,
    page_no: u64,
    page_size: u64,
) -> Response
where
    T: Serialize,
{
    success_response(
        trace_id,
        PageData {
            records,
            page_total,
            page_no,
            page_size,
        },
    )
}

pub fn error_response(code: ErrorCode, trace_id: &str, msg: &str) -> Response {
    error_response_with_data::<Value>(code, trace_id, msg, None)
}

fn error_response_with_data<T: Serialize>(
    code: ErrorCode,
    trace_id: &str,
    msg: &str,
    data: Option<T>,
) -> Response {
    (
        code.status(),
        Json(ApiResponse {
            code: code.code(),
            message: msg.to_string(),
            trace_id: trace_id.to_string(),
            data,
        }),
    )
        .into_response()
}

/// Maps an engine failure onto the client envelope. Server-side failures
/// are logged here; their detail stays out of the response.
pub fn engine_error_response(trace_id: &str, err: EngineError) -> Response {
    match &err {
        EngineError::InvalidRule(reason) => {
            error_response(ErrorCode::InvalidRule, trace_id, &format!("invalid rule: {reason}"))
        }
        EngineError::InvalidArgument(msg) => error_response(ErrorCode::BadRequest, trace_id, msg),
        EngineError::NotFound { entity, id } => error_response(
            ErrorCode::NotFound,
            trace_id,
            &format!("{entity} {id} not found"),
        ),
        EngineError::Conflict(msg) => error_response(ErrorCode::Conflict, trace_id, msg),
        EngineError::NotifyFailed { rule_id, .. } => error_response_with_data(
            ErrorCode::NotifyFailed,
            trace_id,
            "rule saved but the detector was not notified",
            Some(serde_json::json!({ "id": rule_id })),
        ),
        EngineError::DetectorUnavailable(e) => {
            tracing::error!(trace_id = %trace_id, error = %e, "Detector call failed");
            error_response(ErrorCode::DetectorUnavailable, trace_id, "detector unavailable")
        }
        EngineError::Decode(e) => {
            tracing::error!(trace_id = %trace_id, error = %e, "Detector payload rejected");
            error_response(
                ErrorCode::DetectorDecode,
                trace_id,
                "detector returned an unreadable payload",
            )
        }
        EngineError::Store(e) => {
            tracing::error!(trace_id = %trace_id, error = %e, "Storage failure");
            error_response(ErrorCode::StorageError, trace_id, "database error")
        }
    }
}

/// Service health
#[derive(Serialize, ToSchema)]
struct HealthResponse {
    version: String,
    uptime_secs: i64,
}

/// Liveness and uptime.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
async fn health(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let uptime = (Utc::now() - state.start_time).num_seconds();
    success_response(
        &trace_id,
        HealthResponse {
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: uptime,
        },
    )
}

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health))
        .merge(rules::rule_routes())
        .merge(analysis::analysis_routes())
        .merge(monitor::monitor_routes())
        .merge(prometheus::prometheus_routes())
}
