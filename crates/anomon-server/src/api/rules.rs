use anomon_common::types::{deserialize_id, Rule, RuleChanges, RuleDraft};
use anomon_storage::{RuleFilter, RuleSortField};
use axum::extract::{Extension, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::api::pagination::ListParams;
use crate::api::{
    engine_error_response, error_response, success_paginated_response, success_response,
    ErrorCode, IdBody, IdQuery,
};
use crate::logging::TraceId;
use crate::state::AppState;

/// Partial rule update. Fields left out keep their stored value; an empty
/// condition type clears that condition and its threshold.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateRuleRequest {
    #[serde(deserialize_with = "deserialize_id")]
    #[schema(value_type = i64)]
    pub id: i64,
    #[serde(flatten)]
    pub changes: RuleChanges,
}

/// Lists rules.
/// Default order: `name` ascending; default page: `page_no=1&page_size=10`.
#[utoipa::path(
    get,
    path = "/api/v1/rules",
    tag = "Rules",
    params(ListParams),
    responses(
        (status = 200, description = "One page of rules", body = Vec<Rule>),
        (status = 400, description = "Bad paging or sort parameters", body = crate::api::ApiError)
    )
)]
async fn list_rules(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    let page = match params.page() {
        Ok(p) => p,
        Err(msg) => return error_response(ErrorCode::BadRequest, &trace_id, &msg),
    };
    let sort = match params.sort::<RuleSortField>() {
        Ok(s) => s,
        Err(msg) => return error_response(ErrorCode::BadRequest, &trace_id, &msg),
    };
    let filter = RuleFilter {
        name_contains: params.filter(),
    };

    match state.rules.list(&filter, sort, page).await {
        Ok((rules, total)) => {
            success_paginated_response(&trace_id, rules, total, page.page_no, page.page_size)
        }
        Err(e) => engine_error_response(&trace_id, e),
    }
}

/// Fetches one rule.
#[utoipa::path(
    get,
    path = "/api/v1/rules/detail",
    tag = "Rules",
    params(IdQuery),
    responses(
        (status = 200, description = "Rule", body = Rule),
        (status = 404, description = "No such rule", body = crate::api::ApiError)
    )
)]
async fn get_rule(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> impl IntoResponse {
    match state.rules.get(query.id).await {
        Ok(rule) => success_response(&trace_id, rule),
        Err(e) => engine_error_response(&trace_id, e),
    }
}

/// Creates a rule and notifies the detector.
/// A 202 with code 1201 means the rule was saved but the detector was not
/// told; `data.id` carries the new rule's id.
#[utoipa::path(
    post,
    path = "/api/v1/rules/create",
    tag = "Rules",
    request_body = RuleDraft,
    responses(
        (status = 200, description = "Rule created", body = IdBody),
        (status = 202, description = "Rule created, detector not notified", body = crate::api::ApiError),
        (status = 400, description = "Rule failed validation", body = crate::api::ApiError),
        (status = 409, description = "Name already taken", body = crate::api::ApiError)
    )
)]
async fn create_rule(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Json(draft): Json<RuleDraft>,
) -> impl IntoResponse {
    match state.rules.create(draft).await {
        Ok(rule) => success_response(&trace_id, IdBody { id: rule.id }),
        Err(e) => engine_error_response(&trace_id, e),
    }
}

/// Updates the supplied fields of a rule and notifies the detector.
#[utoipa::path(
    post,
    path = "/api/v1/rules/update",
    tag = "Rules",
    request_body = UpdateRuleRequest,
    responses(
        (status = 200, description = "Rule updated", body = IdBody),
        (status = 202, description = "Rule updated, detector not notified", body = crate::api::ApiError),
        (status = 400, description = "Resulting rule failed validation", body = crate::api::ApiError),
        (status = 404, description = "No such rule", body = crate::api::ApiError),
        (status = 409, description = "Name already taken", body = crate::api::ApiError)
    )
)]
async fn update_rule(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Json(req): Json<UpdateRuleRequest>,
) -> impl IntoResponse {
    match state.rules.update(req.id, req.changes).await {
        Ok(rule) => success_response(&trace_id, IdBody { id: rule.id }),
        Err(e) => engine_error_response(&trace_id, e),
    }
}

/// Deletes a rule and notifies the detector. Analysis results that
/// reference it are kept.
#[utoipa::path(
    post,
    path = "/api/v1/rules/delete",
    tag = "Rules",
    request_body = IdBody,
    responses(
        (status = 200, description = "Rule deleted", body = IdBody),
        (status = 202, description = "Rule deleted, detector not notified", body = crate::api::ApiError),
        (status = 404, description = "No such rule", body = crate::api::ApiError)
    )
)]
async fn delete_rule(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Json(body): Json<IdBody>,
) -> impl IntoResponse {
    match state.rules.delete(body.id).await {
        Ok(()) => success_response(&trace_id, IdBody { id: body.id }),
        Err(e) => engine_error_response(&trace_id, e),
    }
}

pub fn rule_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_rules))
        .routes(routes!(get_rule))
        .routes(routes!(create_rule))
        .routes(routes!(update_rule))
        .routes(routes!(delete_rule))
}
