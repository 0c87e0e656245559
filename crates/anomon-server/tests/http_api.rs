mod common;

use anomon_storage::NewAnalysis;
use axum::http::StatusCode;
use common::{
    assert_err_envelope, assert_ok_envelope, build_test_context, cpu_high_rule, request_json,
    request_no_body,
};
use serde_json::json;

async fn create_rule(app: &axum::Router, body: serde_json::Value) -> i64 {
    let (status, resp, _) = request_json(app, "POST", "/api/v1/rules/create", body).await;
    assert_eq!(status, StatusCode::OK, "{resp}");
    assert_ok_envelope(&resp);
    resp["data"]["id"].as_i64().expect("id should be returned")
}

#[tokio::test]
async fn health_returns_envelope_with_trace_id() {
    let ctx = build_test_context().await.expect("context");
    let (status, body, trace) = request_no_body(&ctx.app, "GET", "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);
    assert!(body["data"]["version"].is_string());
    assert_eq!(body["trace_id"].as_str(), trace.as_deref());
}

#[tokio::test]
async fn openapi_document_lists_rule_routes() {
    let ctx = build_test_context().await.expect("context");
    let (status, body, _) = request_no_body(&ctx.app, "GET", "/api/v1/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    let paths = body["paths"].as_object().expect("paths object");
    for path in [
        "/api/v1/rules",
        "/api/v1/rules/create",
        "/api/v1/analysis/result/raw_data",
        "/api/v1/monitor/node_status",
        "/api/v1/prometheus/query_validate",
    ] {
        assert!(paths.contains_key(path), "missing {path}");
    }
}

#[tokio::test]
async fn rule_create_list_detail_round_trip() {
    let ctx = build_test_context().await.expect("context");
    let id = create_rule(&ctx.app, cpu_high_rule()).await;
    assert_eq!(ctx.detector.notify_calls(), 1);

    let (status, body, _) =
        request_no_body(&ctx.app, "GET", "/api/v1/rules?filter=CPU_HIGH").await;
    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);
    assert_eq!(body["data"]["page_total"], 1);
    assert_eq!(body["data"]["page_no"], 1);
    assert_eq!(body["data"]["page_size"], 10);
    let record = &body["data"]["records"][0];
    assert_eq!(record["id"], id);
    assert_eq!(record["created_at"], record["updated_at"]);

    let (status, body, _) =
        request_no_body(&ctx.app, "GET", &format!("/api/v1/rules/detail?id={id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "cpu_high");
    assert_eq!(body["data"]["severity"], "warning");
}

#[tokio::test]
async fn invalid_rule_is_rejected_without_notify() {
    let ctx = build_test_context().await.expect("context");
    let mut rule = cpu_high_rule();
    rule["name"] = json!("cpu-high");
    let (status, body, _) = request_json(&ctx.app, "POST", "/api/v1/rules/create", rule).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1101);

    let mut rule = cpu_high_rule();
    rule["fault_condition_type"] = json!(">");
    rule["fault_threshold"] = json!("not-a-number");
    let (status, body, _) = request_json(&ctx.app, "POST", "/api/v1/rules/create", rule).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1101);

    assert_eq!(ctx.detector.notify_calls(), 0);
}

#[tokio::test]
async fn duplicate_name_is_conflict() {
    let ctx = build_test_context().await.expect("context");
    create_rule(&ctx.app, cpu_high_rule()).await;
    let (status, body, _) =
        request_json(&ctx.app, "POST", "/api/v1/rules/create", cpu_high_rule()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_err_envelope(&body, 1005);
}

#[tokio::test]
async fn notify_failure_reports_applied_mutation() {
    let ctx = build_test_context().await.expect("context");
    ctx.detector.fail_notify(500);

    let (status, body, _) =
        request_json(&ctx.app, "POST", "/api/v1/rules/create", cpu_high_rule()).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_err_envelope(&body, 1201);
    let id = body["data"]["id"].as_i64().expect("rule id in data");

    let (status, body, _) =
        request_no_body(&ctx.app, "GET", &format!("/api/v1/rules/detail?id={id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "cpu_high");
}

#[tokio::test]
async fn update_changes_only_supplied_fields() {
    let ctx = build_test_context().await.expect("context");
    let id = create_rule(&ctx.app, cpu_high_rule()).await;

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/api/v1/rules/update",
        json!({"id": id.to_string(), "severity": "critical", "subhealth_condition_type": ">", "subhealth_threshold": "0.7"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_ok_envelope(&body);
    assert_eq!(ctx.detector.notify_calls(), 2);

    let (_, body, _) =
        request_no_body(&ctx.app, "GET", &format!("/api/v1/rules/detail?id={id}")).await;
    assert_eq!(body["data"]["severity"], "critical");
    assert_eq!(body["data"]["subhealth_threshold"], 0.7);
    assert_eq!(body["data"]["expression"], "cpu_usage > 0.9");

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/api/v1/rules/update",
        json!({"id": id, "duration": "-5m"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1101);

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/api/v1/rules/update",
        json!({"id": 9999, "severity": "error"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_err_envelope(&body, 1004);
}

#[tokio::test]
async fn list_rejects_bad_paging_and_sort() {
    let ctx = build_test_context().await.expect("context");
    for uri in [
        "/api/v1/rules?page_no=0",
        "/api/v1/rules?page_size=0",
        "/api/v1/rules?sort_field=password",
        "/api/v1/rules?sort_order=random",
        "/api/v1/analysis/result?sort_field=expression",
    ] {
        let (status, body, _) = request_no_body(&ctx.app, "GET", uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_err_envelope(&body, 1001);
    }
}

#[tokio::test]
async fn pagination_splits_rules_without_overlap() {
    let ctx = build_test_context().await.expect("context");
    for i in 0..7 {
        let mut rule = cpu_high_rule();
        rule["name"] = json!(format!("rule_{i}"));
        create_rule(&ctx.app, rule).await;
    }
    let mut ids = Vec::new();
    for page in 1..=3 {
        let (_, body, _) = request_no_body(
            &ctx.app,
            "GET",
            &format!("/api/v1/rules?page_no={page}&page_size=3&sort_field=create_time&sort_order=desc"),
        )
        .await;
        assert_eq!(body["data"]["page_total"], 7);
        for r in body["data"]["records"].as_array().expect("records") {
            ids.push(r["id"].as_i64().expect("id"));
        }
    }
    let mut unique = ids.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(ids.len(), 7);
    assert_eq!(unique.len(), 7);
}

#[tokio::test]
async fn raw_data_follows_rule_lifecycle() {
    let ctx = build_test_context().await.expect("context");
    let rule_id = create_rule(&ctx.app, cpu_high_rule()).await;
    let result = ctx
        .state
        .store
        .insert_analysis(&NewAnalysis {
            rule_id,
            rule_name: "cpu_high".to_string(),
            status: "fault".to_string(),
            count: 2,
            created_at: 1000,
            updated_at: 1010,
        })
        .await
        .expect("analysis insert");

    let uri = format!("/api/v1/analysis/result/raw_data?id={}", result.id);
    let (status, body, _) = request_no_body(&ctx.app, "GET", &uri).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let params = &body["data"]["records"]["params"];
    assert_eq!(params["query"], "cpu_usage > 0.9");
    assert_eq!(params["start_time"], "1000");
    assert_eq!(params["end_time"], "1010");
    assert_eq!(params["step"], "1");

    let (status, body, _) =
        request_json(&ctx.app, "POST", "/api/v1/rules/delete", json!({"id": rule_id})).await;
    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);

    let (status, body, _) =
        request_no_body(&ctx.app, "GET", "/api/v1/analysis/result?filter=cpu").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["page_total"], 1);

    let (status, body, _) = request_no_body(&ctx.app, "GET", &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_err_envelope(&body, 1004);

    let (status, _, _) = request_json(
        &ctx.app,
        "POST",
        "/api/v1/analysis/result/delete",
        json!({"id": result.id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/api/v1/analysis/result/delete",
        json!({"id": result.id}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_err_envelope(&body, 1004);
}

#[tokio::test]
async fn monitor_views_decode_detector_payloads() {
    let ctx = build_test_context().await.expect("context");

    let (status, body, _) = request_no_body(&ctx.app, "GET", "/api/v1/monitor/targets").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["targets"][0]["status"], "up");

    let (status, body, _) =
        request_no_body(&ctx.app, "GET", "/api/v1/monitor/node_info?instance=n1:9100").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["kernel_version"], "6.1.0");

    let (status, body, _) = request_no_body(&ctx.app, "GET", "/api/v1/monitor/node_status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["data"][0]["container"]["running"], 3);
}

#[tokio::test]
async fn monitor_rejects_partial_payload() {
    let ctx = build_test_context().await.expect("context");
    ctx.detector
        .broken_node_status
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let (status, body, _) = request_no_body(&ctx.app, "GET", "/api/v1/monitor/node_status").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_err_envelope(&body, 1503);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn monitor_non_200_is_detector_unavailable() {
    let ctx = build_test_context().await.expect("context");
    let (status, body, _) = request_no_body(
        &ctx.app,
        "GET",
        "/api/v1/monitor/cluster_resources?start_time=0&end_time=600&step=60",
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_err_envelope(&body, 1502);

    let (status, body, _) = request_no_body(
        &ctx.app,
        "GET",
        "/api/v1/monitor/cluster_resources?start_time=600&end_time=0&step=60",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1001);
}

#[tokio::test]
async fn prometheus_proxy_gates_on_expression() {
    let ctx = build_test_context().await.expect("context");

    let (status, body, _) = request_no_body(
        &ctx.app,
        "GET",
        "/api/v1/prometheus/query_validate?query=sum%28rate%28http_requests_total%5B5m%5D%29%29",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);

    let (status, body, _) =
        request_no_body(&ctx.app, "GET", "/api/v1/prometheus/query_validate?query=sum%28").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1001);

    let (status, body, _) = request_no_body(
        &ctx.app,
        "GET",
        "/api/v1/prometheus/query?query=up&time=1700000000",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["params"]["time"], "1700000000");

    let (status, body, _) = request_no_body(
        &ctx.app,
        "GET",
        "/api/v1/prometheus/query_range?query=up&start_time=100&end_time=200&step=0",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1001);

    let (status, _, _) = request_no_body(
        &ctx.app,
        "GET",
        "/api/v1/prometheus/query_range?query=up&start_time=100&end_time=200&step=10",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn non_envelope_detector_body_is_detector_unavailable() {
    let ctx = build_test_context().await.expect("context");
    let (status, body, _) = request_no_body(
        &ctx.app,
        "GET",
        "/api/v1/monitor/cluster_container_status?start_time=0&end_time=600&step=60",
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_err_envelope(&body, 1502);
}

#[tokio::test]
async fn page_number_past_addressable_range_is_bad_request() {
    let ctx = build_test_context().await.expect("context");
    for uri in [
        "/api/v1/rules?page_no=18446744073709551615",
        "/api/v1/analysis/result?page_no=18446744073709551615&page_size=1000",
    ] {
        let (status, body, _) = request_no_body(&ctx.app, "GET", uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_err_envelope(&body, 1001);
    }
}

#[tokio::test]
async fn oversized_body_is_rejected_before_the_handler() {
    let ctx = build_test_context().await.expect("context");
    let mut rule = cpu_high_rule();
    rule["expression"] = json!("x".repeat(2 * 1024 * 1024));
    let (status, body, trace) =
        request_json(&ctx.app, "POST", "/api/v1/rules/create", rule).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_err_envelope(&body, 1013);
    assert_eq!(body["trace_id"].as_str(), trace.as_deref());
    assert_eq!(ctx.detector.notify_calls(), 0);
}

#[tokio::test]
async fn type_only_update_keeps_stored_threshold() {
    let ctx = build_test_context().await.expect("context");
    let mut rule = cpu_high_rule();
    rule["fault_condition_type"] = json!(">");
    rule["fault_threshold"] = json!(0.95);
    let id = create_rule(&ctx.app, rule).await;

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/api/v1/rules/update",
        json!({"id": id, "fault_condition_type": ">="}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (_, body, _) =
        request_no_body(&ctx.app, "GET", &format!("/api/v1/rules/detail?id={id}")).await;
    assert_eq!(body["data"]["fault_condition_type"], ">=");
    assert_eq!(body["data"]["fault_threshold"], 0.95);
}
