#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use anomon_server::app;
use anomon_server::config::{DatabaseConfig, DetectorConfig, ServerConfig};
use anomon_server::state::AppState;
use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::extract::{Query, State};
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt;

/// Knobs and counters of the in-process detector stand-in.
#[derive(Default)]
pub struct MockDetector {
    pub notify_calls: AtomicUsize,
    pub notify_status: AtomicI64,
    pub broken_node_status: AtomicBool,
}

impl MockDetector {
    pub fn notify_calls(&self) -> usize {
        self.notify_calls.load(Ordering::SeqCst)
    }

    pub fn fail_notify(&self, status: i64) {
        self.notify_status.store(status, Ordering::SeqCst);
    }
}

pub struct TestContext {
    pub temp_dir: TempDir,
    pub state: AppState,
    pub app: Router,
    pub detector: Arc<MockDetector>,
}

async fn rule_updated(State(mock): State<Arc<MockDetector>>) -> Json<Value> {
    mock.notify_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({"status": mock.notify_status.load(Ordering::SeqCst)}))
}

async fn node_status(State(mock): State<Arc<MockDetector>>) -> Json<Value> {
    let cpu = if mock.broken_node_status.load(Ordering::SeqCst) {
        json!({"usage": "high"})
    } else {
        json!({"usage": 0.25, "used_core": 1.0, "total_core": 4.0, "number_cores": 4})
    };
    Json(json!({
        "status": 200,
        "data": [
            {"instance": "n1:9100", "container": {"running": 3, "total": 4}, "cpu": {"usage": 0.5}},
            {"instance": "n2:9100", "cpu": cpu}
        ]
    }))
}

async fn echo_query(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!({
        "status": 200,
        "data": {"resultType": "matrix", "result": [], "params": params}
    }))
}

fn mock_router(mock: Arc<MockDetector>) -> Router {
    Router::new()
        .route("/api/v1/rule_updated", get(rule_updated))
        .route(
            "/api/v1/monitor/targets",
            get(|| async {
                Json(json!({
                    "status": 200,
                    "data": {"targets": [{"instance": "n1:9100", "status": "up"}]}
                }))
            }),
        )
        .route(
            "/api/v1/monitor/node_info",
            get(|| async {
                Json(json!({
                    "status": 200,
                    "data": [{
                        "instance": "n1:9100",
                        "arch": "x86_64",
                        "kernal_version": "6.1.0",
                        "os_version": "Debian 12"
                    }]
                }))
            }),
        )
        .route("/api/v1/monitor/node_status", get(node_status))
        .route(
            "/api/v1/monitor/cluster_resources",
            get(|| async { Json(json!({"status": 500, "message": "prometheus unreachable"})) }),
        )
        .route(
            "/api/v1/monitor/cluster_container_status",
            get(|| async {
                (
                    StatusCode::BAD_GATEWAY,
                    [("content-type", "text/html")],
                    "<html>502 Bad Gateway</html>",
                )
            }),
        )
        .route("/api/v1/prometheus/query", get(echo_query))
        .route("/api/v1/prometheus/query_range", get(echo_query))
        .with_state(mock)
}

async fn spawn_mock_detector() -> Result<(u16, Arc<MockDetector>)> {
    let mock = Arc::new(MockDetector::default());
    mock.notify_status.store(200, Ordering::SeqCst);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    let router = mock_router(mock.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok((port, mock))
}

pub async fn build_test_context() -> Result<TestContext> {
    let temp_dir = tempfile::tempdir()?;
    let (port, detector) = spawn_mock_detector().await?;

    let config = ServerConfig {
        database: DatabaseConfig {
            url: format!(
                "sqlite://{}?mode=rwc",
                temp_dir.path().join("anomon.db").display()
            ),
        },
        detector: DetectorConfig {
            host: "127.0.0.1".to_string(),
            port,
            timeout_secs: 5,
        },
        ..Default::default()
    };

    let state = AppState::build(config).await?;
    let app = app::build_http_app(state.clone());

    Ok(TestContext {
        temp_dir,
        state,
        app,
        detector,
    })
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value, Option<String>) {
    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");
    let status = resp.status();
    let trace_id = resp
        .headers()
        .get("x-trace-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };
    (status, json, trace_id)
}

pub async fn request_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Value,
) -> (StatusCode, Value, Option<String>) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build");
    send(app, req).await
}

pub async fn request_no_body(
    app: &Router,
    method: &str,
    uri: &str,
) -> (StatusCode, Value, Option<String>) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    send(app, req).await
}

pub fn assert_ok_envelope(json: &Value) {
    assert_eq!(json["code"], 0, "unexpected envelope: {json}");
    assert!(json["message"].is_string());
    assert!(json["trace_id"].is_string());
}

pub fn assert_err_envelope(json: &Value, code: i32) {
    assert_eq!(json["code"], code, "unexpected envelope: {json}");
    assert!(json["message"].is_string());
    assert!(json["trace_id"].is_string());
}

pub fn cpu_high_rule() -> Value {
    json!({
        "name": "cpu_high",
        "expression": "cpu_usage > 0.9",
        "severity": "warning",
        "duration": "5m"
    })
}
