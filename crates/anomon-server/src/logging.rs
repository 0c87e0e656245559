use std::fmt::Write;
use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::extract::Request;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use rand::Rng;

use crate::api::{error_response, ErrorCode};

pub const TRACE_ID_HEADER: &str = "X-Trace-Id";

/// Per-request trace id, inserted as a request extension by
/// [`request_logging`] and echoed in every response envelope.
#[derive(Clone, Debug)]
pub struct TraceId(pub String);

impl std::ops::Deref for TraceId {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

/// 16 hex characters from 8 random bytes.
fn generate_trace_id() -> String {
    let bytes: [u8; 8] = rand::thread_rng().gen();
    let mut s = String::with_capacity(16);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Reuses a caller-supplied trace id when it is short and plain enough to
/// put in a log line.
fn inbound_trace_id(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(TRACE_ID_HEADER)?.to_str().ok()?;
    let plain = (1..=64).contains(&value.len())
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    plain.then(|| value.to_string())
}

const MAX_BODY_LOG_CHARS: usize = 200;
const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// At most `max` bytes of a UTF-8 body, cut on a char boundary.
fn body_snippet(bytes: &[u8], max: usize) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) if s.len() > max => {
            let mut end = max;
            while end > 0 && !s.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &s[..end])
        }
        Ok(s) => s.to_string(),
        Err(_) => "<non-utf8 body>".to_string(),
    }
}

fn format_elapsed(elapsed_us: u128) -> String {
    if elapsed_us < 1000 {
        format!("{elapsed_us}µs")
    } else if elapsed_us < 1_000_000 {
        format!("{}ms", elapsed_us / 1000)
    } else {
        format!("{:.1}s", elapsed_us as f64 / 1_000_000.0)
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"))
}

/// Logs each request and its response under one trace id and echoes the id
/// in the `X-Trace-Id` response header.
///
/// Mutation bodies and JSON response bodies are logged truncated. The
/// OpenAPI document is passed through without body logging.
pub async fn request_logging(mut req: Request, next: Next) -> Response {
    let trace_id = inbound_trace_id(req.headers()).unwrap_or_else(generate_trace_id);
    req.extensions_mut().insert(TraceId(trace_id.clone()));

    let method = req.method().clone();
    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let log_bodies = !target.starts_with("/api/v1/openapi.json");

    let (req, req_body) = if log_bodies && method == axum::http::Method::POST {
        let (parts, body) = req.into_parts();
        let bytes = match axum::body::to_bytes(body, MAX_REQUEST_BODY_BYTES).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(
                    trace_id = %trace_id,
                    method = %method,
                    path = %target,
                    error = %e,
                    "--> request body rejected"
                );
                let mut response = error_response(
                    ErrorCode::PayloadTooLarge,
                    &trace_id,
                    &format!("request body exceeds {MAX_REQUEST_BODY_BYTES} bytes"),
                );
                if let Ok(val) = HeaderValue::from_str(&trace_id) {
                    response.headers_mut().insert(TRACE_ID_HEADER, val);
                }
                return response;
            }
        };
        let snippet = body_snippet(&bytes, MAX_BODY_LOG_CHARS);
        (Request::from_parts(parts, Body::from(bytes)), snippet)
    } else {
        (req, String::new())
    };

    tracing::info!(
        trace_id = %trace_id,
        method = %method,
        path = %target,
        body = %req_body,
        "--> request"
    );

    let start = Instant::now();
    let response = next.run(req).await;
    let elapsed = format_elapsed(start.elapsed().as_micros());

    let (mut parts, body) = response.into_parts();
    let bytes: Bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    let resp_body = if log_bodies && is_json(&parts.headers) {
        body_snippet(&bytes, MAX_BODY_LOG_CHARS)
    } else {
        String::new()
    };

    let status = parts.status;
    if status.is_server_error() {
        tracing::error!(trace_id = %trace_id, status = status.as_u16(), elapsed = %elapsed, body = %resp_body, "<-- response");
    } else if status.is_client_error() || status == axum::http::StatusCode::ACCEPTED {
        tracing::warn!(trace_id = %trace_id, status = status.as_u16(), elapsed = %elapsed, body = %resp_body, "<-- response");
    } else {
        tracing::info!(trace_id = %trace_id, status = status.as_u16(), elapsed = %elapsed, "<-- response");
    }

    if let Ok(val) = HeaderValue::from_str(&trace_id) {
        parts.headers.insert(TRACE_ID_HEADER, val);
    }
    Response::from_parts(parts, Body::from(bytes))
}
