use std::sync::Arc;

use axum::middleware;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;

use crate::state::AppState;
use crate::{api, logging};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "anomon API",
        description = "Detection rule management, analysis results and metric proxy",
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Rules", description = "Detection rule lifecycle"),
        (name = "Analysis", description = "Detected episodes and their metric windows"),
        (name = "Monitor", description = "Infrastructure views reported by the detector"),
        (name = "Prometheus", description = "Ad-hoc metric queries")
    )
)]
struct ApiDoc;

/// The full HTTP surface with CORS and request logging applied.
pub fn build_http_app(state: AppState) -> Router {
    let (router, api_spec) = api::api_routes().split_for_parts();

    let mut spec = ApiDoc::openapi();
    spec.merge(api_spec);
    let spec = Arc::new(spec);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .with_state(state)
        .route(
            "/api/v1/openapi.json",
            get(move || {
                let spec = spec.clone();
                async move { Json(spec.as_ref().clone()) }
            }),
        )
        .layer(cors)
        .layer(middleware::from_fn(logging::request_logging))
}
