use std::path::Path;
use std::sync::Arc;

use axum::{middleware, routing::get, Json, Router};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;
use service::diagram::DiagramService;

use crate::{access_log, openapi::ApiDoc};

pub mod diagrams;
pub mod json_list;

/// Shared handler state
#[derive(Clone)]
pub struct ServerState {
    pub service: Arc<DiagramService>,
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: diagram API, catalog listing, docs,
/// and the static file fallback rooted at `static_root`.
pub fn build_router(state: ServerState, cors: CorsLayer, static_root: impl AsRef<Path>) -> Router {
    let api = Router::new()
        .route("/api/diagrams", get(diagrams::list).post(diagrams::create))
        .route(
            "/api/diagrams/:id",
            get(diagrams::get).put(diagrams::update).delete(diagrams::delete),
        )
        .route("/json/", get(json_list::list_json_files));

    let public = Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json));

    public
        .merge(api)
        .with_state(state)
        .fallback_service(ServeDir::new(static_root.as_ref()))
        .layer(middleware::from_fn(access_log::log_html_access))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
