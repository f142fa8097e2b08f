use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use service::diagram::domain::{DiagramCreateRequest, DiagramUpdateRequest};
use service::diagram::{Diagram, DiagramFilter, DiagramSummary};
use service::errors::ServiceError;

use crate::{errors::JsonApiError, routes::ServerState};

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Exact tag to match
    pub tag: Option<String>,
    /// Case-insensitive title substring
    pub query: Option<String>,
}

#[utoipa::path(
    get, path = "/api/diagrams", tag = "diagrams",
    params(ListQuery),
    responses(
        (status = 200, description = "Backend diagrams followed by catalog diagrams", body = [crate::openapi::DiagramSummaryDoc]),
        (status = 500, description = "Storage Unavailable", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<DiagramSummary>>, JsonApiError> {
    let filter = DiagramFilter::new(q.tag.as_deref(), q.query.as_deref());
    let list = state.service.list_all(&filter).await?;
    Ok(Json(list))
}

#[utoipa::path(
    get, path = "/api/diagrams/{id}", tag = "diagrams",
    params(("id" = String, Path, description = "Backend id or `file-<name>` for catalog diagrams")),
    responses(
        (status = 200, description = "Found", body = crate::openapi::DiagramDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<Diagram>, JsonApiError> {
    let found = state.service.get_by_id(&id).await?;
    let d = found.ok_or_else(|| ServiceError::not_found(&format!("diagram {id}")))?;
    Ok(Json(d))
}

#[utoipa::path(
    post, path = "/api/diagrams", tag = "diagrams",
    request_body = crate::openapi::DiagramCreateDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::DiagramDoc),
        (status = 400, description = "Malformed body or blank title", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<DiagramCreateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Diagram>), JsonApiError> {
    let Json(req) = payload?;
    let created = state.service.create(req).await?;
    info!(id = %created.id, "diagram created via api");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put, path = "/api/diagrams/{id}", tag = "diagrams",
    params(("id" = String, Path, description = "Backend diagram id")),
    request_body = crate::openapi::DiagramUpdateDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::DiagramDoc),
        (status = 400, description = "Malformed body or blank title", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<DiagramUpdateRequest>, JsonRejection>,
) -> Result<Json<Diagram>, JsonApiError> {
    let Json(req) = payload?;
    let updated = state.service.update(&id, req).await?;
    let d = updated.ok_or_else(|| ServiceError::not_found(&format!("diagram {id}")))?;
    Ok(Json(d))
}

#[utoipa::path(
    delete, path = "/api/diagrams/{id}", tag = "diagrams",
    params(("id" = String, Path, description = "Backend diagram id")),
    responses(
        (status = 204, description = "Deleted, or nothing to delete"),
        (status = 500, description = "Storage Unavailable", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<String>) -> Result<StatusCode, JsonApiError> {
    state.service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
