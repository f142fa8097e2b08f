use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorDoc { pub error: String, pub detail: Option<String> }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiagramDoc {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    #[schema(value_type = Option<Object>)]
    pub flow: Option<serde_json::Value>,
    pub version: i64,
    /// `db` or `file`
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(ToSchema)]
pub struct DiagramSummaryDoc {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub version: i64,
    pub source: String,
}

#[derive(ToSchema)]
pub struct DiagramCreateDoc {
    pub title: String,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    #[schema(value_type = Option<Object>)]
    pub flow: Option<serde_json::Value>,
}

#[derive(ToSchema)]
pub struct DiagramUpdateDoc {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    #[schema(value_type = Option<Object>)]
    pub flow: Option<serde_json::Value>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::diagrams::list,
        crate::routes::diagrams::get,
        crate::routes::diagrams::create,
        crate::routes::diagrams::update,
        crate::routes::diagrams::delete,
        crate::routes::json_list::list_json_files,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorDoc,
            DiagramDoc,
            DiagramSummaryDoc,
            DiagramCreateDoc,
            DiagramUpdateDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "diagrams"),
        (name = "catalog")
    )
)]
pub struct ApiDoc;
