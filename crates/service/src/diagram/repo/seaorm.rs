use async_trait::async_trait;
use models::diagram as table;
use sea_orm::DatabaseConnection;

use crate::diagram::domain::{Diagram, DiagramFilter, DiagramSource};
use crate::diagram::repository::DiagramRepository;
use crate::errors::ServiceError;

/// Managed-table backend over the `diagrams` table.
///
/// Every call is a single statement; failures surface as
/// `StorageUnavailable` without retry.
pub struct SeaOrmDiagramRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmDiagramRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn to_row(d: &Diagram) -> table::Model {
    table::Model {
        id: d.id.clone(),
        title: d.title.clone(),
        description: d.description.clone(),
        tags: table::encode_tags(&d.tags),
        flow: d.flow.clone(),
        version: d.version,
        source: d.source.as_str().to_string(),
        created_at: d.created_at,
        updated_at: d.updated_at,
    }
}

fn from_row(row: table::Model) -> Result<Diagram, ServiceError> {
    let tags = row.tag_list()?;
    let source: DiagramSource = row.source.parse().map_err(ServiceError::StorageUnavailable)?;
    Ok(Diagram {
        id: row.id,
        title: row.title,
        description: row.description,
        tags,
        flow: row.flow,
        version: row.version,
        source,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl DiagramRepository for SeaOrmDiagramRepository {
    async fn save(&self, diagram: Diagram) -> Result<Diagram, ServiceError> {
        table::upsert(&self.db, to_row(&diagram)).await?;
        Ok(diagram)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Diagram>, ServiceError> {
        table::find(&self.db, id).await?.map(from_row).transpose()
    }

    async fn find_all(&self, filter: &DiagramFilter) -> Result<Vec<Diagram>, ServiceError> {
        // filtering happens here so tag and case-folding rules are identical
        // to the in-memory backend on every database
        let rows = table::all(&self.db).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let d = from_row(row)?;
            if filter.matches(&d) {
                out.push(d);
            }
        }
        Ok(out)
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), ServiceError> {
        table::delete(&self.db, id).await?;
        Ok(())
    }
}
