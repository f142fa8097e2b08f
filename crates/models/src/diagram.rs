use sea_orm::{entity::prelude::*, sea_query::OnConflict, DatabaseConnection, EntityTrait, QueryOrder};
use serde_json::Value;

use crate::errors::ModelError;

/// Row shape of the `diagrams` table. `tags` holds a JSON array of strings and
/// `flow` the diagram graph exactly as submitted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "diagrams")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub tags: Json,
    #[sea_orm(nullable)]
    pub flow: Option<Json>,
    pub version: i64,
    pub source: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decode the `tags` column into its ordered string list.
    pub fn tag_list(&self) -> Result<Vec<String>, ModelError> {
        serde_json::from_value(self.tags.clone())
            .map_err(|e| ModelError::Decode { column: "tags", reason: e.to_string() })
    }
}

pub fn encode_tags(tags: &[String]) -> Json {
    Value::Array(tags.iter().cloned().map(Value::String).collect())
}

/// Insert the row, or overwrite every column of the row with the same id.
pub async fn upsert(db: &DatabaseConnection, model: Model) -> Result<(), ModelError> {
    let am: ActiveModel = model.into();
    Entity::insert(am)
        .on_conflict(
            OnConflict::column(Column::Id)
                .update_columns([
                    Column::Title,
                    Column::Description,
                    Column::Tags,
                    Column::Flow,
                    Column::Version,
                    Column::Source,
                    Column::CreatedAt,
                    Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))?;
    Ok(())
}

pub async fn find(db: &DatabaseConnection, id: &str) -> Result<Option<Model>, ModelError> {
    Entity::find_by_id(id.to_string())
        .one(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}

/// Every row, ordered by id.
pub async fn all(db: &DatabaseConnection) -> Result<Vec<Model>, ModelError> {
    Entity::find()
        .order_by_asc(Column::Id)
        .all(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}

/// Returns whether a row was removed.
pub async fn delete(db: &DatabaseConnection, id: &str) -> Result<bool, ModelError> {
    let res = Entity::delete_by_id(id.to_string())
        .exec(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use migration::MigratorTrait;
    use sea_orm::{ConnectOptions, Database};
    use serde_json::json;

    async fn memory_db() -> anyhow::Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opt).await?;
        migration::Migrator::up(&db, None).await?;
        Ok(db)
    }

    fn row(id: &str, title: &str) -> Model {
        let at = Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap();
        Model {
            id: id.into(),
            title: title.into(),
            description: None,
            tags: encode_tags(&["x".to_string(), "y".to_string()]),
            flow: Some(json!({"nodes": [{"id": "n1", "meta": {"depth": [1, 2, {"k": null}]}}]})),
            version: 1,
            source: "db".into(),
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn upsert_inserts_then_overwrites() -> anyhow::Result<()> {
        let db = memory_db().await?;
        upsert(&db, row("a", "First")).await?;
        let mut second = row("a", "Second");
        second.version = 2;
        upsert(&db, second.clone()).await?;

        let found = find(&db, "a").await?.expect("row present");
        assert_eq!(found, second);
        assert_eq!(found.tag_list()?, vec!["x".to_string(), "y".to_string()]);
        assert_eq!(all(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn delete_reports_whether_row_existed() -> anyhow::Result<()> {
        let db = memory_db().await?;
        upsert(&db, row("b", "B")).await?;
        assert!(delete(&db, "b").await?);
        assert!(!delete(&db, "b").await?);
        assert!(find(&db, "b").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn all_is_ordered_by_id() -> anyhow::Result<()> {
        let db = memory_db().await?;
        upsert(&db, row("c", "C")).await?;
        upsert(&db, row("a", "A")).await?;
        upsert(&db, row("b", "B")).await?;
        let ids: Vec<String> = all(&db).await?.into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        Ok(())
    }
}
