//! Create `diagrams` table.
//! One row per backend-persisted diagram; tags and flow are JSON columns so
//! the nested graph round-trips without loss.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Diagram::Table)
                    .if_not_exists()
                    .col(string_len(Diagram::Id, 64).primary_key())
                    .col(string(Diagram::Title).not_null())
                    .col(text_null(Diagram::Description))
                    .col(json(Diagram::Tags).not_null())
                    .col(json_null(Diagram::Flow))
                    .col(big_integer(Diagram::Version).not_null())
                    .col(string_len(Diagram::Source, 8).not_null())
                    .col(timestamp_with_time_zone(Diagram::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Diagram::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_diagrams_title")
                    .table(Diagram::Table)
                    .col(Diagram::Title)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Diagram::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Diagram {
    #[sea_orm(iden = "diagrams")]
    Table,
    Id,
    Title,
    Description,
    Tags,
    Flow,
    Version,
    Source,
    CreatedAt,
    UpdatedAt,
}
