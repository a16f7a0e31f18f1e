//! Migration: Create places table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Places::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Places::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Places::Title).string().not_null())
                    .col(ColumnDef::new(Places::Description).text().not_null())
                    .col(ColumnDef::new(Places::Address).string().not_null())
                    .col(ColumnDef::new(Places::Lat).double().not_null())
                    .col(ColumnDef::new(Places::Lon).double().not_null())
                    .col(ColumnDef::new(Places::Image).string().not_null())
                    // No foreign key: ownership is kept consistent by the coordinator
                    .col(ColumnDef::new(Places::Creator).uuid().not_null())
                    .col(
                        ColumnDef::new(Places::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Places::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_places_creator")
                    .table(Places::Table)
                    .col(Places::Creator)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_places_creator")
                    .table(Places::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Places::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Places {
    Table,
    Id,
    Title,
    Description,
    Address,
    Lat,
    Lon,
    Image,
    Creator,
    CreatedAt,
    UpdatedAt,
}
