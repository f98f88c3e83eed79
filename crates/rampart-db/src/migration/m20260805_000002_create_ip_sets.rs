//! create ip_sets table migration

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(IpSets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IpSets::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(IpSets::OrgId).string().not_null())
                    .col(ColumnDef::new(IpSets::Name).string().not_null())
                    .col(ColumnDef::new(IpSets::Description).text())
                    .col(
                        ColumnDef::new(IpSets::Addresses)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(IpSets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IpSets::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // set names are unique within an organisation
        manager
            .create_index(
                Index::create()
                    .name("idx_ip_sets_org_name_unique")
                    .table(IpSets::Table)
                    .col(IpSets::OrgId)
                    .col(IpSets::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IpSets::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum IpSets {
    Table,
    Id,
    OrgId,
    Name,
    Description,
    Addresses,
    CreatedAt,
    UpdatedAt,
}
