//! create rule_templates table migration

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RuleTemplates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RuleTemplates::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RuleTemplates::OrgId).string().not_null())
                    .col(ColumnDef::new(RuleTemplates::Name).string().not_null())
                    .col(ColumnDef::new(RuleTemplates::Description).text())
                    .col(
                        ColumnDef::new(RuleTemplates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RuleTemplates::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // template names are unique within an organisation
        manager
            .create_index(
                Index::create()
                    .name("idx_rule_templates_org_name_unique")
                    .table(RuleTemplates::Table)
                    .col(RuleTemplates::OrgId)
                    .col(RuleTemplates::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RuleTemplates::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum RuleTemplates {
    Table,
    Id,
    OrgId,
    Name,
    Description,
    CreatedAt,
    UpdatedAt,
}
