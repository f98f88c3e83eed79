//! create resource_rules table migration

use sea_orm_migration::prelude::*;

use super::m20260805_000001_create_resources::Resources;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ResourceRules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ResourceRules::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ResourceRules::ResourceId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ResourceRules::Action).string().not_null())
                    .col(ColumnDef::new(ResourceRules::MatchKind).string().not_null())
                    .col(ColumnDef::new(ResourceRules::Value).text().not_null())
                    .col(
                        ColumnDef::new(ResourceRules::Priority)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResourceRules::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(ResourceRules::IpSetId).string())
                    // no foreign key; template cleanup deletes copies itself
                    .col(ColumnDef::new(ResourceRules::TemplateRuleId).big_integer())
                    .col(
                        ColumnDef::new(ResourceRules::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResourceRules::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_resource_rules_resource")
                            .from(ResourceRules::Table, ResourceRules::ResourceId)
                            .to(Resources::Table, Resources::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // index on resource_id for listing a resource's rules
        manager
            .create_index(
                Index::create()
                    .name("idx_resource_rules_resource_id")
                    .table(ResourceRules::Table)
                    .col(ResourceRules::ResourceId)
                    .to_owned(),
            )
            .await?;

        // index on template_rule_id for propagation fan-out
        manager
            .create_index(
                Index::create()
                    .name("idx_resource_rules_template_rule_id")
                    .table(ResourceRules::Table)
                    .col(ResourceRules::TemplateRuleId)
                    .to_owned(),
            )
            .await?;

        // index on ip_set_id for reference counting before set deletion
        manager
            .create_index(
                Index::create()
                    .name("idx_resource_rules_ip_set_id")
                    .table(ResourceRules::Table)
                    .col(ResourceRules::IpSetId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ResourceRules::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ResourceRules {
    Table,
    Id,
    ResourceId,
    Action,
    MatchKind,
    Value,
    Priority,
    Enabled,
    IpSetId,
    TemplateRuleId,
    CreatedAt,
    UpdatedAt,
}
