//! create template_rules table migration

use sea_orm_migration::prelude::*;

use super::m20260805_000003_create_rule_templates::RuleTemplates;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TemplateRules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TemplateRules::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TemplateRules::TemplateId).string().not_null())
                    .col(ColumnDef::new(TemplateRules::Action).string().not_null())
                    .col(ColumnDef::new(TemplateRules::MatchKind).string().not_null())
                    .col(ColumnDef::new(TemplateRules::Value).text().not_null())
                    .col(ColumnDef::new(TemplateRules::Priority).big_integer().not_null())
                    .col(
                        ColumnDef::new(TemplateRules::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(TemplateRules::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TemplateRules::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_template_rules_template")
                            .from(TemplateRules::Table, TemplateRules::TemplateId)
                            .to(RuleTemplates::Table, RuleTemplates::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // index on template_id for listing a template's rules
        manager
            .create_index(
                Index::create()
                    .name("idx_template_rules_template_id")
                    .table(TemplateRules::Table)
                    .col(TemplateRules::TemplateId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TemplateRules::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TemplateRules {
    Table,
    Id,
    TemplateId,
    Action,
    MatchKind,
    Value,
    Priority,
    Enabled,
    CreatedAt,
    UpdatedAt,
}
