//! create template_assignments table migration

use sea_orm_migration::prelude::*;

use super::m20260805_000001_create_resources::Resources;
use super::m20260805_000003_create_rule_templates::RuleTemplates;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TemplateAssignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TemplateAssignments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TemplateAssignments::ResourceId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TemplateAssignments::TemplateId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TemplateAssignments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_template_assignments_resource")
                            .from(TemplateAssignments::Table, TemplateAssignments::ResourceId)
                            .to(Resources::Table, Resources::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_template_assignments_template")
                            .from(TemplateAssignments::Table, TemplateAssignments::TemplateId)
                            .to(RuleTemplates::Table, RuleTemplates::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // a template can be assigned to a resource at most once
        manager
            .create_index(
                Index::create()
                    .name("idx_template_assignments_unique")
                    .table(TemplateAssignments::Table)
                    .col(TemplateAssignments::ResourceId)
                    .col(TemplateAssignments::TemplateId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // index on template_id for propagation fan-out
        manager
            .create_index(
                Index::create()
                    .name("idx_template_assignments_template_id")
                    .table(TemplateAssignments::Table)
                    .col(TemplateAssignments::TemplateId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TemplateAssignments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TemplateAssignments {
    Table,
    Id,
    ResourceId,
    TemplateId,
    CreatedAt,
}
