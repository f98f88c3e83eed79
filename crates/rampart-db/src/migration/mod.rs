//! database migrations for rampart.

pub use sea_orm_migration::prelude::*;

mod m20260805_000001_create_resources;
mod m20260805_000002_create_ip_sets;
mod m20260805_000003_create_rule_templates;
mod m20260805_000004_create_template_rules;
mod m20260805_000005_create_resource_rules;
mod m20260805_000006_create_template_assignments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260805_000001_create_resources::Migration),
            Box::new(m20260805_000002_create_ip_sets::Migration),
            Box::new(m20260805_000003_create_rule_templates::Migration),
            Box::new(m20260805_000004_create_template_rules::Migration),
            Box::new(m20260805_000005_create_resource_rules::Migration),
            Box::new(m20260805_000006_create_template_assignments::Migration),
        ]
    }
}
