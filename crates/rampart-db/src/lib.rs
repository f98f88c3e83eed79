//! database layer for rampart.
//!
//! this crate provides persistent storage for:
//! - Resources
//! - Resource rules
//! - Rule templates and template rules
//! - Template assignments
//! - IP sets
//!
//! rules and templates are hard-deleted; ordering columns and template
//! links are plain integers so the authoring layer stays in control of
//! cascade behavior.

#![warn(missing_docs)]

mod entity;
mod error;
mod migration;

pub use error::Error;

use std::future::Future;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database as SeaOrmDatabase, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use sea_orm_migration::MigratorTrait;

use rampart_types::{
    Config, IpSet, IpSetId, OrgId, Resource, ResourceId, ResourceRule, RuleAction, RuleId,
    RuleMatch, RuleTemplate, TemplateAssignment, TemplateId, TemplateRule, TemplateRuleId,
};

/// result type for database operations.
pub type Result<T> = std::result::Result<T, Error>;

/// database trait for rampart storage operations.
///
/// this trait abstracts over different database backends (sqlite,
/// postgresql). it is deliberately mechanical: lookups, inserts, and
/// deletes with no rule semantics, which live in the engine crate.
pub trait Database: Send + Sync {
    // ─── Health Check ─────────────────────────────────────────────────────────

    /// ping the database to verify connectivity.
    ///
    /// returns `ok(())` if the database is reachable, `err` otherwise.
    /// used for health checks with a recommended timeout of 1 second.
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;

    // ─── Resource Operations ──────────────────────────────────────────────────

    /// create a new resource. returns the created resource with its assigned id.
    fn create_resource(
        &self,
        resource: &Resource,
    ) -> impl Future<Output = Result<Resource>> + Send;

    /// get a resource by id.
    fn get_resource(
        &self,
        id: ResourceId,
    ) -> impl Future<Output = Result<Option<Resource>>> + Send;

    /// list all resources owned by an organisation.
    fn list_resources(&self, org_id: &OrgId) -> impl Future<Output = Result<Vec<Resource>>> + Send;

    /// delete a resource.
    fn delete_resource(&self, id: ResourceId) -> impl Future<Output = Result<()>> + Send;

    /// delete every rule attached to a resource. returns the number removed.
    fn delete_rules_for_resource(
        &self,
        resource_id: ResourceId,
    ) -> impl Future<Output = Result<u64>> + Send;

    /// delete every template assignment of a resource. returns the number removed.
    fn delete_assignments_for_resource(
        &self,
        resource_id: ResourceId,
    ) -> impl Future<Output = Result<u64>> + Send;

    // ─── Resource Rule Operations ─────────────────────────────────────────────

    /// create a new resource rule. returns the created rule with its assigned id.
    fn create_resource_rule(
        &self,
        rule: &ResourceRule,
    ) -> impl Future<Output = Result<ResourceRule>> + Send;

    /// get a resource rule by id.
    fn get_resource_rule(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<ResourceRule>>> + Send;

    /// list a resource's rules ordered by priority, then id.
    fn list_resource_rules(
        &self,
        resource_id: ResourceId,
    ) -> impl Future<Output = Result<Vec<ResourceRule>>> + Send;

    /// update an existing resource rule. returns the updated rule.
    fn update_resource_rule(
        &self,
        rule: &ResourceRule,
    ) -> impl Future<Output = Result<ResourceRule>> + Send;

    /// delete a resource rule.
    fn delete_resource_rule(&self, id: RuleId) -> impl Future<Output = Result<()>> + Send;

    /// the highest priority currently in use on a resource, if it has rules.
    fn max_resource_rule_priority(
        &self,
        resource_id: ResourceId,
    ) -> impl Future<Output = Result<Option<i64>>> + Send;

    /// get the copy of a template rule on a specific resource, if present.
    fn get_linked_resource_rule(
        &self,
        resource_id: ResourceId,
        template_rule_id: TemplateRuleId,
    ) -> impl Future<Output = Result<Option<ResourceRule>>> + Send;

    /// list every resource rule copied from the given template rule.
    fn list_linked_resource_rules(
        &self,
        template_rule_id: TemplateRuleId,
    ) -> impl Future<Output = Result<Vec<ResourceRule>>> + Send;

    /// delete every resource rule copied from the given template rule.
    /// returns the number removed.
    fn delete_linked_resource_rules(
        &self,
        template_rule_id: TemplateRuleId,
    ) -> impl Future<Output = Result<u64>> + Send;

    /// delete the copies of the given template rules on one resource.
    /// returns the number removed.
    fn delete_linked_resource_rules_on_resource(
        &self,
        resource_id: ResourceId,
        template_rule_ids: &[TemplateRuleId],
    ) -> impl Future<Output = Result<u64>> + Send;

    /// count the rules that reference an ip set.
    fn count_resource_rules_for_ip_set(
        &self,
        ip_set_id: &IpSetId,
    ) -> impl Future<Output = Result<u64>> + Send;

    // ─── Rule Template Operations ─────────────────────────────────────────────

    /// create a new rule template.
    fn create_template(
        &self,
        template: &RuleTemplate,
    ) -> impl Future<Output = Result<RuleTemplate>> + Send;

    /// get a template by id.
    fn get_template(
        &self,
        id: &TemplateId,
    ) -> impl Future<Output = Result<Option<RuleTemplate>>> + Send;

    /// get a template by name within an organisation.
    fn get_template_by_name(
        &self,
        org_id: &OrgId,
        name: &str,
    ) -> impl Future<Output = Result<Option<RuleTemplate>>> + Send;

    /// list all templates owned by an organisation.
    fn list_templates(
        &self,
        org_id: &OrgId,
    ) -> impl Future<Output = Result<Vec<RuleTemplate>>> + Send;

    /// update an existing template. returns the updated template.
    fn update_template(
        &self,
        template: &RuleTemplate,
    ) -> impl Future<Output = Result<RuleTemplate>> + Send;

    /// delete a template.
    fn delete_template(&self, id: &TemplateId) -> impl Future<Output = Result<()>> + Send;

    // ─── Template Rule Operations ─────────────────────────────────────────────

    /// create a new template rule. returns the created rule with its assigned id.
    fn create_template_rule(
        &self,
        rule: &TemplateRule,
    ) -> impl Future<Output = Result<TemplateRule>> + Send;

    /// get a template rule by id.
    fn get_template_rule(
        &self,
        id: TemplateRuleId,
    ) -> impl Future<Output = Result<Option<TemplateRule>>> + Send;

    /// list a template's rules ordered by priority, then id.
    fn list_template_rules(
        &self,
        template_id: &TemplateId,
    ) -> impl Future<Output = Result<Vec<TemplateRule>>> + Send;

    /// update an existing template rule. returns the updated rule.
    fn update_template_rule(
        &self,
        rule: &TemplateRule,
    ) -> impl Future<Output = Result<TemplateRule>> + Send;

    /// delete a template rule.
    fn delete_template_rule(
        &self,
        id: TemplateRuleId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// the highest priority currently in use within a template, if it has rules.
    fn max_template_rule_priority(
        &self,
        template_id: &TemplateId,
    ) -> impl Future<Output = Result<Option<i64>>> + Send;

    /// find a template rule with the exact (action, match, value) triple.
    fn find_template_rule(
        &self,
        template_id: &TemplateId,
        action: RuleAction,
        match_kind: RuleMatch,
        value: &str,
    ) -> impl Future<Output = Result<Option<TemplateRule>>> + Send;

    // ─── Template Assignment Operations ───────────────────────────────────────

    /// create a new template assignment.
    fn create_assignment(
        &self,
        assignment: &TemplateAssignment,
    ) -> impl Future<Output = Result<TemplateAssignment>> + Send;

    /// get the assignment linking a template to a resource, if present.
    fn get_assignment(
        &self,
        resource_id: ResourceId,
        template_id: &TemplateId,
    ) -> impl Future<Output = Result<Option<TemplateAssignment>>> + Send;

    /// list every assignment of a template.
    fn list_assignments_for_template(
        &self,
        template_id: &TemplateId,
    ) -> impl Future<Output = Result<Vec<TemplateAssignment>>> + Send;

    /// list every assignment on a resource.
    fn list_assignments_for_resource(
        &self,
        resource_id: ResourceId,
    ) -> impl Future<Output = Result<Vec<TemplateAssignment>>> + Send;

    /// delete the assignment linking a template to a resource.
    fn delete_assignment(
        &self,
        resource_id: ResourceId,
        template_id: &TemplateId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// delete every assignment of a template. returns the number removed.
    fn delete_assignments_for_template(
        &self,
        template_id: &TemplateId,
    ) -> impl Future<Output = Result<u64>> + Send;

    // ─── IP Set Operations ────────────────────────────────────────────────────

    /// create a new ip set.
    fn create_ip_set(&self, set: &IpSet) -> impl Future<Output = Result<IpSet>> + Send;

    /// get an ip set by id.
    fn get_ip_set(&self, id: &IpSetId) -> impl Future<Output = Result<Option<IpSet>>> + Send;

    /// get an ip set by name within an organisation.
    fn get_ip_set_by_name(
        &self,
        org_id: &OrgId,
        name: &str,
    ) -> impl Future<Output = Result<Option<IpSet>>> + Send;

    /// list all ip sets owned by an organisation.
    fn list_ip_sets(&self, org_id: &OrgId) -> impl Future<Output = Result<Vec<IpSet>>> + Send;

    /// update an existing ip set. returns the updated set.
    fn update_ip_set(&self, set: &IpSet) -> impl Future<Output = Result<IpSet>> + Send;

    /// delete an ip set.
    fn delete_ip_set(&self, id: &IpSetId) -> impl Future<Output = Result<()>> + Send;
}

/// the main database implementation using sea-orm.
#[derive(Clone)]
pub struct RampartDb {
    conn: DatabaseConnection,
}

impl RampartDb {
    /// create a new database connection from config.
    pub async fn new(config: &Config) -> Result<Self> {
        let url = Self::build_connection_url(&config.database)?;
        let conn: DatabaseConnection = SeaOrmDatabase::connect(&url)
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let db = Self { conn };

        // enable WAL mode for sqlite if configured
        if config.database.db_type == "sqlite" && config.database.sqlite.write_ahead_log {
            db.enable_wal_mode().await?;
        }

        db.migrate().await?;
        Ok(db)
    }

    /// enable write-ahead logging mode for sqlite.
    ///
    /// WAL mode allows concurrent reads during writes and generally
    /// improves performance. must be called before any writes.
    async fn enable_wal_mode(&self) -> Result<()> {
        use sea_orm::ConnectionTrait;
        self.conn
            .execute_unprepared("PRAGMA journal_mode=WAL")
            .await
            .map_err(|e| Error::Connection(format!("failed to enable WAL mode: {}", e)))?;
        tracing::info!("sqlite WAL mode enabled");
        Ok(())
    }

    /// get the current sqlite journal mode.
    #[cfg(test)]
    async fn get_journal_mode(&self) -> Result<String> {
        use sea_orm::{ConnectionTrait, FromQueryResult};

        #[derive(FromQueryResult)]
        struct JournalMode {
            journal_mode: String,
        }

        let result: Option<JournalMode> = self
            .conn
            .query_one(sea_orm::Statement::from_string(
                sea_orm::DatabaseBackend::Sqlite,
                "PRAGMA journal_mode".to_string(),
            ))
            .await
            .map_err(|e| Error::Connection(e.to_string()))?
            .map(|row| JournalMode::from_query_result(&row, "").unwrap());

        Ok(result.map(|r| r.journal_mode).unwrap_or_default())
    }

    /// build a sea-orm compatible connection url from config.
    fn build_connection_url(config: &rampart_types::DatabaseConfig) -> Result<String> {
        match config.db_type.as_str() {
            "sqlite" => {
                // for sqlite, build the connection url with create mode
                let path = if config.connection_string.starts_with("sqlite:") {
                    config.connection_string.clone()
                } else {
                    format!("sqlite:{}", config.connection_string)
                };
                // add ?mode=rwc to create the file if it doesn't exist
                if path.contains('?') {
                    Ok(path)
                } else {
                    Ok(format!("{}?mode=rwc", path))
                }
            }
            "postgres" | "postgresql" => {
                // postgresql urls should already be properly formatted
                Ok(config.connection_string.clone())
            }
            other => Err(Error::InvalidData(format!(
                "unsupported database type: {}",
                other
            ))),
        }
    }

    /// create an in-memory sqlite database for testing.
    pub async fn new_in_memory() -> Result<Self> {
        let conn: DatabaseConnection = SeaOrmDatabase::connect("sqlite::memory:")
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let db = Self { conn };
        db.migrate().await?;
        Ok(db)
    }

    /// run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        migration::Migrator::up(&self.conn, None)
            .await
            .map_err(|e| Error::Migration(e.to_string()))?;
        Ok(())
    }

    /// close the database connection.
    ///
    /// NOTE: sea-orm connections are reference-counted and cleaned up on drop.
    /// this method exists for explicit cleanup and logging purposes.
    pub async fn close(&self) -> Result<()> {
        tracing::debug!("database connection marked for close");
        Ok(())
    }
}

impl Database for RampartDb {
    // health check

    async fn ping(&self) -> Result<()> {
        use sea_orm::ConnectionTrait;
        self.conn
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        Ok(())
    }

    // resource operations

    async fn create_resource(&self, resource: &Resource) -> Result<Resource> {
        let model: entity::resource::ActiveModel = resource.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_resource(&self, id: ResourceId) -> Result<Option<Resource>> {
        let result = entity::resource::Entity::find_by_id(id.0 as i64)
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_resources(&self, org_id: &OrgId) -> Result<Vec<Resource>> {
        let results = entity::resource::Entity::find()
            .filter(entity::resource::Column::OrgId.eq(org_id.as_str()))
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn delete_resource(&self, id: ResourceId) -> Result<()> {
        entity::resource::Entity::delete_many()
            .filter(entity::resource::Column::Id.eq(id.0 as i64))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    async fn delete_rules_for_resource(&self, resource_id: ResourceId) -> Result<u64> {
        let result = entity::resource_rule::Entity::delete_many()
            .filter(entity::resource_rule::Column::ResourceId.eq(resource_id.0 as i64))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    async fn delete_assignments_for_resource(&self, resource_id: ResourceId) -> Result<u64> {
        let result = entity::template_assignment::Entity::delete_many()
            .filter(entity::template_assignment::Column::ResourceId.eq(resource_id.0 as i64))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    // resource rule operations

    async fn create_resource_rule(&self, rule: &ResourceRule) -> Result<ResourceRule> {
        let model: entity::resource_rule::ActiveModel = rule.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_resource_rule(&self, id: RuleId) -> Result<Option<ResourceRule>> {
        let result = entity::resource_rule::Entity::find_by_id(id.0 as i64)
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_resource_rules(&self, resource_id: ResourceId) -> Result<Vec<ResourceRule>> {
        let results = entity::resource_rule::Entity::find()
            .filter(entity::resource_rule::Column::ResourceId.eq(resource_id.0 as i64))
            .order_by_asc(entity::resource_rule::Column::Priority)
            .order_by_asc(entity::resource_rule::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn update_resource_rule(&self, rule: &ResourceRule) -> Result<ResourceRule> {
        let mut model: entity::resource_rule::ActiveModel = rule.into();
        model.updated_at = Set(Utc::now());
        let result = model.update(&self.conn).await?;
        Ok(result.into())
    }

    async fn delete_resource_rule(&self, id: RuleId) -> Result<()> {
        entity::resource_rule::Entity::delete_many()
            .filter(entity::resource_rule::Column::Id.eq(id.0 as i64))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    async fn max_resource_rule_priority(&self, resource_id: ResourceId) -> Result<Option<i64>> {
        let result = entity::resource_rule::Entity::find()
            .filter(entity::resource_rule::Column::ResourceId.eq(resource_id.0 as i64))
            .order_by_desc(entity::resource_rule::Column::Priority)
            .one(&self.conn)
            .await?;
        Ok(result.map(|model| model.priority))
    }

    async fn get_linked_resource_rule(
        &self,
        resource_id: ResourceId,
        template_rule_id: TemplateRuleId,
    ) -> Result<Option<ResourceRule>> {
        let result = entity::resource_rule::Entity::find()
            .filter(entity::resource_rule::Column::ResourceId.eq(resource_id.0 as i64))
            .filter(entity::resource_rule::Column::TemplateRuleId.eq(template_rule_id.0 as i64))
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_linked_resource_rules(
        &self,
        template_rule_id: TemplateRuleId,
    ) -> Result<Vec<ResourceRule>> {
        let results = entity::resource_rule::Entity::find()
            .filter(entity::resource_rule::Column::TemplateRuleId.eq(template_rule_id.0 as i64))
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn delete_linked_resource_rules(
        &self,
        template_rule_id: TemplateRuleId,
    ) -> Result<u64> {
        let result = entity::resource_rule::Entity::delete_many()
            .filter(entity::resource_rule::Column::TemplateRuleId.eq(template_rule_id.0 as i64))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    async fn delete_linked_resource_rules_on_resource(
        &self,
        resource_id: ResourceId,
        template_rule_ids: &[TemplateRuleId],
    ) -> Result<u64> {
        if template_rule_ids.is_empty() {
            return Ok(0);
        }
        let ids: Vec<i64> = template_rule_ids.iter().map(|id| id.0 as i64).collect();
        let result = entity::resource_rule::Entity::delete_many()
            .filter(entity::resource_rule::Column::ResourceId.eq(resource_id.0 as i64))
            .filter(entity::resource_rule::Column::TemplateRuleId.is_in(ids))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    async fn count_resource_rules_for_ip_set(&self, ip_set_id: &IpSetId) -> Result<u64> {
        let count = entity::resource_rule::Entity::find()
            .filter(entity::resource_rule::Column::IpSetId.eq(ip_set_id.as_str()))
            .count(&self.conn)
            .await?;
        Ok(count)
    }

    // rule template operations

    async fn create_template(&self, template: &RuleTemplate) -> Result<RuleTemplate> {
        let model: entity::rule_template::ActiveModel = template.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_template(&self, id: &TemplateId) -> Result<Option<RuleTemplate>> {
        let result = entity::rule_template::Entity::find_by_id(id.to_string())
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn get_template_by_name(
        &self,
        org_id: &OrgId,
        name: &str,
    ) -> Result<Option<RuleTemplate>> {
        let result = entity::rule_template::Entity::find()
            .filter(entity::rule_template::Column::OrgId.eq(org_id.as_str()))
            .filter(entity::rule_template::Column::Name.eq(name))
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_templates(&self, org_id: &OrgId) -> Result<Vec<RuleTemplate>> {
        let results = entity::rule_template::Entity::find()
            .filter(entity::rule_template::Column::OrgId.eq(org_id.as_str()))
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn update_template(&self, template: &RuleTemplate) -> Result<RuleTemplate> {
        let mut model: entity::rule_template::ActiveModel = template.into();
        model.updated_at = Set(Utc::now());
        let result = model.update(&self.conn).await?;
        Ok(result.into())
    }

    async fn delete_template(&self, id: &TemplateId) -> Result<()> {
        entity::rule_template::Entity::delete_many()
            .filter(entity::rule_template::Column::Id.eq(id.as_str()))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    // template rule operations

    async fn create_template_rule(&self, rule: &TemplateRule) -> Result<TemplateRule> {
        let model: entity::template_rule::ActiveModel = rule.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_template_rule(&self, id: TemplateRuleId) -> Result<Option<TemplateRule>> {
        let result = entity::template_rule::Entity::find_by_id(id.0 as i64)
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_template_rules(&self, template_id: &TemplateId) -> Result<Vec<TemplateRule>> {
        let results = entity::template_rule::Entity::find()
            .filter(entity::template_rule::Column::TemplateId.eq(template_id.as_str()))
            .order_by_asc(entity::template_rule::Column::Priority)
            .order_by_asc(entity::template_rule::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn update_template_rule(&self, rule: &TemplateRule) -> Result<TemplateRule> {
        let mut model: entity::template_rule::ActiveModel = rule.into();
        model.updated_at = Set(Utc::now());
        let result = model.update(&self.conn).await?;
        Ok(result.into())
    }

    async fn delete_template_rule(&self, id: TemplateRuleId) -> Result<()> {
        entity::template_rule::Entity::delete_many()
            .filter(entity::template_rule::Column::Id.eq(id.0 as i64))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    async fn max_template_rule_priority(&self, template_id: &TemplateId) -> Result<Option<i64>> {
        let result = entity::template_rule::Entity::find()
            .filter(entity::template_rule::Column::TemplateId.eq(template_id.as_str()))
            .order_by_desc(entity::template_rule::Column::Priority)
            .one(&self.conn)
            .await?;
        Ok(result.map(|model| model.priority))
    }

    async fn find_template_rule(
        &self,
        template_id: &TemplateId,
        action: RuleAction,
        match_kind: RuleMatch,
        value: &str,
    ) -> Result<Option<TemplateRule>> {
        let result = entity::template_rule::Entity::find()
            .filter(entity::template_rule::Column::TemplateId.eq(template_id.as_str()))
            .filter(entity::template_rule::Column::Action.eq(action.as_str()))
            .filter(entity::template_rule::Column::MatchKind.eq(match_kind.as_str()))
            .filter(entity::template_rule::Column::Value.eq(value))
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    // template assignment operations

    async fn create_assignment(
        &self,
        assignment: &TemplateAssignment,
    ) -> Result<TemplateAssignment> {
        let model: entity::template_assignment::ActiveModel = assignment.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_assignment(
        &self,
        resource_id: ResourceId,
        template_id: &TemplateId,
    ) -> Result<Option<TemplateAssignment>> {
        let result = entity::template_assignment::Entity::find()
            .filter(entity::template_assignment::Column::ResourceId.eq(resource_id.0 as i64))
            .filter(entity::template_assignment::Column::TemplateId.eq(template_id.as_str()))
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_assignments_for_template(
        &self,
        template_id: &TemplateId,
    ) -> Result<Vec<TemplateAssignment>> {
        let results = entity::template_assignment::Entity::find()
            .filter(entity::template_assignment::Column::TemplateId.eq(template_id.as_str()))
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn list_assignments_for_resource(
        &self,
        resource_id: ResourceId,
    ) -> Result<Vec<TemplateAssignment>> {
        let results = entity::template_assignment::Entity::find()
            .filter(entity::template_assignment::Column::ResourceId.eq(resource_id.0 as i64))
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn delete_assignment(
        &self,
        resource_id: ResourceId,
        template_id: &TemplateId,
    ) -> Result<()> {
        entity::template_assignment::Entity::delete_many()
            .filter(entity::template_assignment::Column::ResourceId.eq(resource_id.0 as i64))
            .filter(entity::template_assignment::Column::TemplateId.eq(template_id.as_str()))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    async fn delete_assignments_for_template(&self, template_id: &TemplateId) -> Result<u64> {
        let result = entity::template_assignment::Entity::delete_many()
            .filter(entity::template_assignment::Column::TemplateId.eq(template_id.as_str()))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    // ip set operations

    async fn create_ip_set(&self, set: &IpSet) -> Result<IpSet> {
        let model: entity::ip_set::ActiveModel = set.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_ip_set(&self, id: &IpSetId) -> Result<Option<IpSet>> {
        let result = entity::ip_set::Entity::find_by_id(id.to_string())
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn get_ip_set_by_name(&self, org_id: &OrgId, name: &str) -> Result<Option<IpSet>> {
        let result = entity::ip_set::Entity::find()
            .filter(entity::ip_set::Column::OrgId.eq(org_id.as_str()))
            .filter(entity::ip_set::Column::Name.eq(name))
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_ip_sets(&self, org_id: &OrgId) -> Result<Vec<IpSet>> {
        let results = entity::ip_set::Entity::find()
            .filter(entity::ip_set::Column::OrgId.eq(org_id.as_str()))
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn update_ip_set(&self, set: &IpSet) -> Result<IpSet> {
        let mut model: entity::ip_set::ActiveModel = set.into();
        model.updated_at = Set(Utc::now());
        let result = model.update(&self.conn).await?;
        Ok(result.into())
    }

    async fn delete_ip_set(&self, id: &IpSetId) -> Result<()> {
        entity::ip_set::Entity::delete_many()
            .filter(entity::ip_set::Column::Id.eq(id.as_str()))
            .exec(&self.conn)
            .await?;
        Ok(())
    }
}
