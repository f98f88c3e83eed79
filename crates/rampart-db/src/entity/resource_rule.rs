//! resource rule entity for database storage.

use chrono::{DateTime, Utc};
use rampart_types::{
    IpSetId, ResourceId, ResourceRule, RuleAction, RuleId, RuleMatch, TemplateRuleId,
};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};
use tracing::warn;

/// resource rule database model.
///
/// action and match kind are stored as their wire strings so the rows
/// stay readable in ad-hoc queries.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "resource_rules")]
pub struct Model {
    /// unique rule id
    #[sea_orm(primary_key)]
    pub id: i64,
    /// owning resource
    pub resource_id: i64,
    /// "ACCEPT" or "DROP"
    pub action: String,
    /// canonical match kind
    pub match_kind: String,
    /// canonical match value
    #[sea_orm(column_type = "Text")]
    pub value: String,
    /// evaluation order, lower first
    pub priority: i64,
    /// disabled rules are kept but not evaluated
    pub enabled: bool,
    /// referenced ip set for IP_SET rules
    pub ip_set_id: Option<String>,
    /// source template rule for template copies, no foreign key so
    /// copies survive template cleanup in any order
    pub template_rule_id: Option<i64>,
    /// creation timestamp
    pub created_at: DateTime<Utc>,
    /// last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// resource rule entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// the resource this rule belongs to
    #[sea_orm(
        belongs_to = "super::resource::Entity",
        from = "Column::ResourceId",
        to = "super::resource::Column::Id"
    )]
    Resource,
}

impl Related<super::resource::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Resource.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ResourceRule {
    fn from(model: Model) -> Self {
        let action = match model.action.parse() {
            Ok(action) => action,
            Err(e) => {
                warn!(rule_id = model.id, error = %e, "unknown action in database, treating as DROP");
                RuleAction::Drop
            }
        };
        let match_kind = match model.match_kind.parse() {
            Ok(kind) => kind,
            Err(e) => {
                warn!(rule_id = model.id, error = %e, "unknown match kind in database, treating as IP");
                RuleMatch::Ip
            }
        };
        ResourceRule {
            id: RuleId(model.id as u64),
            resource_id: ResourceId(model.resource_id as u64),
            action,
            match_kind,
            value: model.value,
            priority: model.priority,
            enabled: model.enabled,
            ip_set_id: model.ip_set_id.map(IpSetId),
            template_rule_id: model.template_rule_id.map(|id| TemplateRuleId(id as u64)),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&ResourceRule> for ActiveModel {
    fn from(rule: &ResourceRule) -> Self {
        Self {
            id: if rule.id.0 == 0 {
                NotSet
            } else {
                Set(rule.id.0 as i64)
            },
            resource_id: Set(rule.resource_id.0 as i64),
            action: Set(rule.action.as_str().to_string()),
            match_kind: Set(rule.match_kind.as_str().to_string()),
            value: Set(rule.value.clone()),
            priority: Set(rule.priority),
            enabled: Set(rule.enabled),
            ip_set_id: Set(rule.ip_set_id.as_ref().map(|id| id.to_string())),
            template_rule_id: Set(rule.template_rule_id.map(|id| id.0 as i64)),
            created_at: Set(rule.created_at),
            updated_at: Set(rule.updated_at),
        }
    }
}
