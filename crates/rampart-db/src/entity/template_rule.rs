//! template rule entity for database storage.

use chrono::{DateTime, Utc};
use rampart_types::{RuleAction, RuleMatch, TemplateId, TemplateRule, TemplateRuleId};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};
use tracing::warn;

/// template rule database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "template_rules")]
pub struct Model {
    /// unique template rule id
    #[sea_orm(primary_key)]
    pub id: i64,
    /// owning template
    pub template_id: String,
    /// "ACCEPT" or "DROP"
    pub action: String,
    /// match kind, one of CIDR, IP, PATH
    pub match_kind: String,
    /// match value
    #[sea_orm(column_type = "Text")]
    pub value: String,
    /// ordering within the template, lower first
    pub priority: i64,
    /// disabled rules are copied as disabled
    pub enabled: bool,
    /// creation timestamp
    pub created_at: DateTime<Utc>,
    /// last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// template rule entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// the template this rule belongs to
    #[sea_orm(
        belongs_to = "super::rule_template::Entity",
        from = "Column::TemplateId",
        to = "super::rule_template::Column::Id"
    )]
    RuleTemplate,
}

impl Related<super::rule_template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RuleTemplate.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for TemplateRule {
    fn from(model: Model) -> Self {
        let action = match model.action.parse() {
            Ok(action) => action,
            Err(e) => {
                warn!(template_rule_id = model.id, error = %e, "unknown action in database, treating as DROP");
                RuleAction::Drop
            }
        };
        let match_kind = match model.match_kind.parse() {
            Ok(kind) => kind,
            Err(e) => {
                warn!(template_rule_id = model.id, error = %e, "unknown match kind in database, treating as IP");
                RuleMatch::Ip
            }
        };
        TemplateRule {
            id: TemplateRuleId(model.id as u64),
            template_id: TemplateId(model.template_id),
            action,
            match_kind,
            value: model.value,
            priority: model.priority,
            enabled: model.enabled,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&TemplateRule> for ActiveModel {
    fn from(rule: &TemplateRule) -> Self {
        Self {
            id: if rule.id.0 == 0 {
                NotSet
            } else {
                Set(rule.id.0 as i64)
            },
            template_id: Set(rule.template_id.to_string()),
            action: Set(rule.action.as_str().to_string()),
            match_kind: Set(rule.match_kind.as_str().to_string()),
            value: Set(rule.value.clone()),
            priority: Set(rule.priority),
            enabled: Set(rule.enabled),
            created_at: Set(rule.created_at),
            updated_at: Set(rule.updated_at),
        }
    }
}
