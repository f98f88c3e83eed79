//! rule template entity for database storage.

use chrono::{DateTime, Utc};
use rampart_types::{OrgId, RuleTemplate, TemplateId};
use sea_orm::entity::prelude::*;
use sea_orm::Set;

/// rule template database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "rule_templates")]
pub struct Model {
    /// opaque template id, caller-supplied or generated
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// owning organisation
    pub org_id: String,
    /// template name, unique per organisation
    pub name: String,
    /// optional description
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// creation timestamp
    pub created_at: DateTime<Utc>,
    /// last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// rule template entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// rules belonging to this template
    #[sea_orm(has_many = "super::template_rule::Entity")]
    TemplateRules,
    /// resources this template is assigned to
    #[sea_orm(has_many = "super::template_assignment::Entity")]
    TemplateAssignments,
}

impl Related<super::template_rule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TemplateRules.def()
    }
}

impl Related<super::template_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TemplateAssignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for RuleTemplate {
    fn from(model: Model) -> Self {
        RuleTemplate {
            id: TemplateId(model.id),
            org_id: OrgId(model.org_id),
            name: model.name,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&RuleTemplate> for ActiveModel {
    fn from(template: &RuleTemplate) -> Self {
        Self {
            id: Set(template.id.to_string()),
            org_id: Set(template.org_id.to_string()),
            name: Set(template.name.clone()),
            description: Set(template.description.clone()),
            created_at: Set(template.created_at),
            updated_at: Set(template.updated_at),
        }
    }
}
