//! template assignment entity for database storage.

use chrono::{DateTime, Utc};
use rampart_types::{ResourceId, TemplateAssignment, TemplateId};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};

/// template assignment database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "template_assignments")]
pub struct Model {
    /// unique assignment id
    #[sea_orm(primary_key)]
    pub id: i64,
    /// the assigned resource
    pub resource_id: i64,
    /// the assigned template
    pub template_id: String,
    /// when the assignment was made
    pub created_at: DateTime<Utc>,
}

/// template assignment entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// the resource side of the assignment
    #[sea_orm(
        belongs_to = "super::resource::Entity",
        from = "Column::ResourceId",
        to = "super::resource::Column::Id"
    )]
    Resource,
    /// the template side of the assignment
    #[sea_orm(
        belongs_to = "super::rule_template::Entity",
        from = "Column::TemplateId",
        to = "super::rule_template::Column::Id"
    )]
    RuleTemplate,
}

impl Related<super::resource::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Resource.def()
    }
}

impl Related<super::rule_template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RuleTemplate.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for TemplateAssignment {
    fn from(model: Model) -> Self {
        TemplateAssignment {
            id: model.id as u64,
            resource_id: ResourceId(model.resource_id as u64),
            template_id: TemplateId(model.template_id),
            created_at: model.created_at,
        }
    }
}

impl From<&TemplateAssignment> for ActiveModel {
    fn from(assignment: &TemplateAssignment) -> Self {
        Self {
            id: if assignment.id == 0 {
                NotSet
            } else {
                Set(assignment.id as i64)
            },
            resource_id: Set(assignment.resource_id.0 as i64),
            template_id: Set(assignment.template_id.to_string()),
            created_at: Set(assignment.created_at),
        }
    }
}
