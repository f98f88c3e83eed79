//! resource entity for database storage.

use chrono::{DateTime, Utc};
use rampart_types::{OrgId, Resource, ResourceId};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};

/// resource database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "resources")]
pub struct Model {
    /// unique resource id
    #[sea_orm(primary_key)]
    pub id: i64,
    /// owning organisation
    pub org_id: String,
    /// human-readable name
    pub name: String,
    /// whether the resource terminates http
    pub http_capable: bool,
    /// creation timestamp
    pub created_at: DateTime<Utc>,
    /// last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// resource entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// rules attached to this resource
    #[sea_orm(has_many = "super::resource_rule::Entity")]
    ResourceRules,
    /// templates assigned to this resource
    #[sea_orm(has_many = "super::template_assignment::Entity")]
    TemplateAssignments,
}

impl Related<super::resource_rule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ResourceRules.def()
    }
}

impl Related<super::template_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TemplateAssignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Resource {
    fn from(model: Model) -> Self {
        Resource {
            id: ResourceId(model.id as u64),
            org_id: OrgId(model.org_id),
            name: model.name,
            http_capable: model.http_capable,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&Resource> for ActiveModel {
    fn from(resource: &Resource) -> Self {
        Self {
            id: if resource.id.0 == 0 {
                NotSet
            } else {
                Set(resource.id.0 as i64)
            },
            org_id: Set(resource.org_id.to_string()),
            name: Set(resource.name.clone()),
            http_capable: Set(resource.http_capable),
            created_at: Set(resource.created_at),
            updated_at: Set(resource.updated_at),
        }
    }
}
