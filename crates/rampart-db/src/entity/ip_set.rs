//! ip set entity for database storage.

use chrono::{DateTime, Utc};
use rampart_types::{IpSet, IpSetId, OrgId};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use tracing::warn;

/// ip set database model.
///
/// addresses are stored as a JSON array in a text column.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ip_sets")]
pub struct Model {
    /// opaque ip set id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// owning organisation
    pub org_id: String,
    /// set name, unique per organisation
    pub name: String,
    /// optional description
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// JSON array of addresses and cidr networks
    #[sea_orm(column_type = "Text")]
    pub addresses: String,
    /// creation timestamp
    pub created_at: DateTime<Utc>,
    /// last modification timestamp
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for IpSet {
    fn from(model: Model) -> Self {
        let addresses: Vec<String> = match serde_json::from_str(&model.addresses) {
            Ok(addresses) => addresses,
            Err(e) => {
                warn!(ip_set_id = %model.id, error = %e, "failed to parse addresses JSON, using empty list");
                Vec::new()
            }
        };
        IpSet {
            id: IpSetId(model.id),
            org_id: OrgId(model.org_id),
            name: model.name,
            description: model.description,
            addresses,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&IpSet> for ActiveModel {
    fn from(set: &IpSet) -> Self {
        let addresses_json =
            serde_json::to_string(&set.addresses).unwrap_or_else(|_| "[]".to_string());
        Self {
            id: Set(set.id.to_string()),
            org_id: Set(set.org_id.to_string()),
            name: Set(set.name.clone()),
            description: Set(set.description.clone()),
            addresses: Set(addresses_json),
            created_at: Set(set.created_at),
            updated_at: Set(set.updated_at),
        }
    }
}
