//! resource types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{OrgId, ResourceId};

/// a network-exposed endpoint that rules are attached to.
///
/// resources are registered by the provisioning layer; rampart only
/// needs to know who owns them and whether they terminate http, since
/// request-level match kinds are meaningless on raw tcp/udp endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// unique resource id.
    pub id: ResourceId,
    /// the organisation that owns this resource.
    pub org_id: OrgId,
    /// human-readable name.
    pub name: String,
    /// whether the resource terminates http and can evaluate
    /// request-level rules.
    pub http_capable: bool,
    /// when the resource was registered.
    pub created_at: DateTime<Utc>,
    /// when the resource was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Resource {
    /// create a new resource with the given owner and name.
    pub fn new(id: ResourceId, org_id: OrgId, name: String, http_capable: bool) -> Self {
        let now = Utc::now();
        Self {
            id,
            org_id,
            name,
            http_capable,
            created_at: now,
            updated_at: now,
        }
    }
}
