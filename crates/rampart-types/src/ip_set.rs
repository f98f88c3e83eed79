//! ip set types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{IpSetId, OrgId};

/// a named collection of addresses and networks.
///
/// `IP_SET` rules reference a set by id, so the membership can be
/// edited without touching the rules that use it. membership is only
/// consulted by the data plane at request time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpSet {
    /// unique ip set id.
    pub id: IpSetId,
    /// the organisation that owns this set.
    pub org_id: OrgId,
    /// set name, unique within the organisation.
    pub name: String,
    /// optional free-form description.
    pub description: Option<String>,
    /// member addresses and cidr networks.
    pub addresses: Vec<String>,
    /// when the set was created.
    pub created_at: DateTime<Utc>,
    /// when the set was last modified.
    pub updated_at: DateTime<Utc>,
}

impl IpSet {
    /// create a new ip set owned by the given organisation.
    pub fn new(
        id: IpSetId,
        org_id: OrgId,
        name: String,
        description: Option<String>,
        addresses: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            org_id,
            name,
            description,
            addresses,
            created_at: now,
            updated_at: now,
        }
    }
}
