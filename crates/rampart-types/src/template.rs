//! rule template types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{OrgId, ResourceId, TemplateId};

/// a named collection of rules that can be assigned to resources.
///
/// assigning a template copies its rules onto the resource; later
/// changes to the template are propagated to every assigned resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTemplate {
    /// unique template id, opaque to the server.
    pub id: TemplateId,
    /// the organisation that owns this template.
    pub org_id: OrgId,
    /// template name, unique within the organisation.
    pub name: String,
    /// optional free-form description.
    pub description: Option<String>,
    /// when the template was created.
    pub created_at: DateTime<Utc>,
    /// when the template was last modified.
    pub updated_at: DateTime<Utc>,
}

impl RuleTemplate {
    /// create a new template owned by the given organisation.
    pub fn new(id: TemplateId, org_id: OrgId, name: String, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            org_id,
            name,
            description,
            created_at: now,
            updated_at: now,
        }
    }
}

/// a link between a template and a resource it is applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateAssignment {
    /// unique assignment id.
    pub id: u64,
    /// the resource the template is assigned to.
    pub resource_id: ResourceId,
    /// the assigned template.
    pub template_id: TemplateId,
    /// when the assignment was made.
    pub created_at: DateTime<Utc>,
}

impl TemplateAssignment {
    /// create a new assignment linking a template to a resource.
    pub fn new(resource_id: ResourceId, template_id: TemplateId) -> Self {
        Self {
            id: 0,
            resource_id,
            template_id,
            created_at: Utc::now(),
        }
    }
}
