//! the rule authoring engine.

use std::sync::Arc;

use rampart_db::Database;
use rampart_types::{OrgId, Resource, ResourceId, RuleMatch, RuleTemplate, TemplateId};
use tokio::sync::Mutex;

use crate::error::{Error, Result};

/// rule authoring engine over a storage backend.
///
/// wraps the database handle and a priority allocation lock in arc for
/// cheap cloning and concurrent access. all methods take &self, making
/// it safe for use in async handlers. priority allocation reads the
/// current maximum and then inserts, so every allocating operation
/// serialises through the shared lock.
#[derive(Clone)]
pub struct RuleEngine<D> {
    pub(crate) db: D,
    pub(crate) alloc_lock: Arc<Mutex<()>>,
}

impl<D: Database> RuleEngine<D> {
    /// create a new engine over the given storage backend.
    pub fn new(db: D) -> Self {
        Self {
            db,
            alloc_lock: Arc::new(Mutex::new(())),
        }
    }

    /// the underlying storage handle.
    pub fn db(&self) -> &D {
        &self.db
    }

    /// fetch a resource, failing with not-found when it does not exist.
    pub(crate) async fn require_resource(&self, resource_id: ResourceId) -> Result<Resource> {
        self.db
            .get_resource(resource_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("resource {resource_id} not found")))
    }

    /// fetch a template and verify it belongs to the given organisation.
    pub(crate) async fn require_template(
        &self,
        org_id: &OrgId,
        template_id: &TemplateId,
    ) -> Result<RuleTemplate> {
        let template = self
            .db
            .get_template(template_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("template '{template_id}' not found")))?;
        if template.org_id != *org_id {
            return Err(Error::Forbidden(format!(
                "template '{template_id}' belongs to a different organisation"
            )));
        }
        Ok(template)
    }
}

/// request-level match kinds need a resource that terminates http.
pub(crate) fn check_capability(resource: &Resource, match_kind: RuleMatch) -> Result<()> {
    match match_kind {
        RuleMatch::Path | RuleMatch::IpSet if !resource.http_capable => {
            Err(Error::InvalidRule(format!(
                "{match_kind} rules require an http-capable resource"
            )))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use rampart_types::Resource;

    use super::*;

    fn resource(http_capable: bool) -> Resource {
        Resource::new(
            ResourceId(1),
            OrgId::from("acme"),
            "web".to_string(),
            http_capable,
        )
    }

    #[test]
    fn test_capability_gate() {
        let tcp = resource(false);
        assert!(check_capability(&tcp, RuleMatch::Cidr).is_ok());
        assert!(check_capability(&tcp, RuleMatch::Ip).is_ok());
        assert!(check_capability(&tcp, RuleMatch::Path).is_err());
        assert!(check_capability(&tcp, RuleMatch::IpSet).is_err());

        let http = resource(true);
        assert!(check_capability(&http, RuleMatch::Path).is_ok());
        assert!(check_capability(&http, RuleMatch::IpSet).is_ok());
    }
}
