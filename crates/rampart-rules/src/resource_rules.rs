//! authoring operations for rules attached directly to resources.

use chrono::Utc;
use rampart_db::Database;
use rampart_types::{IpSetId, ResourceId, ResourceRule, RuleAction, RuleId, RuleMatchInput};
use tracing::info;

use crate::engine::{RuleEngine, check_capability};
use crate::error::{Error, Result};
use crate::priority::next_priority;

/// a caller-submitted rule, before canonicalisation.
#[derive(Debug, Clone)]
pub struct RuleSpec {
    /// accept or drop.
    pub action: RuleAction,
    /// the submitted match kind, possibly the `IP_CIDR` pseudo-kind.
    pub match_kind: RuleMatchInput,
    /// the submitted match value.
    pub value: String,
    /// the referenced set, required for `IP_SET` and ignored otherwise.
    pub ip_set_id: Option<IpSetId>,
    /// explicit priority; appended after existing rules when absent.
    pub priority: Option<i64>,
    /// whether the rule is evaluated; defaults to enabled.
    pub enabled: Option<bool>,
}

/// a partial rule update; absent fields keep their stored values.
#[derive(Debug, Clone, Default)]
pub struct RuleUpdate {
    /// new action.
    pub action: Option<RuleAction>,
    /// new match kind, possibly `IP_CIDR`.
    pub match_kind: Option<RuleMatchInput>,
    /// new match value.
    pub value: Option<String>,
    /// new ip set reference.
    pub ip_set_id: Option<IpSetId>,
    /// new priority, taken verbatim.
    pub priority: Option<i64>,
    /// new enabled flag.
    pub enabled: Option<bool>,
}

impl RuleUpdate {
    /// true when no field is set.
    pub fn is_empty(&self) -> bool {
        self.action.is_none()
            && self.match_kind.is_none()
            && self.value.is_none()
            && self.ip_set_id.is_none()
            && self.priority.is_none()
            && self.enabled.is_none()
    }

    /// true when the update touches the match tuple and the rule must
    /// be re-normalised.
    fn touches_match(&self) -> bool {
        self.match_kind.is_some() || self.value.is_some() || self.ip_set_id.is_some()
    }
}

impl<D: Database> RuleEngine<D> {
    /// create a rule on a resource.
    ///
    /// the rule is canonicalised first; without an explicit priority it
    /// is appended after the resource's existing rules.
    pub async fn create_resource_rule(
        &self,
        resource_id: ResourceId,
        spec: RuleSpec,
    ) -> Result<ResourceRule> {
        let resource = self.require_resource(resource_id).await?;
        let normalized = self
            .normalize(
                &resource.org_id,
                spec.action,
                spec.match_kind,
                &spec.value,
                spec.ip_set_id.as_ref(),
            )
            .await?;
        check_capability(&resource, normalized.match_kind)?;

        let _alloc = self.alloc_lock.lock().await;
        let priority = match spec.priority {
            Some(priority) => priority,
            None => next_priority(self.db.max_resource_rule_priority(resource_id).await?),
        };
        let now = Utc::now();
        let rule = ResourceRule {
            id: RuleId(0),
            resource_id,
            action: normalized.action,
            match_kind: normalized.match_kind,
            value: normalized.value,
            priority,
            enabled: spec.enabled.unwrap_or(true),
            ip_set_id: normalized.ip_set_id,
            template_rule_id: None,
            created_at: now,
            updated_at: now,
        };
        let created = self.db.create_resource_rule(&rule).await?;
        info!(
            rule_id = created.id.0,
            resource_id = resource_id.0,
            match_kind = %created.match_kind,
            priority = created.priority,
            "resource rule created"
        );
        Ok(created)
    }

    /// list a resource's rules in evaluation order.
    pub async fn list_resource_rules(&self, resource_id: ResourceId) -> Result<Vec<ResourceRule>> {
        self.require_resource(resource_id).await?;
        Ok(self.db.list_resource_rules(resource_id).await?)
    }

    /// apply a partial update to a rule.
    ///
    /// when any of the match tuple changes, the effective tuple (new
    /// fields over stored ones) is re-normalised and re-validated as a
    /// whole.
    pub async fn update_resource_rule(
        &self,
        resource_id: ResourceId,
        rule_id: RuleId,
        update: RuleUpdate,
    ) -> Result<ResourceRule> {
        if update.is_empty() {
            return Err(Error::InvalidRule(
                "update must change at least one field".to_string(),
            ));
        }
        let resource = self.require_resource(resource_id).await?;
        let mut rule = self
            .db
            .get_resource_rule(rule_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("rule {rule_id} not found")))?;
        if rule.resource_id != resource_id {
            return Err(Error::Forbidden(format!(
                "rule {rule_id} belongs to a different resource"
            )));
        }

        if let Some(action) = update.action {
            rule.action = action;
        }
        if update.touches_match() {
            let match_input = update.match_kind.unwrap_or_else(|| rule.match_kind.into());
            let value = update.value.unwrap_or_else(|| rule.value.clone());
            let ip_set_id = update.ip_set_id.or_else(|| rule.ip_set_id.clone());
            let normalized = self
                .normalize(
                    &resource.org_id,
                    rule.action,
                    match_input,
                    &value,
                    ip_set_id.as_ref(),
                )
                .await?;
            check_capability(&resource, normalized.match_kind)?;
            rule.match_kind = normalized.match_kind;
            rule.value = normalized.value;
            rule.ip_set_id = normalized.ip_set_id;
        }
        if let Some(priority) = update.priority {
            rule.priority = priority;
        }
        if let Some(enabled) = update.enabled {
            rule.enabled = enabled;
        }

        let updated = self.db.update_resource_rule(&rule).await?;
        info!(rule_id = rule_id.0, resource_id = resource_id.0, "resource rule updated");
        Ok(updated)
    }

    /// delete a rule from a resource.
    ///
    /// deleting a template-linked copy only affects this resource; the
    /// template keeps the rule and other assignments keep their copies.
    pub async fn delete_resource_rule(
        &self,
        resource_id: ResourceId,
        rule_id: RuleId,
    ) -> Result<()> {
        self.require_resource(resource_id).await?;
        let rule = self
            .db
            .get_resource_rule(rule_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("rule {rule_id} not found")))?;
        if rule.resource_id != resource_id {
            return Err(Error::Forbidden(format!(
                "rule {rule_id} belongs to a different resource"
            )));
        }
        self.db.delete_resource_rule(rule_id).await?;
        match rule.template_rule_id {
            Some(template_rule_id) => info!(
                rule_id = rule_id.0,
                resource_id = resource_id.0,
                template_rule_id = template_rule_id.0,
                "template rule copy removed from resource, template unchanged"
            ),
            None => info!(
                rule_id = rule_id.0,
                resource_id = resource_id.0,
                "resource rule deleted"
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rampart_db::RampartDb;
    use rampart_types::{IpSet, OrgId, Resource, RuleMatch};

    use super::*;

    async fn setup() -> (RuleEngine<RampartDb>, Resource) {
        let db = RampartDb::new_in_memory().await.unwrap();
        let resource = db
            .create_resource(&Resource::new(
                ResourceId(0),
                OrgId::from("acme"),
                "web".to_string(),
                true,
            ))
            .await
            .unwrap();
        (RuleEngine::new(db), resource)
    }

    fn cidr_spec(value: &str) -> RuleSpec {
        RuleSpec {
            action: RuleAction::Accept,
            match_kind: RuleMatchInput::Cidr,
            value: value.to_string(),
            ip_set_id: None,
            priority: None,
            enabled: None,
        }
    }

    #[tokio::test]
    async fn test_create_allocates_sequential_priorities() {
        let (engine, resource) = setup().await;

        let first = engine
            .create_resource_rule(resource.id, cidr_spec("10.0.0.0/8"))
            .await
            .unwrap();
        let second = engine
            .create_resource_rule(resource.id, cidr_spec("192.168.0.0/16"))
            .await
            .unwrap();

        assert_eq!(first.priority, 1);
        assert_eq!(second.priority, 2);
        assert!(first.enabled);
    }

    #[tokio::test]
    async fn test_create_honours_explicit_priority() {
        let (engine, resource) = setup().await;

        let mut spec = cidr_spec("10.0.0.0/8");
        spec.priority = Some(50);
        let rule = engine.create_resource_rule(resource.id, spec).await.unwrap();
        assert_eq!(rule.priority, 50);

        // an explicit duplicate is stored as-is
        let mut spec = cidr_spec("192.168.0.0/16");
        spec.priority = Some(50);
        let duplicate = engine.create_resource_rule(resource.id, spec).await.unwrap();
        assert_eq!(duplicate.priority, 50);

        // automatic allocation continues after the explicit maximum
        let next = engine
            .create_resource_rule(resource.id, cidr_spec("172.16.0.0/12"))
            .await
            .unwrap();
        assert_eq!(next.priority, 51);
    }

    #[tokio::test]
    async fn test_create_normalizes_ip_cidr_input() {
        let (engine, resource) = setup().await;

        let mut spec = cidr_spec("10.1.2.3");
        spec.match_kind = RuleMatchInput::IpCidr;
        let rule = engine.create_resource_rule(resource.id, spec).await.unwrap();
        assert_eq!(rule.match_kind, RuleMatch::Cidr);
        assert_eq!(rule.value, "10.1.2.3/32");

        // the lenient fallback stores garbage as an IP rule
        let mut spec = cidr_spec("not-an-address");
        spec.match_kind = RuleMatchInput::IpCidr;
        let rule = engine.create_resource_rule(resource.id, spec).await.unwrap();
        assert_eq!(rule.match_kind, RuleMatch::Ip);
        assert_eq!(rule.value, "not-an-address");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_strict_values() {
        let (engine, resource) = setup().await;

        let result = engine
            .create_resource_rule(resource.id, cidr_spec("not-cidr"))
            .await;
        assert!(matches!(result, Err(Error::InvalidRule(_))));

        let mut spec = cidr_spec("10.0.0.0/8");
        spec.match_kind = RuleMatchInput::Ip;
        let result = engine.create_resource_rule(resource.id, spec).await;
        assert!(matches!(result, Err(Error::InvalidRule(_))));
    }

    #[tokio::test]
    async fn test_path_rule_requires_http_capability() {
        let (engine, _) = setup().await;
        let tcp = engine
            .db()
            .create_resource(&Resource::new(
                ResourceId(0),
                OrgId::from("acme"),
                "db".to_string(),
                false,
            ))
            .await
            .unwrap();

        let mut spec = cidr_spec("/admin/*");
        spec.match_kind = RuleMatchInput::Path;
        let result = engine.create_resource_rule(tcp.id, spec.clone()).await;
        assert!(matches!(result, Err(Error::InvalidRule(_))));

        // same spec is accepted on an http-capable resource
        let (engine, http) = setup().await;
        let rule = engine.create_resource_rule(http.id, spec).await.unwrap();
        assert_eq!(rule.match_kind, RuleMatch::Path);
    }

    #[tokio::test]
    async fn test_create_on_missing_resource() {
        let (engine, _) = setup().await;
        let result = engine
            .create_resource_rule(ResourceId(9999), cidr_spec("10.0.0.0/8"))
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_requires_a_field() {
        let (engine, resource) = setup().await;
        let rule = engine
            .create_resource_rule(resource.id, cidr_spec("10.0.0.0/8"))
            .await
            .unwrap();

        let result = engine
            .update_resource_rule(resource.id, rule.id, RuleUpdate::default())
            .await;
        assert!(matches!(result, Err(Error::InvalidRule(_))));
    }

    #[tokio::test]
    async fn test_update_renormalizes_with_stored_fields() {
        let (engine, resource) = setup().await;
        let rule = engine
            .create_resource_rule(resource.id, cidr_spec("10.0.0.0/8"))
            .await
            .unwrap();

        // changing only the value keeps the stored CIDR kind, so the
        // new value must be valid cidr
        let update = RuleUpdate {
            value: Some("bogus".to_string()),
            ..Default::default()
        };
        let result = engine.update_resource_rule(resource.id, rule.id, update).await;
        assert!(matches!(result, Err(Error::InvalidRule(_))));

        let update = RuleUpdate {
            value: Some("172.16.0.0/12".to_string()),
            ..Default::default()
        };
        let updated = engine
            .update_resource_rule(resource.id, rule.id, update)
            .await
            .unwrap();
        assert_eq!(updated.value, "172.16.0.0/12");
        assert_eq!(updated.match_kind, RuleMatch::Cidr);
    }

    #[tokio::test]
    async fn test_update_kind_reuses_stored_value() {
        let (engine, resource) = setup().await;
        let rule = engine
            .create_resource_rule(resource.id, cidr_spec("10.0.0.0/8"))
            .await
            .unwrap();

        // IP_CIDR over the stored "10.0.0.0/8" infers CIDR again
        let update = RuleUpdate {
            match_kind: Some(RuleMatchInput::IpCidr),
            ..Default::default()
        };
        let updated = engine
            .update_resource_rule(resource.id, rule.id, update)
            .await
            .unwrap();
        assert_eq!(updated.match_kind, RuleMatch::Cidr);
        assert_eq!(updated.value, "10.0.0.0/8");
    }

    #[tokio::test]
    async fn test_update_enabled_and_priority_only() {
        let (engine, resource) = setup().await;
        let rule = engine
            .create_resource_rule(resource.id, cidr_spec("10.0.0.0/8"))
            .await
            .unwrap();

        let update = RuleUpdate {
            priority: Some(40),
            enabled: Some(false),
            ..Default::default()
        };
        let updated = engine
            .update_resource_rule(resource.id, rule.id, update)
            .await
            .unwrap();
        assert_eq!(updated.priority, 40);
        assert!(!updated.enabled);
        // the match tuple is untouched
        assert_eq!(updated.value, "10.0.0.0/8");
    }

    #[tokio::test]
    async fn test_update_switch_to_ip_set_and_back() {
        let (engine, resource) = setup().await;
        let set = engine
            .db()
            .create_ip_set(&IpSet::new(
                IpSetId::from("ips-internal"),
                OrgId::from("acme"),
                "internal".to_string(),
                None,
                vec!["10.0.0.0/8".to_string()],
            ))
            .await
            .unwrap();
        let rule = engine
            .create_resource_rule(resource.id, cidr_spec("10.0.0.0/8"))
            .await
            .unwrap();

        let update = RuleUpdate {
            match_kind: Some(RuleMatchInput::IpSet),
            ip_set_id: Some(set.id.clone()),
            ..Default::default()
        };
        let updated = engine
            .update_resource_rule(resource.id, rule.id, update)
            .await
            .unwrap();
        assert_eq!(updated.match_kind, RuleMatch::IpSet);
        assert_eq!(updated.value, set.id.to_string());
        assert_eq!(updated.ip_set_id, Some(set.id));

        // switching away discards the reference
        let update = RuleUpdate {
            match_kind: Some(RuleMatchInput::Cidr),
            value: Some("10.0.0.0/8".to_string()),
            ..Default::default()
        };
        let updated = engine
            .update_resource_rule(resource.id, rule.id, update)
            .await
            .unwrap();
        assert_eq!(updated.ip_set_id, None);
    }

    #[tokio::test]
    async fn test_update_foreign_rule_is_forbidden() {
        let (engine, resource) = setup().await;
        let other = engine
            .db()
            .create_resource(&Resource::new(
                ResourceId(0),
                OrgId::from("acme"),
                "api".to_string(),
                true,
            ))
            .await
            .unwrap();
        let rule = engine
            .create_resource_rule(other.id, cidr_spec("10.0.0.0/8"))
            .await
            .unwrap();

        let update = RuleUpdate {
            enabled: Some(false),
            ..Default::default()
        };
        let result = engine.update_resource_rule(resource.id, rule.id, update).await;
        assert!(matches!(result, Err(Error::Forbidden(_))));

        let result = engine.delete_resource_rule(resource.id, rule.id).await;
        assert!(matches!(result, Err(Error::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_rule() {
        let (engine, resource) = setup().await;
        let rule = engine
            .create_resource_rule(resource.id, cidr_spec("10.0.0.0/8"))
            .await
            .unwrap();

        engine.delete_resource_rule(resource.id, rule.id).await.unwrap();
        assert!(engine.list_resource_rules(resource.id).await.unwrap().is_empty());

        let result = engine.delete_resource_rule(resource.id, rule.id).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
