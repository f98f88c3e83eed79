//! named ip set management.
//!
//! an ip set is an org-scoped list of addresses and networks that
//! `IP_SET` rules reference by id. sets stay editable while referenced;
//! deletion is blocked until no rule points at them.

use ipnet::IpNet;
use rampart_db::Database;
use rampart_types::{IpSet, IpSetId, Name, OrgId};
use std::net::IpAddr;
use tracing::info;

use crate::engine::RuleEngine;
use crate::error::{Error, Result};

/// fields for creating an ip set.
#[derive(Debug, Clone)]
pub struct IpSetSpec {
    /// set name, unique within the organisation.
    pub name: Name,
    /// optional free-form description.
    pub description: Option<String>,
    /// addresses and networks in the set.
    pub addresses: Vec<String>,
}

/// a partial ip set update; absent fields keep their stored values.
#[derive(Debug, Clone, Default)]
pub struct IpSetUpdate {
    /// new name.
    pub name: Option<Name>,
    /// new description.
    pub description: Option<String>,
    /// replacement address list.
    pub addresses: Option<Vec<String>>,
}

impl IpSetUpdate {
    /// true when no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.addresses.is_none()
    }
}

/// every entry must be a plain address or a network in cidr notation.
fn validate_addresses(addresses: &[String]) -> Result<()> {
    for address in addresses {
        if address.parse::<IpAddr>().is_err() && address.parse::<IpNet>().is_err() {
            return Err(Error::InvalidRule(format!(
                "'{address}' is not an ip address or cidr network"
            )));
        }
    }
    Ok(())
}

impl<D: Database> RuleEngine<D> {
    /// create an ip set.
    pub async fn create_ip_set(&self, org_id: &OrgId, spec: IpSetSpec) -> Result<IpSet> {
        validate_addresses(&spec.addresses)?;
        let name = spec.name.into_inner();
        if self.db.get_ip_set_by_name(org_id, &name).await?.is_some() {
            return Err(Error::Conflict(format!(
                "ip set '{name}' already exists in organisation '{org_id}'"
            )));
        }
        let set = IpSet::new(
            IpSetId::generate(),
            org_id.clone(),
            name,
            spec.description,
            spec.addresses,
        );
        let created = self.db.create_ip_set(&set).await?;
        info!(
            ip_set_id = %created.id,
            org_id = %org_id,
            name = %created.name,
            "ip set created"
        );
        Ok(created)
    }

    /// get an ip set by id.
    pub async fn get_ip_set(&self, org_id: &OrgId, id: &IpSetId) -> Result<IpSet> {
        self.require_ip_set(org_id, id).await
    }

    /// list an organisation's ip sets.
    pub async fn list_ip_sets(&self, org_id: &OrgId) -> Result<Vec<IpSet>> {
        Ok(self.db.list_ip_sets(org_id).await?)
    }

    /// apply a partial update to an ip set.
    ///
    /// the address list is replaced wholesale; rules referencing the set
    /// pick the change up on their next evaluation.
    pub async fn update_ip_set(
        &self,
        org_id: &OrgId,
        id: &IpSetId,
        update: IpSetUpdate,
    ) -> Result<IpSet> {
        if update.is_empty() {
            return Err(Error::InvalidRule(
                "update must change at least one field".to_string(),
            ));
        }
        let mut set = self.require_ip_set(org_id, id).await?;
        if let Some(name) = update.name {
            let name = name.into_inner();
            if let Some(existing) = self.db.get_ip_set_by_name(org_id, &name).await?
                && existing.id != set.id
            {
                return Err(Error::Conflict(format!(
                    "ip set '{name}' already exists in organisation '{org_id}'"
                )));
            }
            set.name = name;
        }
        if let Some(description) = update.description {
            set.description = Some(description);
        }
        if let Some(addresses) = update.addresses {
            validate_addresses(&addresses)?;
            set.addresses = addresses;
        }
        let updated = self.db.update_ip_set(&set).await?;
        info!(ip_set_id = %id, "ip set updated");
        Ok(updated)
    }

    /// delete an ip set that no rule references.
    pub async fn delete_ip_set(&self, org_id: &OrgId, id: &IpSetId) -> Result<()> {
        let set = self.require_ip_set(org_id, id).await?;
        let references = self.db.count_resource_rules_for_ip_set(&set.id).await?;
        if references > 0 {
            return Err(Error::Conflict(format!(
                "ip set '{id}' is still referenced by {references} rules"
            )));
        }
        self.db.delete_ip_set(&set.id).await?;
        info!(ip_set_id = %id, org_id = %org_id, "ip set deleted");
        Ok(())
    }

    async fn require_ip_set(&self, org_id: &OrgId, id: &IpSetId) -> Result<IpSet> {
        let set = self
            .db
            .get_ip_set(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("ip set '{id}' not found")))?;
        if set.org_id != *org_id {
            return Err(Error::Forbidden(format!(
                "ip set '{id}' belongs to a different organisation"
            )));
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use rampart_db::RampartDb;
    use rampart_types::{Resource, ResourceId, RuleAction, RuleMatchInput};

    use super::*;
    use crate::resource_rules::RuleSpec;

    async fn engine() -> RuleEngine<RampartDb> {
        RuleEngine::new(RampartDb::new_in_memory().await.unwrap())
    }

    fn spec(name: &str, addresses: &[&str]) -> IpSetSpec {
        IpSetSpec {
            name: Name::new(name).unwrap(),
            description: None,
            addresses: addresses.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_create_validates_addresses() {
        let engine = engine().await;
        let org = OrgId::from("acme");

        let result = engine
            .create_ip_set(&org, spec("internal", &["10.0.0.1", "not-an-address"]))
            .await;
        assert!(matches!(result, Err(Error::InvalidRule(_))));

        let set = engine
            .create_ip_set(&org, spec("internal", &["10.0.0.1", "10.0.0.0/8", "fd00::/8"]))
            .await
            .unwrap();
        assert!(set.id.as_str().starts_with("ips-"));
        assert_eq!(set.addresses.len(), 3);
    }

    #[tokio::test]
    async fn test_name_unique_per_org() {
        let engine = engine().await;

        engine
            .create_ip_set(&OrgId::from("acme"), spec("internal", &[]))
            .await
            .unwrap();
        let result = engine
            .create_ip_set(&OrgId::from("acme"), spec("internal", &[]))
            .await;
        assert!(matches!(result, Err(Error::Conflict(_))));

        // same name in another organisation is allowed
        engine
            .create_ip_set(&OrgId::from("globex"), spec("internal", &[]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_get_enforces_org_boundary() {
        let engine = engine().await;
        let set = engine
            .create_ip_set(&OrgId::from("acme"), spec("internal", &["10.0.0.1"]))
            .await
            .unwrap();

        let result = engine.get_ip_set(&OrgId::from("globex"), &set.id).await;
        assert!(matches!(result, Err(Error::Forbidden(_))));

        let result = engine
            .get_ip_set(&OrgId::from("acme"), &IpSetId::from("ips-missing"))
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_replaces_addresses() {
        let engine = engine().await;
        let org = OrgId::from("acme");
        let set = engine
            .create_ip_set(&org, spec("internal", &["10.0.0.1"]))
            .await
            .unwrap();

        let result = engine.update_ip_set(&org, &set.id, IpSetUpdate::default()).await;
        assert!(matches!(result, Err(Error::InvalidRule(_))));

        let update = IpSetUpdate {
            addresses: Some(vec!["192.168.0.0/16".to_string(), "10.1.2.3".to_string()]),
            ..Default::default()
        };
        let updated = engine.update_ip_set(&org, &set.id, update).await.unwrap();
        assert_eq!(updated.addresses, vec!["192.168.0.0/16", "10.1.2.3"]);
    }

    #[tokio::test]
    async fn test_rename_checks_uniqueness() {
        let engine = engine().await;
        let org = OrgId::from("acme");
        engine.create_ip_set(&org, spec("first", &[])).await.unwrap();
        let second = engine.create_ip_set(&org, spec("second", &[])).await.unwrap();

        let update = IpSetUpdate {
            name: Some(Name::new("first").unwrap()),
            ..Default::default()
        };
        let result = engine.update_ip_set(&org, &second.id, update).await;
        assert!(matches!(result, Err(Error::Conflict(_))));

        // renaming to its own name is a no-op, not a conflict
        let update = IpSetUpdate {
            name: Some(Name::new("second").unwrap()),
            ..Default::default()
        };
        let updated = engine.update_ip_set(&org, &second.id, update).await.unwrap();
        assert_eq!(updated.name, "second");
    }

    #[tokio::test]
    async fn test_delete_blocked_while_referenced() {
        let engine = engine().await;
        let org = OrgId::from("acme");
        let set = engine
            .create_ip_set(&org, spec("internal", &["10.0.0.0/8"]))
            .await
            .unwrap();
        let resource = engine
            .db()
            .create_resource(&Resource::new(
                ResourceId(0),
                org.clone(),
                "web".to_string(),
                true,
            ))
            .await
            .unwrap();
        let rule = engine
            .create_resource_rule(
                resource.id,
                RuleSpec {
                    action: RuleAction::Accept,
                    match_kind: RuleMatchInput::IpSet,
                    value: String::new(),
                    ip_set_id: Some(set.id.clone()),
                    priority: None,
                    enabled: None,
                },
            )
            .await
            .unwrap();

        let result = engine.delete_ip_set(&org, &set.id).await;
        assert!(matches!(result, Err(Error::Conflict(_))));

        engine.delete_resource_rule(resource.id, rule.id).await.unwrap();
        engine.delete_ip_set(&org, &set.id).await.unwrap();
        let result = engine.get_ip_set(&org, &set.id).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
