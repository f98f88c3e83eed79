//! rule canonicalisation.
//!
//! callers may submit rules with the `IP_CIDR` pseudo-kind, which asks
//! the server to classify the value as a bare address or a network.
//! explicit kinds are validated strictly. normalisation also resolves
//! `IP_SET` references and pins the stored value to the set id.

use std::net::IpAddr;

use ipnet::IpNet;
use rampart_db::Database;
use rampart_types::{IpSet, IpSetId, OrgId, PathPattern, RuleAction, RuleMatch, RuleMatchInput};
use tracing::debug;

use crate::engine::RuleEngine;
use crate::error::{Error, Result};

/// a rule in canonical form, ready for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRule {
    /// accept or drop.
    pub action: RuleAction,
    /// the canonical match kind, never `IP_CIDR`.
    pub match_kind: RuleMatch,
    /// the canonical match value.
    pub value: String,
    /// the referenced set for `IP_SET` rules, none otherwise.
    pub ip_set_id: Option<IpSetId>,
}

/// classify an `IP_CIDR` value.
///
/// bare addresses become single-host networks (/32 or /128), values in
/// cidr notation are kept as submitted. anything else falls through as
/// an `IP` rule with the value stored unvalidated; existing callers
/// depend on the fallback accepting arbitrary strings, so it must not
/// be tightened.
pub(crate) fn infer_ip_or_cidr(value: &str) -> (RuleMatch, String) {
    if let Ok(addr) = value.parse::<IpAddr>() {
        let prefix_len = if addr.is_ipv4() { 32 } else { 128 };
        return (RuleMatch::Cidr, format!("{value}/{prefix_len}"));
    }
    if value.parse::<IpNet>().is_ok() {
        return (RuleMatch::Cidr, value.to_string());
    }
    debug!(value = %value, "IP_CIDR value is neither address nor network, storing as IP");
    (RuleMatch::Ip, value.to_string())
}

pub(crate) fn validate_cidr(value: &str) -> Result<()> {
    if value.parse::<IpNet>().is_err() {
        return Err(Error::InvalidRule(format!(
            "'{value}' is not valid CIDR notation"
        )));
    }
    Ok(())
}

pub(crate) fn validate_ip(value: &str) -> Result<()> {
    if value.parse::<IpAddr>().is_err() {
        return Err(Error::InvalidRule(format!(
            "'{value}' is not a valid IP address"
        )));
    }
    Ok(())
}

pub(crate) fn validate_path(value: &str) -> Result<()> {
    PathPattern::validate(value).map_err(|e| Error::InvalidRule(e.to_string()))
}

impl<D: Database> RuleEngine<D> {
    /// resolve an ip set reference for a rule and verify the owner.
    ///
    /// a missing set and a set owned by another organisation are both
    /// reported as invalid rules so a caller cannot probe for foreign
    /// set ids.
    pub(crate) async fn resolve_ip_set(
        &self,
        org_id: &OrgId,
        ip_set_id: &IpSetId,
    ) -> Result<IpSet> {
        match self.db.get_ip_set(ip_set_id).await? {
            Some(set) if set.org_id == *org_id => Ok(set),
            _ => Err(Error::InvalidRule(format!(
                "ip set '{ip_set_id}' does not exist in organisation '{org_id}'"
            ))),
        }
    }

    /// canonicalise a submitted rule tuple.
    ///
    /// for `IP_SET` rules the stored value becomes the set id and the
    /// reference is kept; for every other kind a submitted `ip_set_id`
    /// is discarded.
    pub(crate) async fn normalize(
        &self,
        org_id: &OrgId,
        action: RuleAction,
        match_input: RuleMatchInput,
        value: &str,
        ip_set_id: Option<&IpSetId>,
    ) -> Result<NormalizedRule> {
        match match_input {
            RuleMatchInput::IpCidr => {
                let (match_kind, value) = infer_ip_or_cidr(value);
                Ok(NormalizedRule {
                    action,
                    match_kind,
                    value,
                    ip_set_id: None,
                })
            }
            RuleMatchInput::Cidr => {
                validate_cidr(value)?;
                Ok(NormalizedRule {
                    action,
                    match_kind: RuleMatch::Cidr,
                    value: value.to_string(),
                    ip_set_id: None,
                })
            }
            RuleMatchInput::Ip => {
                validate_ip(value)?;
                Ok(NormalizedRule {
                    action,
                    match_kind: RuleMatch::Ip,
                    value: value.to_string(),
                    ip_set_id: None,
                })
            }
            RuleMatchInput::Path => {
                validate_path(value)?;
                Ok(NormalizedRule {
                    action,
                    match_kind: RuleMatch::Path,
                    value: value.to_string(),
                    ip_set_id: None,
                })
            }
            RuleMatchInput::IpSet => {
                let id = ip_set_id.ok_or_else(|| {
                    Error::InvalidRule("ip_set_id is required for IP_SET rules".to_string())
                })?;
                let set = self.resolve_ip_set(org_id, id).await?;
                Ok(NormalizedRule {
                    action,
                    match_kind: RuleMatch::IpSet,
                    value: set.id.to_string(),
                    ip_set_id: Some(set.id),
                })
            }
        }
    }
}
