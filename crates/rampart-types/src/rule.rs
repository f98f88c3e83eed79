//! access rule types.
//!
//! a resource rule matches incoming traffic against a single criterion
//! and either accepts or drops it. rules live on resources; template
//! rules live on rule templates and are copied onto resources when a
//! template is assigned.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{IpSetId, ResourceId, RuleId, TemplateId, TemplateRuleId};

/// what happens to traffic that matches a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleAction {
    /// let matching traffic through.
    Accept,
    /// silently discard matching traffic.
    Drop,
}

/// the criterion a stored rule matches on.
///
/// this is the canonical set of kinds; submitted rules may additionally
/// use the `IP_CIDR` pseudo-kind, see [`RuleMatchInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleMatch {
    /// source network in cidr notation.
    Cidr,
    /// single source address.
    Ip,
    /// request path glob, only meaningful for http-capable resources.
    Path,
    /// membership of a named ip set.
    IpSet,
}

/// the match kind as submitted by a caller.
///
/// identical to [`RuleMatch`] plus `IP_CIDR`, which asks the server to
/// classify the value as an address or a network. `IP_CIDR` never
/// reaches storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleMatchInput {
    /// source network in cidr notation.
    Cidr,
    /// single source address.
    Ip,
    /// address or network, classified by the server.
    IpCidr,
    /// request path glob.
    Path,
    /// membership of a named ip set.
    IpSet,
}

/// error returned when parsing a rule enum from its wire string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRuleError(String);

impl fmt::Display for ParseRuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown rule token '{}'", self.0)
    }
}

impl std::error::Error for ParseRuleError {}

impl RuleAction {
    /// the wire representation of this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleAction::Accept => "ACCEPT",
            RuleAction::Drop => "DROP",
        }
    }
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RuleAction {
    type Err = ParseRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACCEPT" => Ok(RuleAction::Accept),
            "DROP" => Ok(RuleAction::Drop),
            other => Err(ParseRuleError(other.to_string())),
        }
    }
}

impl RuleMatch {
    /// the wire representation of this match kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleMatch::Cidr => "CIDR",
            RuleMatch::Ip => "IP",
            RuleMatch::Path => "PATH",
            RuleMatch::IpSet => "IP_SET",
        }
    }
}

impl fmt::Display for RuleMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RuleMatch {
    type Err = ParseRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CIDR" => Ok(RuleMatch::Cidr),
            "IP" => Ok(RuleMatch::Ip),
            "PATH" => Ok(RuleMatch::Path),
            "IP_SET" => Ok(RuleMatch::IpSet),
            other => Err(ParseRuleError(other.to_string())),
        }
    }
}

impl RuleMatchInput {
    /// the wire representation of this match kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleMatchInput::Cidr => "CIDR",
            RuleMatchInput::Ip => "IP",
            RuleMatchInput::IpCidr => "IP_CIDR",
            RuleMatchInput::Path => "PATH",
            RuleMatchInput::IpSet => "IP_SET",
        }
    }
}

impl fmt::Display for RuleMatchInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<RuleMatch> for RuleMatchInput {
    fn from(kind: RuleMatch) -> Self {
        match kind {
            RuleMatch::Cidr => RuleMatchInput::Cidr,
            RuleMatch::Ip => RuleMatchInput::Ip,
            RuleMatch::Path => RuleMatchInput::Path,
            RuleMatch::IpSet => RuleMatchInput::IpSet,
        }
    }
}

/// an access rule attached to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRule {
    /// unique rule id.
    pub id: RuleId,
    /// the resource this rule belongs to.
    pub resource_id: ResourceId,
    /// accept or drop.
    pub action: RuleAction,
    /// what the rule matches on.
    #[serde(rename = "match")]
    pub match_kind: RuleMatch,
    /// canonical match value.
    pub value: String,
    /// evaluation order; lower values are evaluated first.
    pub priority: i64,
    /// disabled rules are kept but not evaluated.
    pub enabled: bool,
    /// the referenced ip set, for `IP_SET` rules.
    pub ip_set_id: Option<IpSetId>,
    /// the template rule this was copied from, if any.
    pub template_rule_id: Option<TemplateRuleId>,
    /// when the rule was created.
    pub created_at: DateTime<Utc>,
    /// when the rule was last modified.
    pub updated_at: DateTime<Utc>,
}

/// a rule belonging to a template, copied onto resources on assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRule {
    /// unique template rule id.
    pub id: TemplateRuleId,
    /// the template this rule belongs to.
    pub template_id: TemplateId,
    /// accept or drop.
    pub action: RuleAction,
    /// what the rule matches on.
    #[serde(rename = "match")]
    pub match_kind: RuleMatch,
    /// match value.
    pub value: String,
    /// ordering of rules within the template.
    pub priority: i64,
    /// disabled rules are copied as disabled.
    pub enabled: bool,
    /// when the rule was created.
    pub created_at: DateTime<Utc>,
    /// when the rule was last modified.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_wire_format() {
        assert_eq!(serde_json::to_string(&RuleAction::Accept).unwrap(), "\"ACCEPT\"");
        assert_eq!(serde_json::to_string(&RuleAction::Drop).unwrap(), "\"DROP\"");
        let parsed: RuleAction = serde_json::from_str("\"DROP\"").unwrap();
        assert_eq!(parsed, RuleAction::Drop);
    }

    #[test]
    fn test_match_wire_format() {
        assert_eq!(serde_json::to_string(&RuleMatch::IpSet).unwrap(), "\"IP_SET\"");
        assert_eq!(serde_json::to_string(&RuleMatchInput::IpCidr).unwrap(), "\"IP_CIDR\"");
        let parsed: RuleMatchInput = serde_json::from_str("\"IP_CIDR\"").unwrap();
        assert_eq!(parsed, RuleMatchInput::IpCidr);
    }

    #[test]
    fn test_stored_match_rejects_ip_cidr() {
        let result: Result<RuleMatch, _> = serde_json::from_str("\"IP_CIDR\"");
        assert!(result.is_err());
        assert!("IP_CIDR".parse::<RuleMatch>().is_err());
    }

    #[test]
    fn test_from_str_roundtrip() {
        for kind in [RuleMatch::Cidr, RuleMatch::Ip, RuleMatch::Path, RuleMatch::IpSet] {
            assert_eq!(kind.as_str().parse::<RuleMatch>().unwrap(), kind);
        }
        for action in [RuleAction::Accept, RuleAction::Drop] {
            assert_eq!(action.as_str().parse::<RuleAction>().unwrap(), action);
        }
    }

    #[test]
    fn test_parse_error_mentions_token() {
        let err = "ALLOW".parse::<RuleAction>().unwrap_err();
        assert!(err.to_string().contains("ALLOW"));
    }

    #[test]
    fn test_input_from_stored_kind() {
        assert_eq!(RuleMatchInput::from(RuleMatch::IpSet), RuleMatchInput::IpSet);
        assert_eq!(RuleMatchInput::from(RuleMatch::Cidr), RuleMatchInput::Cidr);
    }
}
