//! shared types for rampart.
//!
//! this crate contains the domain types used across the rampart
//! workspace: identifiers, rules, templates, ip sets, resources, and
//! server configuration. it deliberately has no database or http
//! dependencies so it can be used from any layer.

pub mod config;
pub mod ids;
pub mod ip_set;
pub mod name;
pub mod path_pattern;
pub mod resource;
pub mod rule;
pub mod template;

pub use config::{Config, DatabaseConfig, SqliteConfig};
pub use ids::{IpSetId, OrgId, ResourceId, RuleId, TemplateId, TemplateRuleId};
pub use ip_set::IpSet;
pub use name::{Name, NameError};
pub use path_pattern::{PathPattern, PathPatternError};
pub use resource::Resource;
pub use rule::{ParseRuleError, ResourceRule, RuleAction, RuleMatch, RuleMatchInput, TemplateRule};
pub use template::{RuleTemplate, TemplateAssignment};
