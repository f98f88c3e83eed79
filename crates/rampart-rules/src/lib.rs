//! rule authoring and template propagation for rampart.
//!
//! this crate implements the control-plane side of rampart's access
//! rules: validating and canonicalising submitted rules, allocating
//! evaluation priorities, and keeping template-derived rule copies in
//! sync across the resources a template is assigned to. it never
//! evaluates rules against live traffic.

#![warn(missing_docs)]

pub mod engine;
pub mod error;
pub mod ip_set;
pub mod normalize;
pub mod priority;
pub mod resource_rules;
pub mod sync;
pub mod templates;

pub use engine::RuleEngine;
pub use error::{Error, Result};
pub use ip_set::{IpSetSpec, IpSetUpdate};
pub use normalize::NormalizedRule;
pub use resource_rules::{RuleSpec, RuleUpdate};
pub use sync::{AssignOutcome, Propagation, TemplateRemoval, TemplateRuleRemoval};
pub use templates::{NewTemplate, TemplateRuleSpec, TemplateRuleUpdate, TemplateUpdate};
