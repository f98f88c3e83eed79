//! database entity definitions.

pub mod ip_set;
pub mod resource;
pub mod resource_rule;
pub mod rule_template;
pub mod template_assignment;
pub mod template_rule;
