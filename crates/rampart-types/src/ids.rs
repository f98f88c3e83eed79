//! identifier types.
//!
//! numeric ids are database-assigned; an id of zero marks a record that
//! has not been persisted yet. template and ip set ids are opaque
//! strings so callers can supply their own stable identifiers.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// identifier of the organisation that owns a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrgId(pub String);

/// unique identifier for a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(pub u64);

/// unique identifier for a resource rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleId(pub u64);

/// unique identifier for a rule template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(pub String);

/// unique identifier for a rule inside a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateRuleId(pub u64);

/// unique identifier for an ip set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IpSetId(pub String);

macro_rules! numeric_id {
    ($name:ident) => {
        impl $name {
            /// the raw numeric value.
            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            /// the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(ResourceId);
numeric_id!(RuleId);
numeric_id!(TemplateRuleId);

string_id!(OrgId);
string_id!(TemplateId);
string_id!(IpSetId);

fn random_suffix() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 8] = rng.random();
    hex::encode(bytes)
}

impl TemplateId {
    /// generate a fresh template identifier.
    pub fn generate() -> Self {
        Self(format!("tpl-{}", random_suffix()))
    }
}

impl IpSetId {
    /// generate a fresh ip set identifier.
    pub fn generate() -> Self {
        Self(format!("ips-{}", random_suffix()))
    }
}
