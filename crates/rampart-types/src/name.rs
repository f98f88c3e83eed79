//! validated names for templates and ip sets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// maximum length of a name in bytes.
pub const MAX_NAME_LEN: usize = 63;

/// a validated name.
///
/// names are used for rule templates and ip sets. they are 1 to 63
/// characters of lowercase ascii alphanumerics and hyphens, and may not
/// start or end with a hyphen. names are unique per organisation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(String);

/// error returned when a name fails validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// the name was empty.
    Empty,
    /// the name exceeded [`MAX_NAME_LEN`] bytes.
    TooLong(usize),
    /// the name contained characters outside `[a-z0-9-]`.
    InvalidCharacters,
    /// the name started or ended with a hyphen.
    InvalidHyphenPosition,
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameError::Empty => write!(f, "name cannot be empty"),
            NameError::TooLong(len) => {
                write!(f, "name is {len} bytes, maximum is {MAX_NAME_LEN}")
            }
            NameError::InvalidCharacters => {
                write!(f, "name may only contain lowercase letters, digits, and hyphens")
            }
            NameError::InvalidHyphenPosition => {
                write!(f, "name may not start or end with a hyphen")
            }
        }
    }
}

impl std::error::Error for NameError {}

impl Name {
    /// create a name, validating it first.
    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// check whether a string is a valid name.
    pub fn validate(name: &str) -> Result<(), NameError> {
        if name.is_empty() {
            return Err(NameError::Empty);
        }
        if name.len() > MAX_NAME_LEN {
            return Err(NameError::TooLong(name.len()));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(NameError::InvalidCharacters);
        }
        if name.starts_with('-') || name.ends_with('-') {
            return Err(NameError::InvalidHyphenPosition);
        }
        Ok(())
    }

    /// the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// consume the name, returning the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Name {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Name::new(s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Name {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}
