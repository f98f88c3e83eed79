//! validated request path globs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// maximum length of a path pattern in bytes.
pub const MAX_PATH_PATTERN_LEN: usize = 2048;

/// a validated request path glob.
///
/// patterns must start with `/` and may contain url path characters
/// plus `*` as a wildcard segment. percent escapes must be complete.
/// how wildcards are evaluated against live requests is up to the data
/// plane; this type only guards what authors may store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathPattern(String);

/// error returned when a path pattern fails validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPatternError {
    /// the pattern was empty.
    Empty,
    /// the pattern exceeded [`MAX_PATH_PATTERN_LEN`] bytes.
    TooLong(usize),
    /// the pattern did not start with `/`.
    MissingLeadingSlash,
    /// the pattern contained a character not allowed in url paths.
    InvalidCharacter(char),
    /// a `%` was not followed by two hex digits.
    InvalidPercentEncoding,
}

impl fmt::Display for PathPatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathPatternError::Empty => write!(f, "path pattern cannot be empty"),
            PathPatternError::TooLong(len) => {
                write!(f, "path pattern is {len} bytes, maximum is {MAX_PATH_PATTERN_LEN}")
            }
            PathPatternError::MissingLeadingSlash => {
                write!(f, "path pattern must start with '/'")
            }
            PathPatternError::InvalidCharacter(c) => {
                write!(f, "path pattern contains invalid character {c:?}")
            }
            PathPatternError::InvalidPercentEncoding => {
                write!(f, "'%' must be followed by two hex digits")
            }
        }
    }
}

impl std::error::Error for PathPatternError {}

fn is_path_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '-' | '.' | '_' | '~' | '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ','
                | ';' | '=' | ':' | '@' | '/'
        )
}

impl PathPattern {
    /// create a path pattern, validating it first.
    pub fn new(pattern: impl Into<String>) -> Result<Self, PathPatternError> {
        let pattern = pattern.into();
        Self::validate(&pattern)?;
        Ok(Self(pattern))
    }

    /// check whether a string is a valid path pattern.
    pub fn validate(pattern: &str) -> Result<(), PathPatternError> {
        if pattern.is_empty() {
            return Err(PathPatternError::Empty);
        }
        if pattern.len() > MAX_PATH_PATTERN_LEN {
            return Err(PathPatternError::TooLong(pattern.len()));
        }
        if !pattern.starts_with('/') {
            return Err(PathPatternError::MissingLeadingSlash);
        }
        let mut chars = pattern.chars();
        while let Some(c) = chars.next() {
            if c == '%' {
                let hi = chars.next();
                let lo = chars.next();
                match (hi, lo) {
                    (Some(h), Some(l)) if h.is_ascii_hexdigit() && l.is_ascii_hexdigit() => {}
                    _ => return Err(PathPatternError::InvalidPercentEncoding),
                }
            } else if !is_path_char(c) {
                return Err(PathPatternError::InvalidCharacter(c));
            }
        }
        Ok(())
    }

    /// the pattern as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// consume the pattern, returning the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for PathPattern {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PathPattern {
    type Err = PathPatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for PathPattern {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PathPattern::new(s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for PathPattern {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}


#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]

        #[test]
        fn validate_never_panics(s in ".*") {
            let _ = PathPattern::validate(&s);
        }

        #[test]
        fn simple_globs_always_accepted(segments in prop::collection::vec("[a-z0-9*]{1,8}", 1..6)) {
            let pattern = format!("/{}", segments.join("/"));
            prop_assert!(PathPattern::new(&pattern).is_ok());
        }

        #[test]
        fn accepted_patterns_roundtrip(segments in prop::collection::vec("[a-zA-Z0-9._~*-]{1,8}", 0..5)) {
            let pattern = format!("/{}", segments.join("/"));
            if let Ok(parsed) = PathPattern::new(&pattern) {
                prop_assert_eq!(parsed.as_str(), pattern.as_str());
            }
        }
    }
}
