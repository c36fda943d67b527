//! Source keys: `(domain, name-or-glob)` references to readings.
//!
//! In view files keys are written as `domain/name`; a bare `name` refers to
//! the status domain. A name ending in `*` is a prefix glob. A leading `^`
//! is accepted and dropped when parsing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::KeyError;
use crate::sample::STATUS_DOMAIN;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SourceKey {
    domain: String,
    name: String,
}

impl SourceKey {
    /// Creates a key, lowercasing both parts.
    pub fn new(domain: &str, name: &str) -> Self {
        Self {
            domain: domain.to_lowercase(),
            name: name.to_lowercase(),
        }
    }

    /// Shorthand for a key in the status domain.
    pub fn status(name: &str) -> Self {
        Self::new(STATUS_DOMAIN, name)
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_glob(&self) -> bool {
        is_glob(&self.name)
    }

    /// Literal part of the name (the whole name for non-glob keys).
    pub fn prefix(&self) -> &str {
        pattern_prefix(&self.name)
    }

    /// Whether a metric name in this key's domain is selected by the key.
    pub fn matches(&self, name: &str) -> bool {
        matches_pattern(&self.name, name)
    }
}

/// True if `pattern` is a prefix glob.
pub fn is_glob(pattern: &str) -> bool {
    pattern.ends_with('*')
}

/// Strips the optional leading `^` and the trailing `*`.
pub fn pattern_prefix(pattern: &str) -> &str {
    let pattern = pattern.strip_prefix('^').unwrap_or(pattern);
    pattern.strip_suffix('*').unwrap_or(pattern)
}

/// Literal or prefix-glob match of `name` against `pattern`.
pub fn matches_pattern(pattern: &str, name: &str) -> bool {
    if is_glob(pattern) {
        name.starts_with(pattern_prefix(pattern))
    } else {
        pattern.strip_prefix('^').unwrap_or(pattern) == name
    }
}

impl FromStr for SourceKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| KeyError {
            key: s.to_string(),
            reason,
        };

        let (domain, name) = match s.split_once('/') {
            Some((domain, name)) => (domain.trim(), name.trim()),
            None => (STATUS_DOMAIN, s.trim()),
        };
        let name = name.strip_prefix('^').unwrap_or(name);

        if domain.is_empty() {
            return Err(invalid("empty domain"));
        }
        if name.is_empty() {
            return Err(invalid("empty metric name"));
        }
        if name.contains('/') {
            return Err(invalid("more than one '/'"));
        }
        if name.strip_suffix('*').unwrap_or(name).contains('*') {
            return Err(invalid("'*' is only allowed at the end"));
        }

        Ok(Self::new(domain, name))
    }
}

impl TryFrom<String> for SourceKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SourceKey> for String {
    fn from(key: SourceKey) -> Self {
        key.to_string()
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.domain, self.name)
    }
}
