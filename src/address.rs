//! Repository addresses.
//!
//! An [`Address`] is always `http://` or `https://` followed by a host and an
//! optional path. It is the unit of work for the traversal: the fetch target,
//! the seed of the mirror path and, through [`Address::key`], the identity
//! used to detect revisits.

use crate::error::{MirrorError, Result};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

fn address_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(?i)(https?)://(.+)$").expect("valid address regex"))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Validate a user-supplied address.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let Some(caps) = address_pattern().captures(trimmed) else {
            return Err(MirrorError::InvalidAddress(input.to_string()));
        };
        let rest = &caps[2];
        if rest.starts_with('/') || rest.chars().any(char::is_whitespace) {
            return Err(MirrorError::InvalidAddress(input.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Build the fetch address for a module path such as `github.com/a/b`.
    pub fn from_module_path(module_path: &str) -> Result<Self> {
        Self::parse(&format!("https://{}", module_path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything after `scheme://`.
    pub fn without_scheme(&self) -> &str {
        self.0
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(self.0.as_str())
    }

    /// Host component, e.g. `github.com`.
    pub fn host(&self) -> &str {
        self.without_scheme().split('/').next().unwrap_or_default()
    }

    /// Normalized identity, built from the same scheme-less form as the
    /// mirror path: host lower-cased, trailing `/` and `.git` dropped.
    /// `http://GitHub.com/a/b.git/` and `https://github.com/a/b` share a key.
    pub fn key(&self) -> String {
        let rest = self.without_scheme().trim_end_matches('/');
        let rest = rest.strip_suffix(".git").unwrap_or(rest);
        match rest.split_once('/') {
            Some((host, path)) => format!("{}/{}", host.to_lowercase(), path),
            None => rest.to_lowercase(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Address {
    type Err = MirrorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
