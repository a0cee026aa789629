//! `go.mod` requirement extraction.
//!
//! Only `require` directives are read. Both forms are recognized:
//!
//! ```text
//! require github.com/pkg/errors v0.9.1
//!
//! require (
//!     golang.org/x/net v0.17.0
//!     github.com/google/gopacket v1.1.19 // indirect
//! )
//! ```
//!
//! Each entry is split into a module path and a version token. The version is
//! checked and dropped; the module path becomes an `https://` [`Address`].

use crate::address::Address;
use crate::error::{MirrorError, Result};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

pub const DEFAULT_MANIFEST: &str = "go.mod";

fn module_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)+/\S+$").expect("valid module regex")
    })
}

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^v\d").expect("valid version regex"))
}

fn major_suffix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([^/]+/[^/]+/.+)/v([2-9]|[1-9][0-9]+)$").expect("valid suffix regex")
    })
}

/// Read `<repo_path>/<manifest_name>` and return the addresses it requires.
///
/// A missing, unreadable or non-UTF-8 manifest is reported as
/// [`MirrorError::ManifestUnavailable`].
pub fn extract_dependencies(repo_path: &Path, manifest_name: &str) -> Result<Vec<Address>> {
    let manifest_path = repo_path.join(manifest_name);
    let bytes = fs::read(&manifest_path).map_err(|e| MirrorError::ManifestUnavailable {
        path: manifest_path.clone(),
        reason: e.to_string(),
    })?;
    let content = String::from_utf8(bytes).map_err(|e| MirrorError::ManifestUnavailable {
        path: manifest_path.clone(),
        reason: e.to_string(),
    })?;

    let deps = parse_manifest(&content);
    for dep in &deps {
        tracing::debug!(manifest = %manifest_path.display(), dependency = %dep, "found dependency");
    }
    Ok(deps)
}

/// Extract required addresses from manifest text, in order of appearance.
pub fn parse_manifest(content: &str) -> Vec<Address> {
    let mut deps = Vec::new();
    let mut in_block = false;

    for raw in content.lines() {
        let line = strip_comment(raw);

        if in_block {
            if line.contains(')') {
                in_block = false;
            } else if let Some(addr) = parse_requirement(line) {
                deps.push(addr);
            }
            continue;
        }

        let Some(rest) = require_directive(line) else {
            continue;
        };
        if let Some(inner) = rest.strip_prefix('(') {
            let entry = match inner.split_once(')') {
                Some((entry, _)) => entry,
                None => {
                    in_block = true;
                    inner
                }
            };
            if let Some(addr) = parse_requirement(entry) {
                deps.push(addr);
            }
        } else if let Some(addr) = parse_requirement(rest) {
            deps.push(addr);
        }
    }

    deps
}

/// Parse one `<module> <version>` entry.
pub fn parse_requirement(entry: &str) -> Option<Address> {
    let mut fields = entry.split_whitespace();
    let module = fields.next()?.trim_matches('"');
    let version = fields.next()?.trim_matches('"');

    if !module_pattern().is_match(module) || !version_pattern().is_match(version) {
        return None;
    }

    Address::from_module_path(&strip_major_version(module)).ok()
}

/// `github.com/a/b/v3` -> `github.com/a/b`. `gopkg.in/yaml.v2` is untouched.
pub fn strip_major_version(module: &str) -> String {
    match major_suffix_pattern().captures(module) {
        Some(caps) => caps[1].to_string(),
        None => module.to_string(),
    }
}

/// Text following a leading `require` keyword, trimmed.
fn require_directive(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix("require")?;
    if rest.starts_with(char::is_whitespace) || rest.starts_with('(') {
        Some(rest.trim())
    } else {
        None
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}
