//! `depmirror.lock`: what a run mirrored and at which commit.
//!
//! Written into the mirror root when `--lock` is given. It is a record, not
//! an input: runs never read it back.

use crate::error::{MirrorError, Result};
use crate::report::WalkReport;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const LOCK_FILE: &str = "depmirror.lock";

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct MirrorLock {
    #[serde(rename = "repository")]
    pub repositories: BTreeMap<String, RepositoryLock>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RepositoryLock {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
}

impl MirrorLock {
    pub fn from_report(report: &WalkReport) -> Self {
        let mut lock = Self::default();
        for repo in &report.fetched {
            lock.insert(
                repo.address.to_string(),
                repo.path.to_string_lossy().to_string(),
                repo.head.clone(),
            );
        }
        lock
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(MirrorError::lock)?;
        fs::write(path, content).map_err(MirrorError::lock)?;
        Ok(())
    }

    pub fn get(&self, address: &str) -> Option<&RepositoryLock> {
        self.repositories.get(address)
    }

    pub fn insert(&mut self, address: String, path: String, rev: Option<String>) {
        self.repositories.insert(address, RepositoryLock { path, rev });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use crate::report::MirroredRepo;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_from_report() {
        let mut report = WalkReport::default();
        report.fetched.push(MirroredRepo {
            address: Address::parse("https://github.com/google/gopacket").unwrap(),
            path: PathBuf::from("/mirror/github.com/google/gopacket"),
            head: Some("abc123".to_string()),
            depth: 0,
        });

        let lock = MirrorLock::from_report(&report);
        let entry = lock.get("https://github.com/google/gopacket").unwrap();
        assert_eq!(entry.path, "/mirror/github.com/google/gopacket");
        assert_eq!(entry.rev.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_save_writes_toml() {
        let dir = tempdir().unwrap();
        let mut lock = MirrorLock::default();
        lock.insert(
            "https://golang.org/x/net".to_string(),
            "/mirror/golang.org/x/net".to_string(),
            None,
        );
        let path = dir.path().join(LOCK_FILE);
        lock.save(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("golang.org/x/net"));
        assert!(!content.contains("rev"));

        let parsed: MirrorLock = toml::from_str(&content).unwrap();
        assert_eq!(parsed.get("https://golang.org/x/net"), lock.get("https://golang.org/x/net"));
    }

    #[test]
    fn test_parse() {
        let toml_str = r#"
[repository."https://example.com/a"]
path = "/m/example.com/a"
rev = "deadbeef"
"#;
        let lock: MirrorLock = toml::from_str(toml_str).unwrap();
        assert_eq!(lock.get("https://example.com/a").unwrap().rev.as_deref(), Some("deadbeef"));
    }
}
