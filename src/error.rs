//! Error kinds surfaced by the mirror.
//!
//! Directory, fetch and manifest errors are scoped to a single branch of the
//! traversal: the walker reports them and moves on to the next sibling.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MirrorError>;

#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Invalid repository address '{0}': expected http(s)://host/path")]
    InvalidAddress(String),

    #[error("Invalid proxy address '{address}': {reason}")]
    InvalidProxy { address: String, reason: String },

    #[error("Failed to create directory {}: {source}", .path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch {address}: {source}")]
    Fetch {
        address: String,
        #[source]
        source: git2::Error,
    },

    #[error("Manifest unavailable at {}: {reason}", .path.display())]
    ManifestUnavailable { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Lock file error: {0}")]
    Lock(String),
}

impl MirrorError {
    pub fn config<E: std::fmt::Display>(e: E) -> Self {
        Self::Config(e.to_string())
    }

    pub fn lock<E: std::fmt::Display>(e: E) -> Self {
        Self::Lock(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_error_names_path() {
        let err = MirrorError::DirectoryCreation {
            path: PathBuf::from("/mirror/example.com"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to create directory /mirror/example.com: denied"
        );
    }

    #[test]
    fn test_fetch_error_keeps_source() {
        use std::error::Error as _;
        let err = MirrorError::Fetch {
            address: "https://example.com/a".to_string(),
            source: git2::Error::from_str("boom"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Failed to fetch https://example.com/a"));
    }

    #[test]
    fn test_messages_name_the_culprit() {
        let err = MirrorError::InvalidProxy {
            address: "::nope".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("::nope"));
        assert!(msg.contains("relative URL"));
    }
}
