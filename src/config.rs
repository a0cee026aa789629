//! Optional `depmirror.toml` settings.
//!
//! ```toml
//! proxy = "http://proxy.corp:3128"
//! manifest = "go.mod"
//! submodule_depth = 10
//! lock = true
//! progress = false
//! ```
//!
//! Command-line flags take precedence over the file.

use crate::error::{MirrorError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "depmirror.toml";

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub proxy: Option<String>,
    pub manifest: Option<String>,
    pub submodule_depth: Option<usize>,
    pub lock: Option<bool>,
    pub progress: Option<bool>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| MirrorError::config(format!("{}: {}", path.display(), e)))?;
        Self::parse(&content)
            .map_err(|e| MirrorError::config(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load `explicit` if given, else `depmirror.toml` in `dir` if present,
    /// else defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "using settings file");
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }
}
