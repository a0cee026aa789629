//! # depmirror - offline mirror for Go module dependency trees
//!
//! depmirror clones a repository, reads the `require` directives of its
//! `go.mod`, and clones every required repository in turn until the whole
//! dependency tree is on disk. Each repository lands in a directory derived
//! from its address:
//!
//! ```text
//! <root>/github.com/google/gopacket
//! <root>/golang.org/x/net
//! ```
//!
//! ## Module Organization
//!
//! - [`address`] - Validated `http(s)://` repository addresses
//! - [`paths`] - Address to mirror directory mapping
//! - [`manifest`] - `go.mod` requirement extraction
//! - [`fetch`] - Repository fetching (libgit2)
//! - [`walker`] - Dependency traversal

/// Validated repository addresses.
pub mod address;

/// Settings file (`depmirror.toml`).
pub mod config;

/// Error kinds.
pub mod error;

/// Repository fetching.
pub mod fetch;

/// Mirror record (`depmirror.lock`).
pub mod lock;

/// Diagnostic logging setup.
pub mod logging;

/// `go.mod` parsing.
pub mod manifest;

/// Mirror directory layout.
pub mod paths;

/// Traversal outcome.
pub mod report;

/// Dependency traversal.
pub mod walker;

pub use address::Address;
pub use error::{MirrorError, Result};
pub use fetch::{FetchConfig, GitFetcher, RepositoryFetcher};
pub use walker::DependencyWalker;
