//! Outcome of a traversal.

use crate::address::Address;
use colored::*;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirroredRepo {
    pub address: Address,
    pub path: PathBuf,
    pub head: Option<String>,
    /// Distance from the root repository.
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedFetch {
    pub address: Address,
    pub depth: usize,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct WalkReport {
    /// Repositories fetched, in fetch order.
    pub fetched: Vec<MirroredRepo>,
    pub failed: Vec<FailedFetch>,
    /// Fetched repositories whose manifest could not be read.
    pub manifests_missing: Vec<Address>,
    /// Discovered addresses that had already been visited.
    pub skipped: usize,
}

impl WalkReport {
    /// True when the depth-0 repository was fetched.
    pub fn root_fetched(&self) -> bool {
        self.fetched.iter().any(|repo| repo.depth == 0)
    }

    pub fn dependency_count(&self) -> usize {
        self.fetched.iter().filter(|repo| repo.depth > 0).count()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn print_summary(&self) {
        println!();
        println!(
            "{} Mirrored {} repositories ({} dependencies)",
            "✓".green(),
            self.fetched.len().to_string().bold(),
            self.dependency_count()
        );
        if self.skipped > 0 {
            println!("   {} {} repeated requirements skipped", "↺".cyan(), self.skipped);
        }
        if !self.manifests_missing.is_empty() {
            println!(
                "   {} {} repositories without a readable manifest",
                "ℹ".blue(),
                self.manifests_missing.len()
            );
        }
        if !self.is_clean() {
            println!("{} {} fetches failed:", "x".red(), self.failed.len());
            for failure in &self.failed {
                println!("   - {} ({})", failure.address.to_string().bold(), failure.reason.dimmed());
            }
        }
    }
}
