//! Dependency traversal.
//!
//! Starting from one repository, every address required by a fetched
//! repository's manifest is fetched in turn, depth-first and one at a time.
//!
//! The walk keeps an explicit stack and a visited set keyed by
//! [`Address::key`], so each distinct repository is fetched at most once and
//! dependency cycles terminate. Children are pushed in reverse manifest order,
//! which yields the same pre-order as a naive recursive walk: a dependency's
//! whole subtree is mirrored before its next sibling is touched.
//!
//! Failures are local to their branch. A repository that cannot be fetched,
//! or whose manifest cannot be read, simply contributes no children.

use crate::address::Address;
use crate::error::Result;
use crate::fetch::RepositoryFetcher;
use crate::manifest::{self, DEFAULT_MANIFEST};
use crate::paths::resolve_target_path;
use crate::report::{FailedFetch, MirroredRepo, WalkReport};
use colored::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

struct Pending {
    address: Address,
    depth: usize,
}

#[derive(Default)]
struct Traversal {
    stack: Vec<Pending>,
    visited: HashSet<String>,
    report: WalkReport,
}

impl Traversal {
    fn push_children(&mut self, deps: Vec<Address>, depth: usize) {
        self.stack
            .extend(deps.into_iter().rev().map(|address| Pending { address, depth }));
    }
}

pub struct DependencyWalker<F: RepositoryFetcher> {
    root: PathBuf,
    manifest_name: String,
    fetcher: F,
}

impl<F: RepositoryFetcher> DependencyWalker<F> {
    pub fn new(root: impl Into<PathBuf>, fetcher: F) -> Self {
        Self {
            root: root.into(),
            manifest_name: DEFAULT_MANIFEST.to_string(),
            fetcher,
        }
    }

    pub fn with_manifest(mut self, manifest_name: impl Into<String>) -> Self {
        self.manifest_name = manifest_name.into();
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetch `address` and everything it transitively requires.
    pub fn fetch_and_walk(&self, address: &Address) -> WalkReport {
        let mut traversal = Traversal::default();
        traversal.stack.push(Pending {
            address: address.clone(),
            depth: 0,
        });
        self.drain(&mut traversal);
        traversal.report
    }

    /// Walk the requirements of `address`, already fetched at `repo_path`.
    ///
    /// An unreadable root manifest is returned as an error; failures further
    /// down are recorded in the report.
    pub fn walk(&self, address: &Address, repo_path: &Path) -> Result<WalkReport> {
        let deps = manifest::extract_dependencies(repo_path, &self.manifest_name)?;

        let mut traversal = Traversal::default();
        traversal.visited.insert(address.key());
        traversal.push_children(deps, 1);
        self.drain(&mut traversal);
        Ok(traversal.report)
    }

    fn drain(&self, traversal: &mut Traversal) {
        while let Some(Pending { address, depth }) = traversal.stack.pop() {
            if !traversal.visited.insert(address.key()) {
                tracing::debug!(%address, "already visited");
                traversal.report.skipped += 1;
                continue;
            }

            let Some(repo_path) = self.fetch_node(&address, depth, &mut traversal.report) else {
                continue;
            };

            match manifest::extract_dependencies(&repo_path, &self.manifest_name) {
                Ok(deps) => {
                    for dep in &deps {
                        println!("{}{} Dependency {}", indent(depth + 1), "↳".dimmed(), dep);
                    }
                    traversal.push_children(deps, depth + 1);
                }
                Err(err) => {
                    tracing::warn!(%address, error = %err, "no dependencies read");
                    traversal.report.manifests_missing.push(address);
                }
            }
        }
    }

    /// Resolve the mirror path for `address` and fetch into it.
    ///
    /// The outcome is printed and recorded in `report`; `None` means there is
    /// nothing to descend into.
    pub fn fetch_node(
        &self,
        address: &Address,
        depth: usize,
        report: &mut WalkReport,
    ) -> Option<PathBuf> {
        let fetched = resolve_target_path(address, &self.root)
            .and_then(|target| self.fetcher.fetch(address, &target));

        match fetched {
            Ok(repo) => {
                println!(
                    "{}{} Downloaded {} successfully",
                    indent(depth),
                    "✓".green(),
                    address
                );
                let path = repo.path.clone();
                report.fetched.push(MirroredRepo {
                    address: address.clone(),
                    path: repo.path,
                    head: repo.head,
                    depth,
                });
                Some(path)
            }
            Err(err) => {
                println!("{}{} {}", indent(depth), "x".red(), err);
                report.failed.push(FailedFetch {
                    address: address.clone(),
                    depth,
                    reason: err.to_string(),
                });
                None
            }
        }
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}
