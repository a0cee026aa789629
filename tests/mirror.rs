//! End-to-end traversal over real git repositories.
//!
//! Sources live in a scratch directory laid out like the mirror itself
//! (`<sources>/example.com/root`, ...). A thin fetcher maps each https address
//! onto that tree and clones it with the libgit2 fetcher.

use depmirror::fetch::{FetchConfig, FetchedRepo, GitFetcher, RepositoryFetcher, head_commit};
use depmirror::lock::{LOCK_FILE, MirrorLock};
use depmirror::{Address, DependencyWalker, MirrorError};
use git2::{Repository, Signature};
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

struct LocalGitFetcher {
    sources: PathBuf,
    inner: GitFetcher,
    clones: Cell<usize>,
}

impl LocalGitFetcher {
    fn new(sources: &Path) -> Self {
        Self {
            sources: sources.to_path_buf(),
            inner: GitFetcher::new(FetchConfig {
                show_progress: false,
                ..FetchConfig::default()
            }),
            clones: Cell::new(0),
        }
    }
}

impl RepositoryFetcher for LocalGitFetcher {
    fn fetch(&self, address: &Address, target: &Path) -> depmirror::Result<FetchedRepo> {
        self.clones.set(self.clones.get() + 1);
        let source = self.sources.join(address.without_scheme());
        let repo = self
            .inner
            .clone_url(&source.to_string_lossy(), target)
            .map_err(|err| MirrorError::Fetch {
                address: address.to_string(),
                source: err,
            })?;
        Ok(FetchedRepo {
            path: target.to_path_buf(),
            head: head_commit(&repo),
        })
    }
}

/// Create a committed repository at `<sources>/<module>` requiring `requires`.
fn source_repo(sources: &Path, module: &str, requires: &[&str]) -> String {
    let dir = sources.join(module);
    fs::create_dir_all(&dir).unwrap();
    let repo = Repository::init(&dir).unwrap();

    let mut go_mod = format!("module {module}\n\ngo 1.21\n");
    if !requires.is_empty() {
        go_mod.push_str("\nrequire (\n");
        for req in requires {
            go_mod.push_str(&format!("\t{req} v1.2.3\n"));
        }
        go_mod.push_str(")\n");
    }
    fs::write(dir.join("go.mod"), go_mod).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new("go.mod")).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = Signature::now("Mirror Test", "mirror@example.com").unwrap();
    repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
        .unwrap()
        .to_string()
}

fn scratch() -> (TempDir, TempDir) {
    (tempdir().unwrap(), tempdir().unwrap())
}

#[test]
fn test_mirrors_root_and_two_dependencies() {
    let (sources, mirror) = scratch();
    let root_head = source_repo(
        sources.path(),
        "example.com/root",
        &["example.com/liba", "example.com/libb"],
    );
    source_repo(sources.path(), "example.com/liba", &["example.com/leaf"]);
    source_repo(sources.path(), "example.com/libb", &[]);
    source_repo(sources.path(), "example.com/leaf", &[]);

    let walker = DependencyWalker::new(mirror.path(), LocalGitFetcher::new(sources.path()));
    let report = walker.fetch_and_walk(&Address::parse("https://example.com/root").unwrap());

    assert!(report.is_clean(), "failures: {:?}", report.failed);
    assert_eq!(walker.fetcher().clones.get(), 4);
    for module in ["root", "liba", "libb", "leaf"] {
        assert!(
            mirror.path().join("example.com").join(module).join("go.mod").is_file(),
            "{module} not mirrored"
        );
    }

    let order: Vec<String> = report.fetched.iter().map(|r| r.address.to_string()).collect();
    assert_eq!(
        order,
        vec![
            "https://example.com/root",
            "https://example.com/liba",
            "https://example.com/leaf",
            "https://example.com/libb",
        ]
    );
    assert_eq!(report.fetched[0].head.as_deref(), Some(root_head.as_str()));
}

#[test]
fn test_cycle_between_real_repositories_terminates() {
    let (sources, mirror) = scratch();
    source_repo(sources.path(), "example.com/a", &["example.com/b"]);
    source_repo(sources.path(), "example.com/b", &["example.com/a"]);

    let walker = DependencyWalker::new(mirror.path(), LocalGitFetcher::new(sources.path()));
    let report = walker.fetch_and_walk(&Address::parse("https://example.com/a").unwrap());

    assert_eq!(walker.fetcher().clones.get(), 2);
    assert_eq!(report.fetched.len(), 2);
    assert_eq!(report.skipped, 1);
    assert!(report.is_clean());
}

#[test]
fn test_http_root_required_back_over_https_is_not_recloned() {
    let (sources, mirror) = scratch();
    source_repo(sources.path(), "example.com/a", &["example.com/b"]);
    source_repo(sources.path(), "example.com/b", &["example.com/a"]);

    let walker = DependencyWalker::new(mirror.path(), LocalGitFetcher::new(sources.path()));
    let report = walker.fetch_and_walk(&Address::parse("http://example.com/a").unwrap());

    assert_eq!(walker.fetcher().clones.get(), 2);
    assert_eq!(report.skipped, 1);
    assert!(report.is_clean(), "failures: {:?}", report.failed);
}

#[test]
fn test_unreachable_dependency_is_local_to_its_branch() {
    let (sources, mirror) = scratch();
    source_repo(
        sources.path(),
        "example.com/root",
        &["example.com/gone", "example.com/here"],
    );
    source_repo(sources.path(), "example.com/here", &[]);

    let walker = DependencyWalker::new(mirror.path(), LocalGitFetcher::new(sources.path()));
    let report = walker.fetch_and_walk(&Address::parse("https://example.com/root").unwrap());

    assert!(report.root_fetched());
    assert_eq!(report.failed.len(), 1);
    assert!(mirror.path().join("example.com/here/go.mod").is_file());
    // The directory chain for the failed dependency is left behind.
    assert!(mirror.path().join("example.com/gone").is_dir());
}

#[test]
fn test_lock_records_every_mirrored_repository() {
    let (sources, mirror) = scratch();
    source_repo(sources.path(), "example.com/root", &["example.com/dep"]);
    let dep_head = source_repo(sources.path(), "example.com/dep", &[]);

    let walker = DependencyWalker::new(mirror.path(), LocalGitFetcher::new(sources.path()));
    let report = walker.fetch_and_walk(&Address::parse("https://example.com/root").unwrap());

    let lock_path = mirror.path().join(LOCK_FILE);
    MirrorLock::from_report(&report).save(&lock_path).unwrap();

    let lock: MirrorLock = toml::from_str(&fs::read_to_string(&lock_path).unwrap()).unwrap();
    assert_eq!(lock.repositories.len(), 2);
    assert_eq!(
        lock.get("https://example.com/dep").unwrap().rev.as_deref(),
        Some(dep_head.as_str())
    );
}
