//! Repository fetching.
//!
//! The traversal only needs something that can materialize an [`Address`] at
//! a path; [`RepositoryFetcher`] is that seam. [`GitFetcher`] is the real
//! implementation: a libgit2 clone (submodules included) whose transport is
//! configured per fetcher through [`FetchConfig`], never process-wide.

use crate::address::Address;
use crate::error::{MirrorError, Result};
use colored::*;
use git2::build::RepoBuilder;
use git2::{
    CertificateCheckStatus, FetchOptions, ProxyOptions, RemoteCallbacks, RemoteRedirect,
    Repository, SubmoduleUpdateOptions,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Transfer timeout applied when a proxy is configured.
pub const PROXY_TIMEOUT: Duration = Duration::from_secs(15);

/// Submodule nesting followed by default.
pub const DEFAULT_SUBMODULE_DEPTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySettings {
    pub url: String,
    pub timeout: Duration,
}

impl ProxySettings {
    /// Validate `address` as an absolute proxy URL with a host.
    pub fn parse(address: &str) -> Result<Self> {
        let invalid = |reason: String| MirrorError::InvalidProxy {
            address: address.to_string(),
            reason,
        };
        let parsed = url::Url::parse(address.trim()).map_err(|e| invalid(e.to_string()))?;
        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host".to_string()));
        }
        Ok(Self {
            url: parsed.to_string(),
            timeout: PROXY_TIMEOUT,
        })
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Route through this proxy, skip certificate checks, refuse redirects
    /// and bound each transfer by the proxy timeout.
    pub proxy: Option<ProxySettings>,
    pub submodule_depth: usize,
    pub show_progress: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            submodule_depth: DEFAULT_SUBMODULE_DEPTH,
            show_progress: true,
        }
    }
}

/// A repository materialized on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedRepo {
    pub path: PathBuf,
    /// Commit checked out at HEAD, if the repository has one.
    pub head: Option<String>,
}

pub trait RepositoryFetcher {
    /// Materialize `address` at `target`, which already exists.
    fn fetch(&self, address: &Address, target: &Path) -> Result<FetchedRepo>;
}

pub struct GitFetcher {
    config: FetchConfig,
}

impl GitFetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }

    /// Clone `url` into `target` and bring its submodules up to date.
    ///
    /// `url` may be anything libgit2 can clone from, including a local path.
    pub fn clone_url(
        &self,
        url: &str,
        target: &Path,
    ) -> std::result::Result<Repository, git2::Error> {
        let mut builder = RepoBuilder::new();
        builder.fetch_options(self.fetch_options());
        let repo = builder.clone(url, target)?;
        self.update_submodules(&repo, self.config.submodule_depth)?;
        Ok(repo)
    }

    fn fetch_options(&self) -> FetchOptions<'static> {
        let mut callbacks = RemoteCallbacks::new();
        let mut proxy_opts = ProxyOptions::new();
        let mut fetch_opts = FetchOptions::new();

        match &self.config.proxy {
            Some(proxy) => {
                proxy_opts.url(&proxy.url);
                callbacks
                    .certificate_check(|_cert, _host| Ok(CertificateCheckStatus::CertificateOk));
                let started = Instant::now();
                let timeout = proxy.timeout;
                // Returning false aborts the transfer.
                callbacks.transfer_progress(move |_stats| started.elapsed() <= timeout);
                fetch_opts.follow_redirects(RemoteRedirect::None);
            }
            None => {
                proxy_opts.auto();
            }
        }

        fetch_opts.remote_callbacks(callbacks);
        fetch_opts.proxy_options(proxy_opts);
        fetch_opts
    }

    fn update_submodules(
        &self,
        repo: &Repository,
        depth: usize,
    ) -> std::result::Result<(), git2::Error> {
        if depth == 0 {
            return Ok(());
        }
        for mut submodule in repo.submodules()? {
            let mut opts = SubmoduleUpdateOptions::new();
            opts.fetch(self.fetch_options());
            submodule.update(true, Some(&mut opts))?;
            let nested = submodule.open()?;
            self.update_submodules(&nested, depth - 1)?;
        }
        Ok(())
    }

    fn spinner(&self, address: &Address) -> Option<ProgressBar> {
        if !self.config.show_progress {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.blue} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Cloning {}...", address));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }
}

impl RepositoryFetcher for GitFetcher {
    fn fetch(&self, address: &Address, target: &Path) -> Result<FetchedRepo> {
        tracing::info!(%address, target = %target.display(), "git clone");
        let pb = self.spinner(address);

        let result = self.clone_url(address.as_str(), target);
        match result {
            Ok(repo) => {
                if let Some(pb) = pb {
                    pb.finish_with_message(format!("{} Cloned {}", "✓".green(), address));
                }
                Ok(FetchedRepo {
                    path: target.to_path_buf(),
                    head: head_commit(&repo),
                })
            }
            Err(source) => {
                if let Some(pb) = pb {
                    pb.finish_with_message(format!("{} Failed {}", "x".red(), address));
                }
                Err(MirrorError::Fetch {
                    address: address.to_string(),
                    source,
                })
            }
        }
    }
}

pub fn head_commit(repo: &Repository) -> Option<String> {
    let head = repo.head().ok()?;
    let commit = head.peel_to_commit().ok()?;
    Some(commit.id().to_string())
}
