//! # depmirror CLI Entry Point
//!
//! ```text
//! depmirror <repository-address> <root-directory> [<proxy-address>]
//! ```

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::*;
use std::path::PathBuf;

use depmirror::Address;
use depmirror::config::Settings;
use depmirror::fetch::{FetchConfig, GitFetcher, ProxySettings};
use depmirror::lock::{LOCK_FILE, MirrorLock};
use depmirror::logging;
use depmirror::manifest::DEFAULT_MANIFEST;
use depmirror::walker::DependencyWalker;

#[derive(Parser)]
#[command(name = "depmirror")]
#[command(about = "Mirror a Go module repository and everything it requires", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
struct Cli {
    /// Repository to mirror (http:// or https://)
    address: Address,
    /// Directory the mirror tree is created under
    root: PathBuf,
    /// Proxy for the HTTP(S) transport
    #[arg(value_name = "PROXY")]
    proxy: Option<String>,
    /// Proxy for the HTTP(S) transport (same as the positional argument)
    #[arg(long = "proxy", value_name = "URL", conflicts_with = "proxy")]
    proxy_flag: Option<String>,
    /// Settings file [default: ./depmirror.toml if present]
    #[arg(long)]
    config: Option<PathBuf>,
    /// Manifest file name read from each repository [default: go.mod]
    #[arg(long)]
    manifest: Option<String>,
    /// Write depmirror.lock into the root directory
    #[arg(long)]
    lock: bool,
    /// How deep to follow nested submodules [default: 10]
    #[arg(long)]
    submodule_depth: Option<usize>,
    /// Disable the clone spinner
    #[arg(long)]
    no_progress: bool,
    /// Show debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let cwd = std::env::current_dir().context("Could not determine current directory")?;
    let settings = Settings::discover(cli.config.as_deref(), &cwd)?;

    let proxy = cli
        .proxy_flag
        .clone()
        .or_else(|| cli.proxy.clone())
        .or_else(|| settings.proxy.clone())
        .and_then(|raw| match ProxySettings::parse(&raw) {
            Ok(proxy) => {
                println!("{} Using proxy {}", "ℹ".blue(), proxy.url);
                Some(proxy)
            }
            Err(err) => {
                println!("{} Can't set custom proxy settings: {}", "!".yellow(), err);
                None
            }
        });

    let fetch_config = FetchConfig {
        proxy,
        submodule_depth: cli
            .submodule_depth
            .or(settings.submodule_depth)
            .unwrap_or(depmirror::fetch::DEFAULT_SUBMODULE_DEPTH),
        show_progress: !cli.no_progress && settings.progress.unwrap_or(true),
    };
    let manifest = cli
        .manifest
        .clone()
        .or_else(|| settings.manifest.clone())
        .unwrap_or_else(|| DEFAULT_MANIFEST.to_string());

    println!("{} git clone {}", "📦".blue(), cli.address.to_string().bold());

    let walker =
        DependencyWalker::new(&cli.root, GitFetcher::new(fetch_config)).with_manifest(manifest);
    let report = walker.fetch_and_walk(&cli.address);
    report.print_summary();

    if cli.lock || settings.lock.unwrap_or(false) {
        let lock_path = cli.root.join(LOCK_FILE);
        MirrorLock::from_report(&report)
            .save(&lock_path)
            .with_context(|| format!("Failed to write {}", lock_path.display()))?;
        println!("{} Wrote {}", "✓".green(), lock_path.display());
    }

    if !report.root_fetched() {
        bail!("could not fetch {}", cli.address);
    }
    Ok(())
}
