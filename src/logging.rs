//! Diagnostic logging.
//!
//! Progress meant for the user goes to stdout with `println!`. This sets up
//! `tracing` on stderr for everything else; `RUST_LOG` overrides the level.

use tracing_subscriber::EnvFilter;

pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "depmirror=debug" } else { "depmirror=warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Fails only when a global subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
