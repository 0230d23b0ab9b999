//! Diagnostic logging on stderr.
//!
//! stdout carries only the weather report, so every event goes to stderr.
//! `RUST_LOG` takes precedence over the `--verbose` default.

use tracing_subscriber::EnvFilter;

pub fn init(verbose: bool) {
    let default = if verbose { "warn,wx=debug,wx_core=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .without_time()
        .init();
}
