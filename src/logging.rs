//! Logging setup
//!
//! Diagnostics go to stderr through `tracing` so that stdout stays clean for
//! piping. `RUST_LOG` takes precedence over the `-v` / `-q` flags.

use tracing_subscriber::{fmt, EnvFilter};

/// Default filter directive for the given verbosity flags
pub fn default_directive(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "kitq=debug"
    } else {
        "warn"
    }
}

/// Initialize the global subscriber
///
/// Safe to call more than once; later calls are ignored.
pub fn init(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .without_time()
        .try_init();
}
