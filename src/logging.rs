//! Logging setup
//!
//! Diagnostics go to stderr through `tracing`. Plugin warnings are always shown; `--verbose`
//! adds debug output for resolution, selection and extraction. `CORRAL_LOG` takes an
//! `EnvFilter` directive and overrides both.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Environment variable holding a filter directive, e.g. `corral=trace`
pub const LOG_ENV: &str = "CORRAL_LOG";

fn default_directive(verbose: bool) -> &'static str {
    if verbose { "corral=debug,warn" } else { "warn" }
}

/// Install the global subscriber
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .without_time()
                .with_target(false),
        )
        .try_init();
}
