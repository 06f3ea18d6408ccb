//! Diagnostics go to stderr so they never interleave with REPL tables.
//!
//! `RUST_LOG` takes precedence over the level passed on the command line.

use std::io;
use tracing_subscriber::EnvFilter;

pub fn init(default_level: &str) -> Result<(), String> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| format!("invalid log level '{}': {}", default_level, e))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| e.to_string())
}
