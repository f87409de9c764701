//! Example program for the `optree` command framework.
//!
//! Three levels are declared: the root (`--version`, `--debug`, `--color`),
//! `cat`, which prints files, and `version`, which has a listed `only`
//! subcommand and an unlisted `hidden` one.

mod cat;
mod common;
mod root;
mod sprinkles;
mod version;

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `OPTREE_LOG=debug`.
const LOG_ENV: &str = "OPTREE_LOG";

fn main() -> ExitCode {
    init_tracing();
    let mut root = root::root();
    optree_core::run_with(&mut root, optree_term::term_context().build())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
