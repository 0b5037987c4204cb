//! Bazelisk - a user-friendly launcher for Bazel
//!
//! Everything after argv[0] belongs to the wrapped bazel binary; this
//! process parses no flags of its own.

use bazelisk::config::Config;
use bazelisk::launcher;
use console::style;
use std::env;
use std::ffi::OsString;
use tracing_subscriber::EnvFilter;

fn main() {
    // Logging is controlled by BAZELISK_LOG, never by bazel's own args.
    let filter =
        EnvFilter::try_from_env("BAZELISK_LOG").unwrap_or_else(|_| EnvFilter::new("bazelisk=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let args: Vec<OsString> = env::args_os().skip(1).collect();
    let code = match Config::from_env().and_then(|config| launcher::run(&config, &args)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e}", style("Error:").red().bold());
            if let Some(hint) = e.hint() {
                eprintln!("{} {hint}", style("Hint:").yellow());
            }
            1
        }
    };
    std::process::exit(code);
}
