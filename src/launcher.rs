//! Orchestration: resolve, install, exec
//!
//! The pipeline runs strictly downstream: platform detection, version
//! decision, version resolution, cache population, then exec. The
//! child's exit status becomes our own; its output is never inspected.

use crate::cache;
use crate::config::Config;
use crate::error::{BazeliskError, BazeliskResult};
use crate::platform::Platform;
use crate::version;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::process::{Command, ExitStatus};
use tracing::debug;

/// Run the wrapped tool, forwarding `args` verbatim.
///
/// Returns the child's exit code.
pub fn run(config: &Config, args: &[OsString]) -> BazeliskResult<i32> {
    // Platform validation comes first so an unsupported machine fails
    // before any network access.
    let platform = Platform::detect()?;

    let cwd = env::current_dir().map_err(|e| BazeliskError::io("determining current directory", e))?;
    let spec = version::decide_spec(&cwd)?;
    let resolved = version::resolve_spec(config, &spec)?;
    debug!(version = %resolved, "using bazel version");

    fs::create_dir_all(&config.cache_dir).map_err(|e| {
        BazeliskError::io(
            format!("creating cache directory {}", config.cache_dir.display()),
            e,
        )
    })?;
    let bazel = cache::ensure_installed(config, &platform, &resolved)?;

    debug!(path = %bazel.display(), "launching bazel");
    let status = Command::new(&bazel)
        .args(args)
        .status()
        .map_err(|e| BazeliskError::Launch {
            path: bazel.clone(),
            source: e,
        })?;
    exit_code(status)
}

/// Map a child exit status to the code this process should exit with.
///
/// On Unix a signal-terminated child maps to the conventional
/// 128 + signal number.
fn exit_code(status: ExitStatus) -> BazeliskResult<i32> {
    if let Some(code) = status.code() {
        return Ok(code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Ok(128 + signal);
        }
    }
    Err(BazeliskError::ProcessSignaled)
}
