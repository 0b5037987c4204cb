//! Version source chain
//!
//! Each source inspects the ambient environment and either produces a
//! version spec or abstains with `Ok(None)`. The chain is tried in
//! precedence order:
//!
//! 1. `USE_NIGHTLY_BAZEL` / `USE_BAZEL_NIGHTLY` — nightly channel
//! 2. `USE_CANARY_BAZEL` / `USE_BAZEL_CANARY` — release-candidate channel
//! 3. a `.bazelversion` file in the workspace root
//! 4. the symbolic fallback "latest"
//!
//! The channel sources have no resolver behind them yet, so selecting
//! one fails with `UnresolvedVersionSource` rather than silently
//! falling through to a release the user did not ask for.

use crate::error::{BazeliskError, BazeliskResult};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A single strategy for picking a version spec.
///
/// `Ok(None)` means "no opinion"; the chain moves on to the next source.
pub trait VersionSource {
    /// Name used in logs and error messages
    fn name(&self) -> &'static str;

    /// Produce a version spec, abstain, or fail
    fn pick(&self) -> BazeliskResult<Option<String>>;
}

/// Default source chain, highest precedence first
pub fn default_chain(workspace_dir: &Path) -> Vec<Box<dyn VersionSource>> {
    vec![
        Box::new(EnvChannel::nightly()),
        Box::new(EnvChannel::canary()),
        Box::new(WorkspaceVersionFile::new(workspace_dir)),
        Box::new(FallbackLatest),
    ]
}

/// Release-channel selection via environment variables.
///
/// TODO: resolve the nightly and release-candidate indexes; until then
/// selecting a channel fails loudly.
pub struct EnvChannel {
    channel: &'static str,
    vars: [&'static str; 2],
}

impl EnvChannel {
    pub fn nightly() -> Self {
        Self {
            channel: "nightly channel",
            vars: ["USE_NIGHTLY_BAZEL", "USE_BAZEL_NIGHTLY"],
        }
    }

    pub fn canary() -> Self {
        Self {
            channel: "canary channel",
            vars: ["USE_CANARY_BAZEL", "USE_BAZEL_CANARY"],
        }
    }
}

impl VersionSource for EnvChannel {
    fn name(&self) -> &'static str {
        self.channel
    }

    fn pick(&self) -> BazeliskResult<Option<String>> {
        if self.vars.iter().any(|var| env::var_os(var).is_some()) {
            return Err(BazeliskError::UnresolvedVersionSource {
                origin: self.channel.to_string(),
            });
        }
        Ok(None)
    }
}

/// Version pinned by a `.bazelversion` file in the workspace root.
///
/// The workspace root is the nearest ancestor of the starting directory
/// that contains a `WORKSPACE` or `.bazelversion` file.
pub struct WorkspaceVersionFile {
    start_dir: PathBuf,
}

impl WorkspaceVersionFile {
    pub fn new(start_dir: impl Into<PathBuf>) -> Self {
        Self {
            start_dir: start_dir.into(),
        }
    }
}

impl VersionSource for WorkspaceVersionFile {
    fn name(&self) -> &'static str {
        ".bazelversion"
    }

    fn pick(&self) -> BazeliskResult<Option<String>> {
        let Some(root) = find_workspace_root(&self.start_dir) else {
            return Ok(None);
        };
        let path = root.join(".bazelversion");
        if !path.is_file() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| BazeliskError::io(format!("reading {}", path.display()), e))?;
        let version = content.lines().next().unwrap_or("").trim();
        if version.is_empty() {
            debug!(path = %path.display(), "empty .bazelversion, ignoring");
            return Ok(None);
        }
        Ok(Some(version.to_string()))
    }
}

fn find_workspace_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join("WORKSPACE").is_file() || dir.join(".bazelversion").is_file())
        .map(Path::to_path_buf)
}

/// Terminal fallback: always asks for the newest release
pub struct FallbackLatest;

impl VersionSource for FallbackLatest {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn pick(&self) -> BazeliskResult<Option<String>> {
        Ok(Some(super::LATEST.to_string()))
    }
}
