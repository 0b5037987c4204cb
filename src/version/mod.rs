//! Version resolution
//!
//! Two stages: first an ordered chain of [`sources::VersionSource`]s
//! decides *which* version the user wants (possibly the symbolic label
//! "latest"), then [`resolve_spec`] turns that spec into a concrete
//! [`ResolvedVersion`]. Only the "latest" label needs the network; a
//! pinned spec passes through untouched and unvalidated.

pub mod sources;

use crate::config::Config;
use crate::error::{BazeliskError, BazeliskResult};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Symbolic label for the newest published release
pub const LATEST: &str = "latest";

/// A concrete, non-symbolic version identifier.
///
/// Only produced by [`resolve_spec`], so downstream code never sees
/// "latest" or any other symbolic label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion(String);

impl ResolvedVersion {
    pub(crate) fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResolvedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decide which version spec to use.
///
/// Walks the source chain in precedence order and takes the first
/// opinion. The chain ends in an unconditional "latest" fallback, so an
/// exhausted chain means a source was removed without a replacement.
pub fn decide_spec(workspace_dir: &Path) -> BazeliskResult<String> {
    for source in sources::default_chain(workspace_dir) {
        if let Some(spec) = source.pick()? {
            debug!(source = source.name(), spec = %spec, "version spec selected");
            return Ok(spec);
        }
    }
    Err(BazeliskError::UnresolvedVersionSource {
        origin: "every version source abstained".to_string(),
    })
}

/// Resolve a version spec to a concrete version.
pub fn resolve_spec(config: &Config, spec: &str) -> BazeliskResult<ResolvedVersion> {
    if spec != LATEST {
        return Ok(ResolvedVersion::new(spec));
    }

    let url = &config.latest_url;
    debug!(%url, "resolving latest release");
    let response = config
        .probe_agent()
        .get(url.as_str())
        .call()
        .map_err(|e| BazeliskError::fetch(url, e))?;

    let target = response
        .headers()
        .get("location")
        .ok_or_else(|| BazeliskError::LatestResolve {
            url: url.clone(),
            reason: "release index did not redirect to a tagged release".to_string(),
        })?
        .to_str()
        .map_err(|_| BazeliskError::LatestResolve {
            url: url.clone(),
            reason: "redirect target is not valid UTF-8".to_string(),
        })?
        .to_string();

    let version = version_from_redirect(&target).ok_or_else(|| BazeliskError::LatestResolve {
        url: url.clone(),
        reason: format!("unexpected redirect target '{target}'"),
    })?;
    debug!(version, "latest release resolved");
    Ok(ResolvedVersion::new(version))
}

/// Extract the version from a `.../releases/tag/{version}` redirect target.
fn version_from_redirect(target: &str) -> Option<&str> {
    let version = target.trim_end_matches('/').rsplit('/').next()?;
    if target.contains("/releases/tag/") && !version.is_empty() {
        Some(version)
    } else {
        None
    }
}
