//! Runtime configuration for Bazelisk
//!
//! There is no configuration file; everything comes from a handful of
//! environment variables with sensible defaults. The resulting `Config`
//! is built once in `main` and threaded explicitly through the pipeline,
//! which is also what makes the cache location and release endpoints
//! swappable in tests.

use crate::error::{BazeliskError, BazeliskResult};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use ureq::Agent;

/// Release store the binaries are downloaded from
pub const DEFAULT_BASE_URL: &str = "https://releases.bazel.build";

/// Release index probed when the requested version is "latest"
pub const DEFAULT_LATEST_URL: &str = "https://github.com/bazelbuild/bazel/releases/latest";

const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 120;

/// Resolved runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory the downloaded binaries live in (flat layout)
    pub cache_dir: PathBuf,
    /// Base URL of the release store
    pub base_url: String,
    /// URL of the release index used for "latest" resolution
    pub latest_url: String,
    /// Deadline for each HTTP call; `None` means unbounded
    pub fetch_timeout: Option<Duration>,
}

impl Config {
    /// Build the configuration from the process environment.
    ///
    /// `BAZELISK_HOME` overrides the cache root (default `~/.bazelisk`),
    /// `BAZELISK_BASE_URL` overrides the release store,
    /// `BAZELISK_LATEST_URL` overrides the release index, and
    /// `BAZELISK_FETCH_TIMEOUT_SECS` bounds each HTTP call (0 disables
    /// the deadline).
    pub fn from_env() -> BazeliskResult<Self> {
        let root = match env::var_os("BAZELISK_HOME") {
            Some(home) => PathBuf::from(home),
            None => dirs::home_dir()
                .ok_or(BazeliskError::HomeDirNotFound)?
                .join(".bazelisk"),
        };

        let base_url = env::var("BAZELISK_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let latest_url =
            env::var("BAZELISK_LATEST_URL").unwrap_or_else(|_| DEFAULT_LATEST_URL.to_string());

        let fetch_timeout = match env::var("BAZELISK_FETCH_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.parse().map_err(|_| BazeliskError::InvalidEnvVar {
                    var: "BAZELISK_FETCH_TIMEOUT_SECS".to_string(),
                    value: raw.clone(),
                })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            Err(_) => Some(Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS)),
        };

        let config = Self {
            cache_dir: root.join("bin"),
            base_url,
            latest_url,
            fetch_timeout,
        };
        debug!(cache_dir = %config.cache_dir.display(), base_url = %config.base_url, "configuration resolved");
        Ok(config)
    }

    /// HTTP agent for artifact downloads (follows redirects)
    pub fn http_agent(&self) -> Agent {
        Agent::config_builder()
            .timeout_global(self.fetch_timeout)
            .build()
            .new_agent()
    }

    /// HTTP agent for the release-index probe.
    ///
    /// Redirects are not followed: the probe reads the `Location` target
    /// of the index response instead of the page it points at.
    pub fn probe_agent(&self) -> Agent {
        Agent::config_builder()
            .timeout_global(self.fetch_timeout)
            .max_redirects(0)
            .max_redirects_will_error(false)
            .build()
            .new_agent()
    }
}
