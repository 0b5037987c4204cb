//! Platform detection and release artifact naming
//!
//! A release artifact is identified by `bazel-{version}-{os}-{arch}`.
//! The supported set mirrors what the release store actually publishes:
//! x86_64 binaries for Linux, macOS (named "darwin") and Windows.

use crate::error::{BazeliskError, BazeliskResult};
use crate::version::ResolvedVersion;
use std::env;
use std::fmt;

/// Architectures the release store publishes binaries for.
///
/// A single entry today; broadening support is one edit here.
pub const SUPPORTED_ARCHS: &[&str] = &["x86_64"];

/// Operating systems with published release binaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Linux,
    Darwin,
    Windows,
}

impl Os {
    /// Parse an OS name, case-insensitively.
    ///
    /// Accepts both the release-store spelling ("darwin") and the Rust
    /// `std::env::consts::OS` spelling ("macos") for macOS.
    pub fn parse(name: &str) -> BazeliskResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "linux" => Ok(Self::Linux),
            "darwin" | "macos" => Ok(Self::Darwin),
            "windows" => Ok(Self::Windows),
            other => Err(BazeliskError::UnsupportedOs(other.to_string())),
        }
    }

    /// Lower-case name as it appears in artifact filenames
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Windows => "windows",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The (architecture, operating system) pair of the running machine.
///
/// Detected once at startup and immutable afterwards; construction
/// fails for anything outside the supported set, before any version
/// resolution or network access happens.
#[derive(Debug, Clone)]
pub struct Platform {
    arch: String,
    os: Os,
}

impl Platform {
    /// Detect the current platform from the runtime environment
    pub fn detect() -> BazeliskResult<Self> {
        Self::from_parts(env::consts::ARCH, env::consts::OS)
    }

    /// Validate an (architecture, OS) pair
    pub fn from_parts(arch: &str, os: &str) -> BazeliskResult<Self> {
        if !SUPPORTED_ARCHS.contains(&arch) {
            return Err(BazeliskError::UnsupportedArchitecture(arch.to_string()));
        }
        Ok(Self {
            arch: arch.to_string(),
            os: Os::parse(os)?,
        })
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }

    pub fn os(&self) -> Os {
        self.os
    }

    /// Canonical artifact filename for a release on this platform.
    ///
    /// Pure function of its inputs; the same (version, platform) pair
    /// always yields the same name.
    pub fn artifact_filename(&self, version: &ResolvedVersion) -> String {
        format!("bazel-{}-{}-{}", version, self.os.as_str(), self.arch)
    }
}
