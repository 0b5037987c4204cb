//! Error types for Bazelisk
//!
//! All modules use `BazeliskResult<T>` as their return type. No layer
//! catches errors from a lower layer; everything propagates to `main`,
//! which prints the message (and a hint, when one exists) and exits
//! non-zero.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Bazelisk operations
pub type BazeliskResult<T> = Result<T, BazeliskError>;

/// All errors that can occur in Bazelisk
#[derive(Error, Debug)]
pub enum BazeliskError {
    // Platform errors
    #[error("unsupported machine architecture '{0}'; Bazel releases are currently built for x86_64 only")]
    UnsupportedArchitecture(String),

    #[error("unsupported operating system '{0}'; Bazel releases cover Linux, macOS and Windows")]
    UnsupportedOs(String),

    // Version resolution errors
    #[error("version source '{origin}' is selected but not implemented")]
    UnresolvedVersionSource { origin: String },

    #[error("could not determine the latest Bazel release from {url}: {reason}")]
    LatestResolve { url: String, reason: String },

    #[error("invalid value '{value}' for {var}")]
    InvalidEnvVar { var: String, value: String },

    #[error("home directory could not be determined")]
    HomeDirNotFound,

    // Network errors
    #[error("failed to fetch {url}")]
    Fetch {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("failed to launch {path}")]
    Launch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bazel terminated without an exit code")]
    ProcessSignaled,
}

impl BazeliskError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a fetch error for a URL
    pub fn fetch(url: impl Into<String>, source: ureq::Error) -> Self {
        Self::Fetch {
            url: url.into(),
            source: Box::new(source),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::UnresolvedVersionSource { .. } => Some(
                "unset USE_BAZEL_NIGHTLY / USE_BAZEL_CANARY or pin a release in .bazelversion",
            ),
            Self::HomeDirNotFound => Some("set BAZELISK_HOME to choose a cache location"),
            Self::Fetch { .. } => Some("check your network connection and BAZELISK_BASE_URL"),
            _ => None,
        }
    }
}
