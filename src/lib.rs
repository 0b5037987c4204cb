//! Bazelisk - a user-friendly launcher for Bazel
//!
//! Resolves the Bazel version a workspace wants, downloads the matching
//! release binary into a per-user cache on first use, and execs it with
//! the caller's arguments, forwarding the exit status.

pub mod cache;
pub mod config;
pub mod error;
pub mod launcher;
pub mod platform;
pub mod version;

pub use error::{BazeliskError, BazeliskResult};
