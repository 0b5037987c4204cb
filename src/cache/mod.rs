//! On-disk artifact cache
//!
//! Downloaded binaries live flat in the cache directory under their
//! canonical artifact filename. A file that exists is a hit and is
//! trusted as-is; there is no checksum or re-validation. Misses are
//! downloaded to a temporary file next to the destination and renamed
//! into place only on full success, so a partial download is never
//! visible under the destination name. A per-destination advisory lock
//! serializes concurrent invocations populating the same entry.

pub mod lock;

use crate::config::Config;
use crate::error::{BazeliskError, BazeliskResult};
use crate::platform::Platform;
use crate::version::ResolvedVersion;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Ensure the binary for `version` is present and executable.
///
/// Returns the path to the cached binary. The executable bit is
/// re-applied on every call, hit or miss.
pub fn ensure_installed(
    config: &Config,
    platform: &Platform,
    version: &ResolvedVersion,
) -> BazeliskResult<PathBuf> {
    let filename = platform.artifact_filename(version);
    let dest = config.cache_dir.join(&filename);

    if dest.is_file() {
        debug!(path = %dest.display(), "cache hit");
    } else {
        let _guard = lock::acquire(&dest)?;
        // A concurrent invocation may have finished while we waited.
        if dest.is_file() {
            debug!(path = %dest.display(), "populated while waiting for lock");
        } else {
            download(config, version, &filename, &dest)?;
        }
    }

    set_executable(&dest)?;
    Ok(dest)
}

fn download(
    config: &Config,
    version: &ResolvedVersion,
    filename: &str,
    dest: &Path,
) -> BazeliskResult<()> {
    let url = format!("{}/{}/release/{}", config.base_url, version, filename);
    info!(%url, "downloading bazel");

    let mut response = config
        .http_agent()
        .get(url.as_str())
        .call()
        .map_err(|e| BazeliskError::fetch(&url, e))?;

    let dir = dest.parent().ok_or_else(|| {
        BazeliskError::io(
            format!("resolving parent of {}", dest.display()),
            io::Error::new(io::ErrorKind::NotFound, "destination has no parent"),
        )
    })?;

    // Same directory as the destination so the final rename stays on
    // one filesystem and is atomic.
    let mut staging = NamedTempFile::new_in(dir)
        .map_err(|e| BazeliskError::io(format!("creating staging file in {}", dir.display()), e))?;
    io::copy(&mut response.body_mut().as_reader(), staging.as_file_mut())
        .map_err(|e| BazeliskError::io(format!("writing {}", dest.display()), e))?;
    staging
        .persist(dest)
        .map_err(|e| BazeliskError::io(format!("installing {}", dest.display()), e.error))?;

    debug!(path = %dest.display(), "download complete");
    Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> BazeliskResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .map_err(|e| BazeliskError::io(format!("marking {} executable", path.display()), e))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> BazeliskResult<()> {
    Ok(())
}
