//! Advisory per-destination lock for cache population
//!
//! Concurrent invocations that both miss the cache would otherwise race
//! on the same destination path. The lock is an exclusively-created
//! `<dest>.lock` file; whoever creates it downloads, everyone else
//! waits and then finds the destination populated.

use crate::error::{BazeliskError, BazeliskResult};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const MAX_WAIT: Duration = Duration::from_secs(300);

/// A lock left over from a crashed process is broken after this age.
const STALE_AFTER: Duration = Duration::from_secs(600);

/// Holds the lock file; removes it on drop
pub struct LockGuard {
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to remove lock file");
        }
    }
}

/// Acquire the advisory lock guarding `dest`.
///
/// Blocks (polling) while another holder exists, up to a bounded wait.
pub fn acquire(dest: &Path) -> BazeliskResult<LockGuard> {
    let path = lock_path(dest);
    let started = Instant::now();

    loop {
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                // Contents are informational only; existence is the lock.
                let _ = writeln!(file, "{}", std::process::id());
                debug!(path = %path.display(), "cache lock acquired");
                return Ok(LockGuard { path });
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                if is_stale(&path) {
                    warn!(path = %path.display(), "breaking stale cache lock");
                    let _ = fs::remove_file(&path);
                    continue;
                }
                if started.elapsed() >= MAX_WAIT {
                    return Err(BazeliskError::io(
                        format!("waiting for cache lock {}", path.display()),
                        io::Error::new(io::ErrorKind::TimedOut, "another download is holding the lock"),
                    ));
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                return Err(BazeliskError::io(
                    format!("creating cache lock {}", path.display()),
                    e,
                ));
            }
        }
    }
}

fn lock_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(".lock");
    PathBuf::from(name)
}

fn is_stale(path: &Path) -> bool {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|modified| modified.elapsed().ok())
        .is_some_and(|age| age > STALE_AFTER)
}
