//! File-based mutual exclusion for manifest access.
//!
//! The lock is a zero-byte marker at `<manifest>.lock`, taken with an
//! exclusive create and polled until a caller-supplied timeout. A marker
//! older than the staleness threshold is treated as abandoned by a crashed
//! holder and reclaimed. Advisory only, single machine; filesystems without
//! atomic create-exclusive semantics (some network mounts) are a known
//! limitation and not handled.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{Result, SkdError};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const STALE_AFTER: Duration = Duration::from_secs(30);

/// A lock for one manifest file. Not reentrant; callers must serialize
/// access within a process.
#[derive(Debug)]
pub struct ManifestLock {
    path: PathBuf,
    stale_after: Duration,
}

impl ManifestLock {
    /// Lock for the given manifest path; the marker lives at
    /// `<manifest>.lock`.
    #[must_use]
    pub fn new(manifest_path: &Path) -> Self {
        let mut name = manifest_path.as_os_str().to_os_string();
        name.push(".lock");
        Self {
            path: PathBuf::from(name),
            stale_after: STALE_AFTER,
        }
    }

    /// Override the staleness threshold.
    #[must_use]
    pub const fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    /// The marker file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Try to take the lock, polling until `timeout` elapses.
    ///
    /// The returned guard releases the marker on drop.
    pub fn acquire(&self, timeout: Duration) -> Result<LockGuard<'_>> {
        let deadline = Instant::now() + timeout;

        loop {
            match OpenOptions::new().write(true).create_new(true).open(&self.path) {
                Ok(_) => {
                    debug!(path = %self.path.display(), "acquired manifest lock");
                    return Ok(LockGuard { lock: self });
                }
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {}
                Err(err) => return Err(err.into()),
            }

            if Instant::now() > deadline {
                return Err(SkdError::LockTimeout(format!(
                    "could not acquire {} within {timeout:?}",
                    self.path.display()
                )));
            }

            if self.is_stale() {
                debug!(path = %self.path.display(), "removing stale manifest lock");
                let _ = std::fs::remove_file(&self.path);
                continue;
            }

            std::thread::sleep(POLL_INTERVAL);
        }
    }

    fn is_stale(&self) -> bool {
        std::fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|mtime| mtime.elapsed().ok())
            .is_some_and(|age| age > self.stale_after)
    }

    fn release(&self) {
        // Best effort; a missing marker is not a failure.
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Holds the lock; releases it on drop.
#[derive(Debug)]
pub struct LockGuard<'a> {
    lock: &'a ManifestLock,
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.lock.release();
    }
}
