//! Per-project build locking.
//! One lock file per project under the scratch directory arbitrates
//! cross-process mutual exclusion between concurrent build invocations.
//! Lock files are created lazily and never deleted; removing them could
//! interfere with other processes, so they are left as zero-length markers.

use crate::error::{BuildError, BuildResult};
use fs2::FileExt;
use log::warn;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

/// An exclusive, advisory per-project lock, held for the duration of one
/// build attempt. Released on drop, unconditionally on every exit path.
#[derive(Debug)]
pub struct BuildLock {
    file: File,
    path: PathBuf,
}

impl BuildLock {
    /// Acquires the lock for `project`, retrying on contention.
    ///
    /// Attempts are non-blocking; on contention the caller sleeps for
    /// `poll` and retries until `timeout` is exhausted.
    ///
    /// # Errors
    /// * `BuildError::LockTimeoutError` when the budget runs out with no
    ///   work performed
    pub fn acquire(
        scratch_dir: &Path,
        project: &str,
        timeout: Duration,
        poll: Duration,
    ) -> BuildResult<Self> {
        let path = scratch_dir.join(format!("{}.lock", project));
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&path)
            .map_err(BuildError::IoError)?;

        let start = Instant::now();
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(BuildLock { file, path }),
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    if start.elapsed() >= timeout {
                        return Err(BuildError::LockTimeoutError {
                            project: project.to_string(),
                        });
                    }
                    warn!(
                        "Building for \"{}\" is locked, trying again in {} seconds.",
                        project,
                        poll.as_secs()
                    );
                    thread::sleep(poll);
                }
                Err(e) => return Err(BuildError::IoError(e)),
            }
        }
    }

    /// Path of the lock file marker.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for BuildLock {
    fn drop(&mut self) {
        // Done, or errored. Release the lock either way.
        let _ = FileExt::unlock(&self.file);
    }
}
