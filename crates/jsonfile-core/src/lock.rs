//! Advisory sidecar file lock
//!
//! A document at `path` is guarded by `path.lock`. Creating that file with
//! create-exclusive semantics acquires the lock; deleting it releases it. The
//! content is irrelevant. Processes that ignore the protocol are not stopped.
//!
//! The lock is not reentrant: acquiring it again while already holding it
//! waits for the full budget and then fails with [`Error::LockTimeout`].
//!
//! A process that dies while holding the lock leaves the file behind, and
//! every later acquisition times out until it is removed by hand.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Suffix appended to a document path to name its lock file
pub const LOCK_SUFFIX: &str = ".lock";

/// Polling budget for lock acquisition
///
/// Acquisition gives up at whichever limit is reached first: total `wait`
/// time or `retries` failed polls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockOptions {
    /// Total time to keep polling
    pub wait: Duration,
    /// Maximum number of polls after the first attempt
    pub retries: u32,
    /// Delay between polls
    pub poll_interval: Duration,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            wait: Duration::from_millis(5000),
            retries: 500,
            poll_interval: Duration::from_millis(50),
        }
    }
}

impl LockOptions {
    /// A budget bounded by `wait` alone
    ///
    /// `retries` is set high enough that polling every `poll_interval` never
    /// runs out before `wait` does.
    pub fn timed(wait: Duration, poll_interval: Duration) -> Self {
        let polls = wait.as_millis() / poll_interval.as_millis().max(1);
        Self {
            wait,
            retries: u32::try_from(polls.saturating_add(1)).unwrap_or(u32::MAX),
            poll_interval,
        }
    }
}

/// Get the sidecar lock path for a document
pub fn lock_path_for(document: &Path) -> PathBuf {
    let mut name = OsString::from(document.as_os_str());
    name.push(LOCK_SUFFIX);
    PathBuf::from(name)
}

/// A held lock; the lock file is removed when this is dropped
#[derive(Debug)]
pub struct FileLock {
    path: PathBuf,
    released: bool,
}

impl FileLock {
    /// Acquire the lock at `lock_path`, polling until the budget runs out
    pub fn acquire(lock_path: impl Into<PathBuf>, options: &LockOptions) -> Result<Self> {
        let path = lock_path.into();
        let started = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => {
                    debug!(lock = ?path, attempts, "lock acquired");
                    return Ok(Self {
                        path,
                        released: false,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    let waited = started.elapsed();
                    if attempts > options.retries || waited >= options.wait {
                        return Err(Error::LockTimeout {
                            lock_path: path,
                            attempts,
                            waited,
                        });
                    }
                    thread::sleep(options.poll_interval);
                }
                Err(e) => {
                    return Err(Error::Lock {
                        lock_path: path,
                        source: e,
                    })
                }
            }
        }
    }

    /// Acquire the lock guarding `document`
    pub fn acquire_for(document: &Path, options: &LockOptions) -> Result<Self> {
        Self::acquire(lock_path_for(document), options)
    }

    /// Path of the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock
    ///
    /// Safe to call more than once; a lock file that is already gone counts
    /// as released.
    pub fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }

        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(lock = ?self.path, "lock file already removed");
            }
            Err(e) => {
                return Err(Error::Unlock {
                    lock_path: self.path.clone(),
                    source: e,
                })
            }
        }

        self.released = true;
        debug!(lock = ?self.path, "lock released");
        Ok(())
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(error = %e, "failed to release lock on drop");
        }
    }
}
