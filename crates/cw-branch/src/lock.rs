//! Advisory file lock serialising merges.
//!
//! The lock file lives in the store's database directory. Acquisition spins
//! with a fixed sleep between attempts; running out of attempts is an error.
//! Ordinary queries never take the lock.

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::error::{BranchError, BranchResult};

pub const LOCK_FILE: &str = ".merge.lock";

pub struct MergeLock {
    lock: fd_lock::RwLock<File>,
    path: PathBuf,
    retries: u32,
    interval: Duration,
}

impl MergeLock {
    /// Open (creating if needed) the lock file in `dir`.
    pub fn open(dir: &Path, retries: u32, interval: Duration) -> BranchResult<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)?;
        Ok(Self {
            lock: fd_lock::RwLock::new(file),
            path,
            retries,
            interval,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` while holding the lock exclusively.
    pub fn run<T, F>(&mut self, f: F) -> BranchResult<T>
    where
        F: FnOnce() -> BranchResult<T>,
    {
        for attempt in 0..=self.retries {
            match self.lock.try_write() {
                Ok(_guard) => return f(),
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    debug!(attempt, path = %self.path.display(), "merge lock busy");
                    thread::sleep(self.interval);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(BranchError::LockTimeout {
            path: self.path.display().to_string(),
            attempts: self.retries + 1,
        })
    }
}

impl std::fmt::Debug for MergeLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergeLock").field("path", &self.path).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_closure_under_lock() {
        let dir = tempfile::tempdir().unwrap();
        let mut lock = MergeLock::open(dir.path(), 0, Duration::ZERO).unwrap();
        assert_eq!(lock.run(|| Ok(7)).unwrap(), 7);
        assert!(dir.path().join(LOCK_FILE).exists());
        // released afterwards
        assert_eq!(lock.run(|| Ok(8)).unwrap(), 8);
    }

    #[test]
    fn held_lock_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let mut outer = MergeLock::open(dir.path(), 0, Duration::ZERO).unwrap();
        let result = outer.run(|| {
            let mut inner = MergeLock::open(dir.path(), 2, Duration::from_millis(1))?;
            inner.run(|| Ok(()))
        });
        match result {
            Err(BranchError::LockTimeout { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected lock timeout, got {other:?}"),
        }
    }

    #[test]
    fn closure_errors_propagate() {
        let dir = tempfile::tempdir().unwrap();
        let mut lock = MergeLock::open(dir.path(), 0, Duration::ZERO).unwrap();
        let err = lock
            .run(|| -> BranchResult<()> {
                Err(BranchError::NotFound {
                    branch: "x".into(),
                })
            })
            .unwrap_err();
        assert!(matches!(err, BranchError::NotFound { .. }));
    }
}
