//! Exclusive lock around the create-and-install phase.
//!
//! Two processes racing through a first run would otherwise both write into
//! the same venv directory. The lock file is created with `create_new`, so
//! exactly one contender wins; the rest wait with a bounded timeout.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::EnvError;

/// How long a contender waits for a concurrent bootstrap before failing.
const WAIT_TIMEOUT: Duration = Duration::from_secs(600);
/// Lock files older than this are treated as leftovers of a dead process.
const STALE_AFTER: Duration = Duration::from_secs(3600);
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Scoped lock file, removed on drop — including error unwinds, so a failed
/// install never wedges the next run.
#[derive(Debug)]
pub struct CreationLock {
    path: PathBuf,
}

impl CreationLock {
    pub fn acquire(path: &Path) -> Result<Self, EnvError> {
        Self::acquire_with(path, WAIT_TIMEOUT, STALE_AFTER)
    }

    pub fn acquire_with(
        path: &Path,
        wait_timeout: Duration,
        stale_after: Duration,
    ) -> Result<Self, EnvError> {
        let started = Instant::now();
        loop {
            match OpenOptions::new().write(true).create_new(true).open(path) {
                Ok(mut file) => {
                    let _ = writeln!(file, "{}", std::process::id());
                    return Ok(Self {
                        path: path.to_path_buf(),
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if let Some(judged) = stale_modified(path, stale_after) {
                        // Remove only if it is still the file judged stale;
                        // a fresh lock from another contender has a newer
                        // mtime and must survive.
                        if lock_modified(path) == Some(judged) {
                            tracing::warn!(path = %path.display(), "removing stale creation lock");
                            let _ = std::fs::remove_file(path);
                        }
                        continue;
                    }
                    if started.elapsed() >= wait_timeout {
                        return Err(EnvError::LockTimeout {
                            path: path.to_path_buf(),
                            waited_secs: started.elapsed().as_secs(),
                        });
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    return Err(EnvError::LockAcquire {
                        path: path.to_path_buf(),
                        source: e,
                    })
                }
            }
        }
    }
}

impl Drop for CreationLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn lock_modified(path: &Path) -> Option<std::time::SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// The lock's mtime, if its age exceeds `stale_after`.
fn stale_modified(path: &Path, stale_after: Duration) -> Option<std::time::SystemTime> {
    let modified = lock_modified(path)?;
    let age = modified.elapsed().ok()?;
    (age > stale_after).then_some(modified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lock_file_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("venv.lock");
        {
            let _lock = CreationLock::acquire(&path).unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }

    #[test]
    fn held_lock_times_out_contenders() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("venv.lock");
        let _held = CreationLock::acquire(&path).unwrap();

        let err =
            CreationLock::acquire_with(&path, Duration::from_millis(50), STALE_AFTER).unwrap_err();
        assert!(matches!(err, EnvError::LockTimeout { .. }));
        // The loser must not have removed the winner's lock file.
        assert!(path.exists());
    }

    #[test]
    fn stale_lock_is_reclaimed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("venv.lock");
        std::fs::write(&path, "12345\n").unwrap();
        std::thread::sleep(Duration::from_millis(20));

        // Zero staleness cutoff: any pre-existing lock counts as dead.
        let lock =
            CreationLock::acquire_with(&path, Duration::from_millis(50), Duration::ZERO).unwrap();
        assert!(path.exists());
        drop(lock);
        assert!(!path.exists());
    }
}
