//! File locking for the quote store.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::Error;

/// A lock older than this is considered stale and taken over.
const LOCK_TIMEOUT_MS: u64 = 5000;

/// How long a writer waits for a held lock before giving up.
const LOCK_WAIT_MS: u64 = 5000;

/// Poll interval while waiting on a held lock.
const LOCK_POLL_MS: u64 = 25;

/// Acquire an exclusive lock on a file, waiting briefly if it is held.
pub fn acquire_lock(path: &Path) -> Result<LockHandle, Error> {
    let deadline = SystemTime::now() + Duration::from_millis(LOCK_WAIT_MS);
    loop {
        match try_acquire_lock(path) {
            Ok(handle) => return Ok(handle),
            Err(e) => {
                if SystemTime::now() >= deadline {
                    return Err(e);
                }
                std::thread::sleep(Duration::from_millis(LOCK_POLL_MS));
            }
        }
    }
}

/// Single acquisition attempt.
fn try_acquire_lock(path: &Path) -> Result<LockHandle, Error> {
    let lock_path_str = format!("{}.lock", path.display());
    let lock_path = Path::new(&lock_path_str);

    // Check if lock exists and is not stale
    if lock_path.exists() {
        let lock_age = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64
            - lock_path
                .metadata()?
                .modified()?
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_millis() as u64;

        if lock_age < LOCK_TIMEOUT_MS {
            return Err(Error::Store(format!(
                "Lock file is held: {}",
                lock_path.display()
            )));
        }

        // Stale lock, remove it
        tracing::warn!("Removing stale lock: {}", lock_path.display());
        std::fs::remove_file(lock_path).ok();
    }

    // Create lock file
    let mut lock_file = File::create(lock_path)?;
    lock_file.write_all(format!("{}\n", std::process::id()).as_bytes())?;
    lock_file.sync_all()?;

    tracing::debug!("Acquired lock: {}", lock_path.display());

    Ok(LockHandle {
        lock_path: lock_path.to_path_buf(),
    })
}

/// Lock handle - releases lock when dropped.
pub struct LockHandle {
    lock_path: std::path::PathBuf,
}

impl Drop for LockHandle {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.lock_path) {
            tracing::warn!("Failed to release lock {}: {}", self.lock_path.display(), e);
        } else {
            tracing::debug!("Released lock: {}", self.lock_path.display());
        }
    }
}

/// Acquire lock, execute function, release lock.
pub fn with_lock<T, F>(path: &Path, f: F) -> Result<T, Error>
where
    F: FnOnce() -> Result<T, Error>,
{
    let _lock = acquire_lock(path)?;
    f()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_lock() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("quotes.json");

        fs::write(&test_file, "{}").unwrap();

        let lock1 = try_acquire_lock(&test_file);
        assert!(lock1.is_ok());

        // Try to acquire again should fail
        let lock2 = try_acquire_lock(&test_file);
        assert!(lock2.is_err());

        // Drop first lock
        drop(lock1);

        // Now should work again
        let lock3 = try_acquire_lock(&test_file);
        assert!(lock3.is_ok());
    }

    #[test]
    fn waiting_acquire_succeeds_after_release() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("quotes.json");
        fs::write(&test_file, "{}").unwrap();

        let held = try_acquire_lock(&test_file).unwrap();

        let path = test_file.clone();
        let waiter = std::thread::spawn(move || acquire_lock(&path).is_ok());

        std::thread::sleep(Duration::from_millis(100));
        drop(held);

        assert!(waiter.join().unwrap());
    }
}
