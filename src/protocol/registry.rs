//! Process-wide path registry
//!
//! Maps each store path to the shared cell holding that path's write lock
//! and staging cache. Cells are created lazily on first access and reaped
//! once unreferenced and idle longer than the eviction window, so the map
//! stays bounded across long-lived host processes.
//!
//! Paths are registered literally, as given by the caller; two spellings of
//! the same directory get two cells. The commit path stays atomic either
//! way, so aliasing costs serialization only.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, TryLockError};
use std::thread;
use std::time::{Duration, Instant};

use super::staging::StagingCache;
use crate::errors::{LoreError, LoreResult};

/// Bound on any lock acquisition inside the exchange layer.
pub(crate) const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Poll interval of the bounded try-lock loop.
const LOCK_POLL: Duration = Duration::from_millis(1);

/// Unreferenced cells older than this are reaped from the registry.
const IDLE_EVICTION: Duration = Duration::from_secs(60);

/// Shared per-path state.
pub(crate) struct PathCell {
    write_lock: Mutex<()>,
    staging: Mutex<StagingCache>,
    last_used: Mutex<Instant>,
}

impl PathCell {
    fn new() -> Self {
        Self {
            write_lock: Mutex::new(()),
            staging: Mutex::new(StagingCache::new()),
            last_used: Mutex::new(Instant::now()),
        }
    }

    /// Acquires the path's write lock, waiting at most `LOCK_TIMEOUT`.
    pub fn lock_write(&self) -> LoreResult<MutexGuard<'_, ()>> {
        acquire(&self.write_lock, "store write", LOCK_TIMEOUT)
    }

    /// Acquires the path's staging cache.
    pub fn lock_staging(&self) -> LoreResult<MutexGuard<'_, StagingCache>> {
        acquire(&self.staging, "staging cache", LOCK_TIMEOUT)
    }

    fn touch(&self) {
        if let Ok(mut last_used) = self.last_used.lock() {
            *last_used = Instant::now();
        }
    }

    fn idle_for(&self) -> Duration {
        self.last_used
            .lock()
            .map(|last_used| last_used.elapsed())
            .unwrap_or(Duration::ZERO)
    }
}

/// Deadline-bounded lock acquisition. Surfaces contention past the deadline
/// as a concurrency error instead of blocking the caller indefinitely.
pub(crate) fn acquire<'a, T>(
    mutex: &'a Mutex<T>,
    what: &str,
    timeout: Duration,
) -> LoreResult<MutexGuard<'a, T>> {
    let deadline = Instant::now() + timeout;
    loop {
        match mutex.try_lock() {
            Ok(guard) => return Ok(guard),
            Err(TryLockError::Poisoned(_)) => {
                return Err(LoreError::concurrency(format!(
                    "{} lock poisoned by a panicked holder",
                    what
                )));
            }
            Err(TryLockError::WouldBlock) => {
                if Instant::now() >= deadline {
                    return Err(LoreError::concurrency(format!(
                        "timed out waiting for the {} lock",
                        what
                    )));
                }
                thread::sleep(LOCK_POLL);
            }
        }
    }
}

fn registry() -> &'static Mutex<HashMap<PathBuf, Arc<PathCell>>> {
    static REGISTRY: OnceLock<Mutex<HashMap<PathBuf, Arc<PathCell>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Returns the cell for `path`, creating it on first access.
///
/// Each call also reaps cells that are unreferenced and past the idle
/// window, so the registry never needs explicit teardown.
pub(crate) fn cell_for(path: &Path) -> LoreResult<Arc<PathCell>> {
    let mut map = acquire(registry(), "path registry", LOCK_TIMEOUT)?;

    map.retain(|_, cell| Arc::strong_count(cell) > 1 || cell.idle_for() < IDLE_EVICTION);

    let cell = map
        .entry(path.to_path_buf())
        .or_insert_with(|| Arc::new(PathCell::new()))
        .clone();
    cell.touch();
    Ok(cell)
}
