//! Timestamp service for history records
//!
//! Callers stamp history items before writing them; the store itself never
//! generates timestamps. The value is microseconds since the Unix epoch,
//! adjusted so that repeated calls within one process are strictly
//! increasing even when the wall clock stalls or steps backwards. Values
//! from different processes are not comparable beyond wall-clock accuracy.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static LAST_TIMESTAMP: AtomicI64 = AtomicI64::new(0);

/// Returns the current timestamp in microseconds since the Unix epoch.
///
/// Strictly increasing within the process: if the wall clock has not moved
/// past the previously returned value, the previous value plus one is
/// returned instead.
pub fn current_timestamp() -> i64 {
    let wall_clock = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros() as i64;

    let mut last = LAST_TIMESTAMP.load(Ordering::SeqCst);
    while wall_clock <= last {
        let bumped = last + 1;
        match LAST_TIMESTAMP.compare_exchange_weak(last, bumped, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => return bumped,
            Err(observed) => last = observed,
        }
    }

    LAST_TIMESTAMP.store(wall_clock, Ordering::SeqCst);
    wall_clock
}
