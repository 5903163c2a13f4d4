//! Wall-clock helpers. Milliseconds since the UNIX epoch is the unit used
//! for file modification times throughout the store.

use std::time::{SystemTime, UNIX_EPOCH};

/// Converts a `SystemTime` to milliseconds since UNIX_EPOCH.
///
/// Times before the epoch saturate to `0`.
pub fn system_time_millis(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
