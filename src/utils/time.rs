//! Unix timestamp helpers shared by the credential store backends.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Convert `SystemTime` to a Unix timestamp, saturating to zero for times before the epoch.
pub fn to_unix_timestamp(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

/// Convert a Unix timestamp back to `SystemTime`.
pub fn from_unix_timestamp(timestamp: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(timestamp)
}

/// Current time as a Unix timestamp.
pub fn unix_now() -> u64 {
    to_unix_timestamp(SystemTime::now())
}
