//! Platform adapters
//!
//! The native `shmid_ds` differs between operating systems in field widths
//! and ordering. Each supported family gets one module exposing the same two
//! functions, `to_canonical` and `apply_update`; nothing else in the crate
//! touches native metadata fields.

#[cfg(any(target_os = "linux", target_os = "android"))]
mod linux;
#[cfg(any(target_os = "linux", target_os = "android"))]
pub(crate) use linux::{apply_update, to_canonical};

#[cfg(target_vendor = "apple")]
mod apple;
#[cfg(target_vendor = "apple")]
pub(crate) use apple::{apply_update, to_canonical};

use nix::unistd::{getgid, getpid, getuid};
use std::time::{SystemTime, UNIX_EPOCH};

/// Get current process ID
pub fn current_pid() -> i32 {
    getpid().as_raw()
}

/// Get current real user ID
pub fn current_uid() -> u32 {
    getuid().as_raw()
}

/// Get current real group ID
pub fn current_gid() -> u32 {
    getgid().as_raw()
}

/// Seconds since the Unix epoch, `0` if the clock is before it.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
