//! Canonical, platform-independent segment metadata
//!
//! Everything downstream of the native bridge works with these types only.
//! The conversion from and to the native `shmid_ds` lives in
//! [`crate::platform`].

use crate::error::{ShmError, ShmResult};
use serde::{Serialize, Serializer};
use shmgate::consts::MODE_MASK;
use std::fmt;
use std::str::FromStr;

/// Permission bits of a segment, always within `0o777`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Mode(u32);

impl Mode {
    /// No permissions.
    pub const EMPTY: Self = Self(0);

    /// Accept `bits` only if nothing outside `0o777` is set.
    pub const fn from_bits(bits: u32) -> Option<Self> {
        if bits & !MODE_MASK != 0 {
            None
        } else {
            Some(Self(bits))
        }
    }

    /// Keep the permission bits, drop everything else (e.g. `SHM_DEST`).
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & MODE_MASK)
    }

    /// Raw permission bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Parse an octal permission string such as `"644"`, `"0644"` or `"0o644"`.
    pub fn from_octal_str(text: &str) -> ShmResult<Self> {
        let invalid = || ShmError::InvalidMode {
            value: text.to_string(),
        };
        let trimmed = text.trim();
        let digits = trimmed.strip_prefix("0o").unwrap_or(trimmed);
        if digits.is_empty() || !digits.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            return Err(invalid());
        }
        let bits = u32::from_str_radix(digits, 8).map_err(|_| invalid())?;
        Self::from_bits(bits).ok_or_else(invalid)
    }

    /// Read the decimal digits of `value` as octal: `644` becomes `0o644`.
    pub fn from_octal_digits(value: u64) -> ShmResult<Self> {
        Self::from_octal_str(&value.to_string())
    }

    /// Three octal digits rendered as a decimal number: `0o644` becomes `644`.
    pub const fn as_octal_digits(self) -> u32 {
        ((self.0 >> 6) & 0o7) * 100 + ((self.0 >> 3) & 0o7) * 10 + (self.0 & 0o7)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03o}", self.0)
    }
}

impl FromStr for Mode {
    type Err = ShmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_octal_str(s)
    }
}

impl Serialize for Mode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.as_octal_digits())
    }
}

/// Snapshot of a segment's `stat` data.
///
/// Produced fresh by every stat call. Timestamps are seconds since the
/// Unix epoch, `0` meaning "never".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SegmentMetadata {
    /// Current owner user id
    pub owner_uid: u32,
    /// Current owner group id
    pub owner_gid: u32,
    /// Creator user id
    pub creator_uid: u32,
    /// Creator group id
    pub creator_gid: u32,
    /// Permission bits
    pub mode: Mode,
    /// Segment size in bytes
    pub size_bytes: usize,
    /// Process that created the segment
    pub creator_pid: i32,
    /// Process that last attached or detached
    pub last_attach_pid: i32,
    /// Current number of attachments
    pub attach_count: u64,
    /// Last attach time
    pub last_attach_time: i64,
    /// Last detach time
    pub last_detach_time: i64,
    /// Last change time (create or set)
    pub last_change_time: i64,
}

/// The three fields `IPC_SET` may change. Always applied together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionUpdate {
    /// New owner user id
    pub uid: u32,
    /// New owner group id
    pub gid: u32,
    /// New permission bits
    pub mode: Mode,
}
