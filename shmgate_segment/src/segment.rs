//! Segment identity: keys, identifiers and creation flags

use bitflags::bitflags;
use serde::Serialize;
use shmgate::consts::UNSET_SHMID;
use std::fmt;

use crate::metadata::Mode;

/// Caller-chosen System V key. `0` is `IPC_PRIVATE`.
pub type IpcKey = i32;

/// Key that always allocates a fresh, unnamed segment.
pub const IPC_PRIVATE: IpcKey = 0;

/// OS-assigned segment identifier.
///
/// Either a non-negative value handed out by `shmget` or [`ShmId::UNSET`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ShmId(i32);

impl ShmId {
    /// Sentinel for a handle with no OS segment.
    pub const UNSET: Self = Self(UNSET_SHMID);

    /// Wrap a raw identifier.
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Raw identifier for native calls.
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// True for identifiers the OS could have assigned.
    pub const fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for ShmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

bitflags! {
    /// Flags accepted by `shmget` besides the permission bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CreateFlags: i32 {
        /// Create the segment if the key does not exist (`IPC_CREAT`).
        const CREATE = libc::IPC_CREAT;
        /// Fail if the key already exists (`IPC_EXCL`).
        const EXCLUSIVE = libc::IPC_EXCL;
        /// Back the segment with huge pages (`SHM_HUGETLB`, Linux only).
        const HUGETLB = 0o4000;
        /// Do not reserve swap for the segment (`SHM_NORESERVE`, Linux only).
        const NORESERVE = 0o10000;
    }
}

impl Default for CreateFlags {
    fn default() -> Self {
        Self::CREATE
    }
}

impl CreateFlags {
    /// Value passed as `shmflg`: these flags plus the permission bits.
    pub fn with_mode(self, mode: Mode) -> i32 {
        self.bits() | mode.bits() as i32
    }
}

/// Everything that names a segment and how it was requested.
///
/// `id` is [`ShmId::UNSET`] until create succeeds and again after remove.
/// `requested_size` is `None` for handles adopted from an existing id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SegmentIdentity {
    /// Caller-chosen key
    pub key: IpcKey,
    /// OS-assigned identifier
    pub id: ShmId,
    /// Size passed to `shmget`
    pub requested_size: Option<usize>,
    /// Creation flags
    #[serde(skip)]
    pub flags: CreateFlags,
    /// Permission bits requested at creation
    pub mode: Mode,
}

impl SegmentIdentity {
    /// Identity of a handle that has not created anything yet.
    pub const fn unset() -> Self {
        Self {
            key: IPC_PRIVATE,
            id: ShmId::UNSET,
            requested_size: None,
            flags: CreateFlags::CREATE,
            mode: Mode::EMPTY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shmid_validity() {
        assert!(!ShmId::UNSET.is_valid());
        assert!(ShmId::new(0).is_valid());
        assert!(ShmId::new(32769).is_valid());
        assert_eq!(ShmId::new(42).to_string(), "42");
    }

    #[test]
    fn test_create_flags_combine_with_mode() {
        let mode = Mode::from_octal_str("644").unwrap();
        assert_eq!(CreateFlags::CREATE.with_mode(mode), libc::IPC_CREAT | 0o644);
        assert_eq!(
            (CreateFlags::CREATE | CreateFlags::EXCLUSIVE).with_mode(Mode::EMPTY),
            libc::IPC_CREAT | libc::IPC_EXCL
        );
    }

    #[test]
    fn test_unset_identity() {
        let identity = SegmentIdentity::unset();
        assert_eq!(identity.id, ShmId::UNSET);
        assert_eq!(identity.requested_size, None);
    }
}
