//! Native bridge to the System V shared memory primitives.
//!
//! This module defines:
//! - `NativeBridge` trait - the four primitives every backend provides
//! - `ControlCommand` / `ControlOutcome` - the `shmctl` sub-operations
//! - [`sysv`] - the real kernel backend
//! - [`simulation`] - an in-process backend for tests and `--simulate`
//!
//! Bridges hold no per-segment state the handle depends on. Every call is
//! synchronous; a failure is the errno observed at the sentinel return.

use crate::metadata::{PermissionUpdate, SegmentMetadata};
use crate::segment::{IpcKey, ShmId};
use std::ptr::NonNull;

pub mod simulation;
#[cfg(any(target_os = "linux", target_os = "android", target_vendor = "apple"))]
pub mod sysv;

pub use simulation::SimulatedBridge;
#[cfg(any(target_os = "linux", target_os = "android", target_vendor = "apple"))]
pub use sysv::SysvBridge;

/// Result of a native call; the error is the errno behind the sentinel.
pub type NativeResult<T> = Result<T, nix::Error>;

/// `shmctl` sub-operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// `IPC_STAT`
    Stat,
    /// `IPC_SET` with owner and mode
    Set(PermissionUpdate),
    /// `IPC_RMID`
    Remove,
}

/// What a successful `control` call yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    /// Canonical metadata from `IPC_STAT`
    Stat(SegmentMetadata),
    /// `IPC_SET` / `IPC_RMID` completed
    Done,
}

impl ControlOutcome {
    /// Metadata if this outcome came from a stat.
    pub fn into_metadata(self) -> Option<SegmentMetadata> {
        match self {
            Self::Stat(metadata) => Some(metadata),
            Self::Done => None,
        }
    }
}

/// Trait defining the native shared memory primitives.
///
/// Implementations translate native metadata at this boundary; callers only
/// ever see [`SegmentMetadata`].
///
/// | Primitive | System V call |
/// |-----------|---------------|
/// | `allocate` | `shmget` |
/// | `map` | `shmat` |
/// | `unmap` | `shmdt` |
/// | `control` | `shmctl` |
pub trait NativeBridge: Send + Sync {
    /// Backend identifier (e.g., "sysv", "simulation").
    fn name(&self) -> &'static str;

    /// Get or create the segment for `key`. `flags` carries the creation
    /// flags and permission bits.
    fn allocate(&self, key: IpcKey, size: usize, flags: i32) -> NativeResult<ShmId>;

    /// Map the segment into this process and return its base address.
    fn map(&self, id: ShmId) -> NativeResult<NonNull<u8>>;

    /// Unmap an address previously returned by [`NativeBridge::map`].
    fn unmap(&self, address: NonNull<u8>) -> NativeResult<()>;

    /// Run a `shmctl` sub-operation.
    fn control(&self, id: ShmId, command: ControlCommand) -> NativeResult<ControlOutcome>;
}
