//! Error types for segment lifecycle operations

use crate::handle::SegmentState;
use crate::segment::{IpcKey, ShmId};
use thiserror::Error;

/// Why a lifecycle operation failed.
#[derive(Error, Debug)]
pub enum FailureCause {
    /// The native call returned its failure sentinel; errno attached.
    #[error("{0}")]
    Native(#[from] nix::Error),

    /// The handle was not in a state that permits the operation.
    #[error("segment is {0}")]
    InvalidState(SegmentState),

    /// Attach requested while a mapping is already held.
    #[error("segment is already attached")]
    AlreadyAttached,

    /// Segment content could not be decoded as text.
    #[error("segment content is not valid UTF-8: {0}")]
    InvalidText(#[from] std::str::Utf8Error),
}

/// Errors that can occur during segment lifecycle operations
#[derive(Error, Debug)]
pub enum ShmError {
    /// `shmget` failed or the handle was already bound to a segment
    #[error("Create failed for key {key}: {cause}")]
    CreationFailed {
        /// Caller-supplied key
        key: IpcKey,
        /// Underlying failure
        #[source]
        cause: FailureCause,
    },

    /// `shmat` failed or the handle cannot be attached
    #[error("Attach failed for shmid {id}: {cause}")]
    AttachFailed {
        /// Segment identifier
        id: ShmId,
        /// Underlying failure
        #[source]
        cause: FailureCause,
    },

    /// `shmdt` failed or the handle has no segment
    #[error("Detach failed for shmid {id}: {cause}")]
    DetachFailed {
        /// Segment identifier
        id: ShmId,
        /// Underlying failure
        #[source]
        cause: FailureCause,
    },

    /// `shmctl(IPC_STAT)` failed or the handle has no segment
    #[error("Stat failed for shmid {id}: {cause}")]
    StatFailed {
        /// Segment identifier
        id: ShmId,
        /// Underlying failure
        #[source]
        cause: FailureCause,
    },

    /// `shmctl(IPC_SET)` failed or the handle has no segment
    #[error("Set failed for shmid {id}: {cause}")]
    SetFailed {
        /// Segment identifier
        id: ShmId,
        /// Underlying failure
        #[source]
        cause: FailureCause,
    },

    /// Write attempted on a handle that is not attached
    #[error("Write failed for shmid {id}: {cause}")]
    WriteFailed {
        /// Segment identifier
        id: ShmId,
        /// Underlying failure
        #[source]
        cause: FailureCause,
    },

    /// Read attempted on a handle that is not attached, or content is not text
    #[error("Read failed for shmid {id}: {cause}")]
    ReadFailed {
        /// Segment identifier
        id: ShmId,
        /// Underlying failure
        #[source]
        cause: FailureCause,
    },

    /// `shmctl(IPC_RMID)` failed or the handle has no segment
    #[error("Remove failed for shmid {id}: {cause}{}", detach_suffix(.detach_error))]
    RemoveFailed {
        /// Segment identifier
        id: ShmId,
        /// Underlying failure
        #[source]
        cause: FailureCause,
        /// Failure of the implicit detach that preceded the removal attempt
        detach_error: Option<nix::Error>,
    },

    /// No live handle for the pair and the OS does not know the segment either
    #[error("Segment not found: key {key}, shmid {id}")]
    NotFound {
        /// Caller-supplied key
        key: IpcKey,
        /// Segment identifier
        id: ShmId,
    },

    /// Transfer length exceeds the mapped region
    #[error("Out of bounds: {requested} bytes requested, {available} bytes mapped")]
    OutOfBounds {
        /// Bytes the caller asked to transfer
        requested: usize,
        /// Bytes available in the mapping
        available: usize,
    },

    /// Mode string or value is not a valid octal permission set
    #[error("Invalid mode: {value} (expected octal permission bits 000-777)")]
    InvalidMode {
        /// Rejected input
        value: String,
    },

    /// Handle registered under a pair that does not match its own identity
    #[error("Handle (key {found_key}, shmid {found_id}) registered as (key {key}, shmid {id})")]
    IdentityMismatch {
        /// Key of the registry entry
        key: IpcKey,
        /// Identifier of the registry entry
        id: ShmId,
        /// Key the handle carries
        found_key: IpcKey,
        /// Identifier the handle carries
        found_id: ShmId,
    },
}

fn detach_suffix(detach_error: &Option<nix::Error>) -> String {
    match detach_error {
        Some(errno) => format!(" (preceding detach also failed: {errno})"),
        None => String::new(),
    }
}

impl ShmError {
    /// Native errno behind this error, if the failure came from a native call.
    pub fn errno(&self) -> Option<nix::Error> {
        match self {
            Self::CreationFailed { cause, .. }
            | Self::AttachFailed { cause, .. }
            | Self::DetachFailed { cause, .. }
            | Self::StatFailed { cause, .. }
            | Self::SetFailed { cause, .. }
            | Self::WriteFailed { cause, .. }
            | Self::ReadFailed { cause, .. }
            | Self::RemoveFailed { cause, .. } => match cause {
                FailureCause::Native(errno) => Some(*errno),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Result type for segment lifecycle operations
pub type ShmResult<T> = Result<T, ShmError>;
