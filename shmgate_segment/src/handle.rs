//! Segment handle: the lifecycle state machine of one segment
//!
//! ```text
//! Unset ──create──► Detached ◄──detach── Attached
//!                      │  └──────attach─────►│
//!                      └──remove──► Removed ◄┘
//! ```
//!
//! The mapping produced by attach lives inside the `Attached` state as a
//! [`Mapping`] token. Detach and remove are the only ways out of that
//! state, so no code path can reach a mapping after it has been unmapped.

use crate::error::{FailureCause, ShmError, ShmResult};
use crate::metadata::{Mode, PermissionUpdate, SegmentMetadata};
use crate::native::{ControlCommand, NativeBridge};
use crate::segment::{CreateFlags, IpcKey, SegmentIdentity, ShmId};
use nix::errno::Errno;
use std::fmt;
use std::ptr::NonNull;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Observable lifecycle state of a [`SegmentHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentState {
    /// No segment created yet
    Unset,
    /// Segment exists, not mapped by this handle (also the state right after create)
    Detached,
    /// Segment mapped by this handle
    Attached,
    /// Segment destroyed; terminal
    Removed,
}

impl fmt::Display for SegmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unset => "unset",
            Self::Detached => "detached",
            Self::Attached => "attached",
            Self::Removed => "removed",
        })
    }
}

/// Exclusive ownership of one live mapping.
///
/// Neither `Clone` nor `Copy`: the only way to give it up is through the
/// handle's detach or remove.
pub struct Mapping {
    address: NonNull<u8>,
    len: usize,
}

// SAFETY: the mapping is process-wide memory; exclusive access is
// guaranteed by the owning handle, which callers keep behind a mutex.
unsafe impl Send for Mapping {}

impl Mapping {
    /// Base address, for reporting only.
    pub fn address(&self) -> usize {
        self.address.as_ptr() as usize
    }

    /// Usable length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True for a zero-length mapping.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn copy_in(&mut self, bytes: &[u8]) {
        debug_assert!(bytes.len() <= self.len);
        // SAFETY: bounds checked by the caller; the mapping is live while
        // this token exists and the source is a distinct Rust allocation.
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), self.address.as_ptr(), bytes.len());
        }
    }

    fn copy_out(&self, len: usize) -> Vec<u8> {
        debug_assert!(len <= self.len);
        let mut buffer = vec![0u8; len];
        // SAFETY: as in copy_in.
        unsafe {
            std::ptr::copy_nonoverlapping(self.address.as_ptr(), buffer.as_mut_ptr(), len);
        }
        buffer
    }
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapping")
            .field("address", &self.address)
            .field("len", &self.len)
            .finish()
    }
}

enum Lifecycle {
    Unset,
    Detached,
    Attached(Mapping),
    Removed,
}

/// Handle on one System V segment.
pub struct SegmentHandle {
    bridge: Arc<dyn NativeBridge>,
    identity: SegmentIdentity,
    lifecycle: Lifecycle,
}

impl SegmentHandle {
    /// Create a handle in the `Unset` state.
    pub fn new(bridge: Arc<dyn NativeBridge>) -> Self {
        Self {
            bridge,
            identity: SegmentIdentity::unset(),
            lifecycle: Lifecycle::Unset,
        }
    }

    /// Build a `Detached` handle for a segment this process did not create.
    ///
    /// The segment must answer a stat; its reported size and mode become the
    /// handle's identity.
    pub fn adopt(bridge: Arc<dyn NativeBridge>, key: IpcKey, id: ShmId) -> ShmResult<Self> {
        if !id.is_valid() {
            return Err(ShmError::NotFound { key, id });
        }
        let metadata = bridge
            .control(id, ControlCommand::Stat)
            .map_err(|errno| match errno {
                Errno::EINVAL | Errno::EIDRM => ShmError::NotFound { key, id },
                _ => ShmError::StatFailed {
                    id,
                    cause: errno.into(),
                },
            })?
            .into_metadata()
            .ok_or(ShmError::StatFailed {
                id,
                cause: FailureCause::InvalidState(SegmentState::Unset),
            })?;

        debug!("Adopted shmid {} (key {}, {} bytes)", id, key, metadata.size_bytes);
        Ok(Self {
            bridge,
            identity: SegmentIdentity {
                key,
                id,
                requested_size: None,
                flags: CreateFlags::empty(),
                mode: metadata.mode,
            },
            lifecycle: Lifecycle::Detached,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SegmentState {
        match self.lifecycle {
            Lifecycle::Unset => SegmentState::Unset,
            Lifecycle::Detached => SegmentState::Detached,
            Lifecycle::Attached(_) => SegmentState::Attached,
            Lifecycle::Removed => SegmentState::Removed,
        }
    }

    /// Identity snapshot.
    pub fn identity(&self) -> SegmentIdentity {
        self.identity
    }

    /// Caller key.
    pub fn key(&self) -> IpcKey {
        self.identity.key
    }

    /// OS identifier, [`ShmId::UNSET`] before create and after remove.
    pub fn id(&self) -> ShmId {
        self.identity.id
    }

    /// Length of the current mapping, if attached.
    pub fn mapped_len(&self) -> Option<usize> {
        match &self.lifecycle {
            Lifecycle::Attached(mapping) => Some(mapping.len()),
            _ => None,
        }
    }

    /// Backend this handle talks to.
    pub fn bridge(&self) -> &Arc<dyn NativeBridge> {
        &self.bridge
    }

    /// Allocate the segment. Only valid on an `Unset` handle.
    pub fn create(
        &mut self,
        key: IpcKey,
        size: usize,
        flags: CreateFlags,
        mode: Mode,
    ) -> ShmResult<ShmId> {
        if !matches!(self.lifecycle, Lifecycle::Unset) {
            return Err(ShmError::CreationFailed {
                key,
                cause: FailureCause::InvalidState(self.state()),
            });
        }

        let id = self
            .bridge
            .allocate(key, size, flags.with_mode(mode))
            .map_err(|errno| ShmError::CreationFailed {
                key,
                cause: errno.into(),
            })?;

        self.identity = SegmentIdentity {
            key,
            id,
            requested_size: Some(size),
            flags,
            mode,
        };
        self.lifecycle = Lifecycle::Detached;
        info!("Created shmid {} (key {}, {} bytes, mode {})", id, key, size, mode);
        Ok(id)
    }

    /// Map the segment and return the mapped base address.
    ///
    /// The mapping length is the segment size a fresh stat reports, which
    /// exceeds the requested size when create reused a larger segment.
    pub fn attach(&mut self) -> ShmResult<usize> {
        let id = self.identity.id;
        let fail = |cause: FailureCause| ShmError::AttachFailed { id, cause };

        match self.lifecycle {
            Lifecycle::Detached => {}
            Lifecycle::Attached(_) => return Err(fail(FailureCause::AlreadyAttached)),
            Lifecycle::Unset | Lifecycle::Removed => {
                return Err(fail(FailureCause::InvalidState(self.state())));
            }
        }

        let len = self
            .control_stat()
            .map_err(|errno| fail(errno.into()))?
            .size_bytes;

        let address = self.bridge.map(id).map_err(|errno| fail(errno.into()))?;
        let mapping = Mapping { address, len };
        let base = mapping.address();
        self.lifecycle = Lifecycle::Attached(mapping);
        debug!("Attached shmid {} at {:#x} ({} bytes)", id, base, len);
        Ok(base)
    }

    /// Unmap the segment. Detaching a detached handle is a no-op.
    pub fn detach(&mut self) -> ShmResult<()> {
        let id = self.identity.id;
        match self.lifecycle {
            Lifecycle::Detached => Ok(()),
            Lifecycle::Attached(_) => self.unmap_current().map_err(|errno| ShmError::DetachFailed {
                id,
                cause: errno.into(),
            }),
            Lifecycle::Unset | Lifecycle::Removed => Err(ShmError::DetachFailed {
                id,
                cause: FailureCause::InvalidState(self.state()),
            }),
        }
    }

    /// Fresh metadata snapshot. Does not require attachment.
    pub fn stat(&self) -> ShmResult<SegmentMetadata> {
        let id = self.identity.id;
        self.require_segment()
            .map_err(|cause| ShmError::StatFailed { id, cause })?;
        self.control_stat().map_err(|errno| ShmError::StatFailed {
            id,
            cause: errno.into(),
        })
    }

    /// Change owner and mode. All three fields are applied together.
    pub fn set(&self, uid: u32, gid: u32, mode: Mode) -> ShmResult<()> {
        let id = self.identity.id;
        self.require_segment()
            .map_err(|cause| ShmError::SetFailed { id, cause })?;
        let update = PermissionUpdate { uid, gid, mode };
        self.bridge
            .control(id, ControlCommand::Set(update))
            .map_err(|errno| ShmError::SetFailed {
                id,
                cause: errno.into(),
            })?;
        debug!("Set shmid {} owner {}:{} mode {}", id, uid, gid, mode);
        Ok(())
    }

    /// Copy `bytes` to the start of the mapping.
    pub fn write_data(&mut self, bytes: &[u8]) -> ShmResult<()> {
        let id = self.identity.id;
        let state = self.state();
        let Lifecycle::Attached(mapping) = &mut self.lifecycle else {
            return Err(ShmError::WriteFailed {
                id,
                cause: FailureCause::InvalidState(state),
            });
        };
        if bytes.len() > mapping.len() {
            return Err(ShmError::OutOfBounds {
                requested: bytes.len(),
                available: mapping.len(),
            });
        }
        mapping.copy_in(bytes);
        Ok(())
    }

    /// Write `text` followed by a NUL terminator.
    pub fn write_text(&mut self, text: &str) -> ShmResult<()> {
        let mut bytes = Vec::with_capacity(text.len() + 1);
        bytes.extend_from_slice(text.as_bytes());
        bytes.push(0);
        self.write_data(&bytes)
    }

    /// Read `length` bytes from the start of the mapping, stopping at the
    /// first NUL byte inside that window.
    ///
    /// This is the default, text-oriented read. Binary payloads that may
    /// contain NUL bytes should use [`SegmentHandle::read_raw`].
    pub fn read_data(&self, length: usize) -> ShmResult<Vec<u8>> {
        let mut bytes = self.read_raw(length)?;
        if let Some(end) = bytes.iter().position(|&b| b == 0) {
            bytes.truncate(end);
        }
        Ok(bytes)
    }

    /// Read exactly `length` bytes from the start of the mapping.
    pub fn read_raw(&self, length: usize) -> ShmResult<Vec<u8>> {
        let Lifecycle::Attached(mapping) = &self.lifecycle else {
            return Err(ShmError::ReadFailed {
                id: self.identity.id,
                cause: FailureCause::InvalidState(self.state()),
            });
        };
        if length > mapping.len() {
            return Err(ShmError::OutOfBounds {
                requested: length,
                available: mapping.len(),
            });
        }
        Ok(mapping.copy_out(length))
    }

    /// [`SegmentHandle::read_data`] decoded as UTF-8.
    pub fn read_text(&self, length: usize) -> ShmResult<String> {
        let bytes = self.read_data(length)?;
        String::from_utf8(bytes).map_err(|e| ShmError::ReadFailed {
            id: self.identity.id,
            cause: FailureCause::InvalidText(e.utf8_error()),
        })
    }

    /// Destroy the segment, detaching first if needed.
    ///
    /// A failed implicit detach does not stop the removal attempt; it is
    /// reported inside [`ShmError::RemoveFailed`] if removal fails too.
    pub fn remove(&mut self) -> ShmResult<()> {
        let id = self.identity.id;
        self.require_segment()
            .map_err(|cause| ShmError::RemoveFailed {
                id,
                cause,
                detach_error: None,
            })?;

        let detach_error = self.unmap_current().err();

        if let Err(errno) = self.bridge.control(id, ControlCommand::Remove) {
            return Err(ShmError::RemoveFailed {
                id,
                cause: errno.into(),
                detach_error,
            });
        }

        if let Some(errno) = detach_error {
            warn!(
                "shmid {} removed but its mapping could not be detached: {}",
                id, errno
            );
        }
        self.identity.id = ShmId::UNSET;
        self.lifecycle = Lifecycle::Removed;
        info!("Removed shmid {} (key {})", id, self.identity.key);
        Ok(())
    }

    /// Run `f` with the segment attached.
    ///
    /// Attaches if needed and, when it did, detaches again on every exit
    /// path. An error from `f` wins over a detach error.
    pub fn with_attachment<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> ShmResult<T>,
    ) -> ShmResult<T> {
        let attached_here = !matches!(self.lifecycle, Lifecycle::Attached(_));
        if attached_here {
            self.attach()?;
        }

        let result = f(self);
        if !attached_here {
            return result;
        }

        match (result, self.detach()) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(detach)) => Err(detach),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(detach)) => {
                warn!("Detach after failed operation also failed: {}", detach);
                Err(err)
            }
        }
    }

    fn require_segment(&self) -> Result<(), FailureCause> {
        match self.lifecycle {
            Lifecycle::Detached | Lifecycle::Attached(_) => Ok(()),
            Lifecycle::Unset | Lifecycle::Removed => Err(FailureCause::InvalidState(self.state())),
        }
    }

    fn control_stat(&self) -> Result<SegmentMetadata, nix::Error> {
        self.bridge
            .control(self.identity.id, ControlCommand::Stat)?
            .into_metadata()
            .ok_or(nix::Error::EINVAL)
    }

    /// Unmap the current mapping. The token stays in place on failure.
    fn unmap_current(&mut self) -> Result<(), nix::Error> {
        let Lifecycle::Attached(mapping) = &self.lifecycle else {
            return Ok(());
        };
        self.bridge.unmap(mapping.address)?;
        debug!("Detached shmid {}", self.identity.id);
        self.lifecycle = Lifecycle::Detached;
        Ok(())
    }
}

impl fmt::Debug for SegmentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentHandle")
            .field("backend", &self.bridge.name())
            .field("identity", &self.identity)
            .field("state", &self.state())
            .finish()
    }
}

impl Drop for SegmentHandle {
    fn drop(&mut self) {
        if let Lifecycle::Attached(mapping) = &self.lifecycle {
            if let Err(errno) = self.bridge.unmap(mapping.address) {
                warn!(
                    "Dropping shmid {} with a mapping that failed to detach: {}",
                    self.identity.id, errno
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::SimulatedBridge;
    use crate::segment::IPC_PRIVATE;

    fn sim() -> Arc<SimulatedBridge> {
        Arc::new(SimulatedBridge::new())
    }

    fn created(bridge: &Arc<SimulatedBridge>, size: usize) -> SegmentHandle {
        let mut handle = SegmentHandle::new(bridge.clone());
        handle
            .create(IPC_PRIVATE, size, CreateFlags::CREATE, Mode::from_bits_truncate(0o600))
            .unwrap();
        handle
    }

    #[test]
    fn test_new_handle_is_unset() {
        let handle = SegmentHandle::new(sim());
        assert_eq!(handle.state(), SegmentState::Unset);
        assert_eq!(handle.id(), ShmId::UNSET);
        assert!(matches!(handle.stat(), Err(ShmError::StatFailed { .. })));
    }

    #[test]
    fn test_failed_create_leaves_handle_unset() {
        let bridge = sim();
        let mut handle = SegmentHandle::new(bridge.clone());
        let err = handle
            .create(1234, 64, CreateFlags::empty(), Mode::EMPTY)
            .unwrap_err();
        assert!(matches!(err, ShmError::CreationFailed { key: 1234, .. }));
        assert_eq!(err.errno(), Some(Errno::ENOENT));
        assert_eq!(handle.state(), SegmentState::Unset);
        assert_eq!(handle.identity(), SegmentIdentity::unset());
    }

    #[test]
    fn test_create_twice_is_rejected() {
        let bridge = sim();
        let mut handle = created(&bridge, 64);
        let err = handle
            .create(IPC_PRIVATE, 64, CreateFlags::CREATE, Mode::EMPTY)
            .unwrap_err();
        assert!(matches!(
            err,
            ShmError::CreationFailed {
                cause: FailureCause::InvalidState(SegmentState::Detached),
                ..
            }
        ));
        assert_eq!(bridge.live_segments(), 1);
    }

    #[test]
    fn test_attach_twice_reports_already_attached() {
        let bridge = sim();
        let mut handle = created(&bridge, 64);
        handle.attach().unwrap();
        let err = handle.attach().unwrap_err();
        assert!(matches!(
            err,
            ShmError::AttachFailed {
                cause: FailureCause::AlreadyAttached,
                ..
            }
        ));
        assert!(err.to_string().ends_with("segment is already attached"));
        assert_eq!(bridge.live_mappings(), 1);
    }

    #[test]
    fn test_write_requires_attachment_and_bounds() {
        let bridge = sim();
        let mut handle = created(&bridge, 8);
        assert!(matches!(
            handle.write_data(b"abc"),
            Err(ShmError::WriteFailed { .. })
        ));
        assert!(matches!(handle.read_data(3), Err(ShmError::ReadFailed { .. })));

        handle.attach().unwrap();
        assert_eq!(handle.mapped_len(), Some(8));
        assert!(handle.write_data(b"12345678").is_ok());
        assert!(matches!(
            handle.write_data(b"123456789"),
            Err(ShmError::OutOfBounds {
                requested: 9,
                available: 8
            })
        ));
        // Terminator counts against the mapping.
        assert!(matches!(
            handle.write_text("12345678"),
            Err(ShmError::OutOfBounds { requested: 9, .. })
        ));
        assert!(matches!(
            handle.read_raw(9),
            Err(ShmError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_read_truncates_but_raw_does_not() {
        let bridge = sim();
        let mut handle = created(&bridge, 16);
        handle.attach().unwrap();
        handle.write_data(b"ab\0cd").unwrap();

        assert_eq!(handle.read_data(5).unwrap(), b"ab");
        assert_eq!(handle.read_raw(5).unwrap(), b"ab\0cd");
    }

    #[test]
    fn test_read_text_rejects_invalid_utf8() {
        let bridge = sim();
        let mut handle = created(&bridge, 16);
        handle.attach().unwrap();
        handle.write_data(&[0xff, 0xfe, 0]).unwrap();
        assert!(matches!(
            handle.read_text(3),
            Err(ShmError::ReadFailed {
                cause: FailureCause::InvalidText(_),
                ..
            })
        ));
    }

    #[test]
    fn test_remove_detaches_first() {
        let bridge = sim();
        let mut handle = created(&bridge, 64);
        handle.attach().unwrap();
        handle.remove().unwrap();

        assert_eq!(handle.state(), SegmentState::Removed);
        assert_eq!(handle.id(), ShmId::UNSET);
        assert_eq!(bridge.live_mappings(), 0);
        assert_eq!(bridge.live_segments(), 0);
        assert!(matches!(handle.remove(), Err(ShmError::RemoveFailed { .. })));
        assert!(matches!(handle.detach(), Err(ShmError::DetachFailed { .. })));
    }

    #[test]
    fn test_with_attachment_detaches_on_error() {
        let bridge = sim();
        let mut handle = created(&bridge, 4);
        let result = handle.with_attachment(|h| h.write_data(b"too long"));
        assert!(matches!(result, Err(ShmError::OutOfBounds { .. })));
        assert_eq!(handle.state(), SegmentState::Detached);
        assert_eq!(bridge.live_mappings(), 0);
    }

    #[test]
    fn test_with_attachment_keeps_existing_mapping() {
        let bridge = sim();
        let mut handle = created(&bridge, 16);
        handle.attach().unwrap();
        handle.with_attachment(|h| h.write_text("hi")).unwrap();
        assert_eq!(handle.state(), SegmentState::Attached);
    }

    #[test]
    fn test_adopt_uses_reported_size() {
        let bridge = sim();
        let original = created(&bridge, 300);
        let mut adopted =
            SegmentHandle::adopt(bridge.clone(), IPC_PRIVATE, original.id()).unwrap();
        assert_eq!(adopted.identity().requested_size, None);
        adopted.attach().unwrap();
        assert_eq!(adopted.mapped_len(), Some(300));
    }

    #[test]
    fn test_adopt_rejects_unknown_id() {
        let bridge = sim();
        assert!(matches!(
            SegmentHandle::adopt(bridge.clone(), 1, ShmId::UNSET),
            Err(ShmError::NotFound { .. })
        ));
        assert!(matches!(
            SegmentHandle::adopt(bridge, 1, ShmId::new(4242)),
            Err(ShmError::NotFound { key: 1, .. })
        ));
    }

    #[test]
    fn test_drop_releases_mapping() {
        let bridge = sim();
        {
            let mut handle = created(&bridge, 64);
            handle.attach().unwrap();
            assert_eq!(bridge.live_mappings(), 1);
        }
        assert_eq!(bridge.live_mappings(), 0);
    }

    /// Simulated backend whose unmap and remove can be made to fail.
    struct FaultyBridge {
        inner: SimulatedBridge,
        unmap_error: Option<Errno>,
        remove_error: Option<Errno>,
    }

    impl NativeBridge for FaultyBridge {
        fn name(&self) -> &'static str {
            "faulty"
        }

        fn allocate(&self, key: IpcKey, size: usize, flags: i32) -> crate::native::NativeResult<ShmId> {
            self.inner.allocate(key, size, flags)
        }

        fn map(&self, id: ShmId) -> crate::native::NativeResult<NonNull<u8>> {
            self.inner.map(id)
        }

        fn unmap(&self, address: NonNull<u8>) -> crate::native::NativeResult<()> {
            match self.unmap_error {
                Some(errno) => Err(errno),
                None => self.inner.unmap(address),
            }
        }

        fn control(
            &self,
            id: ShmId,
            command: ControlCommand,
        ) -> crate::native::NativeResult<crate::native::ControlOutcome> {
            match (command, self.remove_error) {
                (ControlCommand::Remove, Some(errno)) => Err(errno),
                _ => self.inner.control(id, command),
            }
        }
    }

    fn attached_on(bridge: FaultyBridge) -> SegmentHandle {
        let mut handle = SegmentHandle::new(Arc::new(bridge));
        handle
            .create(IPC_PRIVATE, 64, CreateFlags::CREATE, Mode::from_bits_truncate(0o600))
            .unwrap();
        handle.attach().unwrap();
        handle
    }

    #[test]
    fn test_remove_reports_detach_error_when_both_fail() {
        let mut handle = attached_on(FaultyBridge {
            inner: SimulatedBridge::new(),
            unmap_error: Some(Errno::EINVAL),
            remove_error: Some(Errno::EPERM),
        });
        let id = handle.id();

        let err = handle.remove().unwrap_err();
        assert!(matches!(
            err,
            ShmError::RemoveFailed {
                cause: FailureCause::Native(Errno::EPERM),
                detach_error: Some(Errno::EINVAL),
                ..
            }
        ));
        assert!(err.to_string().contains("preceding detach also failed"));
        assert_eq!(handle.state(), SegmentState::Attached);
        assert_eq!(handle.id(), id);
    }

    #[test]
    fn test_remove_continues_after_failed_detach() {
        let mut handle = attached_on(FaultyBridge {
            inner: SimulatedBridge::new(),
            unmap_error: Some(Errno::EINVAL),
            remove_error: None,
        });

        handle.remove().unwrap();
        assert_eq!(handle.state(), SegmentState::Removed);
        assert_eq!(handle.id(), ShmId::UNSET);
        assert_eq!(handle.mapped_len(), None);
    }

    #[test]
    fn test_attach_maps_full_segment_when_create_reuses_key() {
        let bridge = sim();
        let id = bridge
            .allocate(77, 2048, CreateFlags::CREATE.with_mode(Mode::from_bits_truncate(0o600)))
            .unwrap();

        let mut handle = SegmentHandle::new(bridge.clone());
        assert_eq!(
            handle
                .create(77, 1024, CreateFlags::CREATE, Mode::from_bits_truncate(0o600))
                .unwrap(),
            id
        );
        handle.attach().unwrap();
        assert_eq!(handle.mapped_len(), Some(2048));
        assert_eq!(handle.read_text(2048).unwrap(), "");
    }
}
