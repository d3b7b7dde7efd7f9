//! Kernel System V backend

use super::{ControlCommand, ControlOutcome, NativeBridge, NativeResult};
use crate::platform;
use crate::segment::{IpcKey, ShmId};
use nix::errno::Errno;
use std::ptr::NonNull;
use tracing::trace;

/// Bridge calling `shmget`/`shmat`/`shmdt`/`shmctl` through libc.
#[derive(Debug, Default, Clone, Copy)]
pub struct SysvBridge;

impl SysvBridge {
    /// Create the kernel bridge.
    pub const fn new() -> Self {
        Self
    }

    fn stat_buffer(id: ShmId) -> NativeResult<libc::shmid_ds> {
        // SAFETY: shmid_ds is plain old data; the kernel fills it in.
        let mut buf: libc::shmid_ds = unsafe { std::mem::zeroed() };
        // SAFETY: buf is a valid, writable shmid_ds for the duration of the call.
        Errno::result(unsafe { libc::shmctl(id.raw(), libc::IPC_STAT, &mut buf) })?;
        Ok(buf)
    }
}

impl NativeBridge for SysvBridge {
    fn name(&self) -> &'static str {
        "sysv"
    }

    fn allocate(&self, key: IpcKey, size: usize, flags: i32) -> NativeResult<ShmId> {
        // SAFETY: shmget takes plain integers.
        let id = Errno::result(unsafe { libc::shmget(key as libc::key_t, size, flags) })?;
        trace!("shmget(key={}, size={}, flags={:#o}) -> {}", key, size, flags, id);
        Ok(ShmId::new(id))
    }

    fn map(&self, id: ShmId) -> NativeResult<NonNull<u8>> {
        // SAFETY: a null address lets the kernel choose the placement.
        let address = unsafe { libc::shmat(id.raw(), std::ptr::null(), 0) };
        if address as isize == -1 {
            return Err(Errno::last());
        }
        trace!("shmat(shmid={}) -> {:p}", id, address);
        NonNull::new(address.cast::<u8>()).ok_or(Errno::EINVAL)
    }

    fn unmap(&self, address: NonNull<u8>) -> NativeResult<()> {
        // SAFETY: address came from shmat; the caller gives up its mapping.
        Errno::result(unsafe { libc::shmdt(address.as_ptr().cast::<libc::c_void>()) })?;
        trace!("shmdt({:p})", address);
        Ok(())
    }

    fn control(&self, id: ShmId, command: ControlCommand) -> NativeResult<ControlOutcome> {
        trace!("shmctl(shmid={}, {:?})", id, command);
        match command {
            ControlCommand::Stat => {
                let buf = Self::stat_buffer(id)?;
                Ok(ControlOutcome::Stat(platform::to_canonical(&buf)))
            }
            ControlCommand::Set(update) => {
                // IPC_SET consumes a full buffer; begin from the live values.
                let mut buf = Self::stat_buffer(id)?;
                platform::apply_update(&mut buf, &update);
                // SAFETY: buf is a valid shmid_ds for the duration of the call.
                Errno::result(unsafe { libc::shmctl(id.raw(), libc::IPC_SET, &mut buf) })?;
                Ok(ControlOutcome::Done)
            }
            ControlCommand::Remove => {
                // SAFETY: IPC_RMID does not read the buffer argument.
                Errno::result(unsafe {
                    libc::shmctl(id.raw(), libc::IPC_RMID, std::ptr::null_mut())
                })?;
                Ok(ControlOutcome::Done)
            }
        }
    }
}
