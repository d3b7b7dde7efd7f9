//! Simulated System V backend.
//!
//! The `SimulatedBridge` emulates the kernel's bookkeeping in process memory:
//! key lookup with `IPC_CREAT`/`IPC_EXCL`, zero-filled page-aligned regions,
//! attach counts and pids, timestamps, and deferred destruction of a removed
//! segment until its last detach. It lets the service and its tests run
//! where System V IPC is unavailable.

use super::{ControlCommand, ControlOutcome, NativeBridge, NativeResult};
use crate::metadata::{Mode, SegmentMetadata};
use crate::platform::{current_gid, current_pid, current_uid, unix_now};
use crate::segment::{CreateFlags, IPC_PRIVATE, IpcKey, ShmId};
use nix::errno::Errno;
use parking_lot::Mutex;
use std::alloc::{Layout, alloc_zeroed, dealloc};
use std::collections::HashMap;
use std::ptr::NonNull;
use tracing::trace;

/// Allocation granularity of simulated regions.
pub const SIM_PAGE_SIZE: usize = 4096;

/// Default upper bound on a single segment (mirrors a typical `SHMMAX`).
pub const SIM_MAX_SEGMENT_SIZE: usize = 1 << 30;

/// First identifier handed out; keeps ids clear of small test keys.
const FIRST_SIM_ID: i32 = 65536;

/// Zero-filled, page-aligned heap region standing in for a segment.
struct Region {
    ptr: NonNull<u8>,
    layout: Layout,
}

// SAFETY: the region is plain memory owned by the simulator; access to the
// bookkeeping is serialized by the bridge mutex and data access by the
// owning handle.
unsafe impl Send for Region {}

impl Region {
    fn zeroed(size: usize) -> NativeResult<Self> {
        let len = size.div_ceil(SIM_PAGE_SIZE).max(1) * SIM_PAGE_SIZE;
        let layout = Layout::from_size_align(len, SIM_PAGE_SIZE).map_err(|_| Errno::EINVAL)?;
        // SAFETY: layout has a non-zero size.
        let ptr = unsafe { alloc_zeroed(layout) };
        NonNull::new(ptr)
            .map(|ptr| Self { ptr, layout })
            .ok_or(Errno::ENOMEM)
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        // SAFETY: ptr was returned by alloc_zeroed with this layout.
        unsafe { dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

struct SimSegment {
    key: IpcKey,
    region: Region,
    meta: SegmentMetadata,
    /// IPC_RMID issued while attached; freed on last detach.
    destroyed: bool,
}

struct SimState {
    next_id: i32,
    segments: HashMap<ShmId, SimSegment>,
    /// Base address -> (segment, number of live attaches at that address)
    attachments: HashMap<usize, (ShmId, usize)>,
}

/// In-process bridge emulating `shmget`/`shmat`/`shmdt`/`shmctl`.
pub struct SimulatedBridge {
    state: Mutex<SimState>,
    max_segment_size: usize,
}

impl SimulatedBridge {
    /// Create an empty simulator.
    pub fn new() -> Self {
        Self::with_max_segment_size(SIM_MAX_SEGMENT_SIZE)
    }

    /// Create a simulator rejecting segments larger than `max_segment_size`.
    pub fn with_max_segment_size(max_segment_size: usize) -> Self {
        Self {
            state: Mutex::new(SimState {
                next_id: FIRST_SIM_ID,
                segments: HashMap::new(),
                attachments: HashMap::new(),
            }),
            max_segment_size,
        }
    }

    /// Segments not yet destroyed.
    pub fn live_segments(&self) -> usize {
        self.state
            .lock()
            .segments
            .values()
            .filter(|segment| !segment.destroyed)
            .count()
    }

    /// Live mappings across all segments.
    pub fn live_mappings(&self) -> usize {
        self.state.lock().attachments.values().map(|(_, n)| n).sum()
    }
}

impl Default for SimulatedBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeBridge for SimulatedBridge {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn allocate(&self, key: IpcKey, size: usize, flags: i32) -> NativeResult<ShmId> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let create = CreateFlags::from_bits_truncate(flags);

        if key != IPC_PRIVATE {
            let existing = state
                .segments
                .iter()
                .find(|(_, segment)| segment.key == key && !segment.destroyed);
            if let Some((&id, segment)) = existing {
                if create.contains(CreateFlags::CREATE | CreateFlags::EXCLUSIVE) {
                    return Err(Errno::EEXIST);
                }
                if size > segment.meta.size_bytes {
                    return Err(Errno::EINVAL);
                }
                trace!("sim shmget(key={}) -> existing {}", key, id);
                return Ok(id);
            }
            if !create.contains(CreateFlags::CREATE) {
                return Err(Errno::ENOENT);
            }
        }

        if size == 0 || size > self.max_segment_size {
            return Err(Errno::EINVAL);
        }

        let region = Region::zeroed(size)?;
        let id = ShmId::new(state.next_id);
        state.next_id += 1;

        let (uid, gid) = (current_uid(), current_gid());
        let meta = SegmentMetadata {
            owner_uid: uid,
            owner_gid: gid,
            creator_uid: uid,
            creator_gid: gid,
            mode: Mode::from_bits_truncate(flags as u32),
            size_bytes: size,
            creator_pid: current_pid(),
            last_attach_pid: 0,
            attach_count: 0,
            last_attach_time: 0,
            last_detach_time: 0,
            last_change_time: unix_now(),
        };
        state.segments.insert(
            id,
            SimSegment {
                key,
                region,
                meta,
                destroyed: false,
            },
        );
        trace!("sim shmget(key={}, size={}) -> {}", key, size, id);
        Ok(id)
    }

    fn map(&self, id: ShmId) -> NativeResult<NonNull<u8>> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let segment = state.segments.get_mut(&id).ok_or(Errno::EINVAL)?;
        if segment.destroyed {
            return Err(Errno::EIDRM);
        }

        segment.meta.attach_count += 1;
        segment.meta.last_attach_pid = current_pid();
        segment.meta.last_attach_time = unix_now();

        let address = segment.region.ptr;
        state
            .attachments
            .entry(address.as_ptr() as usize)
            .or_insert((id, 0))
            .1 += 1;
        trace!("sim shmat(shmid={}) -> {:p}", id, address);
        Ok(address)
    }

    fn unmap(&self, address: NonNull<u8>) -> NativeResult<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let slot = address.as_ptr() as usize;

        let (id, remaining) = match state.attachments.get_mut(&slot) {
            Some(entry) => {
                entry.1 -= 1;
                (entry.0, entry.1)
            }
            None => return Err(Errno::EINVAL),
        };
        if remaining == 0 {
            state.attachments.remove(&slot);
        }

        let release = match state.segments.get_mut(&id) {
            Some(segment) => {
                segment.meta.attach_count = segment.meta.attach_count.saturating_sub(1);
                segment.meta.last_attach_pid = current_pid();
                segment.meta.last_detach_time = unix_now();
                segment.destroyed && segment.meta.attach_count == 0
            }
            None => false,
        };
        if release {
            state.segments.remove(&id);
            trace!("sim shmid {} released after last detach", id);
        }
        trace!("sim shmdt({:p})", address);
        Ok(())
    }

    fn control(&self, id: ShmId, command: ControlCommand) -> NativeResult<ControlOutcome> {
        let mut state = self.state.lock();
        let segment = state.segments.get_mut(&id).ok_or(Errno::EINVAL)?;
        match command {
            ControlCommand::Stat => Ok(ControlOutcome::Stat(segment.meta)),
            ControlCommand::Set(update) => {
                segment.meta.owner_uid = update.uid;
                segment.meta.owner_gid = update.gid;
                segment.meta.mode = update.mode;
                segment.meta.last_change_time = unix_now();
                Ok(ControlOutcome::Done)
            }
            ControlCommand::Remove => {
                segment.meta.last_change_time = unix_now();
                if segment.meta.attach_count == 0 {
                    state.segments.remove(&id);
                } else {
                    segment.destroyed = true;
                }
                Ok(ControlOutcome::Done)
            }
        }
    }
}
