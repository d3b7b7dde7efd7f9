//! Darwin `shmid_ds` translation
//!
//! `ipc_perm` leads with the ids and a 16-bit `mode_t`; `shm_nattch` is a
//! `c_ushort`. The struct is packed, so fields are only ever copied out.

use crate::metadata::{Mode, PermissionUpdate, SegmentMetadata};

/// Translate a kernel `shmid_ds` into the canonical snapshot.
#[allow(clippy::unnecessary_cast)]
pub(crate) fn to_canonical(ds: &libc::shmid_ds) -> SegmentMetadata {
    let perm = ds.shm_perm;
    SegmentMetadata {
        owner_uid: perm.uid as u32,
        owner_gid: perm.gid as u32,
        creator_uid: perm.cuid as u32,
        creator_gid: perm.cgid as u32,
        mode: Mode::from_bits_truncate(perm.mode as u32),
        size_bytes: { ds.shm_segsz } as usize,
        creator_pid: { ds.shm_cpid } as i32,
        last_attach_pid: { ds.shm_lpid } as i32,
        attach_count: { ds.shm_nattch } as u64,
        last_attach_time: { ds.shm_atime } as i64,
        last_detach_time: { ds.shm_dtime } as i64,
        last_change_time: { ds.shm_ctime } as i64,
    }
}

/// Write the `IPC_SET` fields into a buffer previously filled by `IPC_STAT`.
pub(crate) fn apply_update(ds: &mut libc::shmid_ds, update: &PermissionUpdate) {
    let mut perm = ds.shm_perm;
    perm.uid = update.uid as libc::uid_t;
    perm.gid = update.gid as libc::gid_t;
    perm.mode = update.mode.bits() as libc::mode_t;
    ds.shm_perm = perm;
}
