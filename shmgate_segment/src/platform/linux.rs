//! Linux `shmid_ds` translation
//!
//! glibc and musl disagree on the width of `ipc_perm.mode` (`c_ushort` vs
//! `mode_t`) and `shm_nattch` is a `c_ulong`. The mode word also carries
//! `SHM_DEST` and `SHM_LOCKED` above the permission bits, which are dropped.

use crate::metadata::{Mode, PermissionUpdate, SegmentMetadata};

/// Translate a kernel `shmid_ds` into the canonical snapshot.
#[allow(clippy::unnecessary_cast)]
pub(crate) fn to_canonical(ds: &libc::shmid_ds) -> SegmentMetadata {
    SegmentMetadata {
        owner_uid: ds.shm_perm.uid as u32,
        owner_gid: ds.shm_perm.gid as u32,
        creator_uid: ds.shm_perm.cuid as u32,
        creator_gid: ds.shm_perm.cgid as u32,
        mode: Mode::from_bits_truncate(ds.shm_perm.mode as u32),
        size_bytes: ds.shm_segsz as usize,
        creator_pid: ds.shm_cpid as i32,
        last_attach_pid: ds.shm_lpid as i32,
        attach_count: ds.shm_nattch as u64,
        last_attach_time: ds.shm_atime as i64,
        last_detach_time: ds.shm_dtime as i64,
        last_change_time: ds.shm_ctime as i64,
    }
}

/// Write the `IPC_SET` fields into a buffer previously filled by `IPC_STAT`.
pub(crate) fn apply_update(ds: &mut libc::shmid_ds, update: &PermissionUpdate) {
    ds.shm_perm.uid = update.uid as libc::uid_t;
    ds.shm_perm.gid = update.gid as libc::gid_t;
    ds.shm_perm.mode = update.mode.bits() as _;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zeroed() -> libc::shmid_ds {
        // SAFETY: shmid_ds is plain old data; all-zero is a valid value.
        unsafe { std::mem::zeroed() }
    }

    #[test]
    fn test_translation_masks_kernel_flags() {
        let mut ds = zeroed();
        ds.shm_perm.uid = 1000;
        ds.shm_perm.gid = 100;
        ds.shm_perm.cuid = 0;
        ds.shm_perm.cgid = 0;
        // 0o1000 is SHM_DEST
        ds.shm_perm.mode = 0o1644 as _;
        ds.shm_segsz = 1024;
        ds.shm_cpid = 42;
        ds.shm_lpid = 43;
        ds.shm_nattch = 2;
        ds.shm_atime = 10;
        ds.shm_dtime = 11;
        ds.shm_ctime = 12;

        let meta = to_canonical(&ds);
        assert_eq!(meta.owner_uid, 1000);
        assert_eq!(meta.owner_gid, 100);
        assert_eq!(meta.mode.bits(), 0o644);
        assert_eq!(meta.size_bytes, 1024);
        assert_eq!(meta.creator_pid, 42);
        assert_eq!(meta.last_attach_pid, 43);
        assert_eq!(meta.attach_count, 2);
        assert_eq!(
            (meta.last_attach_time, meta.last_detach_time, meta.last_change_time),
            (10, 11, 12)
        );
    }

    #[test]
    fn test_apply_update_leaves_creator_fields() {
        let mut ds = zeroed();
        ds.shm_perm.cuid = 500;
        ds.shm_perm.cgid = 501;
        apply_update(
            &mut ds,
            &PermissionUpdate {
                uid: 7,
                gid: 8,
                mode: Mode::from_bits_truncate(0o600),
            },
        );
        let meta = to_canonical(&ds);
        assert_eq!((meta.owner_uid, meta.owner_gid), (7, 8));
        assert_eq!((meta.creator_uid, meta.creator_gid), (500, 501));
        assert_eq!(meta.mode.bits(), 0o600);
    }
}
