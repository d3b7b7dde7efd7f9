//! Process-wide table of live segment handles.
//!
//! Maps each OS identifier to one shared [`SegmentHandle`], so that every
//! request naming a segment operates on the same logical handle and is
//! serialized by the same lock. The caller key is recorded with the entry
//! and checked on lookup; it never creates a second entry for an id.
//!
//! Locking: every entry has its own mutex held for the duration of a
//! lifecycle operation. The table lock is taken only briefly for insert,
//! lookup and delete and is never held while waiting on an entry lock.
//! The only nesting is entry lock → table write lock, when an entry is
//! dropped after its segment was removed or found gone.

use crate::error::{ShmError, ShmResult};
use crate::handle::SegmentHandle;
use crate::metadata::Mode;
use crate::native::{ControlCommand, NativeBridge};
use crate::segment::{CreateFlags, IpcKey, ShmId};
use nix::errno::Errno;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tracing::{debug, warn};

/// Shared, individually locked handle.
pub type SharedHandle = Arc<Mutex<SegmentHandle>>;

struct Slot {
    key: IpcKey,
    handle: SharedHandle,
}

impl Slot {
    fn checked(&self, key: IpcKey, id: ShmId) -> ShmResult<SharedHandle> {
        if self.key != key {
            return Err(ShmError::IdentityMismatch {
                key,
                id,
                found_key: self.key,
                found_id: id,
            });
        }
        Ok(self.handle.clone())
    }
}

/// Registry of live handles, constructed at startup and shared by reference.
pub struct SegmentRegistry {
    bridge: Arc<dyn NativeBridge>,
    entries: RwLock<HashMap<ShmId, Slot>>,
}

impl SegmentRegistry {
    /// Create an empty registry whose handles use `bridge`.
    pub fn new(bridge: Arc<dyn NativeBridge>) -> Self {
        Self {
            bridge,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Backend shared by every handle of this registry.
    pub fn bridge(&self) -> &Arc<dyn NativeBridge> {
        &self.bridge
    }

    /// Insert `handle` for segment `id`, recorded under `key`.
    ///
    /// If `id` is already registered under the same key the live handle is
    /// kept, the new one is dropped, and the live one is returned.
    ///
    /// # Errors
    /// `IdentityMismatch` if the handle does not carry `(key, id)`, or if
    /// `id` is already registered under another key.
    pub fn register(&self, key: IpcKey, id: ShmId, handle: SegmentHandle) -> ShmResult<SharedHandle> {
        if handle.key() != key || handle.id() != id {
            return Err(ShmError::IdentityMismatch {
                key,
                id,
                found_key: handle.key(),
                found_id: handle.id(),
            });
        }

        let mut entries = self.entries.write();
        match entries.entry(id) {
            Entry::Occupied(existing) => {
                debug!("shmid {} (key {}) already registered", id, key);
                existing.get().checked(key, id)
            }
            Entry::Vacant(slot) => {
                let handle = Arc::new(Mutex::new(handle));
                slot.insert(Slot {
                    key,
                    handle: handle.clone(),
                });
                Ok(handle)
            }
        }
    }

    /// Live handle for `(key, id)`.
    ///
    /// # Errors
    /// `NotFound` if `id` is not registered, `IdentityMismatch` if it is
    /// registered under another key.
    pub fn lookup(&self, key: IpcKey, id: ShmId) -> ShmResult<SharedHandle> {
        match self.entries.read().get(&id) {
            Some(slot) => slot.checked(key, id),
            None => Err(ShmError::NotFound { key, id }),
        }
    }

    /// Drop the entry for `(key, id)`, returning it if present.
    ///
    /// An entry recorded under another key is left in place.
    pub fn unregister(&self, key: IpcKey, id: ShmId) -> Option<SharedHandle> {
        let mut entries = self.entries.write();
        match entries.entry(id) {
            Entry::Occupied(slot) if slot.get().key == key => Some(slot.remove().handle),
            _ => None,
        }
    }

    /// Create a segment and register its handle. Returns the OS identifier.
    pub fn create(&self, key: IpcKey, size: usize, flags: CreateFlags, mode: Mode) -> ShmResult<ShmId> {
        let mut handle = SegmentHandle::new(self.bridge.clone());
        let id = handle.create(key, size, flags, mode)?;
        self.register(key, id, handle)?;
        Ok(id)
    }

    /// Register a handle for a segment the OS already knows.
    ///
    /// # Errors
    /// `NotFound` if the OS does not know `id`, `StatFailed` for any other
    /// stat failure, `IdentityMismatch` if `id` is registered under another key.
    pub fn adopt(&self, key: IpcKey, id: ShmId) -> ShmResult<SharedHandle> {
        let handle = SegmentHandle::adopt(self.bridge.clone(), key, id)?;
        self.register(key, id, handle)
    }

    /// [`SegmentRegistry::lookup`], falling back to [`SegmentRegistry::adopt`].
    pub fn resolve(&self, key: IpcKey, id: ShmId) -> ShmResult<SharedHandle> {
        match self.lookup(key, id) {
            Ok(handle) => Ok(handle),
            Err(ShmError::NotFound { .. }) => self.adopt(key, id),
            Err(e) => Err(e),
        }
    }

    /// Run `f` on the resolved handle while holding its entry lock.
    ///
    /// If `f` fails because the OS no longer knows the segment, the entry
    /// is dropped.
    pub fn with_segment<T>(
        &self,
        key: IpcKey,
        id: ShmId,
        f: impl FnOnce(&mut SegmentHandle) -> ShmResult<T>,
    ) -> ShmResult<T> {
        let shared = self.resolve(key, id)?;
        let mut handle = shared.lock();
        f(&mut handle).inspect_err(|err| self.evict_if_gone(id, &shared, err))
    }

    /// Remove the segment and its entry.
    ///
    /// The entry is unregistered while its lock is still held, so a racing
    /// caller sees either `NotFound` or a handle already in `Removed`.
    pub fn remove(&self, key: IpcKey, id: ShmId) -> ShmResult<()> {
        let shared = self.resolve(key, id)?;
        let mut handle = shared.lock();
        if let Err(err) = handle.remove() {
            self.evict_if_gone(id, &shared, &err);
            return Err(err);
        }
        self.drop_entry(id, &shared);
        Ok(())
    }

    /// Best-effort detach of every registered handle. Returns the number of
    /// handles that failed to detach.
    pub fn detach_all(&self) -> usize {
        let handles: Vec<SharedHandle> = self
            .entries
            .read()
            .values()
            .map(|slot| slot.handle.clone())
            .collect();
        let mut failures = 0;
        for shared in handles {
            let mut handle = shared.lock();
            if let Err(e) = handle.detach() {
                warn!("Detach during shutdown failed: {}", e);
                failures += 1;
            }
        }
        failures
    }

    /// Number of registered handles.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop the entry of `id` if the segment behind it no longer exists.
    /// Called with the entry lock held.
    fn evict_if_gone(&self, id: ShmId, shared: &SharedHandle, err: &ShmError) {
        if !matches!(err.errno(), Some(Errno::EINVAL | Errno::EIDRM)) {
            return;
        }
        if let Err(Errno::EINVAL | Errno::EIDRM) = self.bridge.control(id, ControlCommand::Stat) {
            warn!("shmid {} no longer exists, dropping its registry entry", id);
            self.drop_entry(id, shared);
        }
    }

    fn drop_entry(&self, id: ShmId, shared: &SharedHandle) {
        let mut entries = self.entries.write();
        if entries
            .get(&id)
            .is_some_and(|slot| Arc::ptr_eq(&slot.handle, shared))
        {
            entries.remove(&id);
        }
    }
}

impl std::fmt::Debug for SegmentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentRegistry")
            .field("backend", &self.bridge.name())
            .field("entries", &self.len())
            .finish()
    }
}
