//! # shmgate segment lifecycle
//!
//! Safe lifecycle management for System V shared memory segments: create,
//! attach, stat, set, write, read, detach and remove, with the mapped pointer
//! owned by the handle so it can never outlive its mapping.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────┐    ┌──────────────────┐    ┌──────────────────┐
//! │ SegmentRegistry  │    │  SegmentHandle   │    │  NativeBridge    │
//! │                  │    │                  │    │                  │
//! │ (key, shmid) ────┼───►│ Unset/Detached/  ├───►│ SysvBridge       │
//! │   → handle       │    │ Attached/Removed │    │ SimulatedBridge  │
//! └──────────────────┘    └──────────────────┘    └──────────────────┘
//!                                                          │
//!                                                 ┌──────────────────┐
//!                                                 │ platform/        │
//!                                                 │ shmid_ds ⇄       │
//!                                                 │ SegmentMetadata  │
//!                                                 └──────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use shmgate_segment::{CreateFlags, Mode, SegmentRegistry, SimulatedBridge};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = SegmentRegistry::new(Arc::new(SimulatedBridge::new()));
//! let mode = Mode::from_octal_str("644")?;
//! let id = registry.create(5678, 1024, CreateFlags::CREATE, mode)?;
//!
//! registry.with_segment(5678, id, |h| h.with_attachment(|h| h.write_text("hello")))?;
//! let text = registry.with_segment(5678, id, |h| h.with_attachment(|h| h.read_text(1024)))?;
//! assert_eq!(text, "hello");
//!
//! registry.remove(5678, id)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Thread Safety
//!
//! - **SegmentHandle**: `Send`, not shared; wrap it in a mutex to share
//! - **SegmentRegistry**: `Send + Sync` with per-entry locking
//! - **NativeBridge**: implementations are `Send + Sync` and stateless
//!   towards the handle

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod handle;
pub mod metadata;
pub mod native;
pub mod platform;
pub mod registry;
pub mod segment;

pub use error::{FailureCause, ShmError, ShmResult};
pub use handle::{Mapping, SegmentHandle, SegmentState};
pub use metadata::{Mode, PermissionUpdate, SegmentMetadata};
pub use native::{ControlCommand, ControlOutcome, NativeBridge, SimulatedBridge};
#[cfg(any(target_os = "linux", target_os = "android", target_vendor = "apple"))]
pub use native::SysvBridge;
pub use registry::{SegmentRegistry, SharedHandle};
pub use segment::{CreateFlags, IPC_PRIVATE, IpcKey, SegmentIdentity, ShmId};

static_assertions::assert_impl_all!(SegmentRegistry: Send, Sync);
static_assertions::assert_impl_all!(SegmentHandle: Send);
static_assertions::assert_impl_all!(Mapping: Send);
static_assertions::assert_not_impl_any!(Mapping: Clone, Copy);

/// Initialize tracing for library consumers and tests
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
