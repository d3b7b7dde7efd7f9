//! Prelude module for common re-exports.
//!
//! ```rust
//! use shmgate_common::prelude::*;
//! ```

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};

// ─── Constants ──────────────────────────────────────────────────────
pub use crate::consts::{DEFAULT_CONFIG_PATH, DEFAULT_LISTEN_ADDR, MODE_MASK, UNSET_SHMID};
