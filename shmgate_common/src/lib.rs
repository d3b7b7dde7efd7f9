//! shmgate Common Library
//!
//! Shared constants and configuration loading utilities for all shmgate
//! workspace crates.
//!
//! # Module Structure
//!
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Default addresses, paths and limits
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! shmgate = { package = "shmgate_common", path = "../shmgate_common" }
//! ```
//!
//! ```rust
//! use shmgate_common::config::{ConfigLoader, SharedConfig};
//! use shmgate_common::consts::MODE_MASK;
//! ```

pub mod config;
pub mod consts;
pub mod prelude;
