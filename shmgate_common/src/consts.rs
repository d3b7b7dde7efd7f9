//! Workspace-wide constants.
//!
//! Single source of truth for default addresses, paths and limits.

/// Default service name used when the config file omits one.
pub const DEFAULT_SERVICE_NAME: &str = "shmgate";

/// Default HTTP listen address of the gateway.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:50000";

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/shmgate/shmgate.toml";

/// Permission bits a segment mode may carry (`rwxrwxrwx`).
pub const MODE_MASK: u32 = 0o777;

/// Identifier value of a handle that has no OS segment behind it.
pub const UNSET_SHMID: i32 = -1;
