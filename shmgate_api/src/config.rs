//! Gateway configuration (`shmgate.toml`).
//!
//! ```toml
//! [shared]
//! log_level = "info"
//! service_name = "shmgate"
//!
//! [server]
//! listen = "0.0.0.0:50000"
//!
//! [backend]
//! simulate = false
//! ```
//!
//! Every section is optional; CLI flags override file values.

use serde::{Deserialize, Serialize};
use shmgate::config::{ConfigError, SharedConfig};
use shmgate::consts::DEFAULT_LISTEN_ADDR;
use std::net::SocketAddr;

/// Top-level gateway configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Fields common to every shmgate binary
    #[serde(default)]
    pub shared: SharedConfig,
    /// HTTP listener
    #[serde(default)]
    pub server: ServerConfig,
    /// Native backend selection
    #[serde(default)]
    pub backend: BackendConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_listen() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

/// Native backend settings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Use the in-process simulated backend instead of the kernel
    #[serde(default)]
    pub simulate: bool,
}

impl ApiConfig {
    /// Validate and return the parsed listen address.
    ///
    /// # Errors
    ///
    /// `ConfigError::ValidationError` for an empty service name or an
    /// unparsable listen address.
    pub fn validate(&self) -> Result<SocketAddr, ConfigError> {
        self.shared.validate()?;
        self.server.listen.parse().map_err(|e| {
            ConfigError::ValidationError(format!(
                "server.listen '{}' is not a socket address: {e}",
                self.server.listen
            ))
        })
    }
}
