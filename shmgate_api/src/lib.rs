//! # shmgate HTTP gateway
//!
//! Exposes System V segment lifecycle operations over HTTP.
//!
//! # Architecture
//!
//! ```text
//! HTTP clients ──JSON──► routes ──► SegmentRegistry ──► SegmentHandle ──► NativeBridge ──► kernel
//! ```
//!
//! Every failure is answered with `500 {"err": "<message>"}`.

pub mod config;
pub mod error;
pub mod payload;
pub mod routes;

use shmgate_segment::{NativeBridge, SegmentRegistry, SimulatedBridge};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::router;

/// Pick the native backend.
///
/// Falls back to the simulated backend on targets without System V IPC.
pub fn select_bridge(simulate: bool) -> Arc<dyn NativeBridge> {
    if simulate {
        info!("Simulated shared memory backend enabled");
        return Arc::new(SimulatedBridge::new());
    }

    #[cfg(any(target_os = "linux", target_os = "android", target_vendor = "apple"))]
    let bridge: Arc<dyn NativeBridge> = Arc::new(shmgate_segment::SysvBridge::new());

    #[cfg(not(any(target_os = "linux", target_os = "android", target_vendor = "apple")))]
    let bridge: Arc<dyn NativeBridge> = {
        warn!("System V shared memory unavailable on this target, using the simulated backend");
        Arc::new(SimulatedBridge::new())
    };

    bridge
}

/// Serve the gateway on `listener` until `shutdown` resolves, then detach
/// every mapping still held by the registry.
pub async fn serve<F>(
    listener: TcpListener,
    registry: Arc<SegmentRegistry>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(
        "Listening on {} ({} backend)",
        listener.local_addr()?,
        registry.bridge().name()
    );
    axum::serve(listener, router(registry.clone()))
        .with_graceful_shutdown(shutdown)
        .await?;

    let failures = registry.detach_all();
    if failures > 0 {
        warn!("{} segment(s) could not be detached during shutdown", failures);
    }
    info!("Gateway stopped with {} registered segment(s)", registry.len());
    Ok(())
}
