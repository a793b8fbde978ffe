use tokio::signal;
use tracing::{error, info, warn};

use ollama_relay_core::{GatewaySnapshot, SharedSnapshot};

use crate::config_source::ConfigSource;

#[allow(
    clippy::expect_used,
    reason = "Signal handlers are critical infrastructure, panic is appropriate on failure"
)]
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received, draining connections");
}

/// Re-read configuration on SIGHUP and swap the snapshot.
///
/// The listener stays bound to its original address; only the alias table,
/// upstream settings and inbound key change.
#[cfg(unix)]
pub async fn reload_on_sighup(shared: SharedSnapshot, source: ConfigSource, bound_addr: String) {
    let mut hangup = match signal::unix::signal(signal::unix::SignalKind::hangup()) {
        Ok(s) => s,
        Err(e) => {
            warn!("SIGHUP reload disabled: {}", e);
            return;
        },
    };

    while hangup.recv().await.is_some() {
        info!("SIGHUP received, reloading configuration");
        let loaded = match source.load() {
            Ok(loaded) => loaded,
            Err(e) => {
                error!("Reload failed, keeping previous configuration: {}", e);
                continue;
            },
        };
        if loaded.config.socket_addr() != bound_addr {
            warn!(
                "Listen address change to {} requires a restart; still serving on {}",
                loaded.config.socket_addr(),
                bound_addr
            );
        }
        match GatewaySnapshot::from_config(&loaded.config) {
            Ok(snapshot) => shared.replace(snapshot).await,
            Err(e) => error!("Reload failed, keeping previous configuration: {}", e),
        }
    }
}
