//! # Snack Stand Register
//!
//! The register process: loads the snapshot, wires the service facade,
//! optionally starts the sync agent, and waits for a shutdown signal.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Register Process                                 │
//! │                                                                         │
//! │  pos.toml ──► AppConfig                                                 │
//! │                   │                                                     │
//! │  snapshot ──► Register ──► RegisterState ──┬──► RegisterService        │
//! │                                             │         │                 │
//! │                                             └──► SyncAgent (live mode)  │
//! │                                                       │                 │
//! │                                              remote key-value store     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod lock;
mod service;
mod state;

use std::sync::Arc;

use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

use snack_core::Register;
use snack_store::SnapshotStore;
use snack_sync::{InMemoryRemote, SyncAgent};

use crate::config::AppConfig;
use crate::lock::ScreenLock;
use crate::service::{RegisterService, SnapshotFoldListener};
use crate::state::RegisterState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting snack stand register...");

    let config = AppConfig::load_or_default(None);
    info!(
        stand = %config.device_name(),
        mode = %config.sync.mode,
        data_dir = %config.data_dir().display(),
        "Configuration loaded"
    );

    // A broken snapshot must not brick the stand: log it and open with
    // the seed catalog instead.
    let store = SnapshotStore::new(config.data_dir());
    let register = match store.load() {
        Ok(Some(snapshot)) => snapshot.into_register(),
        Ok(None) => {
            info!("No snapshot on disk; starting with the default catalog");
            Register::with_default_catalog()
        }
        Err(e) => {
            warn!(error = %e, "Snapshot unreadable; starting with the default catalog");
            Register::with_default_catalog()
        }
    };
    let state = RegisterState::new(register);

    let sync = if config.is_sync_enabled() {
        // The in-memory backend keeps this binary self-contained; a real
        // deployment hands the agent its own RemoteStore implementation.
        let remote = Arc::new(InMemoryRemote::new());
        let listener = SnapshotFoldListener::new(state.clone(), store.clone());
        let handle = SyncAgent::with_listener(remote, state.shared(), Arc::new(listener))
            .start()
            .await;
        info!("Sync agent running");
        Some(handle)
    } else {
        info!("Sync disabled (mode: offline)");
        None
    };

    let service = RegisterService::new(state, store, ScreenLock::new(config.admin_pin()), sync);
    info!(items = service.items().len(), "Register ready");

    shutdown_signal().await;

    service.shutdown().await;
    info!("Register shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=snack_sync=trace` - Show trace for one crate only
/// - Default: INFO, with DEBUG for the snack crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,snack_core=debug,snack_store=debug,snack_sync=debug,snack_register=debug")
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .init();
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
