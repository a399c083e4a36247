//! # Sync Agent
//!
//! Main orchestrator for register reconciliation. Runs the initial pull,
//! the fold loops, and the outbound mirror.
//!
//! ## Agent Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SyncAgent Architecture                           │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                         SyncAgent::start                         │  │
//! │  │                                                                  │  │
//! │  │  1. Open all six (table, kind) subscriptions                     │  │
//! │  │  2. Initial pull: select_all both tables, fold as snapshots      │  │
//! │  │     (empty remote catalog → publish the local seed instead)      │  │
//! │  │  3. Spawn one fold loop per subscription                         │  │
//! │  │  4. Spawn the outbound mirror                                    │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │  Fold loops    │  │OutboundMirror  │  │   SyncStatus (watch)   │    │
//! │  │  (6 tasks)     │  │                │  │                        │    │
//! │  │                │  │ Pushes local   │  │ idle → syncing →       │    │
//! │  │ Apply remote   │  │ mutations,     │  │ success | error →      │    │
//! │  │ changes to the │  │ fire-and-      │  │ idle                   │    │
//! │  │ register       │  │ forget         │  │                        │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  Subscriptions open BEFORE the pull, so changes written while the      │
//! │  snapshot is in flight buffer up and fold afterwards. Any overlap      │
//! │  with the snapshot is harmless: inserts dedupe by id, updates          │
//! │  replace, deletes ignore missing rows. The same rules swallow the      │
//! │  echo of this register's own mirror pushes.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use snack_core::{Item, Register, Sale};

use crate::error::SyncError;
use crate::events::{ChangeEvent, EventKind, Table};
use crate::outbound::{OutboundHandle, OutboundOp, OutboundProcessor};
use crate::remote::RemoteStore;

// =============================================================================
// Sync Status
// =============================================================================

/// Where the sync machine currently sits.
///
/// Transitions are `idle → syncing → success | error → idle`; terminal
/// outcomes are momentary, the machine always settles back to idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Syncing,
    Success,
    Error,
}

impl SyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::Idle => "idle",
            SyncState::Syncing => "syncing",
            SyncState::Success => "success",
            SyncState::Error => "error",
        }
    }
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current sync status for external queries.
#[derive(Debug, Clone)]
pub struct SyncStatus {
    /// Current machine state.
    pub state: SyncState,

    /// Mutations mirrored to the remote since startup.
    pub pushed: u64,

    /// Most recent pull or push failure; cleared by the next success.
    pub last_error: Option<String>,

    /// When the remote last accepted a mirror push.
    pub last_success_at: Option<DateTime<Utc>>,
}

impl Default for SyncStatus {
    fn default() -> Self {
        SyncStatus {
            state: SyncState::Idle,
            pushed: 0,
            last_error: None,
            last_success_at: None,
        }
    }
}

// =============================================================================
// Fold Listener Trait
// =============================================================================

/// Observes register changes made by the sync side (implemented by the
/// app to persist and to notify the UI).
pub trait FoldListener: Send + Sync {
    /// Called once after the initial pull has been applied.
    fn pulled(&self);

    /// Called after one change event has been folded into the register.
    fn folded(&self, table: Table, kind: EventKind);
}

/// No-op listener for testing and headless use.
pub struct NoOpListener;

impl FoldListener for NoOpListener {
    fn pulled(&self) {}
    fn folded(&self, _table: Table, _kind: EventKind) {}
}

// =============================================================================
// Sync Agent
// =============================================================================

/// Reconciles one register against the shared remote store.
pub struct SyncAgent {
    /// Remote document store.
    remote: Arc<dyn RemoteStore>,

    /// The register this agent keeps in step.
    register: Arc<Mutex<Register>>,

    /// Observer for sync-side register changes.
    listener: Arc<dyn FoldListener>,
}

impl SyncAgent {
    /// Creates a new sync agent.
    pub fn new(remote: Arc<dyn RemoteStore>, register: Arc<Mutex<Register>>) -> Self {
        Self::with_listener(remote, register, Arc::new(NoOpListener))
    }

    /// Creates a new sync agent with a custom fold listener.
    pub fn with_listener(
        remote: Arc<dyn RemoteStore>,
        register: Arc<Mutex<Register>>,
        listener: Arc<dyn FoldListener>,
    ) -> Self {
        SyncAgent {
            remote,
            register,
            listener,
        }
    }

    /// Starts the agent and returns a handle to it.
    ///
    /// Never fails: an unreachable remote degrades to local-only
    /// operation with the failure on the status surface. The register
    /// keeps selling either way.
    pub async fn start(self) -> SyncAgentHandle {
        info!("Starting sync agent");

        let (status_tx, status_rx) = watch::channel(SyncStatus::default());
        let status_tx = Arc::new(status_tx);

        // Subscriptions open before the pull so nothing written during
        // the snapshot is missed; overlapping events fold as no-ops.
        let mut streams = Vec::new();
        for table in Table::ALL {
            for kind in EventKind::ALL {
                match self.remote.subscribe(table, kind).await {
                    Ok(stream) => streams.push((table, kind, stream)),
                    Err(e) => warn!(
                        %table,
                        %kind,
                        ?e,
                        "Subscription failed; changes of this kind will not arrive"
                    ),
                }
            }
        }

        Self::initial_pull(&self.remote, &self.register, &self.listener, &status_tx).await;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        for (table, kind, stream) in streams {
            tokio::spawn(Self::run_fold_loop(
                self.register.clone(),
                self.listener.clone(),
                table,
                kind,
                stream,
                shutdown_rx.clone(),
            ));
        }

        let (processor, outbound) = OutboundProcessor::new(self.remote.clone(), status_tx.clone());
        tokio::spawn(processor.run());

        info!("Sync agent started");

        SyncAgentHandle {
            outbound,
            status_rx,
            status_tx,
            shutdown_tx,
        }
    }

    /// Pulls both tables and folds them into the register as snapshots.
    ///
    /// An empty remote catalog is not adopted; instead the local catalog
    /// is published so the first register to come up seeds the store.
    async fn initial_pull(
        remote: &Arc<dyn RemoteStore>,
        register: &Arc<Mutex<Register>>,
        listener: &Arc<dyn FoldListener>,
        status_tx: &Arc<watch::Sender<SyncStatus>>,
    ) {
        status_tx.send_modify(|s| s.state = SyncState::Syncing);

        let pulled = async {
            let items = remote.select_all(Table::Items).await?;
            let sales = remote.select_all(Table::Sales).await?;
            Ok::<_, SyncError>((items, sales))
        }
        .await;

        let (item_rows, sale_rows) = match pulled {
            Ok(rows) => rows,
            Err(e) => {
                warn!(?e, "Initial pull failed; keeping local state");
                status_tx.send_modify(|s| {
                    s.state = SyncState::Error;
                    s.last_error = Some(e.to_string());
                });
                status_tx.send_modify(|s| s.state = SyncState::Idle);
                return;
            }
        };

        let items = decode_rows::<Item>(Table::Items, item_rows);
        let sales = decode_rows::<Sale>(Table::Sales, sale_rows);
        let item_count = items.len();
        let sale_count = sales.len();

        // One lock covers both snapshots so no fold interleaves between
        // them. If the remote catalog was empty we keep ours and push it
        // up after releasing the lock.
        let seed: Vec<Item> = {
            let mut reg = register.lock().expect("register mutex poisoned");
            let adopted = reg.apply_items_snapshot(items);
            reg.apply_sales_snapshot(sales);
            if adopted {
                Vec::new()
            } else {
                reg.items().to_vec()
            }
        };

        info!(
            items = item_count,
            sales = sale_count,
            adopted = seed.is_empty(),
            "Initial pull applied"
        );
        listener.pulled();

        let mut seed_errors = 0usize;
        if !seed.is_empty() {
            info!(count = seed.len(), "Remote catalog empty; publishing local seed");
            for item in &seed {
                let row = match serde_json::to_value(item) {
                    Ok(row) => row,
                    Err(e) => {
                        warn!(?e, item_id = %item.id, "Seed item failed to encode");
                        seed_errors += 1;
                        continue;
                    }
                };
                if let Err(e) = remote.insert(Table::Items, row).await {
                    warn!(?e, item_id = %item.id, "Failed to publish seed item");
                    seed_errors += 1;
                }
            }
        }

        if seed_errors > 0 {
            status_tx.send_modify(|s| {
                s.state = SyncState::Error;
                s.last_error = Some(format!("{seed_errors} seed items failed to publish"));
            });
        } else {
            status_tx.send_modify(|s| {
                s.state = SyncState::Success;
                s.last_error = None;
                s.last_success_at = Some(Utc::now());
            });
        }
        status_tx.send_modify(|s| s.state = SyncState::Idle);
    }

    /// Consumes one (table, kind) subscription until shutdown.
    async fn run_fold_loop(
        register: Arc<Mutex<Register>>,
        listener: Arc<dyn FoldListener>,
        table: Table,
        kind: EventKind,
        mut stream: BoxStream<'static, ChangeEvent>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        debug!(%table, %kind, "Fold loop started");

        loop {
            tokio::select! {
                event = stream.next() => {
                    match event {
                        Some(event) => Self::fold_event(&register, &listener, event),
                        None => {
                            warn!(%table, %kind, "Subscription stream ended");
                            break;
                        }
                    }
                }

                changed = shutdown_rx.changed() => {
                    // A dropped sender means the handle is gone; stop too.
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        debug!(%table, %kind, "Fold loop stopped");
    }

    /// Applies one change event to the register under its fold rules.
    fn fold_event(
        register: &Arc<Mutex<Register>>,
        listener: &Arc<dyn FoldListener>,
        event: ChangeEvent,
    ) {
        let (table, kind) = (event.table, event.kind);

        match kind {
            EventKind::Insert | EventKind::Update => match table {
                Table::Items => {
                    let Some(item) = decode_new::<Item>(&event) else {
                        return;
                    };
                    let mut reg = register.lock().expect("register mutex poisoned");
                    match kind {
                        EventKind::Insert => reg.apply_item_insert(item),
                        _ => reg.apply_item_update(item),
                    }
                }
                Table::Sales => {
                    let Some(sale) = decode_new::<Sale>(&event) else {
                        return;
                    };
                    let mut reg = register.lock().expect("register mutex poisoned");
                    match kind {
                        EventKind::Insert => reg.apply_sale_insert(sale),
                        _ => reg.apply_sale_update(sale),
                    }
                }
            },
            EventKind::Delete => {
                let Some(id) = event.row_id().map(str::to_string) else {
                    warn!(%table, "Delete event carries no row id");
                    return;
                };
                let mut reg = register.lock().expect("register mutex poisoned");
                match table {
                    Table::Items => reg.apply_item_delete(&id),
                    Table::Sales => reg.apply_sale_delete(&id),
                }
            }
        }

        debug!(%table, %kind, "Folded remote change");
        listener.folded(table, kind);
    }
}

// =============================================================================
// Agent Handle (for external control)
// =============================================================================

/// Handle for a running [`SyncAgent`].
///
/// The app holds this to mirror mutations, watch the status surface, and
/// stop the agent on shutdown.
pub struct SyncAgentHandle {
    /// Mirror queue for local mutations.
    outbound: OutboundHandle,

    /// Status receiver retained for `status()`.
    status_rx: watch::Receiver<SyncStatus>,

    /// Status sender, shared with the mirror; enqueue failures land here.
    status_tx: Arc<watch::Sender<SyncStatus>>,

    /// Shutdown signal for the fold loops.
    shutdown_tx: watch::Sender<bool>,
}

impl SyncAgentHandle {
    /// Queues a mutation for mirroring. Never blocks and never fails
    /// the caller; a full or closed queue is recorded on the status
    /// surface and the op is dropped.
    pub fn enqueue(&self, op: OutboundOp) {
        if let Err(e) = self.outbound.try_enqueue(op) {
            warn!(?e, "Dropping mirror write");
            self.status_tx.send_modify(|s| {
                s.state = SyncState::Error;
                s.last_error = Some(e.to_string());
            });
        }
    }

    /// Gets the current sync status.
    pub fn status(&self) -> SyncStatus {
        self.status_rx.borrow().clone()
    }

    /// Opens a fresh status subscription (for UIs that want pushes).
    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.status_tx.subscribe()
    }

    /// Signals the agent to shut down gracefully.
    pub async fn shutdown(&self) {
        info!("Shutting down sync agent");
        let _ = self.shutdown_tx.send(true);
        let _ = self.outbound.shutdown().await;
        info!("Sync agent stopped");
    }
}

// =============================================================================
// Row Decoding
// =============================================================================

/// Decodes a pulled table, dropping rows that do not parse. Folds never
/// invent an entity from a half-readable row.
fn decode_rows<T: DeserializeOwned>(table: Table, rows: Vec<Value>) -> Vec<T> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        match serde_json::from_value::<T>(row) {
            Ok(value) => out.push(value),
            Err(e) => warn!(%table, ?e, "Dropping undecodable remote row"),
        }
    }
    out
}

/// Decodes the new row of an insert or update event.
fn decode_new<T: DeserializeOwned>(event: &ChangeEvent) -> Option<T> {
    let Some(row) = event.new_row.clone() else {
        warn!(table = %event.table, kind = %event.kind, "Change event carries no row");
        return None;
    };
    match serde_json::from_value(row) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(table = %event.table, kind = %event.kind, ?e, "Dropping undecodable change event");
            None
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryRemote;
    use snack_core::{PaymentMethod, SaleChannel};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingListener {
        pulls: AtomicUsize,
        folds: AtomicUsize,
    }

    impl CountingListener {
        fn new() -> Self {
            CountingListener {
                pulls: AtomicUsize::new(0),
                folds: AtomicUsize::new(0),
            }
        }
    }

    impl FoldListener for CountingListener {
        fn pulled(&self) {
            self.pulls.fetch_add(1, Ordering::SeqCst);
        }
        fn folded(&self, _table: Table, _kind: EventKind) {
            self.folds.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn shared_register() -> Arc<Mutex<Register>> {
        Arc::new(Mutex::new(Register::with_default_catalog()))
    }

    fn item_count(register: &Arc<Mutex<Register>>) -> usize {
        register.lock().unwrap().items().len()
    }

    async fn wait_until(mut check: impl FnMut() -> bool) {
        for _ in 0..400 {
            if check() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn test_empty_remote_gets_seeded() {
        let remote = Arc::new(InMemoryRemote::new());
        let register = shared_register();
        let seeded = item_count(&register);
        assert!(seeded > 0);

        let handle = SyncAgent::new(remote.clone(), register.clone())
            .start()
            .await;

        assert_eq!(remote.row_count(Table::Items), seeded);
        assert_eq!(item_count(&register), seeded);
        let status = handle.status();
        assert_eq!(status.state, SyncState::Idle);
        assert!(status.last_error.is_none());

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_populated_remote_is_adopted_wholesale() {
        let remote = Arc::new(InMemoryRemote::new());
        let lone = Item {
            id: "pretzels".to_string(),
            name: "Pretzels".to_string(),
            price_cents: 300,
            stock: 7,
            options: Vec::new(),
            color: "bg-amber-500".to_string(),
            icon: "🥨".to_string(),
        };
        remote
            .insert(Table::Items, serde_json::to_value(&lone).unwrap())
            .await
            .unwrap();

        let register = shared_register();
        let listener = Arc::new(CountingListener::new());
        let handle = SyncAgent::with_listener(remote.clone(), register.clone(), listener.clone())
            .start()
            .await;

        // Local catalog is replaced, and the remote is not re-seeded.
        assert_eq!(item_count(&register), 1);
        assert_eq!(register.lock().unwrap().items()[0].id, "pretzels");
        assert_eq!(remote.row_count(Table::Items), 1);
        assert_eq!(listener.pulls.load(Ordering::SeqCst), 1);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_pull_failure_keeps_local_state() {
        let remote = Arc::new(InMemoryRemote::new());
        remote.set_fail_reads(true);

        let register = shared_register();
        let before = item_count(&register);
        let handle = SyncAgent::new(remote.clone(), register.clone())
            .start()
            .await;

        assert_eq!(item_count(&register), before);
        let status = handle.status();
        assert_eq!(status.state, SyncState::Idle);
        assert!(status.last_error.is_some());

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_checkout_mirrors_through_handle() {
        let remote = Arc::new(InMemoryRemote::new());
        let register = shared_register();
        let handle = SyncAgent::new(remote.clone(), register.clone())
            .start()
            .await;
        let seeded = remote.row_count(Table::Items);

        let (sale, touched) = {
            let mut reg = register.lock().unwrap();
            reg.add_to_cart("chips", Some("Hot Cheetos")).unwrap();
            let sale = reg
                .checkout(PaymentMethod::Cash, None, SaleChannel::Attended)
                .unwrap();
            let touched = reg.find_item("chips").unwrap().clone();
            (sale, touched)
        };
        handle.enqueue(OutboundOp::SaleInserted(sale));
        handle.enqueue(OutboundOp::ItemUpdated(touched));

        wait_until(|| remote.row_count(Table::Sales) == 1).await;
        wait_until(|| handle.status().pushed == 2).await;
        assert_eq!(remote.row_count(Table::Items), seeded);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_remote_insert_folds_into_register() {
        let remote = Arc::new(InMemoryRemote::new());
        let register = shared_register();
        let listener = Arc::new(CountingListener::new());
        let handle = SyncAgent::with_listener(remote.clone(), register.clone(), listener.clone())
            .start()
            .await;
        let seeded = item_count(&register);

        let newcomer = Item {
            id: "popcorn".to_string(),
            name: "Popcorn".to_string(),
            price_cents: 150,
            stock: 12,
            options: Vec::new(),
            color: "bg-yellow-400".to_string(),
            icon: "🍿".to_string(),
        };
        remote
            .insert(Table::Items, serde_json::to_value(&newcomer).unwrap())
            .await
            .unwrap();

        wait_until(|| item_count(&register) == seeded + 1).await;
        wait_until(|| listener.folds.load(Ordering::SeqCst) >= 1).await;

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_folding() {
        let remote = Arc::new(InMemoryRemote::new());
        let register = shared_register();
        let handle = SyncAgent::new(remote.clone(), register.clone())
            .start()
            .await;
        let seeded = item_count(&register);

        handle.shutdown().await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        remote
            .insert(
                Table::Items,
                serde_json::json!({
                    "id": "late",
                    "name": "Late",
                    "price_cents": 100,
                    "stock": 1,
                    "options": [],
                    "color": "",
                    "icon": ""
                }),
            )
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(item_count(&register), seeded);
    }

    #[test]
    fn test_sync_status_default() {
        let status = SyncStatus::default();
        assert_eq!(status.state, SyncState::Idle);
        assert_eq!(status.pushed, 0);
        assert!(status.last_error.is_none());
        assert!(status.last_success_at.is_none());
    }

    #[test]
    fn test_sync_state_names() {
        assert_eq!(SyncState::Idle.as_str(), "idle");
        assert_eq!(SyncState::Syncing.as_str(), "syncing");
        assert_eq!(SyncState::Success.as_str(), "success");
        assert_eq!(SyncState::Error.as_str(), "error");
    }
}
