//! # Outbound Mirror
//!
//! Pushes local register mutations to the remote store, fire-and-forget.
//!
//! ## Mirror Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Outbound Mirror Flow                              │
//! │                                                                         │
//! │   checkout / add_item / adjust_stock / cancel / reset_history           │
//! │        │                                                                │
//! │        │ try_enqueue(OutboundOp)          never blocks the sale path    │
//! │        ▼                                                                │
//! │  ┌───────────────────┐      ┌─────────────────────────────────────┐    │
//! │  │  bounded mpsc     │─────▶│          OutboundProcessor          │    │
//! │  │  (op queue)       │      │                                     │    │
//! │  └───────────────────┘      │  1. status ← syncing                │    │
//! │                             │  2. serialize entity to a row       │    │
//! │                             │  3. insert / update / delete_all    │    │
//! │                             │  4. status ← success | error        │    │
//! │                             │  5. queue drained? status ← idle    │    │
//! │                             └──────────────────┬──────────────────┘    │
//! │                                                ▼                        │
//! │                                           RemoteStore                   │
//! │                                                                         │
//! │  NO RETRY: a failed push is logged, flips the status to error, and     │
//! │  is forgotten. The local register is the source of truth for this      │
//! │  device; the next successful mutation carries the fresh state anyway.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use snack_core::{Item, Sale};

use crate::agent::{SyncState, SyncStatus};
use crate::error::{SyncError, SyncResult};
use crate::events::Table;
use crate::remote::RemoteStore;

// =============================================================================
// Constants
// =============================================================================

/// Mutations buffered before `try_enqueue` starts rejecting. A stand
/// rings up a sale every few seconds at worst; hitting this ceiling
/// means the remote has been down for a while.
const OP_QUEUE_SIZE: usize = 100;

// =============================================================================
// Outbound Operations
// =============================================================================

/// One local mutation to mirror to the remote store.
#[derive(Debug, Clone)]
pub enum OutboundOp {
    /// A catalog entry was created (admin add, or seeding an empty remote).
    ItemInserted(Item),

    /// A catalog entry changed (stock movement, admin adjustment).
    ItemUpdated(Item),

    /// A checkout froze a new sale.
    SaleInserted(Sale),

    /// A sale changed status (fulfilled or canceled).
    SaleUpdated(Sale),

    /// The history was reset; the sales table empties wholesale.
    SalesCleared,
}

impl OutboundOp {
    /// Entity kind and id for log lines.
    pub fn describe(&self) -> (&'static str, String) {
        match self {
            OutboundOp::ItemInserted(item) => ("item_insert", item.id.clone()),
            OutboundOp::ItemUpdated(item) => ("item_update", item.id.clone()),
            OutboundOp::SaleInserted(sale) => ("sale_insert", sale.id.clone()),
            OutboundOp::SaleUpdated(sale) => ("sale_update", sale.id.clone()),
            OutboundOp::SalesCleared => ("sales_clear", "*".to_string()),
        }
    }
}

// =============================================================================
// Outbound Processor
// =============================================================================

/// Drains the op queue and pushes each mutation to the remote once.
pub struct OutboundProcessor {
    /// Remote store to push into.
    remote: Arc<dyn RemoteStore>,

    /// Receiver for queued mutations.
    op_rx: mpsc::Receiver<OutboundOp>,

    /// Shared status surface, also written by the pull path.
    status_tx: Arc<watch::Sender<SyncStatus>>,

    /// Shutdown receiver.
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for enqueueing mutations and stopping the processor.
#[derive(Clone)]
pub struct OutboundHandle {
    /// Sender side of the op queue.
    op_tx: mpsc::Sender<OutboundOp>,

    /// Shutdown sender.
    shutdown_tx: mpsc::Sender<()>,
}

impl OutboundHandle {
    /// Queues a mutation for mirroring without blocking.
    ///
    /// Fails when the processor is gone or the queue is full; either way
    /// the op is dropped, in keeping with the no-retry rule.
    pub fn try_enqueue(&self, op: OutboundOp) -> SyncResult<()> {
        self.op_tx.try_send(op).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                SyncError::ChannelError("Outbound queue full".into())
            }
            mpsc::error::TrySendError::Closed(_) => {
                SyncError::ChannelError("Outbound queue closed".into())
            }
        })
    }

    /// Triggers graceful shutdown.
    pub async fn shutdown(&self) -> SyncResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| SyncError::ChannelError("Shutdown channel closed".into()))
    }
}

impl OutboundProcessor {
    /// Creates a new processor and returns a handle.
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        status_tx: Arc<watch::Sender<SyncStatus>>,
    ) -> (Self, OutboundHandle) {
        let (op_tx, op_rx) = mpsc::channel(OP_QUEUE_SIZE);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let processor = OutboundProcessor {
            remote,
            op_rx,
            status_tx,
            shutdown_rx,
        };

        let handle = OutboundHandle { op_tx, shutdown_tx };

        (processor, handle)
    }

    /// Runs the mirror loop.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        info!("Outbound mirror starting");

        loop {
            tokio::select! {
                Some(op) = self.op_rx.recv() => {
                    self.process(op).await;

                    // Drain anything that queued while we were pushing,
                    // then settle back to idle.
                    while let Ok(op) = self.op_rx.try_recv() {
                        self.process(op).await;
                    }
                    self.status_tx.send_modify(|s| s.state = SyncState::Idle);
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Outbound mirror shutting down");
                    break;
                }
            }
        }

        info!("Outbound mirror stopped");
    }

    /// Pushes one op and records the outcome on the status surface.
    async fn process(&self, op: OutboundOp) {
        let (entity, id) = op.describe();
        self.status_tx
            .send_modify(|s| s.state = SyncState::Syncing);
        debug!(entity, id = %id, "Pushing mirror write");

        match self.push(op).await {
            Ok(()) => {
                self.status_tx.send_modify(|s| {
                    s.state = SyncState::Success;
                    s.pushed += 1;
                    s.last_error = None;
                    s.last_success_at = Some(Utc::now());
                });
            }
            Err(e) => {
                warn!(
                    ?e,
                    entity,
                    id = %id,
                    retryable = e.is_retryable(),
                    "Mirror push failed; not retried"
                );
                self.status_tx.send_modify(|s| {
                    s.state = SyncState::Error;
                    s.last_error = Some(e.to_string());
                });
            }
        }
    }

    /// Translates an op into one remote store call.
    async fn push(&self, op: OutboundOp) -> SyncResult<()> {
        match op {
            OutboundOp::ItemInserted(item) => {
                let row = serde_json::to_value(&item)?;
                self.remote.insert(Table::Items, row).await
            }
            OutboundOp::ItemUpdated(item) => {
                let row = serde_json::to_value(&item)?;
                self.remote.update(Table::Items, &item.id, row).await
            }
            OutboundOp::SaleInserted(sale) => {
                let row = serde_json::to_value(&sale)?;
                self.remote.insert(Table::Sales, row).await
            }
            OutboundOp::SaleUpdated(sale) => {
                let row = serde_json::to_value(&sale)?;
                self.remote.update(Table::Sales, &sale.id, row).await
            }
            OutboundOp::SalesCleared => self.remote.delete_all(Table::Sales).await,
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
    use snack_core::ItemOption;
    use std::time::Duration;

    fn test_item(id: &str) -> Item {
        Item {
            id: id.to_string(),
            name: format!("{id} name"),
            price_cents: 200,
            stock: 5,
            options: vec![ItemOption::new("Hot Cheetos", 5)],
            color: "bg-blue-500".to_string(),
            icon: "🍟".to_string(),
        }
    }

    fn status_pair() -> (Arc<watch::Sender<SyncStatus>>, watch::Receiver<SyncStatus>) {
        let (tx, rx) = watch::channel(SyncStatus::default());
        (Arc::new(tx), rx)
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
    async fn test_item_insert_reaches_remote() {
        let remote = Arc::new(InMemoryRemote::new());
        let (status_tx, status_rx) = status_pair();
        let (processor, handle) = OutboundProcessor::new(remote.clone(), status_tx);
        tokio::spawn(processor.run());

        handle
            .try_enqueue(OutboundOp::ItemInserted(test_item("chips")))
            .unwrap();

        wait_until(|| remote.row_count(Table::Items) == 1).await;
        wait_until(|| status_rx.borrow().pushed == 1).await;
        wait_until(|| status_rx.borrow().state == SyncState::Idle).await;
        assert!(status_rx.borrow().last_error.is_none());
        assert!(status_rx.borrow().last_success_at.is_some());

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_push_is_not_retried() {
        let remote = Arc::new(InMemoryRemote::new());
        remote.set_fail_writes(true);
        let (status_tx, status_rx) = status_pair();
        let (processor, handle) = OutboundProcessor::new(remote.clone(), status_tx);
        tokio::spawn(processor.run());

        handle
            .try_enqueue(OutboundOp::ItemInserted(test_item("lost")))
            .unwrap();
        wait_until(|| status_rx.borrow().last_error.is_some()).await;
        assert_eq!(remote.row_count(Table::Items), 0);

        // Remote recovers; only ops enqueued afterwards land.
        remote.set_fail_writes(false);
        handle
            .try_enqueue(OutboundOp::ItemInserted(test_item("kept")))
            .unwrap();
        wait_until(|| status_rx.borrow().pushed == 1).await;

        let rows = remote.select_all(Table::Items).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], "kept");

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_sales_cleared_empties_remote_table() {
        let remote = Arc::new(InMemoryRemote::new());
        remote
            .insert(Table::Sales, serde_json::json!({ "id": "s1" }))
            .await
            .unwrap();
        remote
            .insert(Table::Sales, serde_json::json!({ "id": "s2" }))
            .await
            .unwrap();

        let (status_tx, status_rx) = status_pair();
        let (processor, handle) = OutboundProcessor::new(remote.clone(), status_tx);
        tokio::spawn(processor.run());

        handle.try_enqueue(OutboundOp::SalesCleared).unwrap();
        wait_until(|| remote.row_count(Table::Sales) == 0).await;
        wait_until(|| status_rx.borrow().pushed == 1).await;

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_enqueue_after_shutdown_fails() {
        let remote = Arc::new(InMemoryRemote::new());
        let (status_tx, _status_rx) = status_pair();
        let (processor, handle) = OutboundProcessor::new(remote, status_tx);
        let task = tokio::spawn(processor.run());

        handle.shutdown().await.unwrap();
        task.await.unwrap();

        let err = handle.try_enqueue(OutboundOp::SalesCleared).unwrap_err();
        assert!(matches!(err, SyncError::ChannelError(_)));
    }
}
