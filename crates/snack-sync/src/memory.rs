//! # In-Memory Remote
//!
//! A process-local [`RemoteStore`] used by tests and by demo setups that
//! run several registers inside one process.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          InMemoryRemote                                 │
//! │                                                                         │
//! │   items table                      sales table                          │
//! │  ┌──────────────────────────┐    ┌──────────────────────────┐          │
//! │  │ rows:  Mutex<Vec<Value>> │    │ rows:  Mutex<Vec<Value>> │          │
//! │  │ inserts: broadcast ─────────▶ │ inserts: broadcast ─────────▶       │
//! │  │ updates: broadcast ─────────▶ │ updates: broadcast ─────────▶       │
//! │  │ deletes: broadcast ─────────▶ │ deletes: broadcast ─────────▶       │
//! │  └──────────────────────────┘    └──────────────────────────┘          │
//! │                                                                         │
//! │  Every write emits on the matching (table, kind) channel, including    │
//! │  writes made by the register that will hear the echo. Slow or absent   │
//! │  subscribers never block a write; lagging receivers drop events.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `set_fail_reads` / `set_fail_writes` switches simulate an outage
//! so tests can watch the status surface flip to error without any
//! network involved.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::error::{SyncError, SyncResult};
use crate::events::{ChangeEvent, EventKind, Table};
use crate::remote::RemoteStore;

/// Buffered events per (table, kind) channel before laggards drop.
const EVENT_BUFFER: usize = 64;

/// One table's rows plus its three change channels.
struct TableState {
    rows: Mutex<Vec<Value>>,
    inserts: broadcast::Sender<ChangeEvent>,
    updates: broadcast::Sender<ChangeEvent>,
    deletes: broadcast::Sender<ChangeEvent>,
}

impl TableState {
    fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            inserts: broadcast::channel(EVENT_BUFFER).0,
            updates: broadcast::channel(EVENT_BUFFER).0,
            deletes: broadcast::channel(EVENT_BUFFER).0,
        }
    }

    fn sender_for(&self, kind: EventKind) -> &broadcast::Sender<ChangeEvent> {
        match kind {
            EventKind::Insert => &self.inserts,
            EventKind::Update => &self.updates,
            EventKind::Delete => &self.deletes,
        }
    }

    /// Emits an event; no subscribers is not an error.
    fn emit(&self, event: ChangeEvent) {
        let _ = self.sender_for(event.kind).send(event);
    }
}

/// In-process document store shared between registers via `Arc`.
pub struct InMemoryRemote {
    items: TableState,
    sales: TableState,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self {
            items: TableState::new(),
            sales: TableState::new(),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    fn table(&self, table: Table) -> &TableState {
        match table {
            Table::Items => &self.items,
            Table::Sales => &self.sales,
        }
    }

    /// Makes every read fail until cleared.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every write fail until cleared.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of rows currently in `table`. Test convenience.
    pub fn row_count(&self, table: Table) -> usize {
        self.table(table)
            .rows
            .lock()
            .expect("remote rows mutex poisoned")
            .len()
    }

    fn check_read(&self, table: Table, op: &'static str) -> SyncResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(SyncError::remote_op(table, op, "simulated outage"));
        }
        Ok(())
    }

    fn check_write(&self, table: Table, op: &'static str) -> SyncResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SyncError::remote_op(table, op, "simulated outage"));
        }
        Ok(())
    }
}

impl Default for InMemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

fn row_id(row: &Value) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

#[async_trait]
impl RemoteStore for InMemoryRemote {
    async fn select_all(&self, table: Table) -> SyncResult<Vec<Value>> {
        self.check_read(table, "select_all")?;
        let rows = self
            .table(table)
            .rows
            .lock()
            .expect("remote rows mutex poisoned");
        Ok(rows.clone())
    }

    async fn insert(&self, table: Table, row: Value) -> SyncResult<()> {
        self.check_write(table, "insert")?;
        let id = row_id(&row)
            .ok_or(SyncError::InvalidRow { table })?
            .to_string();
        let state = self.table(table);
        {
            let mut rows = state.rows.lock().expect("remote rows mutex poisoned");
            // Re-inserting an existing id replaces the row, so publishing
            // a seed catalog twice cannot duplicate the table.
            if let Some(existing) = rows.iter_mut().find(|r| row_id(r) == Some(id.as_str())) {
                *existing = row.clone();
            } else {
                rows.push(row.clone());
            }
            state.emit(ChangeEvent::insert(table, row));
        }
        Ok(())
    }

    async fn update(&self, table: Table, id: &str, row: Value) -> SyncResult<()> {
        self.check_write(table, "update")?;
        let state = self.table(table);
        {
            let mut rows = state.rows.lock().expect("remote rows mutex poisoned");
            // Updating an id the store never saw is a silent no-op.
            if let Some(existing) = rows.iter_mut().find(|r| row_id(r) == Some(id)) {
                *existing = row.clone();
                state.emit(ChangeEvent::update(table, row));
            }
        }
        Ok(())
    }

    async fn delete(&self, table: Table, id: &str) -> SyncResult<()> {
        self.check_write(table, "delete")?;
        let state = self.table(table);
        {
            let mut rows = state.rows.lock().expect("remote rows mutex poisoned");
            if let Some(pos) = rows.iter().position(|r| row_id(r) == Some(id)) {
                let old = rows.remove(pos);
                state.emit(ChangeEvent::delete(table, old));
            }
        }
        Ok(())
    }

    async fn delete_all(&self, table: Table) -> SyncResult<()> {
        self.check_write(table, "delete_all")?;
        let state = self.table(table);
        {
            let mut rows = state.rows.lock().expect("remote rows mutex poisoned");
            for old in rows.drain(..) {
                state.emit(ChangeEvent::delete(table, old));
            }
        }
        Ok(())
    }

    async fn subscribe(
        &self,
        table: Table,
        kind: EventKind,
    ) -> SyncResult<BoxStream<'static, ChangeEvent>> {
        self.check_read(table, "subscribe")?;
        let rx = self.table(table).sender_for(kind).subscribe();
        // Lagged receivers yield Err entries; drop those rather than
        // killing the stream.
        let stream = BroadcastStream::new(rx).filter_map(|r| async move { r.ok() });
        Ok(stream.boxed())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::timeout;

    fn row(id: &str, name: &str) -> Value {
        json!({ "id": id, "name": name })
    }

    #[tokio::test]
    async fn test_insert_and_select_all() {
        let remote = InMemoryRemote::new();
        remote
            .insert(Table::Items, row("a", "chips"))
            .await
            .unwrap();
        remote
            .insert(Table::Items, row("b", "fruit-foot"))
            .await
            .unwrap();

        let rows = remote.select_all(Table::Items).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(remote.row_count(Table::Sales), 0);
    }

    #[tokio::test]
    async fn test_insert_same_id_replaces() {
        let remote = InMemoryRemote::new();
        remote
            .insert(Table::Items, row("a", "chips"))
            .await
            .unwrap();
        remote
            .insert(Table::Items, row("a", "chips v2"))
            .await
            .unwrap();

        let rows = remote.select_all(Table::Items).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "chips v2");
    }

    #[tokio::test]
    async fn test_insert_without_id_is_rejected() {
        let remote = InMemoryRemote::new();
        let err = remote
            .insert(Table::Items, json!({ "name": "no id" }))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::InvalidRow { .. }));
        assert_eq!(remote.row_count(Table::Items), 0);
    }

    #[tokio::test]
    async fn test_update_missing_id_is_silent() {
        let remote = InMemoryRemote::new();
        remote
            .update(Table::Items, "ghost", row("ghost", "nope"))
            .await
            .unwrap();
        assert_eq!(remote.row_count(Table::Items), 0);
    }

    #[tokio::test]
    async fn test_delete_and_delete_all() {
        let remote = InMemoryRemote::new();
        remote.insert(Table::Sales, row("s1", "x")).await.unwrap();
        remote.insert(Table::Sales, row("s2", "y")).await.unwrap();

        remote.delete(Table::Sales, "s1").await.unwrap();
        assert_eq!(remote.row_count(Table::Sales), 1);

        // Deleting an absent id stays quiet.
        remote.delete(Table::Sales, "s1").await.unwrap();

        remote.delete_all(Table::Sales).await.unwrap();
        assert_eq!(remote.row_count(Table::Sales), 0);
    }

    #[tokio::test]
    async fn test_subscribe_sees_matching_kind_only() {
        let remote = InMemoryRemote::new();
        let mut inserts = remote
            .subscribe(Table::Items, EventKind::Insert)
            .await
            .unwrap();
        let mut deletes = remote
            .subscribe(Table::Items, EventKind::Delete)
            .await
            .unwrap();

        remote
            .insert(Table::Items, row("a", "chips"))
            .await
            .unwrap();
        remote.delete(Table::Items, "a").await.unwrap();

        let ev = timeout(Duration::from_secs(1), inserts.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ev.kind, EventKind::Insert);
        assert_eq!(ev.row_id(), Some("a"));

        let ev = timeout(Duration::from_secs(1), deletes.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ev.kind, EventKind::Delete);
        assert_eq!(ev.row_id(), Some("a"));
    }

    #[tokio::test]
    async fn test_delete_all_emits_one_event_per_row() {
        let remote = InMemoryRemote::new();
        remote.insert(Table::Sales, row("s1", "x")).await.unwrap();
        remote.insert(Table::Sales, row("s2", "y")).await.unwrap();

        let mut deletes = remote
            .subscribe(Table::Sales, EventKind::Delete)
            .await
            .unwrap();
        remote.delete_all(Table::Sales).await.unwrap();

        let first = timeout(Duration::from_secs(1), deletes.next())
            .await
            .unwrap()
            .unwrap();
        let second = timeout(Duration::from_secs(1), deletes.next())
            .await
            .unwrap()
            .unwrap();
        let mut ids = vec![first.row_id().unwrap().to_string(), second.row_id().unwrap().to_string()];
        ids.sort();
        assert_eq!(ids, vec!["s1", "s2"]);
    }

    #[tokio::test]
    async fn test_simulated_outage() {
        let remote = InMemoryRemote::new();
        remote.set_fail_writes(true);
        let err = remote
            .insert(Table::Items, row("a", "chips"))
            .await
            .unwrap_err();
        assert!(err.is_retryable());

        remote.set_fail_writes(false);
        remote.set_fail_reads(true);
        assert!(remote.select_all(Table::Items).await.is_err());
        assert!(remote
            .subscribe(Table::Items, EventKind::Insert)
            .await
            .is_err());

        remote.set_fail_reads(false);
        remote
            .insert(Table::Items, row("a", "chips"))
            .await
            .unwrap();
        assert_eq!(remote.row_count(Table::Items), 1);
    }
}
