//! # Remote Store Seam
//!
//! The trait every reconciliation backend implements.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         RemoteStore Contract                            │
//! │                                                                         │
//! │  The remote is a dumb document store: two tables ("items", "sales"),   │
//! │  each a bag of JSON rows keyed by a string "id" field. It does not     │
//! │  validate rows, enforce schemas, or merge anything.                     │
//! │                                                                         │
//! │  select_all    read every row in a table                                │
//! │  insert        add a row (the row carries its own id)                   │
//! │  update        replace the row with the given id, if present           │
//! │  delete        remove the row with the given id, if present            │
//! │  delete_all    empty the table                                          │
//! │  subscribe     stream of change events for one (table, kind) pair      │
//! │                                                                         │
//! │  All conflict handling lives on the register side, in the fold rules.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;

use crate::error::SyncResult;
use crate::events::{ChangeEvent, EventKind, Table};

/// Backend-agnostic interface to the shared document store.
///
/// Implementations must be safe to share across tasks; the agent holds
/// one behind an `Arc` and calls it from the pull path, the fold loops,
/// and the outbound mirror concurrently.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Returns every row currently in `table`.
    async fn select_all(&self, table: Table) -> SyncResult<Vec<Value>>;

    /// Adds `row` to `table`. The row must carry a string `id` field.
    async fn insert(&self, table: Table, row: Value) -> SyncResult<()>;

    /// Replaces the row whose id is `id` with `row`. A missing id is
    /// not an error; the update is simply dropped.
    async fn update(&self, table: Table, id: &str, row: Value) -> SyncResult<()>;

    /// Removes the row whose id is `id`, if present.
    async fn delete(&self, table: Table, id: &str) -> SyncResult<()>;

    /// Removes every row in `table`.
    async fn delete_all(&self, table: Table) -> SyncResult<()>;

    /// Opens a stream of change events for one `(table, kind)` pair.
    ///
    /// The stream includes events caused by this register's own writes;
    /// callers rely on the fold rules being no-ops for rows they already
    /// hold rather than on any echo suppression here.
    async fn subscribe(
        &self,
        table: Table,
        kind: EventKind,
    ) -> SyncResult<BoxStream<'static, ChangeEvent>>;
}
