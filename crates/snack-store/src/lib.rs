//! # snack-store: Local Snapshot Persistence
//!
//! The register's state lives in memory; this crate is where it sleeps.
//! One opaque JSON document (the catalog and the sale history) is written
//! under a fixed storage key in the data directory after every change and
//! read back once at startup.
//!
//! ## Storage Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Snapshot Persistence                               │
//! │                                                                         │
//! │   Register (in memory)                                                  │
//! │        │                                                                │
//! │        │ after every items/sales change                                 │
//! │        ▼                                                                │
//! │   Snapshot { items, sales }                                             │
//! │        │                                                                │
//! │        │ serde_json                                                     │
//! │        ▼                                                                │
//! │   <data_dir>/snack_pos_simple_v1.tmp   ← full write                    │
//! │        │                                                                │
//! │        │ rename (atomic on the same filesystem)                         │
//! │        ▼                                                                │
//! │   <data_dir>/snack_pos_simple_v1       ← never half-written            │
//! │                                                                         │
//! │   Startup: load() → Some(snapshot) | None (fresh register)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Not a Database
//! A folding-table snack stand holds a four-item menu and a day's worth of
//! sales. The whole state serializes in microseconds, and a single document
//! that is rewritten wholesale is trivially crash-safe with tmp + rename.
//! The interesting durability story lives in the remote store (snack-sync);
//! this file is just the local warm start.
//!
//! ## Modules
//! - [`snapshot`] - The snapshot document and the store that reads/writes it
//! - [`error`] - Store error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod snapshot;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use snapshot::{Snapshot, SnapshotStore, STORAGE_KEY};
