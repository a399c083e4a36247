//! # snack-sync: Remote Reconciliation for Snack Stand POS
//!
//! This crate keeps a register's [`snack_core::Register`] in step with a
//! shared remote document store, so several registers (and a dashboard)
//! can watch one stand.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Reconciliation Architecture                      │
//! │                                                                         │
//! │   Register A (this process)                 Register B (elsewhere)      │
//! │  ┌───────────────────────────┐            ┌─────────────────────────┐   │
//! │  │        SyncAgent          │            │       SyncAgent         │   │
//! │  │                           │            │                         │   │
//! │  │  initial pull  ◄─────────┐│            │                         │   │
//! │  │  fold loops    ◄────────┐││            │                         │   │
//! │  │  outbound mirror ──────┐│││            │                         │   │
//! │  └────────────────────────┼┼┼┘            └───────────┬─────────────┘   │
//! │                           ▼▼▼                         ▼                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    RemoteStore (trait)                          │   │
//! │  │                                                                 │   │
//! │  │   "items" table        "sales" table        subscriptions       │   │
//! │  │   JSON rows by id      JSON rows by id      per (table, kind)   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  RULES OF THE HOUSE:                                                   │
//! │  • The local register never waits for the remote. Mirror pushes are    │
//! │    fire-and-forget and are NOT retried on failure.                     │
//! │  • Remote changes fold in under dedupe/replace/ignore rules, so        │
//! │    echoes of our own writes are harmless.                              │
//! │  • An empty remote catalog is never adopted; the first register up     │
//! │    publishes its local catalog instead.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`agent`] - Main `SyncAgent` orchestrator and the status surface
//! - [`error`] - Sync error types
//! - [`events`] - Tables, event kinds, and change events
//! - [`memory`] - In-process `RemoteStore` for tests and demos
//! - [`outbound`] - Fire-and-forget mirror of local mutations
//! - [`remote`] - The `RemoteStore` trait
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::{Arc, Mutex};
//! use snack_core::Register;
//! use snack_sync::{InMemoryRemote, OutboundOp, SyncAgent};
//!
//! let remote = Arc::new(InMemoryRemote::new());
//! let register = Arc::new(Mutex::new(Register::with_default_catalog()));
//!
//! let handle = SyncAgent::new(remote, register.clone()).start().await;
//!
//! // After a local mutation, mirror it:
//! let item = register.lock().unwrap().find_item("chips").unwrap().clone();
//! handle.enqueue(OutboundOp::ItemUpdated(item));
//!
//! // Watch the status surface:
//! println!("sync state: {}", handle.status().state);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod agent;
pub mod error;
pub mod events;
pub mod memory;
pub mod outbound;
pub mod remote;

// =============================================================================
// Re-exports
// =============================================================================

pub use agent::{FoldListener, NoOpListener, SyncAgent, SyncAgentHandle, SyncState, SyncStatus};
pub use error::{SyncError, SyncResult};
pub use events::{ChangeEvent, EventKind, Table};
pub use memory::InMemoryRemote;
pub use outbound::{OutboundHandle, OutboundOp, OutboundProcessor};
pub use remote::RemoteStore;
