//! # Store Error Types
//!
//! Error types for snapshot persistence.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io::Error / serde_json::Error                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds the path and categorization           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Register app: a failed SAVE is logged and the register keeps going    │
//! │  (the in-memory state is already correct); a corrupt LOAD falls back   │
//! │  to a fresh seed with a warning.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Snapshot persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the snapshot file failed.
    ///
    /// ## When This Occurs
    /// - Data directory missing and cannot be created
    /// - File permissions issue
    /// - Disk full mid-write (the rename step keeps the old snapshot)
    #[error("Snapshot I/O failed at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot file exists but is not a valid snapshot document.
    ///
    /// ## When This Occurs
    /// - Truncated by an external process (our own writes are atomic)
    /// - Hand-edited JSON
    /// - A future format this build does not understand
    #[error("Snapshot at {path} is corrupt: {message}")]
    Corrupt { path: String, message: String },

    /// Serializing the in-memory state failed.
    /// Should not happen for our own types; surfaced rather than swallowed.
    #[error("Snapshot encode failed: {0}")]
    Encode(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
