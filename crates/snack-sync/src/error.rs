//! # Sync Error Types
//!
//! Error types for remote reconciliation.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌──────────────────┐  ┌───────────────────────┐  │
//! │  │  Remote Store   │  │  Subscriptions   │  │  Rows & Channels      │  │
//! │  │                 │  │                  │  │                       │  │
//! │  │  RemoteOp       │  │  Subscription    │  │  Serialization        │  │
//! │  │  (read/write    │  │  Closed          │  │  InvalidRow           │  │
//! │  │   failed)       │  │                  │  │  ChannelError         │  │
//! │  └─────────────────┘  └──────────────────┘  └───────────────────────┘  │
//! │                                                                         │
//! │  These errors are never user-facing: a failed push or pull flips the   │
//! │  SyncStatus and lands in the log. Nothing in the sale path waits on    │
//! │  them, and nothing replays them either. is_retryable() exists so the   │
//! │  log can say whether a human retry (or the next mutation) is likely    │
//! │  to succeed.                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::events::Table;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering remote store and reconciliation failures.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A remote store operation failed.
    ///
    /// ## When This Occurs
    /// - The backing service is unreachable or mid-outage
    /// - The service rejected the row
    #[error("Remote {op} on '{table}' failed: {message}")]
    RemoteOp {
        table: Table,
        op: &'static str,
        message: String,
    },

    /// A subscription stream could not be opened or ended.
    /// Changes from other registers stop arriving until restart.
    #[error("Subscription to '{table}' ({kind}) closed: {message}")]
    SubscriptionClosed {
        table: Table,
        kind: &'static str,
        message: String,
    },

    /// Encoding an entity into a row document (or back) failed.
    /// For our own types this indicates a bug, not an outage.
    #[error("Row serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A row arrived without a usable string `id`.
    #[error("Row on '{table}' has no string id")]
    InvalidRow { table: Table },

    /// A channel between sync tasks closed unexpectedly.
    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl SyncError {
    /// Creates a RemoteOp error for a given table and operation name.
    pub fn remote_op(table: Table, op: &'static str, message: impl Into<String>) -> Self {
        SyncError::RemoteOp {
            table,
            op,
            message: message.into(),
        }
    }

    /// True when a later identical attempt could plausibly succeed
    /// (outage-shaped failures). Nothing retries automatically; this
    /// feeds the log line and the status surface.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncError::RemoteOp { .. } | SyncError::SubscriptionClosed { .. }
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_categories() {
        assert!(SyncError::remote_op(Table::Items, "insert", "timeout").is_retryable());
        assert!(!SyncError::InvalidRow { table: Table::Sales }.is_retryable());
        assert!(!SyncError::ChannelError("closed".into()).is_retryable());
    }

    #[test]
    fn test_error_display_includes_context() {
        let err = SyncError::remote_op(Table::Sales, "delete_all", "connection refused");
        assert_eq!(
            err.to_string(),
            "Remote delete_all on 'sales' failed: connection refused"
        );
    }
}
