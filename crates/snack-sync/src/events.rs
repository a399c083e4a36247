//! # Change Events
//!
//! The vocabulary of the remote seam: which table, which mutation, and the
//! affected row as an opaque JSON document.
//!
//! ## Event Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ChangeEvent                                      │
//! │                                                                         │
//! │   kind      new_row          old_row                                    │
//! │   ──────    ─────────────    ─────────────                              │
//! │   insert    the new row      (none)                                     │
//! │   update    the row after    (none)                                     │
//! │   delete    (none)           the row before                             │
//! │                                                                         │
//! │   Rows are serde_json::Value: the remote store is a dumb document       │
//! │   store and does not know our entity types. The fold side               │
//! │   deserializes and drops anything malformed.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Tables
// =============================================================================

/// The logical tables of the shared remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    /// The shared catalog (stock counts included).
    Items,
    /// The shared sale ledger.
    Sales,
}

impl Table {
    /// All tables, for wiring one subscription loop per table.
    pub const ALL: [Table; 2] = [Table::Items, Table::Sales];

    /// Stable wire/log name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Items => "items",
            Table::Sales => "sales",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Event Kinds
// =============================================================================

/// The mutation kinds a subscription can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A row was added.
    Insert,
    /// A row was replaced.
    Update,
    /// A row was removed.
    Delete,
}

impl EventKind {
    /// All kinds, for wiring one subscription per (table, kind).
    pub const ALL: [EventKind; 3] = [EventKind::Insert, EventKind::Update, EventKind::Delete];

    /// Stable wire/log name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Insert => "insert",
            EventKind::Update => "update",
            EventKind::Delete => "delete",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Change Event
// =============================================================================

/// One mutation observed on the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Table the mutation happened on.
    pub table: Table,

    /// What kind of mutation.
    pub kind: EventKind,

    /// The row after the change (insert/update).
    pub new_row: Option<Value>,

    /// The row before the change (delete).
    pub old_row: Option<Value>,
}

impl ChangeEvent {
    /// An insert event carrying the new row.
    pub fn insert(table: Table, row: Value) -> Self {
        ChangeEvent {
            table,
            kind: EventKind::Insert,
            new_row: Some(row),
            old_row: None,
        }
    }

    /// An update event carrying the row after the change.
    pub fn update(table: Table, row: Value) -> Self {
        ChangeEvent {
            table,
            kind: EventKind::Update,
            new_row: Some(row),
            old_row: None,
        }
    }

    /// A delete event carrying the row as it was before removal.
    pub fn delete(table: Table, old_row: Value) -> Self {
        ChangeEvent {
            table,
            kind: EventKind::Delete,
            new_row: None,
            old_row: Some(old_row),
        }
    }

    /// The id of the affected row, read from whichever side carries it.
    /// `None` means the event is malformed and must be dropped by folds.
    pub fn row_id(&self) -> Option<&str> {
        self.new_row
            .as_ref()
            .or(self.old_row.as_ref())
            .and_then(|row| row.get("id"))
            .and_then(Value::as_str)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_id_prefers_new_row() {
        let event = ChangeEvent::insert(Table::Items, json!({"id": "chips"}));
        assert_eq!(event.row_id(), Some("chips"));

        let event = ChangeEvent::delete(Table::Sales, json!({"id": "sale-1"}));
        assert_eq!(event.row_id(), Some("sale-1"));
    }

    #[test]
    fn test_row_id_missing_or_non_string() {
        let event = ChangeEvent::insert(Table::Items, json!({"name": "Chips"}));
        assert_eq!(event.row_id(), None);

        let event = ChangeEvent::insert(Table::Items, json!({"id": 7}));
        assert_eq!(event.row_id(), None);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(Table::Items.to_string(), "items");
        assert_eq!(EventKind::Delete.to_string(), "delete");
        assert_eq!(
            serde_json::to_string(&EventKind::Insert).unwrap(),
            "\"insert\""
        );
    }
}
