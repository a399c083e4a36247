//! # Domain Types
//!
//! Core domain types used throughout Snack Stand POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Item       │   │    OrderLine    │   │      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (slug/uuid) │   │  item_id        │   │  id (UUID)      │       │
//! │  │  name           │   │  option_name?   │   │  lines (frozen) │       │
//! │  │  price_cents    │   │  quantity       │   │  total_cents    │       │
//! │  │  stock (derived │   │  unit_price     │   │  status         │       │
//! │  │   when options) │   │   (frozen)      │   │  payment_method │       │
//! │  │  options[]      │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   ItemOption    │   │   SaleStatus    │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name           │   │  Pending        │   │  Cash           │       │
//! │  │  stock          │   │  Completed      │   │  Venmo          │       │
//! │  └─────────────────┘   │  Canceled       │   │  CashApp        │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Derived Stock Rule
//! When an `Item` has options, `Item::stock` is a CACHE of the option sum,
//! recomputed by the stock ledger after every mutation. Only optionless
//! items treat `stock` as authoritative. See [`crate::stock`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Item & ItemOption
// =============================================================================

/// A flavor/variant of an item with its own stock count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemOption {
    /// Display name, unique within the parent item (e.g. "Hot Cheetos").
    pub name: String,

    /// Units on hand for this flavor.
    pub stock: u32,
}

impl ItemOption {
    /// Creates an option with the given name and starting stock.
    pub fn new(name: impl Into<String>, stock: u32) -> Self {
        ItemOption {
            name: name.into(),
            stock,
        }
    }
}

/// A catalog item available for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Item {
    /// Unique identifier. Seed items use stable slugs ("chips") so two
    /// fresh registers converge on the same rows; admin-added items get
    /// UUIDs.
    pub id: String,

    /// Display name shown on the register grid.
    pub name: String,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Units on hand. Derived from `options` when any exist.
    pub stock: u32,

    /// Flavor variants. Empty for single-variant items.
    #[serde(default)]
    pub options: Vec<ItemOption>,

    /// Tile color class for the frontend (opaque to the core).
    #[serde(default)]
    pub color: String,

    /// Tile emoji/icon for the frontend (opaque to the core).
    #[serde(default)]
    pub icon: String,
}

impl Item {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// True when this item is split into flavor options.
    #[inline]
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    /// Looks up an option by name.
    pub fn find_option(&self, name: &str) -> Option<&ItemOption> {
        self.options.iter().find(|o| o.name == name)
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// A line in a draft or frozen order.
/// Uses the snapshot pattern: name and unit price are frozen at add time so
/// later catalog edits never rewrite an order already rung up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLine {
    /// Item this line refers to.
    pub item_id: String,

    /// Item name at add time (frozen).
    pub item_name: String,

    /// Selected flavor, present iff the item has options.
    pub option_name: Option<String>,

    /// Unit price in cents at add time (frozen).
    pub unit_price_cents: i64,

    /// Units on this line. Always >= 1; a line at 0 is removed instead.
    pub quantity: u32,
}

impl OrderLine {
    /// Returns the frozen unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    /// True when this line is keyed by the given (item, option) pair.
    /// The cart holds at most one line per key.
    pub fn matches(&self, item_id: &str, option_name: Option<&str>) -> bool {
        self.item_id == item_id && self.option_name.as_deref() == option_name
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// The lifecycle status of a sale.
///
/// ```text
///            fulfill
///  PENDING ───────────► COMPLETED (terminal)
///     │
///     │ cancel (restores stock exactly once)
///     ▼
///  CANCELED (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Order taken, awaiting pickup/fulfillment (storefront flow).
    Pending,
    /// Sale has been paid and handed over.
    Completed,
    /// Pending order was cancelled; its stock was restored.
    Canceled,
}

impl SaleStatus {
    /// True for statuses with no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SaleStatus::Completed | SaleStatus::Canceled)
    }
}

// =============================================================================
// Sale Channel
// =============================================================================

/// Where a checkout originated; decides the sale's starting status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleChannel {
    /// Staff rang it up in person; paid and handed over on the spot.
    Attended,
    /// Customer ordered through the storefront; pickup happens later.
    Unattended,
}

impl SaleChannel {
    /// The status a freshly checked-out sale starts in.
    pub fn initial_status(&self) -> SaleStatus {
        match self {
            SaleChannel::Attended => SaleStatus::Completed,
            SaleChannel::Unattended => SaleStatus::Pending,
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash in the box.
    Cash,
    /// Venmo transfer.
    Venmo,
    /// Cash App transfer.
    CashApp,
}

// =============================================================================
// Customer Info
// =============================================================================

/// Pickup details attached to storefront (unattended) orders.
/// Opaque to the core beyond storage; the pickup label is whatever the
/// storefront's slot picker produced ("Friday lunch").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerInfo {
    /// Name to call out at pickup.
    pub name: String,

    /// Free-form pickup slot label, if one was chosen.
    pub pickup_label: Option<String>,
}

// =============================================================================
// Sale
// =============================================================================

/// An immutable record of a committed order plus its mutable status.
///
/// `lines` and `total_cents` are frozen at checkout; only `status` ever
/// changes afterwards, and at most once (see [`SaleStatus`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sale {
    /// Unique identifier (UUID v4), generated at checkout.
    pub id: String,

    /// When the checkout happened.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// Snapshot of the cart at checkout time (frozen).
    pub lines: Vec<OrderLine>,

    /// Order total in cents at checkout time (frozen).
    pub total_cents: i64,

    /// How the customer paid.
    pub payment_method: PaymentMethod,

    /// Lifecycle status; the only mutable field.
    pub status: SaleStatus,

    /// Pickup details for storefront orders.
    pub customer: Option<CustomerInfo>,
}

impl Sale {
    /// Returns the frozen total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Recomputes the total from the frozen lines.
    /// Must always equal [`Sale::total`]; used to assert the invariant.
    pub fn recomputed_total(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(), |acc, line| acc + line.line_total())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(!SaleStatus::Pending.is_terminal());
        assert!(SaleStatus::Completed.is_terminal());
        assert!(SaleStatus::Canceled.is_terminal());
    }

    #[test]
    fn test_channel_initial_status() {
        assert_eq!(SaleChannel::Attended.initial_status(), SaleStatus::Completed);
        assert_eq!(SaleChannel::Unattended.initial_status(), SaleStatus::Pending);
    }

    #[test]
    fn test_find_option() {
        let item = Item {
            id: "chips".into(),
            name: "Chips".into(),
            price_cents: 200,
            stock: 9,
            options: vec![
                ItemOption::new("Hot Cheetos", 4),
                ItemOption::new("Hot Funyuns", 5),
            ],
            color: String::new(),
            icon: String::new(),
        };

        assert!(item.has_options());
        assert_eq!(item.find_option("Hot Funyuns").map(|o| o.stock), Some(5));
        assert!(item.find_option("Plain").is_none());
    }

    #[test]
    fn test_line_key_matching() {
        let line = OrderLine {
            item_id: "chips".into(),
            item_name: "Chips".into(),
            option_name: Some("Hot Cheetos".into()),
            unit_price_cents: 200,
            quantity: 2,
        };

        assert!(line.matches("chips", Some("Hot Cheetos")));
        assert!(!line.matches("chips", Some("Hot Funyuns")));
        assert!(!line.matches("chips", None));
        assert_eq!(line.line_total().cents(), 400);
    }

    #[test]
    fn test_status_serde_casing() {
        let json = serde_json::to_string(&SaleStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
        let method = serde_json::to_string(&PaymentMethod::CashApp).unwrap();
        assert_eq!(method, "\"cash_app\"");
    }
}
