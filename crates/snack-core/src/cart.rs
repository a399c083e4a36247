//! # Cart Manager
//!
//! The draft order being rung up, before checkout freezes it into a sale.
//!
//! ## Line Identity
//! Lines are keyed by `(item_id, option_name)`: two flavors of the same
//! chips are two lines, two bags of the same flavor are one line with
//! quantity 2.
//!
//! ## Add Decision Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart: Add One Unit                                   │
//! │                                                                         │
//! │  add_line(item, option)                                                 │
//! │       │                                                                 │
//! │       ├── item has options, none chosen?                                │
//! │       │        └── Ok(NeedsOptionSelection)   ← ask the user, no error  │
//! │       │                                                                 │
//! │       ├── option named but item doesn't have it?                        │
//! │       │        └── Err(UnknownOption)         ← caller bug              │
//! │       │                                                                 │
//! │       ├── cart already holds all available units of this key?           │
//! │       │        └── Ok(SoldOut)                ← normal outcome          │
//! │       │                                                                 │
//! │       └── otherwise merge into existing line or append a new one        │
//! │                └── Ok(Added)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Availability Is Cart-Relative
//! The sold-out check counts units already in THIS cart against current
//! stock, so one register cannot queue up more of a flavor than the shelf
//! holds. It cannot see other registers' carts; simultaneous checkouts can
//! still overdraw, and the ledger's clamp-at-zero rule absorbs that (see
//! [`crate::stock`]).
//!
//! Adding an item never moves stock. Stock moves exactly once, at checkout.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::stock;
use crate::types::{Item, OrderLine};

// =============================================================================
// Add Outcome
// =============================================================================

/// What happened when a unit was offered to the cart.
///
/// These are the expected forks of ringing an item up; none of them is an
/// error. Errors are reserved for requests that are malformed no matter
/// what the stock situation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AddOutcome {
    /// The unit is in the cart.
    Added,
    /// The item comes in flavors and the caller has not picked one yet.
    NeedsOptionSelection,
    /// Every unit the shelf holds for this key is already in the cart.
    SoldOut,
}

// =============================================================================
// Cart
// =============================================================================

/// The current draft order.
///
/// ## Invariants
/// - At most one line per `(item_id, option_name)` key
/// - Every line has quantity >= 1 (a line hitting 0 is removed)
/// - Prices and names on lines are frozen at add time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    /// Lines in the draft order.
    pub lines: Vec<OrderLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Offers one unit of an item (and flavor, if any) to the cart.
    ///
    /// ## Behavior
    /// - Flavored item without a flavor: returns `NeedsOptionSelection`
    ///   without touching the cart.
    /// - Flavor named that the item does not carry (or any flavor named on
    ///   a single-variant item): returns `Err(UnknownOption)`.
    /// - Cart already holds every available unit of this key: `SoldOut`.
    /// - Otherwise the unit merges into the matching line, or starts a new
    ///   line with the item's current name and price frozen in.
    pub fn add_line(&mut self, item: &Item, option_name: Option<&str>) -> CoreResult<AddOutcome> {
        if item.has_options() && option_name.is_none() {
            return Ok(AddOutcome::NeedsOptionSelection);
        }

        if let Some(name) = option_name {
            if item.find_option(name).is_none() {
                return Err(CoreError::UnknownOption {
                    item: item.name.clone(),
                    option: name.to_string(),
                });
            }
        }

        let available = stock::available(item, option_name);
        if self.quantity_of(&item.id, option_name) >= available {
            return Ok(AddOutcome::SoldOut);
        }

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.matches(&item.id, option_name))
        {
            line.quantity += 1;
        } else {
            self.lines.push(OrderLine {
                item_id: item.id.clone(),
                item_name: item.name.clone(),
                option_name: option_name.map(str::to_string),
                unit_price_cents: item.price_cents,
                quantity: 1,
            });
        }

        Ok(AddOutcome::Added)
    }

    /// Removes one unit for the given key.
    ///
    /// A line reaching quantity 0 is dropped. Removing a key that is not
    /// in the cart is a no-op; mashing the minus button is not an error.
    pub fn remove_line(&mut self, item_id: &str, option_name: Option<&str>) {
        if let Some(idx) = self
            .lines
            .iter()
            .position(|l| l.matches(item_id, option_name))
        {
            if self.lines[idx].quantity > 1 {
                self.lines[idx].quantity -= 1;
            } else {
                self.lines.remove(idx);
            }
        }
    }

    /// Units of the given key already in the cart.
    pub fn quantity_of(&self, item_id: &str, option_name: Option<&str>) -> u32 {
        self.lines
            .iter()
            .find(|l| l.matches(item_id, option_name))
            .map(|l| l.quantity)
            .unwrap_or(0)
    }

    /// Recomputes the order total from the lines.
    /// Never cached: the cart is small and a stale total is worse than the
    /// handful of multiplications.
    pub fn total(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(), |acc, line| acc + line.line_total())
    }

    /// Drops every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Number of distinct `(item, option)` keys in the cart.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemOption;

    fn plain_item(id: &str, price_cents: i64, stock: u32) -> Item {
        Item {
            id: id.to_string(),
            name: format!("Item {}", id),
            price_cents,
            stock,
            options: Vec::new(),
            color: String::new(),
            icon: String::new(),
        }
    }

    fn chips() -> Item {
        Item {
            id: "chips".into(),
            name: "Chips".into(),
            price_cents: 200,
            stock: 3,
            options: vec![
                ItemOption::new("Hot Cheetos", 2),
                ItemOption::new("Hot Funyuns", 1),
            ],
            color: String::new(),
            icon: String::new(),
        }
    }

    #[test]
    fn test_add_merges_same_key() {
        let mut cart = Cart::new();
        let item = plain_item("1", 100, 10);

        assert_eq!(cart.add_line(&item, None).unwrap(), AddOutcome::Added);
        assert_eq!(cart.add_line(&item, None).unwrap(), AddOutcome::Added);

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.quantity_of("1", None), 2);
        assert_eq!(cart.total().cents(), 200);
    }

    #[test]
    fn test_total_sums_mixed_lines() {
        let mut cart = Cart::new();
        let chips = plain_item("chips", 200, 10);
        let fruit = plain_item("fruit", 100, 10);

        cart.add_line(&chips, None).unwrap();
        cart.add_line(&chips, None).unwrap();
        cart.add_line(&fruit, None).unwrap();
        cart.add_line(&fruit, None).unwrap();
        cart.add_line(&fruit, None).unwrap();

        // 2 x $2.00 + 3 x $1.00
        assert_eq!(cart.total().cents(), 700);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_flavors_are_distinct_lines() {
        let mut cart = Cart::new();
        let item = chips();

        cart.add_line(&item, Some("Hot Cheetos")).unwrap();
        cart.add_line(&item, Some("Hot Funyuns")).unwrap();

        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.quantity_of("chips", Some("Hot Cheetos")), 1);
        assert_eq!(cart.quantity_of("chips", Some("Hot Funyuns")), 1);
    }

    #[test]
    fn test_missing_flavor_asks_for_selection() {
        let mut cart = Cart::new();
        let item = chips();

        let outcome = cart.add_line(&item, None).unwrap();
        assert_eq!(outcome, AddOutcome::NeedsOptionSelection);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_unknown_flavor_is_an_error() {
        let mut cart = Cart::new();

        let err = cart.add_line(&chips(), Some("Plain")).unwrap_err();
        assert!(matches!(err, CoreError::UnknownOption { .. }));

        // Naming a flavor on a single-variant item is the same caller bug.
        let plain = plain_item("1", 100, 5);
        let err = cart.add_line(&plain, Some("Spicy")).unwrap_err();
        assert!(matches!(err, CoreError::UnknownOption { .. }));
    }

    #[test]
    fn test_sold_out_is_cart_relative() {
        let mut cart = Cart::new();
        let item = chips();

        // Hot Funyuns has one unit on the shelf.
        assert_eq!(
            cart.add_line(&item, Some("Hot Funyuns")).unwrap(),
            AddOutcome::Added
        );
        assert_eq!(
            cart.add_line(&item, Some("Hot Funyuns")).unwrap(),
            AddOutcome::SoldOut
        );

        // Other flavors are unaffected by that key being exhausted.
        assert_eq!(
            cart.add_line(&item, Some("Hot Cheetos")).unwrap(),
            AddOutcome::Added
        );
    }

    #[test]
    fn test_zero_stock_rejects_first_add() {
        let mut cart = Cart::new();
        let item = plain_item("1", 100, 0);

        assert_eq!(cart.add_line(&item, None).unwrap(), AddOutcome::SoldOut);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_price_frozen_at_add_time() {
        let mut cart = Cart::new();
        let mut item = plain_item("1", 100, 10);

        cart.add_line(&item, None).unwrap();

        // A later catalog price change must not rewrite the open order.
        item.price_cents = 250;
        assert_eq!(cart.total().cents(), 100);
    }

    #[test]
    fn test_remove_decrements_then_drops() {
        let mut cart = Cart::new();
        let item = plain_item("1", 100, 10);

        cart.add_line(&item, None).unwrap();
        cart.add_line(&item, None).unwrap();

        cart.remove_line("1", None);
        assert_eq!(cart.quantity_of("1", None), 1);

        cart.remove_line("1", None);
        assert!(cart.is_empty());

        // Removing an absent key is a no-op.
        cart.remove_line("1", None);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_line(&plain_item("1", 100, 5), None).unwrap();
        assert!(!cart.is_empty());

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total().cents(), 0);
    }
}
