//! # Stock Ledger
//!
//! Clamped stock arithmetic for items and their flavor options.
//!
//! ## Counting Philosophy
//! Stock counts track what is physically in the bins, and the physical
//! handover is the ground truth. If two registers both sell the last bag,
//! the second decrement clamps at zero instead of erroring: the snack was
//! already handed over, so refusing to record the sale would only make the
//! books wrong in a different way. Underflow is a counting artifact here,
//! never a reason to reject money.
//!
//! ## Derived Stock
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Item "chips"                                                           │
//! │                                                                         │
//! │  options: [ Hot Cheetos lime: 4 ]  ◄── authoritative counts            │
//! │           [ Hot Cheetos:      5 ]                                       │
//! │           [ Hot Funyuns:      5 ]                                       │
//! │           [ Hot Doritos:      5 ]                                       │
//! │           [ Hot Fritos:       5 ]                                       │
//! │                    │                                                    │
//! │                    ▼ recompute after every mutation                     │
//! │  stock: 24        ◄── cache of the option sum, NEVER edited directly   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Every mutation that touches an option finishes by recomputing the parent
//! item's cached total, so `Item::stock` always equals the option sum for
//! optioned items. Optionless items own their `stock` field outright.
//!
//! All functions here are infallible: a decrement aimed at a flavor the
//! item does not have moves no stock and leaves the item consistent.

use crate::types::Item;

// =============================================================================
// Queries
// =============================================================================

/// Units available for a given (item, option) key.
///
/// - Optionless item, no option: the item's own stock.
/// - Optioned item, named option: that option's stock, or 0 if the item
///   has no option by that name.
/// - Any other pairing (flavored item without a flavor choice, or a flavor
///   named on a single-variant item): 0, since no sellable unit matches.
pub fn available(item: &Item, option_name: Option<&str>) -> u32 {
    match (item.has_options(), option_name) {
        (false, None) => item.stock,
        (true, Some(name)) => item.find_option(name).map(|o| o.stock).unwrap_or(0),
        _ => 0,
    }
}

/// True when nothing sellable remains: an optionless item with zero stock,
/// or an optioned item whose every flavor is at zero.
pub fn is_sold_out(item: &Item) -> bool {
    if item.has_options() {
        item.options.iter().all(|o| o.stock == 0)
    } else {
        item.stock == 0
    }
}

// =============================================================================
// Mutations
// =============================================================================

/// Recomputes the cached item total from its options.
/// No-op for optionless items.
pub fn recompute_derived(item: &mut Item) {
    if item.has_options() {
        item.stock = item
            .options
            .iter()
            .fold(0u32, |acc, o| acc.saturating_add(o.stock));
    }
}

/// Removes up to `qty` units for the given key, clamping at zero.
///
/// On an optioned item only a matching named option moves stock; the
/// cached total is recomputed either way. On an optionless item the item's
/// own count is decremented.
pub fn decrement(item: &mut Item, option_name: Option<&str>, qty: u32) {
    if item.has_options() {
        if let Some(name) = option_name {
            if let Some(option) = item.options.iter_mut().find(|o| o.name == name) {
                option.stock = option.stock.saturating_sub(qty);
            }
        }
        recompute_derived(item);
    } else {
        item.stock = item.stock.saturating_sub(qty);
    }
}

/// Returns `qty` units for the given key (cancel restock, restock deliveries).
///
/// Mirror of [`decrement`]: only a matching key moves stock, and the cached
/// total is recomputed for optioned items.
pub fn increment(item: &mut Item, option_name: Option<&str>, qty: u32) {
    if item.has_options() {
        if let Some(name) = option_name {
            if let Some(option) = item.options.iter_mut().find(|o| o.name == name) {
                option.stock = option.stock.saturating_add(qty);
            }
        }
        recompute_derived(item);
    } else {
        item.stock = item.stock.saturating_add(qty);
    }
}

/// Applies a signed stock correction, clamping at zero on the way down.
/// `adjust(item, key, -3)` after spotting spoilage, `adjust(item, key, 12)`
/// after a restock run.
pub fn adjust(item: &mut Item, option_name: Option<&str>, delta: i32) {
    if delta >= 0 {
        increment(item, option_name, delta as u32);
    } else {
        decrement(item, option_name, delta.unsigned_abs());
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
