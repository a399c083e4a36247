//! # Register State Container
//!
//! The single authoritative in-memory state of one register:
//! the catalog, the sale history, and the draft cart.
//!
//! ## One Container, Two Writers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Register                                      │
//! │                                                                         │
//! │   Local actions                    Remote folds                         │
//! │   ─────────────                    ────────────                         │
//! │   add_to_cart / remove_from_cart   apply_items_snapshot (guarded)       │
//! │   checkout                         apply_sales_snapshot                 │
//! │   fulfill / cancel                 apply_item_insert/update/delete      │
//! │   add_item / adjust_stock          apply_sale_insert/update/delete      │
//! │   reset_history                                                         │
//! │            │                                │                           │
//! │            └────────────┬───────────────────┘                           │
//! │                         ▼                                               │
//! │              ┌─────────────────────┐                                    │
//! │              │  items: Vec<Item>   │   derived totals recomputed        │
//! │              │  sales: Vec<Sale>   │   after every mutation             │
//! │              │  cart:  Cart        │                                    │
//! │              └─────────────────────┘                                    │
//! │                                                                         │
//! │   The app wraps the whole container in one Mutex; remote events and     │
//! │   button presses are serialized through the same lock, so every         │
//! │   invariant is enforced in exactly one place.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Checkout Freezes, Status Moves
//! Checkout turns the cart into a [`Sale`] whose lines and total never
//! change again. Afterwards only the status moves, and only once:
//! PENDING → COMPLETED (fulfill) or PENDING → CANCELED (cancel, which
//! restores the frozen quantities to stock). Attended checkouts are born
//! COMPLETED and never move at all.
//!
//! ## Fold Semantics
//! Remote change events fold under fixed rules: an insert for a known id
//! is dropped (two fresh registers both pushing the seed catalog must not
//! double the menu), an update or delete for an unknown id is ignored, and
//! a wholesale items snapshot is refused when empty so a blank remote can
//! never wipe a freshly seeded register.

use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::{AddOutcome, Cart};
use crate::catalog;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::stock;
use crate::types::{CustomerInfo, Item, ItemOption, PaymentMethod, Sale, SaleChannel, SaleStatus};
use crate::validation;
use crate::MAX_STOCK;

// =============================================================================
// New Item Input
// =============================================================================

/// Admin input for creating a catalog item.
///
/// The register assigns the id (UUID v4) and recomputes the derived total,
/// so the caller only describes the item. `stock` seeds a single-variant
/// item and is ignored once `options` are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewItem {
    /// Display name, unique within the catalog (case-insensitive).
    pub name: String,

    /// Price in cents.
    pub price_cents: i64,

    /// Starting stock for a single-variant item.
    #[serde(default)]
    pub stock: u32,

    /// Flavor variants, each with its own starting stock.
    #[serde(default)]
    pub options: Vec<ItemOption>,

    /// Tile color class for the frontend.
    #[serde(default)]
    pub color: String,

    /// Tile emoji/icon for the frontend.
    #[serde(default)]
    pub icon: String,
}

// =============================================================================
// Register
// =============================================================================

/// The authoritative state of one register.
///
/// Fields are private: every mutation path runs through a method that keeps
/// the derived-stock rule intact (`Item::stock` equals the option sum for
/// optioned items, after every operation).
#[derive(Debug, Clone, Default)]
pub struct Register {
    /// The live catalog.
    items: Vec<Item>,

    /// Committed sales, in checkout order.
    sales: Vec<Sale>,

    /// The draft order being rung up.
    cart: Cart,
}

impl Register {
    /// Creates an empty register: no catalog, no history, empty cart.
    pub fn new() -> Self {
        Register::default()
    }

    /// Creates a register seeded with the built-in starter catalog.
    pub fn with_default_catalog() -> Self {
        Register {
            items: catalog::default_catalog(),
            sales: Vec::new(),
            cart: Cart::new(),
        }
    }

    /// Rebuilds a register from persisted parts (a loaded snapshot).
    ///
    /// The cart is not restored: a draft order does not survive a
    /// restart. Cached item totals are recomputed rather than trusted,
    /// in case the snapshot was written by an older build.
    pub fn from_parts(mut items: Vec<Item>, sales: Vec<Sale>) -> Self {
        for item in &mut items {
            stock::recompute_derived(item);
        }
        Register {
            items,
            sales,
            cart: Cart::new(),
        }
    }

    // =========================================================================
    // Read Access
    // =========================================================================

    /// The live catalog.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Looks up a catalog item by id.
    pub fn find_item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == item_id)
    }

    /// Committed sales, in checkout order.
    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    /// Looks up a sale by id.
    pub fn find_sale(&self, sale_id: &str) -> Option<&Sale> {
        self.sales.iter().find(|s| s.id == sale_id)
    }

    /// The current draft order.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Sale history for display, most recent checkout first.
    pub fn sales_newest_first(&self) -> Vec<Sale> {
        let mut sales = self.sales.clone();
        sales.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sales
    }

    /// Storefront orders still waiting for pickup, oldest first.
    /// Oldest first because pickup is a queue, not a feed.
    pub fn pending_sales(&self) -> Vec<Sale> {
        let mut sales: Vec<Sale> = self
            .sales
            .iter()
            .filter(|s| s.status == SaleStatus::Pending)
            .cloned()
            .collect();
        sales.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        sales
    }

    // =========================================================================
    // Cart Actions
    // =========================================================================

    /// Offers one unit of an item (and flavor, if any) to the cart.
    ///
    /// Looks the item up in the live catalog and delegates to
    /// [`Cart::add_line`], so the sold-out check always runs against
    /// current stock, including stock that a remote fold just changed.
    pub fn add_to_cart(
        &mut self,
        item_id: &str,
        option_name: Option<&str>,
    ) -> CoreResult<AddOutcome> {
        let item = self
            .items
            .iter()
            .find(|i| i.id == item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;
        self.cart.add_line(item, option_name)
    }

    /// Removes one unit for the given key from the cart.
    ///
    /// No catalog lookup: a line whose item was deleted remotely must
    /// still be removable from the draft.
    pub fn remove_from_cart(&mut self, item_id: &str, option_name: Option<&str>) {
        self.cart.remove_line(item_id, option_name);
    }

    /// Current draft order total.
    pub fn cart_total(&self) -> Money {
        self.cart.total()
    }

    /// Abandons the draft order without ringing it up.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    // =========================================================================
    // Checkout & Sale Lifecycle
    // =========================================================================

    /// Commits the cart as a sale.
    ///
    /// ## Behavior
    /// - Empty cart: `Err(EmptyCart)`, nothing changes.
    /// - Otherwise the cart lines and their total are frozen into a new
    ///   [`Sale`] (UUID v4 id, current timestamp), stock is decremented
    ///   once per line (clamping at zero), and the cart is cleared.
    /// - The starting status comes from the channel: attended checkouts
    ///   are COMPLETED on the spot, storefront orders start PENDING.
    ///
    /// Checkout itself never fails for stock reasons: by the time the
    /// money changed hands the units are gone no matter what the counter
    /// says. A line whose item vanished from the catalog (remote delete
    /// mid-order) still sells at its frozen price; it just has no stock
    /// left to move.
    pub fn checkout(
        &mut self,
        payment_method: PaymentMethod,
        customer: Option<CustomerInfo>,
        channel: SaleChannel,
    ) -> CoreResult<Sale> {
        if self.cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let lines = std::mem::take(&mut self.cart.lines);
        let total = lines
            .iter()
            .fold(Money::zero(), |acc, line| acc + line.line_total());

        for line in &lines {
            if let Some(item) = self.items.iter_mut().find(|i| i.id == line.item_id) {
                stock::decrement(item, line.option_name.as_deref(), line.quantity);
            }
        }

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            total_cents: total.cents(),
            lines,
            payment_method,
            status: channel.initial_status(),
            customer,
        };

        self.sales.push(sale.clone());
        Ok(sale)
    }

    /// Marks a PENDING sale as COMPLETED (picked up and paid).
    ///
    /// Stock does not move: it already moved at checkout.
    pub fn fulfill(&mut self, sale_id: &str) -> CoreResult<Sale> {
        let sale = self.pending_sale_mut(sale_id)?;
        sale.status = SaleStatus::Completed;
        Ok(sale.clone())
    }

    /// Cancels a PENDING sale and restores its frozen quantities to stock.
    ///
    /// The terminal-status guard is what makes the restore happen exactly
    /// once: a second cancel is `Err(InvalidTransition)` before any stock
    /// moves. Restoring a line whose item has since been deleted is a
    /// silent no-op; those units have nowhere to go back to.
    pub fn cancel(&mut self, sale_id: &str) -> CoreResult<Sale> {
        let sale = {
            let sale = self.pending_sale_mut(sale_id)?;
            sale.status = SaleStatus::Canceled;
            sale.clone()
        };

        for line in &sale.lines {
            if let Some(item) = self.items.iter_mut().find(|i| i.id == line.item_id) {
                stock::increment(item, line.option_name.as_deref(), line.quantity);
            }
        }

        Ok(sale)
    }

    /// Finds a sale that is still allowed to transition.
    fn pending_sale_mut(&mut self, sale_id: &str) -> CoreResult<&mut Sale> {
        let sale = self
            .sales
            .iter_mut()
            .find(|s| s.id == sale_id)
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;

        if sale.status != SaleStatus::Pending {
            return Err(CoreError::InvalidTransition {
                sale_id: sale_id.to_string(),
                current_status: sale.status,
            });
        }

        Ok(sale)
    }

    // =========================================================================
    // Admin: Catalog Management
    // =========================================================================

    /// Adds a new catalog item from admin input.
    ///
    /// Validates names, price, and stock counts; rejects a display name
    /// already in the catalog (case-insensitive) and duplicate flavor
    /// names within the new item. The stored item gets a fresh UUID and a
    /// recomputed derived total.
    pub fn add_item(&mut self, new_item: NewItem) -> CoreResult<Item> {
        validation::validate_item_name(&new_item.name)?;
        validation::validate_price_cents(new_item.price_cents)?;
        validation::validate_stock(new_item.stock)?;

        let name = new_item.name.trim().to_string();
        if self.items.iter().any(|i| i.name.eq_ignore_ascii_case(&name)) {
            return Err(ValidationError::Duplicate {
                field: "item name".to_string(),
                value: name,
            }
            .into());
        }

        let mut options = Vec::with_capacity(new_item.options.len());
        for option in &new_item.options {
            validation::validate_option_name(&option.name)?;
            validation::validate_stock(option.stock)?;

            let trimmed = option.name.trim();
            if options
                .iter()
                .any(|o: &ItemOption| o.name.eq_ignore_ascii_case(trimmed))
            {
                return Err(ValidationError::Duplicate {
                    field: "option name".to_string(),
                    value: trimmed.to_string(),
                }
                .into());
            }
            options.push(ItemOption::new(trimmed, option.stock));
        }

        let mut item = Item {
            id: Uuid::new_v4().to_string(),
            name,
            price_cents: new_item.price_cents,
            stock: new_item.stock,
            options,
            color: new_item.color,
            icon: new_item.icon,
        };
        stock::recompute_derived(&mut item);

        self.items.push(item.clone());
        Ok(item)
    }

    /// Applies a signed stock correction to an item or one of its flavors.
    ///
    /// ## Rules
    /// - Optioned item without a flavor named: `Err(StockIsDerived)`; the
    ///   item-level count is a cache and cannot be written directly.
    /// - Flavor named that does not exist (on either kind of item):
    ///   `Err(UnknownOption)`.
    /// - Corrections clamp at zero on the way down and are rejected past
    ///   [`MAX_STOCK`] on the way up.
    ///
    /// Returns the item after the correction.
    pub fn adjust_stock(
        &mut self,
        item_id: &str,
        option_name: Option<&str>,
        delta: i32,
    ) -> CoreResult<Item> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;

        match (item.has_options(), option_name) {
            (true, None) => {
                return Err(CoreError::StockIsDerived(item.name.clone()));
            }
            (_, Some(name)) if item.find_option(name).is_none() => {
                return Err(CoreError::UnknownOption {
                    item: item.name.clone(),
                    option: name.to_string(),
                });
            }
            _ => {}
        }

        let current = stock::available(item, option_name);
        let target = if delta >= 0 {
            current.saturating_add(delta as u32)
        } else {
            current.saturating_sub(delta.unsigned_abs())
        };
        if target > MAX_STOCK {
            return Err(ValidationError::OutOfRange {
                field: "stock".to_string(),
                min: 0,
                max: MAX_STOCK as i64,
            }
            .into());
        }

        stock::adjust(item, option_name, delta);
        Ok(item.clone())
    }

    // =========================================================================
    // Earnings & History
    // =========================================================================

    /// Takings across all COMPLETED sales.
    /// Pending money is not earned yet; canceled money never was.
    pub fn earnings_total(&self) -> Money {
        self.sales
            .iter()
            .filter(|s| s.status == SaleStatus::Completed)
            .fold(Money::zero(), |acc, s| acc + s.total())
    }

    /// Takings across COMPLETED sales checked out today, register-local time.
    pub fn earnings_today(&self) -> Money {
        self.earnings_on(Local::now().date_naive())
    }

    fn earnings_on(&self, day: NaiveDate) -> Money {
        self.sales
            .iter()
            .filter(|s| s.status == SaleStatus::Completed)
            .filter(|s| s.created_at.with_timezone(&Local).date_naive() == day)
            .fold(Money::zero(), |acc, s| acc + s.total())
    }

    /// Wipes the sale history. Stock stays where it is: clearing the books
    /// does not put snacks back in the bins.
    ///
    /// Returns how many sales were dropped, for the audit log.
    pub fn reset_history(&mut self) -> usize {
        let dropped = self.sales.len();
        self.sales.clear();
        dropped
    }

    // =========================================================================
    // Remote Folds
    // =========================================================================
    // Everything below is driven by the sync layer. A malformed or stale
    // event degrades to a no-op, never a panic.

    /// Replaces the catalog with a remote snapshot.
    ///
    /// An empty snapshot is refused and `false` is returned: a brand-new
    /// remote has nothing to teach a freshly seeded register, and adopting
    /// its emptiness would wipe the menu. Accepted items get their derived
    /// totals recomputed rather than trusted.
    pub fn apply_items_snapshot(&mut self, mut items: Vec<Item>) -> bool {
        if items.is_empty() {
            return false;
        }
        for item in &mut items {
            stock::recompute_derived(item);
        }
        self.items = items;
        true
    }

    /// Replaces the sale history with a remote snapshot, even an empty one.
    /// An empty sales table is meaningful (a reset), unlike an empty menu.
    pub fn apply_sales_snapshot(&mut self, sales: Vec<Sale>) {
        self.sales = sales;
    }

    /// Folds a remote item insert. An id already in the catalog is dropped:
    /// two registers pushing the same seed rows must converge, not double.
    pub fn apply_item_insert(&mut self, mut item: Item) {
        if self.items.iter().any(|i| i.id == item.id) {
            return;
        }
        stock::recompute_derived(&mut item);
        self.items.push(item);
    }

    /// Folds a remote item update, replacing the local row wholesale.
    /// An unknown id is ignored; folds never invent catalog entries.
    pub fn apply_item_update(&mut self, mut item: Item) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            stock::recompute_derived(&mut item);
            *existing = item;
        }
    }

    /// Folds a remote item delete. Unknown id: no-op.
    pub fn apply_item_delete(&mut self, item_id: &str) {
        self.items.retain(|i| i.id != item_id);
    }

    /// Folds a remote sale insert (a sale rung up on another register).
    /// Known ids are dropped so replayed events cannot double the books.
    pub fn apply_sale_insert(&mut self, sale: Sale) {
        if self.sales.iter().any(|s| s.id == sale.id) {
            return;
        }
        self.sales.push(sale);
    }

    /// Folds a remote sale update (a status change made elsewhere),
    /// replacing the local row wholesale. Unknown id: no-op.
    ///
    /// No stock compensation happens here: the register that performed
    /// the cancel already restored stock and mirrors the item rows too.
    pub fn apply_sale_update(&mut self, sale: Sale) {
        if let Some(existing) = self.sales.iter_mut().find(|s| s.id == sale.id) {
            *existing = sale;
        }
    }

    /// Folds a remote sale delete (another register reset the history).
    pub fn apply_sale_delete(&mut self, sale_id: &str) {
        self.sales.retain(|s| s.id != sale_id);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
