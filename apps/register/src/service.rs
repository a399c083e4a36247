//! # Register Service
//!
//! The facade every frontend call lands on. One method per screen action,
//! each returning a serializable view or an [`ApiError`].
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        RegisterService                                  │
//! │                                                                         │
//! │  UI call ──► service method                                             │
//! │                  │                                                      │
//! │                  ├── 1. gate      (ScreenLock, admin methods only)      │
//! │                  ├── 2. mutate    (RegisterState, one short lock)       │
//! │                  ├── 3. persist   (SnapshotStore, log-and-continue)     │
//! │                  └── 4. mirror    (SyncAgentHandle, fire-and-forget)    │
//! │                                                                         │
//! │  Steps 3 and 4 never fail the call: the sale already happened on        │
//! │  this register, and that is the record that counts.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## View Models
//! Methods return dedicated view structs (camelCase JSON, TypeScript
//! bindings via ts-rs) rather than raw domain types, so the frontend
//! contract can carry derived display fields like `soldOut` without
//! polluting the core.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use ts_rs::TS;

use snack_core::{
    stock, AddOutcome, CustomerInfo, Item, NewItem, OrderLine, PaymentMethod, Register, Sale,
    SaleChannel,
};
use snack_store::{Snapshot, SnapshotStore, StoreResult};
use snack_sync::{EventKind, FoldListener, OutboundOp, SyncAgentHandle, Table};

use crate::error::ApiError;
use crate::lock::ScreenLock;
use crate::state::RegisterState;

// =============================================================================
// View Models
// =============================================================================

/// One catalog tile as the grid renders it.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ItemView {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    /// Units on hand; derived from the options when any exist.
    pub stock: u32,
    pub options: Vec<OptionView>,
    pub color: String,
    pub icon: String,
    /// True when no unit of any flavor is left. The tile stays on the
    /// grid greyed out; it never disappears.
    pub sold_out: bool,
}

/// One flavor row inside an item tile.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OptionView {
    pub name: String,
    pub stock: u32,
    pub sold_out: bool,
}

impl From<&Item> for ItemView {
    fn from(item: &Item) -> Self {
        ItemView {
            id: item.id.clone(),
            name: item.name.clone(),
            price_cents: item.price_cents,
            stock: item.stock,
            options: item
                .options
                .iter()
                .map(|o| OptionView {
                    name: o.name.clone(),
                    stock: o.stock,
                    sold_out: o.stock == 0,
                })
                .collect(),
            color: item.color.clone(),
            icon: item.icon.clone(),
            sold_out: stock::is_sold_out(item),
        }
    }
}

/// The draft order as the cart panel renders it.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartView {
    pub lines: Vec<OrderLine>,
    pub total_cents: i64,
    pub total_quantity: u32,
}

/// What `add_to_cart` hands back: the outcome of the tap plus the cart
/// as it now stands, so the UI repaints from one response.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AddToCartResponse {
    pub outcome: AddOutcome,
    pub cart: CartView,
}

/// Checkout parameters from the payment screen.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CheckoutRequest {
    pub payment_method: PaymentMethod,

    /// Pickup details for storefront orders; counter sales leave it out.
    #[serde(default)]
    pub customer: Option<CustomerInfo>,

    pub channel: SaleChannel,
}

/// Takings summary for the earnings screen.
#[derive(Debug, Clone, Copy, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EarningsView {
    /// All completed sales, all time.
    pub total_cents: i64,
    /// Completed sales checked out today, register-local time.
    pub today_cents: i64,
}

/// Sync health for the status badge.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SyncStatusView {
    /// One of "idle", "syncing", "success", "error".
    pub state: String,
    /// Mirror writes pushed since startup.
    pub pushed: u64,
    pub last_error: Option<String>,
    /// RFC 3339 timestamp of the last successful push.
    pub last_success_at: Option<String>,
}

impl From<snack_sync::SyncStatus> for SyncStatusView {
    fn from(status: snack_sync::SyncStatus) -> Self {
        SyncStatusView {
            state: status.state.as_str().to_string(),
            pushed: status.pushed,
            last_error: status.last_error,
            last_success_at: status.last_success_at.map(|t| t.to_rfc3339()),
        }
    }
}

// =============================================================================
// Register Service
// =============================================================================

/// The one object the binary wires up and every frontend call goes through.
///
/// Methods lock the register briefly, never across an await, so the same
/// state can be shared with the sync agent's fold loops.
pub struct RegisterService {
    state: RegisterState,
    store: SnapshotStore,
    lock: ScreenLock,
    sync: Option<SyncAgentHandle>,
}

impl RegisterService {
    /// Wires the service together. Pass `sync: None` for offline mode.
    pub fn new(
        state: RegisterState,
        store: SnapshotStore,
        lock: ScreenLock,
        sync: Option<SyncAgentHandle>,
    ) -> Self {
        RegisterService {
            state,
            store,
            lock,
            sync,
        }
    }

    // =========================================================================
    // Catalog & Cart Views
    // =========================================================================

    /// The catalog as the grid renders it, sold-out tiles included.
    pub fn items(&self) -> Vec<ItemView> {
        self.state
            .with_register(|r| r.items().iter().map(ItemView::from).collect())
    }

    /// The current draft order.
    pub fn cart(&self) -> CartView {
        self.state.with_register(cart_view)
    }

    // =========================================================================
    // Cart Operations
    // =========================================================================

    /// Handles one tap on a catalog tile (or a flavor row inside it).
    ///
    /// Sold-out and pick-a-flavor come back as [`AddOutcome`] values, not
    /// errors; only a vanished item or unknown flavor name fails the call.
    /// The cart is in-memory only, so nothing is persisted or mirrored.
    pub fn add_to_cart(
        &self,
        item_id: &str,
        option_name: Option<&str>,
    ) -> Result<AddToCartResponse, ApiError> {
        debug!(item_id, ?option_name, "add_to_cart");
        let (outcome, cart) = self.state.with_register_mut(|r| {
            let outcome = r.add_to_cart(item_id, option_name)?;
            Ok::<_, ApiError>((outcome, cart_view(r)))
        })?;
        Ok(AddToCartResponse { outcome, cart })
    }

    /// Drops one whole line from the cart. Unknown keys are a no-op.
    pub fn remove_from_cart(&self, item_id: &str, option_name: Option<&str>) -> CartView {
        debug!(item_id, ?option_name, "remove_from_cart");
        self.state.with_register_mut(|r| {
            r.remove_from_cart(item_id, option_name);
            cart_view(r)
        })
    }

    /// Empties the draft order.
    pub fn clear_cart(&self) -> CartView {
        debug!("clear_cart");
        self.state.with_register_mut(|r| {
            r.clear_cart();
            cart_view(r)
        })
    }

    // =========================================================================
    // Checkout & Sale Lifecycle
    // =========================================================================

    /// Freezes the cart into a sale and commits the stock decrements.
    ///
    /// Counter sales complete on the spot; storefront orders come back
    /// `Pending` and wait in the pickup queue.
    pub fn checkout(&self, request: CheckoutRequest) -> Result<Sale, ApiError> {
        debug!(method = ?request.payment_method, channel = ?request.channel, "checkout");
        let (sale, touched) = self.state.with_register_mut(|r| {
            let sale = r.checkout(request.payment_method, request.customer, request.channel)?;
            let touched = touched_items(r, &sale);
            Ok::<_, ApiError>((sale, touched))
        })?;

        self.persist();
        self.mirror(OutboundOp::SaleInserted(sale.clone()));
        for item in touched {
            self.mirror(OutboundOp::ItemUpdated(item));
        }

        info!(
            sale_id = %sale.id,
            total_cents = sale.total_cents,
            lines = sale.lines.len(),
            status = ?sale.status,
            "Checkout complete"
        );
        Ok(sale)
    }

    /// Marks a pending storefront order as picked up and paid.
    pub fn fulfill(&self, sale_id: &str) -> Result<Sale, ApiError> {
        debug!(sale_id, "fulfill");
        let sale = self.state.with_register_mut(|r| r.fulfill(sale_id))?;

        self.persist();
        self.mirror(OutboundOp::SaleUpdated(sale.clone()));

        info!(sale_id = %sale.id, "Sale fulfilled");
        Ok(sale)
    }

    /// Cancels a pending order and puts its units back on the shelf.
    pub fn cancel(&self, sale_id: &str) -> Result<Sale, ApiError> {
        debug!(sale_id, "cancel");
        let (sale, touched) = self.state.with_register_mut(|r| {
            let sale = r.cancel(sale_id)?;
            let touched = touched_items(r, &sale);
            Ok::<_, ApiError>((sale, touched))
        })?;

        self.persist();
        self.mirror(OutboundOp::SaleUpdated(sale.clone()));
        for item in touched {
            self.mirror(OutboundOp::ItemUpdated(item));
        }

        info!(sale_id = %sale.id, "Sale canceled; stock restored");
        Ok(sale)
    }

    // =========================================================================
    // History & Earnings
    // =========================================================================

    /// Sale history for display, most recent checkout first.
    pub fn sales_history(&self) -> Vec<Sale> {
        self.state.with_register(|r| r.sales_newest_first())
    }

    /// Storefront orders still waiting for pickup, oldest first.
    pub fn pending_sales(&self) -> Vec<Sale> {
        self.state.with_register(|r| r.pending_sales())
    }

    /// Takings summary. Pending money is not earned yet.
    pub fn earnings(&self) -> EarningsView {
        self.state.with_register(|r| EarningsView {
            total_cents: r.earnings_total().cents(),
            today_cents: r.earnings_today().cents(),
        })
    }

    // =========================================================================
    // Screen Lock
    // =========================================================================

    /// Tries a PIN. Returns whether the admin screen is now unlocked.
    pub fn unlock_admin(&self, pin: &str) -> bool {
        self.lock.unlock(pin)
    }

    /// Re-locks the admin screen (leaving it, or after a timeout).
    pub fn lock_admin(&self) {
        self.lock.lock();
    }

    /// Whether admin operations would currently be allowed.
    pub fn is_admin_unlocked(&self) -> bool {
        self.lock.is_unlocked()
    }

    fn require_unlocked(&self) -> Result<(), ApiError> {
        if self.lock.is_unlocked() {
            Ok(())
        } else {
            Err(ApiError::locked())
        }
    }

    // =========================================================================
    // Admin Operations (PIN-gated)
    // =========================================================================

    /// Adds a new catalog item from the admin form.
    pub fn add_item(&self, new_item: NewItem) -> Result<ItemView, ApiError> {
        self.require_unlocked()?;
        debug!(name = %new_item.name, "add_item");

        let item = self.state.with_register_mut(|r| r.add_item(new_item))?;

        self.persist();
        self.mirror(OutboundOp::ItemInserted(item.clone()));

        info!(item_id = %item.id, name = %item.name, "Item added to catalog");
        Ok(ItemView::from(&item))
    }

    /// Moves stock for an item or one of its flavors. Clamps at zero.
    pub fn adjust_stock(
        &self,
        item_id: &str,
        option_name: Option<&str>,
        delta: i32,
    ) -> Result<ItemView, ApiError> {
        self.require_unlocked()?;
        debug!(item_id, ?option_name, delta, "adjust_stock");

        let item = self
            .state
            .with_register_mut(|r| r.adjust_stock(item_id, option_name, delta))?;

        self.persist();
        self.mirror(OutboundOp::ItemUpdated(item.clone()));

        info!(item_id = %item.id, stock = item.stock, "Stock adjusted");
        Ok(ItemView::from(&item))
    }

    /// Wipes the sale history on every register sharing the remote.
    /// Stock stays where it is: resetting the books is not a refund.
    pub fn reset_history(&self) -> Result<usize, ApiError> {
        self.require_unlocked()?;

        let removed = self.state.with_register_mut(|r| r.reset_history());

        self.persist();
        self.mirror(OutboundOp::SalesCleared);

        info!(removed, "Sales history reset");
        Ok(removed)
    }

    // =========================================================================
    // Sync
    // =========================================================================

    /// Sync health for the status badge. `None` in offline mode.
    pub fn sync_status(&self) -> Option<SyncStatusView> {
        self.sync.as_ref().map(|h| SyncStatusView::from(h.status()))
    }

    // =========================================================================
    // Persistence & Shutdown
    // =========================================================================

    /// Saves a snapshot, logging failures instead of surfacing them.
    /// A dead disk must never fail the sale that triggered the save.
    fn persist(&self) {
        if let Err(e) = self.save() {
            error!(error = %e, "Snapshot save failed; continuing with in-memory state");
        }
    }

    fn save(&self) -> StoreResult<()> {
        let snapshot = self.state.with_register(Snapshot::of_register);
        self.store.save(&snapshot)
    }

    /// Stops the sync agent (when one is running) and writes a final
    /// snapshot before the process exits.
    pub async fn shutdown(&self) {
        if let Some(handle) = &self.sync {
            handle.shutdown().await;
        }
        match self.save() {
            Ok(()) => info!("Final snapshot saved"),
            Err(e) => error!(error = %e, "Final snapshot save failed"),
        }
    }

    fn mirror(&self, op: OutboundOp) {
        if let Some(handle) = &self.sync {
            handle.enqueue(op);
        }
    }
}

/// Renders the register's cart for the UI.
fn cart_view(register: &Register) -> CartView {
    let cart = register.cart();
    CartView {
        lines: cart.lines.clone(),
        total_cents: register.cart_total().cents(),
        total_quantity: cart.total_quantity(),
    }
}

/// The items a sale touched, deduplicated, as they now stand on the shelf.
/// An item deleted from the catalog since the sale is simply skipped.
fn touched_items(register: &Register, sale: &Sale) -> Vec<Item> {
    let mut out: Vec<Item> = Vec::new();
    for line in &sale.lines {
        if out.iter().any(|i| i.id == line.item_id) {
            continue;
        }
        if let Some(item) = register.find_item(&line.item_id) {
            out.push(item.clone());
        }
    }
    out
}

// =============================================================================
// Snapshot Fold Listener
// =============================================================================

/// Persists the register after the sync agent changes it.
///
/// Fold loops mutate the shared register directly; without this hook those
/// changes would live only in memory until the next local action saved a
/// snapshot. The listener runs outside the register lock, so taking it
/// again here cannot deadlock.
pub struct SnapshotFoldListener {
    state: RegisterState,
    store: SnapshotStore,
}

impl SnapshotFoldListener {
    pub fn new(state: RegisterState, store: SnapshotStore) -> Self {
        SnapshotFoldListener { state, store }
    }

    fn persist(&self, cause: &str) {
        let snapshot = self.state.with_register(Snapshot::of_register);
        if let Err(e) = self.store.save(&snapshot) {
            error!(error = %e, cause, "Snapshot save after sync change failed");
        }
    }
}

impl FoldListener for SnapshotFoldListener {
    fn pulled(&self) {
        self.persist("initial pull");
    }

    fn folded(&self, table: Table, kind: EventKind) {
        debug!(%table, %kind, "Persisting after remote fold");
        self.persist("remote fold");
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
