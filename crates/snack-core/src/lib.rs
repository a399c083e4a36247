//! # snack-core: Pure Business Logic for Snack Stand POS
//!
//! This crate is the **heart** of the snack stand register. It contains the
//! entity model, the stock ledger, the cart, and the sale lifecycle as plain
//! data plus synchronous transitions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Snack Stand POS Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Register App (apps/register)                 │   │
//! │  │    Screen Lock ──► Service Facade ──► Config & Wiring          │   │
//! │  └───────────┬─────────────────────────────────────┬───────────────┘   │
//! │              │                                     │                    │
//! │  ┌───────────▼───────────────┐  ┌──────────────────▼───────────────┐   │
//! │  │  ★ snack-core (THIS) ★    │  │        snack-sync                │   │
//! │  │                           │  │                                  │   │
//! │  │  ┌────────┐ ┌──────────┐  │  │  Remote store trait, change      │   │
//! │  │  │ types  │ │  money   │  │◄─┤  events, sync agent. Folds       │   │
//! │  │  │ stock  │ │  cart    │  │  │  remote events through the       │   │
//! │  │  │register│ │validation│  │  │  Register under one lock.        │   │
//! │  │  └────────┘ └──────────┘  │  └──────────────────────────────────┘   │
//! │  │                           │                                          │
//! │  │  NO FILESYSTEM • NO       │  ┌──────────────────────────────────┐   │
//! │  │  NETWORK • NO ASYNC       │  │        snack-store               │   │
//! │  └───────────────────────────┘  │  Local snapshot document on disk │   │
//! │                                 └──────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entity model (Item, ItemOption, OrderLine, Sale, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`stock`] - Stock ledger: pure stock-delta arithmetic
//! - [`cart`] - Draft order accumulation against current stock
//! - [`register`] - Authoritative state container: checkout, lifecycle, folds
//! - [`catalog`] - Built-in starter catalog for first runs
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **No I/O**: Snapshot, network, and remote store access is FORBIDDEN
//!    here. The only impurity is id/clock generation at checkout.
//! 2. **Integer Money**: All monetary values are in cents (i64) to avoid
//!    float errors.
//! 3. **Explicit Errors**: All errors are typed, never strings or panics.
//! 4. **One container**: Local actions and remote folds mutate the same
//!    [`register::Register`], so invariants are checked in one place.
//!
//! ## Example Usage
//!
//! ```rust
//! use snack_core::register::Register;
//! use snack_core::types::{PaymentMethod, SaleChannel};
//!
//! let mut register = Register::with_default_catalog();
//!
//! // Ring up two bags of chips (a flavor must be picked first)
//! register.add_to_cart("chips", Some("Hot Cheetos")).unwrap();
//! register.add_to_cart("chips", Some("Hot Cheetos")).unwrap();
//!
//! let sale = register
//!     .checkout(PaymentMethod::Cash, None, SaleChannel::Attended)
//!     .unwrap();
//! assert_eq!(sale.total().cents(), 400); // 2 x $2.00
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod register;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use snack_core::Money` instead of
// `use snack_core::money::Money`

pub use cart::{AddOutcome, Cart};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use register::{NewItem, Register};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum stock an admin action may leave on a single item or option.
///
/// ## Business Reason
/// Prevents fat-fingered restocks (e.g., typing 20000 instead of 20).
/// Cancellation compensation is exempt: restoring sold stock must never
/// fail, so `stock::increment` has no ceiling.
pub const MAX_STOCK: u32 = 9_999;

/// Maximum length of an item or option display name.
pub const MAX_NAME_LEN: usize = 80;
