//! # Error Types
//!
//! Domain-specific error types for snack-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  snack-core errors (this file)                                         │
//! │  ├── CoreError        - Lifecycle and catalog rule violations          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  snack-store errors (separate crate)                                   │
//! │  └── StoreError       - Snapshot read/write failures                   │
//! │                                                                         │
//! │  snack-sync errors (separate crate)                                    │
//! │  └── SyncError        - Remote store failures (never user-facing)      │
//! │                                                                         │
//! │  Register app errors                                                   │
//! │  └── ApiError         - What the frontend sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Frontend               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (item id, status, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message
//!
//! Two near-errors are NOT here: a sold-out or flavorless add-to-cart
//! comes back as a [`crate::cart::AddOutcome`] value, and a stock
//! decrement below zero clamps instead of failing. Both are ordinary
//! returns in [`crate::cart`] and [`crate::stock`].

use thiserror::Error;

use crate::types::SaleStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Item cannot be found in the catalog.
    ///
    /// ## When This Occurs
    /// - Item id doesn't exist locally
    /// - A remote delete removed the item between UI render and action
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// A named option does not exist on the referenced item.
    ///
    /// ## When This Occurs
    /// - An option name was supplied for an item without options
    /// - The option was renamed/removed by a remote update mid-session
    #[error("Item {item} has no option named '{option}'")]
    UnknownOption { item: String, option: String },

    /// Sale not found.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Checkout attempted with an empty cart.
    ///
    /// ## User Workflow
    /// ```text
    /// Tap "Checkout" with no lines
    ///      │
    ///      ▼
    /// EmptyCart
    ///      │
    ///      ▼
    /// UI shows: "Add something to the basket first"
    /// ```
    /// No sale is created and no stock changes.
    #[error("Cart is empty")]
    EmptyCart,

    /// A fulfill/cancel was attempted on a sale that is not PENDING.
    ///
    /// ## When This Occurs
    /// - Cancelling an already-cancelled sale (would double-restore stock)
    /// - Fulfilling a completed sale
    ///
    /// COMPLETED and CANCELED are terminal; the state machine has no
    /// outgoing edges from either.
    #[error("Sale {sale_id} is {current_status:?}, cannot transition")]
    InvalidTransition {
        sale_id: String,
        current_status: SaleStatus,
    },

    /// Item-level stock was adjusted on an item whose stock is derived.
    ///
    /// When an item has options, its stock field is a cache of the option
    /// sum; writing it directly would diverge from the options.
    #[error("Stock for {0} is derived from its options; adjust an option instead")]
    StockIsDerived(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be non-negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Duplicate value (e.g., duplicate item name).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidTransition {
            sale_id: "abc-123".to_string(),
            current_status: SaleStatus::Completed,
        };
        assert_eq!(
            err.to_string(),
            "Sale abc-123 is Completed, cannot transition"
        );

        let err = CoreError::UnknownOption {
            item: "chips".to_string(),
            option: "Plain".to_string(),
        };
        assert_eq!(err.to_string(), "Item chips has no option named 'Plain'");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::Duplicate {
            field: "item name".to_string(),
            value: "Chips".to_string(),
        };
        assert_eq!(err.to_string(), "item name 'Chips' already exists");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
