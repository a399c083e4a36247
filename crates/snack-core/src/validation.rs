//! # Validation Module
//!
//! Input validation for admin-entered catalog data.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend                                                     │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Register service (Rust)                                      │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Register state                                               │
//! │  └── Uniqueness checks against the live catalog                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ringing up sales never goes through here: sold-out and missing-flavor
//! situations are register outcomes, not validation failures. Only the
//! admin paths (add item, adjust stock) validate input.

use crate::error::ValidationError;
use crate::{MAX_NAME_LEN, MAX_STOCK};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an item display name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most 80 characters
///
/// ## Example
/// ```rust
/// use snack_core::validation::validate_item_name;
///
/// assert!(validate_item_name("Rice Krispies").is_ok());
/// assert!(validate_item_name("").is_err());
/// assert!(validate_item_name(&"A".repeat(100)).is_err());
/// ```
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a flavor option name.
///
/// Same rules as item names; option names additionally must be unique
/// within their parent item, which is checked where the item is assembled.
pub fn validate_option_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "option name".to_string(),
        });
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "option name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (giveaway items)
///
/// ## Example
/// ```rust
/// use snack_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(500).is_ok());  // $5.00
/// assert!(validate_price_cents(0).is_ok());    // Free item
/// assert!(validate_price_cents(-100).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a stock count.
///
/// ## Rules
/// - Must not exceed MAX_STOCK (9999)
///
/// A folding-table stand does not hold ten thousand of anything; a count
/// that large is a typo.
pub fn validate_stock(stock: u32) -> ValidationResult<()> {
    if stock > MAX_STOCK {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: MAX_STOCK as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("Munchie Bags").is_ok());
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name("   ").is_err());
        assert!(validate_item_name(&"A".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_option_name() {
        assert!(validate_option_name("Hot Cheetos lime").is_ok());
        assert!(validate_option_name("").is_err());
        assert!(validate_option_name(&"B".repeat(81)).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(500).is_ok());
        assert!(validate_price_cents(-1).is_err());
    }

    #[test]
    fn test_validate_stock() {
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(30).is_ok());
        assert!(validate_stock(9999).is_ok());
        assert!(validate_stock(10000).is_err());
    }
}
