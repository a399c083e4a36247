//! # API Error Type
//!
//! Unified error type for the service facade.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Register                           │
//! │                                                                         │
//! │  Storefront / UI                Rust Backend                            │
//! │  ────────────────               ────────────                            │
//! │                                                                         │
//! │  checkout(...)                                                          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Service Method                                                  │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Domain error? ── CoreError::EmptyCart ─────────┐               │  │
//! │  │         │                                       ▼               │  │
//! │  │  Locked screen? ── ApiError::locked() ───── ApiError ──────────►│  │
//! │  │         │                                       ▲               │  │
//! │  │  Snapshot error? ── StoreError::Corrupt ────────┘               │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "CART_ERROR", "message": "Cart is empty" }                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Note what is NOT here: a sold-out shelf. Stock exhaustion surfaces as
//! [`snack_core::AddOutcome`] from `add_to_cart`, because "we're out of
//! Hot Cheetos" is an answer, not a failure.

use serde::Serialize;
use snack_core::CoreError;
use snack_store::StoreError;

/// API error returned from service methods.
///
/// ## Serialization
/// This is what a frontend receives when a call fails:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Item not found: chips"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Cart operation failed
    CartError,

    /// Sale lifecycle rule violated
    BusinessLogic,

    /// Admin screen is locked
    Locked,

    /// Snapshot persistence failed
    StorageError,

    /// Anything else
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates the locked-screen refusal.
    pub fn locked() -> Self {
        ApiError::new(ErrorCode::Locked, "Admin screen is locked; enter the PIN")
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts domain errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ItemNotFound(id) => ApiError::not_found("Item", &id),
            CoreError::SaleNotFound(id) => ApiError::not_found("Sale", &id),
            CoreError::UnknownOption { item, option } => ApiError::new(
                ErrorCode::ValidationError,
                format!("Item {} has no option named '{}'", item, option),
            ),
            CoreError::EmptyCart => ApiError::new(ErrorCode::CartError, "Cart is empty"),
            CoreError::InvalidTransition {
                sale_id,
                current_status,
            } => ApiError::new(
                ErrorCode::BusinessLogic,
                format!("Sale {} is {:?}, cannot transition", sale_id, current_status),
            ),
            CoreError::StockIsDerived(id) => ApiError::new(
                ErrorCode::ValidationError,
                format!("Stock for {} is derived from its options; adjust an option instead", id),
            ),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

/// Converts snapshot errors to API errors.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        // The path and cause go to the log; callers get a generic line.
        tracing::error!(?err, "Snapshot operation failed");
        ApiError::new(ErrorCode::StorageError, "Saving the register failed")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
