//! # Error Types
//!
//! Domain-specific error types for bodega-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  bodega-core errors (this file)                                     │
//! │  ├── CoreError        - Planning / domain failures                  │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  bodega-db errors (separate crate)                                  │
//! │  ├── DbError          - Database operation failures                 │
//! │  └── CheckoutError    - Commit-time classification for callers      │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → CheckoutError → caller         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (lot id, available quantity, ...)
//! 3. Errors are enum variants, never String
//! 4. Core errors are detected during planning and never mutate state

use chrono::NaiveDate;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Planning and domain logic errors.
///
/// All of these short-circuit before any I/O: a failed plan produces zero
/// allocations and zero mutation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Requested quantity exceeds the total available across all lots.
    ///
    /// ## User Workflow
    /// ```text
    /// Request 50 units
    ///      │
    ///      ▼
    /// Sum stock across lots: 40
    ///      │
    ///      ▼
    /// InsufficientStock { available: 40, requested: 50 }
    ///      │
    ///      ▼
    /// UI shows: "Only 40 left"
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// An allocation would draw from a lot past its expiration date.
    ///
    /// Consumption order puts soonest-expiring lots first, so an expired lot
    /// with remaining stock surfaces here before anything is committed.
    #[error("Lot {lot_id} expired on {expired_on}")]
    ExpiredLot {
        lot_id: String,
        expired_on: NaiveDate,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements. Used for early
/// validation before planning runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
