//! # Validation Module
//!
//! Input validation for checkout requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                              │
//! │                                                                     │
//! │  Layer 1: Caller (HTTP layer, out of scope)                         │
//! │  └── Type validation (deserialization)                              │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: THIS MODULE - business rule validation, before any I/O    │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 3: Database (SQLite)                                         │
//! │  ├── CHECK constraints on lot quantities                            │
//! │  └── Foreign key constraints                                        │
//! │                                                                     │
//! │  Defense in depth: the authoritative stock check is the             │
//! │  conditional decrement inside the commit transaction.               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{CheckoutLine, Discount, DiscountKind};
use crate::MAX_LINE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a requested quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an override price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (comped items)
pub fn validate_override_price(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a sale-level discount.
///
/// ## Rules
/// - Amount: non-negative cents (the commit clamps it to the subtotal)
/// - Percentage: 0-100 whole percent
pub fn validate_discount(discount: &Discount) -> ValidationResult<()> {
    match discount.kind {
        DiscountKind::Amount => {
            if discount.value < 0 {
                return Err(ValidationError::OutOfRange {
                    field: "discount amount".to_string(),
                    min: 0,
                    max: i64::MAX,
                });
            }
        }
        DiscountKind::Percentage => {
            if !(0..=100).contains(&discount.value) {
                return Err(ValidationError::OutOfRange {
                    field: "discount percentage".to_string(),
                    min: 0,
                    max: 100,
                });
            }
        }
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a seller identity string.
///
/// The identity is opaque (supplied by the external auth layer); the only
/// rule here is that it must be present.
pub fn validate_seller_id(seller_id: &str) -> ValidationResult<()> {
    if seller_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "seller_id".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Line Validators
// =============================================================================

/// Validates the shape of a single checkout line.
///
/// Quantity and (for overrides) price are checked; references to products
/// and lots are resolved later against live data.
pub fn validate_line(line: &CheckoutLine) -> ValidationResult<()> {
    validate_quantity(line.quantity())?;

    if let CheckoutLine::Override { price_cents, .. } = line {
        validate_override_price(*price_cents)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
