//! # Domain Types
//!
//! Core domain types for the bodega checkout engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐   │
//! │  │    StockLot     │   │      Sale       │   │    SaleLine     │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │   │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │   │
//! │  │  product_id     │   │  seller_id      │   │  sale_id (FK)   │   │
//! │  │  quantities     │   │  subtotal       │   │  lot_id (FK)    │   │
//! │  │  prices         │   │  discount       │   │  price + tier   │   │
//! │  │  expires_on?    │   │  total          │   │  quantity       │   │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘   │
//! │                                                                     │
//! │  ┌─────────────────┐   ┌─────────────────┐                         │
//! │  │  CheckoutLine   │   │    Discount     │                         │
//! │  │  ─────────────  │   │  ─────────────  │                         │
//! │  │  Automatic      │   │  Amount         │                         │
//! │  │  Override       │   │  Percentage     │                         │
//! │  └─────────────────┘   └─────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One `SaleLine` is created **per allocation**: a single logical cart line
//! split across two lots produces two `SaleLine` rows.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Stock Lot
// =============================================================================

/// A batch of inventory for one product, with its own quantity, prices, and
/// optional expiration date.
///
/// ## Lifecycle
/// Created once at intake; `current_quantity` is decremented only by
/// successful sale commits and never incremented by this engine (restocking
/// is a separate concern). A depleted lot (`current_quantity == 0`) is
/// excluded from selection but never deleted: sale lines keep referencing it
/// for the audit trail.
///
/// ## Invariant
/// `0 <= current_quantity <= initial_quantity` at all times. The database
/// schema enforces the same bounds with CHECK constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockLot {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Product this lot belongs to.
    pub product_id: String,

    /// Optional lot barcode / batch code from the supplier.
    pub lot_code: Option<String>,

    /// Quantity received at intake. Immutable.
    pub initial_quantity: i64,

    /// Quantity still on the shelf. Monotonically non-increasing here.
    pub current_quantity: i64,

    /// Per-unit retail price in cents.
    pub unit_price_cents: i64,

    /// Per-unit wholesale price in cents. `None` means this lot has no tier
    /// pricing, which is distinct from a wholesale price of zero.
    pub wholesale_price_cents: Option<i64>,

    /// Expiration date. `None` means the lot never expires.
    pub expires_on: Option<NaiveDate>,

    /// Intake timestamp. Drives FIFO ordering among never-expiring lots.
    pub received_at: DateTime<Utc>,

    /// When the lot was last touched (intake or decrement).
    pub updated_at: DateTime<Utc>,
}

impl StockLot {
    /// Creates a minimal lot with no wholesale tier and no expiration.
    ///
    /// Intended for construction sites that fill in the optional fields
    /// afterwards (and for tests).
    pub fn new(
        id: impl Into<String>,
        product_id: impl Into<String>,
        quantity: i64,
        unit_price_cents: i64,
    ) -> Self {
        let now = Utc::now();
        StockLot {
            id: id.into(),
            product_id: product_id.into(),
            lot_code: None,
            initial_quantity: quantity,
            current_quantity: quantity,
            unit_price_cents,
            wholesale_price_cents: None,
            expires_on: None,
            received_at: now,
            updated_at: now,
        }
    }

    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the wholesale price as Money, if this lot has tier pricing.
    #[inline]
    pub fn wholesale_price(&self) -> Option<Money> {
        self.wholesale_price_cents.map(Money::from_cents)
    }

    /// Whether the lot still has units on the shelf.
    #[inline]
    pub fn has_stock(&self) -> bool {
        self.current_quantity > 0
    }

    /// Whether the lot is past its expiration date on `today`.
    ///
    /// The expiration day itself still counts as sellable.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        match self.expires_on {
            Some(date) => date < today,
            None => false,
        }
    }

    /// Whether the lot expires within `days` days of `today` (inclusive),
    /// without being expired yet.
    pub fn expires_within(&self, today: NaiveDate, days: i64) -> bool {
        match self.expires_on {
            Some(date) => date >= today && date <= today + Duration::days(days),
            None => false,
        }
    }
}

// =============================================================================
// Price Tier
// =============================================================================

/// The price tier applied to one allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    /// Regular per-unit retail price.
    Unit,
    /// Wholesale price, granted when an allocation meets the threshold.
    Wholesale,
}

// =============================================================================
// Discount
// =============================================================================

/// The kind of a sale-level discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// Fixed amount in cents, clamped to the subtotal.
    Amount,
    /// Percentage of the subtotal, 0-100.
    Percentage,
}

/// A sale-level discount as requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    pub kind: DiscountKind,
    /// Cents for `Amount`, whole percent (0-100) for `Percentage`.
    pub value: i64,
}

impl Discount {
    /// Fixed-amount discount in cents.
    pub const fn amount(cents: i64) -> Self {
        Discount {
            kind: DiscountKind::Amount,
            value: cents,
        }
    }

    /// Percentage discount (whole percent, 0-100).
    pub const fn percentage(percent: i64) -> Self {
        Discount {
            kind: DiscountKind::Percentage,
            value: percent,
        }
    }

    /// Computes the discount amount against a subtotal.
    ///
    /// - `Amount` is clamped to the subtotal so the total never goes negative.
    /// - `Percentage` is `subtotal * value / 100`, truncated to whole cents.
    ///   The 0-100 bound on `value` is enforced upstream by validation.
    pub fn amount_off(&self, subtotal: Money) -> Money {
        match self.kind {
            DiscountKind::Amount => Money::from_cents(self.value).min(subtotal),
            DiscountKind::Percentage => subtotal.percent_of(self.value),
        }
    }
}

// =============================================================================
// Checkout Line
// =============================================================================

/// One proposed line of a checkout request.
///
/// ## Why a Tagged Enum?
/// The two shapes are genuinely different inputs, not one object with
/// optional fields checked by presence. `Automatic` lets the engine pick
/// lots and prices; `Override` pins a specific lot and price (e.g., an
/// operator resolving a dispute at the counter). Overrides are never
/// trusted blindly: availability is re-validated at commit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckoutLine {
    /// Engine resolves lots and prices for a product.
    Automatic { product_id: String, quantity: i64 },
    /// Caller pins a specific lot and applied price.
    Override {
        lot_id: String,
        quantity: i64,
        price_cents: i64,
    },
}

impl CheckoutLine {
    /// The requested quantity, regardless of shape.
    pub fn quantity(&self) -> i64 {
        match self {
            CheckoutLine::Automatic { quantity, .. } => *quantity,
            CheckoutLine::Override { quantity, .. } => *quantity,
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale header.
///
/// Immutable once committed: there is no update path for sales in this
/// engine (refunds/returns are a separate concern).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    /// Opaque seller identity supplied by the (external) auth layer.
    pub seller_id: String,
    /// Sum of all line totals.
    pub subtotal_cents: i64,
    /// Discount as requested, kept for the audit trail.
    pub discount_kind: Option<DiscountKind>,
    pub discount_value: Option<i64>,
    /// Derived discount amount actually subtracted.
    pub discount_cents: i64,
    /// `subtotal_cents - discount_cents`, never negative.
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale Line
// =============================================================================

/// One persisted allocation of a sale.
///
/// The applied price and tier are frozen at commit time; later lot price
/// changes never rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLine {
    pub id: String,
    pub sale_id: String,
    pub lot_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Per-unit price applied to this allocation.
    pub price_cents: i64,
    pub tier: PriceTier,
    /// `price_cents * quantity`.
    pub line_total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl SaleLine {
    /// Returns the applied price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_lot_expiry_checks() {
        let mut lot = StockLot::new("l1", "p1", 10, 1000);
        let today = date(2025, 6, 10);

        assert!(!lot.is_expired(today));
        assert!(!lot.expires_within(today, 7));

        lot.expires_on = Some(date(2025, 6, 9));
        assert!(lot.is_expired(today));

        // Expiration day itself is still sellable
        lot.expires_on = Some(date(2025, 6, 10));
        assert!(!lot.is_expired(today));
        assert!(lot.expires_within(today, 7));

        lot.expires_on = Some(date(2025, 6, 17));
        assert!(lot.expires_within(today, 7));

        lot.expires_on = Some(date(2025, 6, 18));
        assert!(!lot.expires_within(today, 7));
    }

    #[test]
    fn test_discount_amount_off() {
        let subtotal = Money::from_cents(10000);

        // Scenario D: 10% of 10000 = 1000
        assert_eq!(
            Discount::percentage(10).amount_off(subtotal).cents(),
            1000
        );

        // Fixed amount, clamped to subtotal
        assert_eq!(Discount::amount(2500).amount_off(subtotal).cents(), 2500);
        assert_eq!(
            Discount::amount(99999).amount_off(subtotal).cents(),
            10000
        );
    }

    #[test]
    fn test_checkout_line_serde_shape() {
        let line = CheckoutLine::Automatic {
            product_id: "p1".to_string(),
            quantity: 4,
        };
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["type"], "automatic");
        assert_eq!(json["quantity"], 4);

        let parsed: CheckoutLine = serde_json::from_value(serde_json::json!({
            "type": "override",
            "lot_id": "l1",
            "quantity": 2,
            "price_cents": 750
        }))
        .unwrap();
        assert_eq!(parsed.quantity(), 2);
    }
}
