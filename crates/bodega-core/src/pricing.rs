//! # Pricing Evaluator
//!
//! Decides unit vs. wholesale price for a single lot allocation.
//!
//! ## The Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  evaluate(lot, take)                                                │
//! │                                                                     │
//! │  lot has wholesale price AND take >= WHOLESALE_THRESHOLD (3)?       │
//! │       │                                                             │
//! │       ├── YES → tier = wholesale, price = lot.wholesale_price       │
//! │       │         savings = (unit - wholesale) × take                 │
//! │       │                                                             │
//! │       └── NO  → tier = unit, price = lot.unit_price, savings = 0    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The threshold applies to the quantity taken **from this lot**, not to the
//! order total. A request split across lots can mix tiers in one order; see
//! [`crate::WHOLESALE_THRESHOLD`].

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{PriceTier, StockLot};
use crate::WHOLESALE_THRESHOLD;

/// The outcome of pricing one allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Per-unit price applied.
    pub price: Money,
    /// Which tier produced that price.
    pub tier: PriceTier,
    /// Total saved versus unit price; zero for unit-tier quotes.
    pub savings: Money,
}

/// Prices a quantity taken from one lot.
///
/// `take` is the allocation size for this lot alone. Callers guarantee
/// `take > 0`; a zero take never reaches pricing because the planner skips
/// empty draws.
pub fn evaluate(lot: &StockLot, take: i64) -> PriceQuote {
    match lot.wholesale_price() {
        Some(wholesale) if take >= WHOLESALE_THRESHOLD => PriceQuote {
            price: wholesale,
            tier: PriceTier::Wholesale,
            savings: (lot.unit_price() - wholesale).multiply_quantity(take),
        },
        _ => PriceQuote {
            price: lot.unit_price(),
            tier: PriceTier::Unit,
            savings: Money::zero(),
        },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn lot_with_wholesale(unit: i64, wholesale: Option<i64>) -> StockLot {
        let mut lot = StockLot::new("l1", "p1", 100, unit);
        lot.wholesale_price_cents = wholesale;
        lot
    }

    #[test]
    fn test_at_threshold_gets_wholesale() {
        let lot = lot_with_wholesale(1000, Some(800));
        let quote = evaluate(&lot, 3);

        assert_eq!(quote.tier, PriceTier::Wholesale);
        assert_eq!(quote.price.cents(), 800);
        assert_eq!(quote.savings.cents(), 600); // (1000 - 800) × 3
    }

    #[test]
    fn test_below_threshold_gets_unit() {
        let lot = lot_with_wholesale(1000, Some(800));
        let quote = evaluate(&lot, 2);

        assert_eq!(quote.tier, PriceTier::Unit);
        assert_eq!(quote.price.cents(), 1000);
        assert!(quote.savings.is_zero());
    }

    #[test]
    fn test_no_wholesale_price_always_unit() {
        let lot = lot_with_wholesale(1000, None);
        let quote = evaluate(&lot, 50);

        assert_eq!(quote.tier, PriceTier::Unit);
        assert_eq!(quote.price.cents(), 1000);
        assert!(quote.savings.is_zero());
    }

    #[test]
    fn test_large_take_savings() {
        let lot = lot_with_wholesale(1000, Some(750));
        let quote = evaluate(&lot, 20);

        assert_eq!(quote.tier, PriceTier::Wholesale);
        assert_eq!(quote.price.cents(), 750);
        assert_eq!(quote.savings.cents(), 5000); // (1000 - 750) × 20
    }
}
