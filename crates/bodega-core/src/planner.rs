//! # Consumption Planner
//!
//! Composes the lot selector and pricing evaluator into a read-only
//! allocation plan covering a requested quantity.
//!
//! ## Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  plan(lots, requested, today)                                       │
//! │                                                                     │
//! │  1. Order lots with stock by consumption priority (selector)        │
//! │  2. For each lot in order:                                          │
//! │       expired?           → Err(ExpiredLot), no partial plan         │
//! │       take = min(remaining, lot.current_quantity)                   │
//! │       price the take for THIS lot (pricing)                         │
//! │       append allocation, remaining -= take                          │
//! │  3. remaining == 0 → done                                           │
//! │     lots exhausted → Err(InsufficientStock { available })           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Planning is pure: it never mutates lots, so plans may be computed
//! speculatively and discarded. The commit transaction in bodega-db
//! re-checks live quantities; a plan is a proposal, not a reservation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{PriceTier, StockLot};
use crate::{pricing, selector, validation};

/// The portion of a requested quantity drawn from one specific lot.
///
/// Derived, not persisted: the coordinator turns each allocation into a
/// `SaleLine` row at commit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub lot_id: String,
    pub product_id: String,
    /// Units drawn from this lot. Always > 0.
    pub quantity: i64,
    /// Per-unit price applied to this allocation.
    pub price_cents: i64,
    pub tier: PriceTier,
    /// `price_cents * quantity`.
    pub line_total_cents: i64,
    /// Saved versus unit price; zero for unit-tier allocations.
    pub savings_cents: i64,
}

impl Allocation {
    /// Builds an allocation from a lot, a take amount, and its price quote.
    fn from_take(lot: &StockLot, take: i64) -> Self {
        let quote = pricing::evaluate(lot, take);
        Allocation {
            lot_id: lot.id.clone(),
            product_id: lot.product_id.clone(),
            quantity: take,
            price_cents: quote.price.cents(),
            tier: quote.tier,
            line_total_cents: quote.price.multiply_quantity(take).cents(),
            savings_cents: quote.savings.cents(),
        }
    }
}

/// Plans how to cover `requested` units of one product from `lots`.
///
/// `lots` is a snapshot of the product's stock lots in any order; the plan
/// imposes consumption order itself. Fails whole: on any error nothing is
/// allocated and nothing is mutated.
///
/// ## Errors
/// - `Validation` if `requested` is out of range
/// - `ExpiredLot` if consumption would reach a lot past its expiration
/// - `InsufficientStock` if stock across all lots can't cover the request
pub fn plan(lots: &[StockLot], requested: i64, today: NaiveDate) -> CoreResult<Vec<Allocation>> {
    validation::validate_quantity(requested)?;

    let product_id = lots
        .first()
        .map(|lot| lot.product_id.clone())
        .unwrap_or_default();

    let candidates = selector::consumption_order(lots.iter().cloned());
    let available: i64 = candidates.iter().map(|lot| lot.current_quantity).sum();

    let mut allocations = Vec::new();
    let mut remaining = requested;

    for lot in &candidates {
        if remaining == 0 {
            break;
        }

        if lot.is_expired(today) {
            return Err(CoreError::ExpiredLot {
                lot_id: lot.id.clone(),
                expired_on: lot.expires_on.unwrap_or_default(),
            });
        }

        let take = remaining.min(lot.current_quantity);
        if take > 0 {
            allocations.push(Allocation::from_take(lot, take));
            remaining -= take;
        }
    }

    if remaining > 0 {
        return Err(CoreError::InsufficientStock {
            product_id,
            available,
            requested,
        });
    }

    Ok(allocations)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn lot(
        id: &str,
        qty: i64,
        unit: i64,
        wholesale: Option<i64>,
        expires: Option<NaiveDate>,
        received_day: u32,
    ) -> StockLot {
        let mut lot = StockLot::new(id, "p1", qty, unit);
        lot.wholesale_price_cents = wholesale;
        lot.expires_on = expires;
        lot.received_at = Utc.with_ymd_and_hms(2025, 1, received_day, 8, 0, 0).unwrap();
        lot.updated_at = lot.received_at;
        lot
    }

    const TODAY: fn() -> NaiveDate = || date(2025, 1, 30);

    /// Scenario A: multi-lot FIFO with wholesale pricing on both portions.
    #[test]
    fn test_multi_lot_plan_with_wholesale() {
        let lots = vec![
            // Lot B arrived first but never expires, so it drains second
            lot("b", 50, 1000, Some(750), None, 1),
            lot("a", 100, 1000, Some(800), Some(date(2025, 6, 1)), 10),
        ];

        let plan = plan(&lots, 120, TODAY()).unwrap();

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].lot_id, "a");
        assert_eq!(plan[0].quantity, 100);
        assert_eq!(plan[0].price_cents, 800);
        assert_eq!(plan[0].tier, PriceTier::Wholesale);
        assert_eq!(plan[1].lot_id, "b");
        assert_eq!(plan[1].quantity, 20);
        assert_eq!(plan[1].price_cents, 750);
        assert_eq!(plan[1].tier, PriceTier::Wholesale);

        let subtotal: i64 = plan.iter().map(|a| a.line_total_cents).sum();
        assert_eq!(subtotal, 95_000);
    }

    /// Scenario B: tiering is per allocation, so one order can mix tiers.
    #[test]
    fn test_mixed_tiers_within_one_order() {
        let lots = vec![
            lot("a", 2, 1000, Some(800), Some(date(2025, 3, 1)), 1),
            lot("b", 50, 1000, Some(900), None, 2),
        ];

        let plan = plan(&lots, 5, TODAY()).unwrap();

        assert_eq!(plan.len(), 2);
        // 2 units from A: below threshold → unit price
        assert_eq!(plan[0].quantity, 2);
        assert_eq!(plan[0].tier, PriceTier::Unit);
        assert_eq!(plan[0].price_cents, 1000);
        // 3 units from B: at threshold → wholesale
        assert_eq!(plan[1].quantity, 3);
        assert_eq!(plan[1].tier, PriceTier::Wholesale);
        assert_eq!(plan[1].price_cents, 900);
    }

    /// Scenario E: cover-all failure carries the available total.
    #[test]
    fn test_insufficient_stock_fails_whole() {
        let lots = vec![
            lot("a", 25, 1000, None, Some(date(2025, 6, 1)), 1),
            lot("b", 15, 1000, None, None, 2),
        ];

        let err = plan(&lots, 50, TODAY()).unwrap_err();
        match err {
            CoreError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 40);
                assert_eq!(requested, 50);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[test]
    fn test_no_lots_is_insufficient() {
        let err = plan(&[], 1, TODAY()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock { available: 0, .. }
        ));
    }

    #[test]
    fn test_expired_lot_rejected() {
        let lots = vec![
            lot("old", 10, 1000, None, Some(date(2025, 1, 5)), 1),
            lot("fresh", 10, 1000, None, Some(date(2025, 6, 1)), 2),
        ];

        let err = plan(&lots, 5, TODAY()).unwrap_err();
        match err {
            CoreError::ExpiredLot { lot_id, expired_on } => {
                assert_eq!(lot_id, "old");
                assert_eq!(expired_on, date(2025, 1, 5));
            }
            other => panic!("expected ExpiredLot, got {other:?}"),
        }
    }

    /// Allocation completeness: quantities always sum to the request.
    #[test]
    fn test_allocation_completeness() {
        let lots = vec![
            lot("a", 7, 500, None, Some(date(2025, 4, 1)), 1),
            lot("b", 9, 500, None, Some(date(2025, 5, 1)), 2),
            lot("c", 30, 500, None, None, 3),
        ];

        for requested in [1, 7, 8, 16, 46] {
            let plan = plan(&lots, requested, TODAY()).unwrap();
            let total: i64 = plan.iter().map(|a| a.quantity).sum();
            assert_eq!(total, requested);
            assert!(plan.iter().all(|a| a.quantity > 0));
        }
    }

    #[test]
    fn test_invalid_quantity_rejected() {
        let lots = vec![lot("a", 10, 500, None, None, 1)];
        assert!(matches!(
            plan(&lots, 0, TODAY()),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            plan(&lots, -3, TODAY()),
            Err(CoreError::Validation(_))
        ));
    }
}
