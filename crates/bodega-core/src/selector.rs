//! # Lot Selector
//!
//! Orders candidate stock lots for a product by consumption priority.
//!
//! ## Ordering Rule (exact)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Consumption Priority                             │
//! │                                                                     │
//! │  1. Lots WITH an expiration date before lots WITHOUT one,           │
//! │     regardless of intake time.                                      │
//! │  2. Among expiring lots: ascending by expiration (soonest first).   │
//! │  3. Among never-expiring lots: ascending by intake (oldest first).  │
//! │                                                                     │
//! │  Example shelf:                                                     │
//! │    Lot C  expires 2025-05-01            ──► position 1              │
//! │    Lot A  expires 2025-06-01            ──► position 2              │
//! │    Lot B  no expiry, received Jan 3rd   ──► position 3              │
//! │    Lot D  no expiry, received Feb 9th   ──► position 4              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No side effects: selection never mutates lots. An empty result is not an
//! error; the planner turns it into an insufficiency failure.

use std::cmp::Ordering;

use crate::types::StockLot;

/// Compares two lots by consumption priority.
///
/// Exposed so tests (and any caller holding a pre-fetched snapshot) can
/// assert the ordering invariant directly.
pub fn consumption_priority(a: &StockLot, b: &StockLot) -> Ordering {
    match (a.expires_on, b.expires_on) {
        (Some(ea), Some(eb)) => ea.cmp(&eb).then_with(|| a.received_at.cmp(&b.received_at)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.received_at.cmp(&b.received_at),
    }
}

/// Returns the lots that still have stock, in consumption order.
///
/// Depleted lots are dropped (they stay in the database for the audit
/// trail but never participate in selection).
pub fn consumption_order(lots: impl IntoIterator<Item = StockLot>) -> Vec<StockLot> {
    let mut candidates: Vec<StockLot> = lots.into_iter().filter(StockLot::has_stock).collect();
    candidates.sort_by(consumption_priority);
    candidates
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn lot(id: &str, qty: i64, expires: Option<NaiveDate>, received_day: u32) -> StockLot {
        let mut lot = StockLot::new(id, "p1", qty, 1000);
        lot.expires_on = expires;
        lot.received_at = Utc.with_ymd_and_hms(2025, 1, received_day, 12, 0, 0).unwrap();
        lot.updated_at = lot.received_at;
        lot
    }

    #[test]
    fn test_expiring_lots_come_first() {
        let ordered = consumption_order(vec![
            lot("no-expiry-old", 5, None, 1),
            lot("expiring", 5, Some(date(2025, 6, 1)), 20),
        ]);

        let ids: Vec<&str> = ordered.iter().map(|l| l.id.as_str()).collect();
        // Expiring lot wins even though it arrived much later
        assert_eq!(ids, vec!["expiring", "no-expiry-old"]);
    }

    #[test]
    fn test_soonest_expiration_first() {
        let ordered = consumption_order(vec![
            lot("june", 5, Some(date(2025, 6, 1)), 1),
            lot("may", 5, Some(date(2025, 5, 1)), 2),
            lot("july", 5, Some(date(2025, 7, 1)), 3),
        ]);

        let ids: Vec<&str> = ordered.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["may", "june", "july"]);
    }

    #[test]
    fn test_null_expiry_ordered_by_intake() {
        let ordered = consumption_order(vec![
            lot("feb", 5, None, 28),
            lot("jan", 5, None, 3),
            lot("mid", 5, None, 15),
        ]);

        let ids: Vec<&str> = ordered.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["jan", "mid", "feb"]);
    }

    #[test]
    fn test_depleted_lots_excluded() {
        let ordered = consumption_order(vec![
            lot("empty", 0, Some(date(2025, 5, 1)), 1),
            lot("stocked", 5, Some(date(2025, 6, 1)), 2),
        ]);

        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0].id, "stocked");
    }

    #[test]
    fn test_empty_input_is_empty_not_error() {
        assert!(consumption_order(Vec::new()).is_empty());
    }

    #[test]
    fn test_full_ordering_invariant() {
        let ordered = consumption_order(vec![
            lot("d", 1, None, 9),
            lot("a", 1, Some(date(2025, 6, 1)), 20),
            lot("b", 1, None, 3),
            lot("c", 1, Some(date(2025, 5, 1)), 25),
        ]);

        let ids: Vec<&str> = ordered.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b", "d"]);

        // Every expiring lot precedes every non-expiring one
        let first_null = ordered.iter().position(|l| l.expires_on.is_none()).unwrap();
        assert!(ordered[..first_null].iter().all(|l| l.expires_on.is_some()));
        assert!(ordered[first_null..].iter().all(|l| l.expires_on.is_none()));
    }
}
