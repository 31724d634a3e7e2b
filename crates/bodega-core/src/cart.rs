//! # Cart Validator
//!
//! Non-mutating pre-flight check over a batch of proposed checkout lines.
//!
//! ## Purpose
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Cart Review (advisory)                           │
//! │                                                                     │
//! │  UI builds a cart ──► review(lines, snapshot)                       │
//! │                            │                                        │
//! │                            ├── errors:   blocks the checkout button │
//! │                            │   • non-positive quantity              │
//! │                            │   • more than total stock              │
//! │                            │   • expired lot on the shelf           │
//! │                            │                                        │
//! │                            └── warnings: shown, never blocking      │
//! │                                • lot within 7 days of expiry        │
//! │                                • 1-2 units short of wholesale       │
//! │                                                                     │
//! │  This is a fast-fail UX gate ONLY. Stock can change between review  │
//! │  and commit; the authoritative check is the conditional decrement   │
//! │  inside the commit transaction.                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{CheckoutLine, StockLot};
use crate::{validation, EXPIRY_WARNING_DAYS, WHOLESALE_THRESHOLD};

/// One advisory finding, tied to the line that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartIssue {
    /// Zero-based index into the reviewed lines.
    pub line: usize,
    pub message: String,
}

impl CartIssue {
    fn new(line: usize, message: impl Into<String>) -> Self {
        CartIssue {
            line,
            message: message.into(),
        }
    }
}

/// The outcome of reviewing a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartReview {
    /// True when no errors were found. Warnings never flip this.
    pub is_valid: bool,
    pub errors: Vec<CartIssue>,
    pub warnings: Vec<CartIssue>,
}

/// Reviews proposed lines against a snapshot of the relevant stock lots.
///
/// `lots` must contain every lot of every product referenced by an
/// `Automatic` line, plus every lot referenced by an `Override` line (the
/// persistence layer assembles that snapshot). Purely advisory and
/// non-mutating; safe to call repeatedly and concurrently.
pub fn review(lines: &[CheckoutLine], lots: &[StockLot], today: NaiveDate) -> CartReview {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        if let Err(err) = validation::validate_line(line) {
            errors.push(CartIssue::new(index, err.to_string()));
            continue;
        }

        match line {
            CheckoutLine::Automatic {
                product_id,
                quantity,
            } => {
                review_automatic(
                    index,
                    product_id,
                    *quantity,
                    lots,
                    today,
                    &mut errors,
                    &mut warnings,
                );
            }
            CheckoutLine::Override {
                lot_id, quantity, ..
            } => {
                review_override(
                    index,
                    lot_id,
                    *quantity,
                    lots,
                    today,
                    &mut errors,
                    &mut warnings,
                );
            }
        }
    }

    CartReview {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

fn review_automatic(
    index: usize,
    product_id: &str,
    quantity: i64,
    lots: &[StockLot],
    today: NaiveDate,
    errors: &mut Vec<CartIssue>,
    warnings: &mut Vec<CartIssue>,
) {
    let product_lots: Vec<&StockLot> = lots
        .iter()
        .filter(|lot| lot.product_id == product_id && lot.has_stock())
        .collect();

    let available: i64 = product_lots.iter().map(|lot| lot.current_quantity).sum();
    if quantity > available {
        errors.push(CartIssue::new(
            index,
            format!(
                "requested {quantity} of product {product_id}, only {available} available"
            ),
        ));
    }

    for lot in &product_lots {
        if lot.is_expired(today) {
            errors.push(CartIssue::new(
                index,
                format!(
                    "lot {} of product {product_id} expired on {}",
                    lot.id,
                    lot.expires_on.unwrap_or_default()
                ),
            ));
        } else if lot.expires_within(today, EXPIRY_WARNING_DAYS) {
            warnings.push(CartIssue::new(
                index,
                format!(
                    "lot {} of product {product_id} expires on {}",
                    lot.id,
                    lot.expires_on.unwrap_or_default()
                ),
            ));
        }
    }

    // Upsell hint: 1-2 units short of a wholesale tier somebody offers
    let has_wholesale = product_lots
        .iter()
        .any(|lot| lot.wholesale_price_cents.is_some());
    let short_by = WHOLESALE_THRESHOLD - quantity;
    if has_wholesale && (1..=2).contains(&short_by) {
        warnings.push(CartIssue::new(
            index,
            format!(
                "add {short_by} more of product {product_id} to reach the wholesale price"
            ),
        ));
    }
}

fn review_override(
    index: usize,
    lot_id: &str,
    quantity: i64,
    lots: &[StockLot],
    today: NaiveDate,
    errors: &mut Vec<CartIssue>,
    warnings: &mut Vec<CartIssue>,
) {
    let Some(lot) = lots.iter().find(|lot| lot.id == lot_id) else {
        errors.push(CartIssue::new(index, format!("unknown lot {lot_id}")));
        return;
    };

    if lot.is_expired(today) {
        errors.push(CartIssue::new(
            index,
            format!(
                "lot {lot_id} expired on {}",
                lot.expires_on.unwrap_or_default()
            ),
        ));
    } else if lot.expires_within(today, EXPIRY_WARNING_DAYS) {
        warnings.push(CartIssue::new(
            index,
            format!(
                "lot {lot_id} expires on {}",
                lot.expires_on.unwrap_or_default()
            ),
        ));
    }

    if quantity > lot.current_quantity {
        errors.push(CartIssue::new(
            index,
            format!(
                "requested {quantity} from lot {lot_id}, only {} available",
                lot.current_quantity
            ),
        ));
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 3, 10)
    }

    fn lot(id: &str, product: &str, qty: i64, expires: Option<NaiveDate>) -> StockLot {
        let mut lot = StockLot::new(id, product, qty, 1000);
        lot.expires_on = expires;
        lot
    }

    fn automatic(product: &str, qty: i64) -> CheckoutLine {
        CheckoutLine::Automatic {
            product_id: product.to_string(),
            quantity: qty,
        }
    }

    #[test]
    fn test_clean_cart_is_valid() {
        let lots = vec![lot("l1", "p1", 20, Some(date(2025, 9, 1)))];
        let review = review(&[automatic("p1", 5)], &lots, today());

        assert!(review.is_valid);
        assert!(review.errors.is_empty());
        assert!(review.warnings.is_empty());
    }

    #[test]
    fn test_non_positive_quantity_is_error() {
        let lots = vec![lot("l1", "p1", 20, None)];
        let review = review(&[automatic("p1", 0)], &lots, today());

        assert!(!review.is_valid);
        assert_eq!(review.errors.len(), 1);
        assert_eq!(review.errors[0].line, 0);
    }

    #[test]
    fn test_over_stock_is_error_with_available() {
        let lots = vec![
            lot("l1", "p1", 25, Some(date(2025, 9, 1))),
            lot("l2", "p1", 15, None),
        ];
        let review = review(&[automatic("p1", 50)], &lots, today());

        assert!(!review.is_valid);
        assert!(review.errors[0].message.contains("only 40 available"));
    }

    #[test]
    fn test_near_expiry_is_warning_not_error() {
        let soon = today() + Duration::days(5);
        let lots = vec![lot("l1", "p1", 20, Some(soon))];
        let review = review(&[automatic("p1", 5)], &lots, today());

        assert!(review.is_valid);
        assert_eq!(review.warnings.len(), 1);
        assert!(review.warnings[0].message.contains("expires on"));
    }

    #[test]
    fn test_expired_lot_is_error() {
        let lots = vec![
            lot("stale", "p1", 20, Some(date(2025, 1, 1))),
            lot("fresh", "p1", 20, Some(date(2025, 9, 1))),
        ];
        let review = review(&[automatic("p1", 5)], &lots, today());

        assert!(!review.is_valid);
        assert!(review.errors[0].message.contains("stale"));
    }

    #[test]
    fn test_upsell_warning_near_threshold() {
        let mut tiered = lot("l1", "p1", 20, None);
        tiered.wholesale_price_cents = Some(800);
        let lots = vec![tiered];

        // 1 and 2 are short of the threshold of 3 → hint
        for qty in [1, 2] {
            let review = review(&[automatic("p1", qty)], &lots, today());
            assert!(review.is_valid);
            assert_eq!(review.warnings.len(), 1, "qty {qty}");
            assert!(review.warnings[0].message.contains("wholesale"));
        }

        // At the threshold: no hint
        let review = review(&[automatic("p1", 3)], &lots, today());
        assert!(review.warnings.is_empty());
    }

    #[test]
    fn test_no_upsell_without_wholesale_price() {
        let lots = vec![lot("l1", "p1", 20, None)];
        let review = review(&[automatic("p1", 2)], &lots, today());
        assert!(review.warnings.is_empty());
    }

    #[test]
    fn test_override_checks() {
        let lots = vec![lot("l1", "p1", 4, None)];

        let unknown = CheckoutLine::Override {
            lot_id: "nope".to_string(),
            quantity: 1,
            price_cents: 500,
        };
        let review_unknown = review(std::slice::from_ref(&unknown), &lots, today());
        assert!(!review_unknown.is_valid);

        let too_many = CheckoutLine::Override {
            lot_id: "l1".to_string(),
            quantity: 9,
            price_cents: 500,
        };
        let review_qty = review(std::slice::from_ref(&too_many), &lots, today());
        assert!(!review_qty.is_valid);
        assert!(review_qty.errors[0].message.contains("only 4 available"));
    }

    #[test]
    fn test_override_near_expiry_is_warning() {
        let soon = today() + Duration::days(5);
        let lots = vec![lot("l1", "p1", 10, Some(soon))];

        let pinned = CheckoutLine::Override {
            lot_id: "l1".to_string(),
            quantity: 2,
            price_cents: 900,
        };
        let near = review(std::slice::from_ref(&pinned), &lots, today());

        assert!(near.is_valid);
        assert_eq!(near.warnings.len(), 1);
        assert!(near.warnings[0].message.contains("expires on"));

        // Past expiry stays an error, not a warning
        let lots = vec![lot("l1", "p1", 10, Some(date(2025, 1, 1)))];
        let past = review(std::slice::from_ref(&pinned), &lots, today());
        assert!(!past.is_valid);
        assert!(past.warnings.is_empty());
    }

    #[test]
    fn test_issues_keep_line_indexes() {
        let lots = vec![lot("l1", "p1", 10, None), lot("l2", "p2", 10, None)];
        let lines = vec![automatic("p1", 5), automatic("p2", 99)];
        let review = review(&lines, &lots, today());

        assert!(!review.is_valid);
        assert_eq!(review.errors.len(), 1);
        assert_eq!(review.errors[0].line, 1);
    }
}
