//! # Checkout Coordinator
//!
//! Turns checkout lines into a persisted sale: resolves allocations,
//! computes totals, and atomically commits sale + line items + lot
//! decrements.
//!
//! ## Commit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    checkout(lines, seller, discount)                │
//! │                                                                     │
//! │  PLANNING (read-only, no transaction)                               │
//! │    Automatic line → fetch lot snapshot → bodega_core::planner       │
//! │    Override line  → fetch lot, check existence + expiry             │
//! │         │                                                           │
//! │  VALIDATING                                                         │
//! │    subtotal = Σ line totals                                         │
//! │    discount = amount (clamped) | percentage | none                  │
//! │    total    = subtotal − discount                                   │
//! │         │                                                           │
//! │  COMMITTING (one transaction)                                       │
//! │    INSERT sale header                                               │
//! │    INSERT one sale_line per allocation                              │
//! │    UPDATE stock_lots                                                │
//! │       SET current_quantity = current_quantity − take                │
//! │       WHERE id = ? AND current_quantity >= take   ◄── live check    │
//! │         │                                                           │
//! │         ├── 0 rows affected → ROLLBACK, Conflict error              │
//! │         └── all applied     → COMMIT, return receipt                │
//! │                                                                     │
//! │  Terminal states: Committed | RolledBack. Nothing partial is ever   │
//! │  visible; retry policy belongs to the caller.                       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Optimistic Concurrency
//! The decrement re-checks the live quantity, not the value read during
//! planning, so two commits racing for a lot's last units cannot both
//! succeed. The loser gets a `Conflict` and the lot is left untouched
//! (never negative, never double-decremented).

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, SqlitePool, Transaction};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::lot::LotRepository;
use crate::repository::sale::{generate_sale_id, generate_sale_line_id};
use bodega_core::cart::CartReview;
use bodega_core::planner::Allocation;
use bodega_core::{
    cart, planner, validation, CheckoutLine, CoreError, Discount, Money, PriceTier, Sale,
    StockLot, ValidationError, WHOLESALE_THRESHOLD,
};

// =============================================================================
// Errors
// =============================================================================

/// The failure taxonomy a checkout caller sees.
///
/// Each variant maps to a stable machine-readable `kind()` so API layers can
/// classify failures without parsing messages.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// An `Automatic` line referenced a product with no lots at all.
    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    /// An `Override` line referenced a lot that does not exist.
    #[error("Unknown lot: {0}")]
    UnknownLot(String),

    /// Planning or validation failure from the pure core
    /// (insufficient stock, expired lot, malformed input).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A conditional decrement lost a race at commit time. The whole
    /// transaction was rolled back; the caller may re-plan and retry as a
    /// fresh attempt.
    #[error("Lot {lot_id} changed concurrently: requested {requested}, {available} left")]
    Conflict {
        lot_id: String,
        requested: i64,
        available: i64,
    },

    /// Unexpected storage failure; the transaction was rolled back and the
    /// error is not retried here.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ValidationError> for CheckoutError {
    fn from(err: ValidationError) -> Self {
        CheckoutError::Core(CoreError::Validation(err))
    }
}

impl CheckoutError {
    /// Stable category for API callers: `validation`, `insufficient_stock`,
    /// `expired_lot`, `conflict`, or `persistence`.
    pub fn kind(&self) -> &'static str {
        match self {
            CheckoutError::UnknownProduct(_) | CheckoutError::UnknownLot(_) => "validation",
            CheckoutError::Core(CoreError::Validation(_)) => "validation",
            CheckoutError::Core(CoreError::InsufficientStock { .. }) => "insufficient_stock",
            CheckoutError::Core(CoreError::ExpiredLot { .. }) => "expired_lot",
            CheckoutError::Conflict { .. } => "conflict",
            CheckoutError::Db(_) => "persistence",
        }
    }
}

// =============================================================================
// Receipt DTOs
// =============================================================================

/// One committed allocation, as returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    pub lot_id: String,
    pub product_id: String,
    pub quantity_sold: i64,
    pub price_applied_cents: i64,
    pub price_tier: PriceTier,
    pub line_total_cents: i64,
}

/// The successful outcome of a checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub sale_id: String,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    /// Total saved versus unit pricing across wholesale allocations.
    pub wholesale_savings_cents: i64,
    pub line_items: Vec<ReceiptLine>,
}

// =============================================================================
// Coordinator
// =============================================================================

/// Sale transaction coordinator.
///
/// The only component of the engine that mutates shared state, and it does
/// so exclusively inside one bounded transaction per checkout attempt.
#[derive(Debug, Clone)]
pub struct Checkout {
    pool: SqlitePool,
}

impl Checkout {
    /// Creates a new coordinator over a pool.
    pub fn new(pool: SqlitePool) -> Self {
        Checkout { pool }
    }

    /// Advisory pre-flight review of a cart. Read-only; see
    /// [`bodega_core::cart`] for the checks performed.
    ///
    /// Unknown products simply contribute zero stock here (surfacing as an
    /// insufficiency error in the review); the authoritative rejection
    /// happens at checkout.
    pub async fn validate_cart(&self, lines: &[CheckoutLine]) -> DbResult<CartReview> {
        let snapshot = self.snapshot_for(lines).await?;
        let today = Utc::now().date_naive();

        debug!(lines = lines.len(), lots = snapshot.len(), "Reviewing cart");
        Ok(cart::review(lines, &snapshot, today))
    }

    /// Executes one checkout attempt end to end.
    ///
    /// On any failure nothing is persisted: planning errors abort before
    /// I/O, and commit-time failures roll the whole transaction back.
    pub async fn checkout(
        &self,
        lines: &[CheckoutLine],
        seller_id: &str,
        discount: Option<Discount>,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        // -- Planning + validation, before any write ----------------------
        if lines.is_empty() {
            return Err(ValidationError::Required {
                field: "lines".to_string(),
            }
            .into());
        }
        validation::validate_seller_id(seller_id)?;
        if let Some(d) = &discount {
            validation::validate_discount(d)?;
        }

        let today = Utc::now().date_naive();
        let mut allocations: Vec<Allocation> = Vec::new();

        for line in lines {
            validation::validate_line(line)?;

            match line {
                CheckoutLine::Automatic {
                    product_id,
                    quantity,
                } => {
                    let lots = self.lots().list_for_product(product_id).await?;
                    if lots.is_empty() {
                        return Err(CheckoutError::UnknownProduct(product_id.clone()));
                    }
                    allocations.extend(planner::plan(&lots, *quantity, today)?);
                }
                CheckoutLine::Override {
                    lot_id,
                    quantity,
                    price_cents,
                } => {
                    let lot = self
                        .lots()
                        .get_by_id(lot_id)
                        .await?
                        .ok_or_else(|| CheckoutError::UnknownLot(lot_id.clone()))?;
                    allocations.push(resolve_override(&lot, *quantity, *price_cents, today)?);
                }
            }
        }

        let subtotal = Money::from_cents(allocations.iter().map(|a| a.line_total_cents).sum());
        let discount_amount = discount
            .map(|d| d.amount_off(subtotal))
            .unwrap_or_else(Money::zero);
        let total = subtotal - discount_amount;
        let savings: i64 = allocations.iter().map(|a| a.savings_cents).sum();

        let sale = Sale {
            id: generate_sale_id(),
            seller_id: seller_id.to_string(),
            subtotal_cents: subtotal.cents(),
            discount_kind: discount.map(|d| d.kind),
            discount_value: discount.map(|d| d.value),
            discount_cents: discount_amount.cents(),
            total_cents: total.cents(),
            created_at: Utc::now(),
        };

        // -- Committing: one atomic transaction ---------------------------
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        insert_sale(&mut tx, &sale).await?;

        for allocation in &allocations {
            insert_sale_line(&mut tx, &sale.id, allocation).await?;

            if let Err(conflict) = decrement_lot(&mut tx, allocation).await? {
                warn!(
                    sale_id = %sale.id,
                    lot_id = %conflict.0,
                    "Conditional decrement lost a race, rolling back"
                );
                tx.rollback().await.map_err(DbError::from)?;
                return Err(CheckoutError::Conflict {
                    lot_id: conflict.0,
                    requested: conflict.1,
                    available: conflict.2,
                });
            }
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            sale_id = %sale.id,
            seller_id = %seller_id,
            subtotal = %subtotal,
            total = %total,
            allocations = allocations.len(),
            "Sale committed"
        );

        Ok(CheckoutReceipt {
            sale_id: sale.id,
            subtotal_cents: sale.subtotal_cents,
            discount_cents: sale.discount_cents,
            total_cents: sale.total_cents,
            wholesale_savings_cents: savings,
            line_items: allocations
                .into_iter()
                .map(|a| ReceiptLine {
                    lot_id: a.lot_id,
                    product_id: a.product_id,
                    quantity_sold: a.quantity,
                    price_applied_cents: a.price_cents,
                    price_tier: a.tier,
                    line_total_cents: a.line_total_cents,
                })
                .collect(),
        })
    }

    fn lots(&self) -> LotRepository {
        LotRepository::new(self.pool.clone())
    }

    /// Assembles the lot snapshot a cart review needs: every lot of every
    /// referenced product, plus every lot pinned by an override.
    async fn snapshot_for(&self, lines: &[CheckoutLine]) -> DbResult<Vec<StockLot>> {
        let repo = self.lots();
        let mut snapshot: Vec<StockLot> = Vec::new();

        for line in lines {
            match line {
                CheckoutLine::Automatic { product_id, .. } => {
                    for lot in repo.list_for_product(product_id).await? {
                        if !snapshot.iter().any(|l| l.id == lot.id) {
                            snapshot.push(lot);
                        }
                    }
                }
                CheckoutLine::Override { lot_id, .. } => {
                    if let Some(lot) = repo.get_by_id(lot_id).await? {
                        if !snapshot.iter().any(|l| l.id == lot.id) {
                            snapshot.push(lot);
                        }
                    }
                }
            }
        }

        Ok(snapshot)
    }
}

// =============================================================================
// Line Resolution
// =============================================================================

/// Resolves an override line against the live lot.
///
/// Existence, expiry, and input shape are checked here; availability is
/// deliberately NOT pre-checked, because the conditional decrement inside
/// the transaction is the authoritative check (overrides planned from a
/// stale snapshot surface as `Conflict`, matching the automatic path's
/// commit-time behavior).
fn resolve_override(
    lot: &StockLot,
    quantity: i64,
    price_cents: i64,
    today: chrono::NaiveDate,
) -> Result<Allocation, CheckoutError> {
    if lot.is_expired(today) {
        return Err(CoreError::ExpiredLot {
            lot_id: lot.id.clone(),
            expired_on: lot.expires_on.unwrap_or_default(),
        }
        .into());
    }

    // An operator pinning the lot's wholesale price at threshold quantity
    // is recorded as a wholesale sale; any other pinned price is unit tier.
    let (tier, savings) = match lot.wholesale_price_cents {
        Some(wholesale) if price_cents == wholesale && quantity >= WHOLESALE_THRESHOLD => (
            PriceTier::Wholesale,
            (lot.unit_price_cents - wholesale) * quantity,
        ),
        _ => (PriceTier::Unit, 0),
    };

    Ok(Allocation {
        lot_id: lot.id.clone(),
        product_id: lot.product_id.clone(),
        quantity,
        price_cents,
        tier,
        line_total_cents: price_cents * quantity,
        savings_cents: savings,
    })
}

// =============================================================================
// Transaction Steps
// =============================================================================

async fn insert_sale(tx: &mut Transaction<'_, Sqlite>, sale: &Sale) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sales (
            id, seller_id, subtotal_cents,
            discount_kind, discount_value, discount_cents,
            total_cents, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.seller_id)
    .bind(sale.subtotal_cents)
    .bind(sale.discount_kind)
    .bind(sale.discount_value)
    .bind(sale.discount_cents)
    .bind(sale.total_cents)
    .bind(sale.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_sale_line(
    tx: &mut Transaction<'_, Sqlite>,
    sale_id: &str,
    allocation: &Allocation,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sale_lines (
            id, sale_id, lot_id, product_id,
            quantity, price_cents, tier, line_total_cents, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(generate_sale_line_id())
    .bind(sale_id)
    .bind(&allocation.lot_id)
    .bind(&allocation.product_id)
    .bind(allocation.quantity)
    .bind(allocation.price_cents)
    .bind(allocation.tier)
    .bind(allocation.line_total_cents)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Applies one conditional decrement.
///
/// Returns `Ok(Err((lot_id, requested, available)))` when the live quantity
/// no longer covers the allocation; the caller rolls the transaction back.
async fn decrement_lot(
    tx: &mut Transaction<'_, Sqlite>,
    allocation: &Allocation,
) -> DbResult<Result<(), (String, i64, i64)>> {
    let result = sqlx::query(
        r#"
        UPDATE stock_lots
        SET current_quantity = current_quantity - ?2,
            updated_at = ?3
        WHERE id = ?1 AND current_quantity >= ?2
        "#,
    )
    .bind(&allocation.lot_id)
    .bind(allocation.quantity)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        let available: i64 =
            sqlx::query_scalar("SELECT current_quantity FROM stock_lots WHERE id = ?1")
                .bind(&allocation.lot_id)
                .fetch_optional(&mut **tx)
                .await?
                .unwrap_or(0);

        return Ok(Err((
            allocation.lot_id.clone(),
            allocation.quantity,
            available,
        )));
    }

    Ok(Ok(()))
}

// =============================================================================
// Integration Tests (in-memory SQLite)
// =============================================================================
