//! # Stock Lot Repository
//!
//! Database operations for inventory lots.
//!
//! ## Mutation Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                   Who Touches current_quantity                      │
//! │                                                                     │
//! │  ✅ insert()           - sets it once at intake                     │
//! │  ✅ checkout commit    - conditional decrement (crate::checkout)    │
//! │  ❌ everything else    - reads only                                 │
//! │                                                                     │
//! │  Depleted lots are never deleted: committed sale lines reference    │
//! │  them forever (audit trail).                                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use bodega_core::StockLot;

/// Repository for stock lot database operations.
#[derive(Debug, Clone)]
pub struct LotRepository {
    pool: SqlitePool,
}

impl LotRepository {
    /// Creates a new LotRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LotRepository { pool }
    }

    /// Gets a lot by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<StockLot>> {
        let lot = sqlx::query_as::<_, StockLot>(
            r#"
            SELECT
                id, product_id, lot_code,
                initial_quantity, current_quantity,
                unit_price_cents, wholesale_price_cents,
                expires_on, received_at, updated_at
            FROM stock_lots
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(lot)
    }

    /// Lists every lot of a product, including depleted ones.
    ///
    /// Consumption ordering is NOT applied here: the pure core owns the
    /// ordering rule, and callers feed this snapshot into
    /// `bodega_core::selector` / `planner`.
    pub async fn list_for_product(&self, product_id: &str) -> DbResult<Vec<StockLot>> {
        let lots = sqlx::query_as::<_, StockLot>(
            r#"
            SELECT
                id, product_id, lot_code,
                initial_quantity, current_quantity,
                unit_price_cents, wholesale_price_cents,
                expires_on, received_at, updated_at
            FROM stock_lots
            WHERE product_id = ?1
            ORDER BY received_at
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(product_id = %product_id, count = lots.len(), "Fetched lots for product");
        Ok(lots)
    }

    /// Inserts a new lot at intake.
    ///
    /// The engine never increments `current_quantity` afterwards; a restock
    /// arrives as a fresh lot with its own prices and expiration.
    pub async fn insert(&self, lot: &StockLot) -> DbResult<()> {
        debug!(id = %lot.id, product_id = %lot.product_id, qty = lot.initial_quantity, "Inserting lot");

        sqlx::query(
            r#"
            INSERT INTO stock_lots (
                id, product_id, lot_code,
                initial_quantity, current_quantity,
                unit_price_cents, wholesale_price_cents,
                expires_on, received_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&lot.id)
        .bind(&lot.product_id)
        .bind(&lot.lot_code)
        .bind(lot.initial_quantity)
        .bind(lot.current_quantity)
        .bind(lot.unit_price_cents)
        .bind(lot.wholesale_price_cents)
        .bind(lot.expires_on)
        .bind(lot.received_at)
        .bind(lot.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts lots that still have stock (for diagnostics and seeding).
    pub async fn count_with_stock(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stock_lots WHERE current_quantity > 0")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

/// Helper to generate a new lot ID.
pub fn generate_lot_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get_roundtrip() {
        let db = test_db().await;
        let repo = db.lots();

        let mut lot = StockLot::new(generate_lot_id(), "prod-1", 40, 1250);
        lot.lot_code = Some("BATCH-7".to_string());
        lot.wholesale_price_cents = Some(990);
        lot.expires_on = NaiveDate::from_ymd_opt(2025, 12, 31);

        repo.insert(&lot).await.unwrap();

        let fetched = repo.get_by_id(&lot.id).await.unwrap().unwrap();
        assert_eq!(fetched.product_id, "prod-1");
        assert_eq!(fetched.current_quantity, 40);
        assert_eq!(fetched.wholesale_price_cents, Some(990));
        assert_eq!(fetched.expires_on, NaiveDate::from_ymd_opt(2025, 12, 31));
    }

    #[tokio::test]
    async fn test_list_for_product_includes_depleted() {
        let db = test_db().await;
        let repo = db.lots();

        let mut depleted = StockLot::new(generate_lot_id(), "prod-1", 10, 500);
        depleted.current_quantity = 0;
        repo.insert(&depleted).await.unwrap();
        repo.insert(&StockLot::new(generate_lot_id(), "prod-1", 5, 500))
            .await
            .unwrap();
        repo.insert(&StockLot::new(generate_lot_id(), "prod-2", 5, 500))
            .await
            .unwrap();

        let lots = repo.list_for_product("prod-1").await.unwrap();
        assert_eq!(lots.len(), 2);

        assert_eq!(repo.count_with_stock().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_get_missing_is_none_not_error() {
        let db = test_db().await;
        let found = db.lots().get_by_id("nope").await.unwrap();
        assert!(found.is_none());
    }
}
