//! # bodega-db: SQLite Persistence for the Bodega Checkout Engine
//!
//! This crate owns every byte that touches disk. It wraps the pure planning
//! and pricing logic from `bodega-core` with a SQLite-backed store and the
//! one place where inventory is actually mutated: the checkout transaction.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        bodega-db Layout                             │
//! │                                                                     │
//! │  Database (pool.rs)                                                 │
//! │    ├── lots()      → LotRepository    (reads + lot intake)          │
//! │    ├── sales()     → SaleRepository   (read-only sale history)      │
//! │    └── checkout()  → Checkout         (validate_cart / checkout)    │
//! │                          │                                          │
//! │                          │  the ONLY writer of stock_lots           │
//! │                          ▼                                          │
//! │                  one transaction per attempt:                       │
//! │                  sale + lines + conditional decrements              │
//! │                                                                     │
//! │  migrations.rs → embedded schema migrations (sqlx::migrate!)        │
//! │  error.rs      → DbError taxonomy over sqlx failures                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use bodega_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("bodega.db")).await?;
//! let receipt = db.checkout().checkout(&lines, "cashier-1", None).await?;
//! ```

pub mod checkout;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use checkout::{Checkout, CheckoutError, CheckoutReceipt, ReceiptLine};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::lot::LotRepository;
pub use repository::sale::SaleRepository;
