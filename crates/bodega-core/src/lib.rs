//! # bodega-core: Pure Business Logic for the Bodega Checkout Engine
//!
//! This crate is the **heart** of the bodega point-of-sale backend. It
//! contains the lot-consumption and tiered-pricing logic as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Bodega Checkout Flow                           │
//! │                                                                     │
//! │  HTTP / UI layer (external)                                         │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │             ★ bodega-core (THIS CRATE) ★                      │ │
//! │  │                                                               │ │
//! │  │  ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐         │ │
//! │  │  │ selector │ │ pricing  │ │ planner  │ │   cart   │         │ │
//! │  │  │ lot FIFO │ │ tier/qty │ │ greedy   │ │ advisory │         │ │
//! │  │  │ ordering │ │ quotes   │ │ alloc    │ │ checks   │         │ │
//! │  │  └──────────┘ └──────────┘ └──────────┘ └──────────┘         │ │
//! │  │                                                               │ │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  bodega-db: the *only* mutation point (atomic checkout commit)      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (StockLot, Sale, SaleLine, CheckoutLine, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`selector`] - Expiration-aware FIFO ordering of stock lots
//! - [`pricing`] - Unit vs. wholesale tier decision per allocation
//! - [`planner`] - Read-only consumption plans covering a requested quantity
//! - [`cart`] - Advisory pre-flight cart review (errors, warnings, upsells)
//! - [`validation`] - Input validation rules
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: planning is deterministic over a lot snapshot
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are in cents (i64)
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use bodega_core::{planner, types::StockLot};
//! use chrono::{NaiveDate, Utc};
//!
//! let lot = StockLot::new("lot-1", "prod-1", 50, 1000);
//! let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
//!
//! // 50 units available, ask for 10: one allocation at unit price
//! let plan = planner::plan(std::slice::from_ref(&lot), 10, today).unwrap();
//! assert_eq!(plan.len(), 1);
//! assert_eq!(plan[0].quantity, 10);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod planner;
pub mod pricing;
pub mod selector;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use bodega_core::Money` instead of
// `use bodega_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minimum quantity drawn *from a single lot* to qualify for that lot's
/// wholesale price.
///
/// ## Important: Per-Allocation Semantics
/// The threshold is evaluated against the quantity taken from each lot, not
/// against the total requested quantity for the order. A 10-unit request
/// split 2-from-A / 8-from-B prices the 2-unit portion at unit price and the
/// 8-unit portion at wholesale price.
pub const WHOLESALE_THRESHOLD: i64 = 3;

/// Lots expiring within this many days produce a cart warning.
pub const EXPIRY_WARNING_DAYS: i64 = 7;

/// Maximum quantity of a single checkout line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
