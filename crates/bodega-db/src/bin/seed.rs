//! # Seed Data Generator
//!
//! Populates the database with stock lots for development, then runs one
//! demo checkout end to end so the whole pipeline can be eyeballed.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p bodega-db --bin seed
//!
//! # Specify database path
//! cargo run -p bodega-db --bin seed -- --db ./data/bodega.db
//!
//! # Seed without the demo checkout
//! cargo run -p bodega-db --bin seed -- --no-demo
//! ```
//!
//! ## Generated Lots
//! Each catalog product gets 2-3 lots with staggered received dates, mixed
//! expiry (some near-dated, some shelf-stable), and wholesale pricing on a
//! subset, so FIFO ordering, tier splits, and expiry warnings all have data
//! to bite on.

use chrono::{Duration, Utc};
use std::env;
use tracing_subscriber::EnvFilter;

use bodega_core::{CheckoutLine, Discount, StockLot};
use bodega_db::repository::lot::generate_lot_id;
use bodega_db::{Database, DbConfig};

/// Product catalog: (product_id, unit price cents, wholesale price cents).
const CATALOG: &[(&str, i64, Option<i64>)] = &[
    ("cola-2l", 250, Some(200)),
    ("water-1l", 120, Some(90)),
    ("corn-flour-1kg", 450, Some(380)),
    ("rice-5kg", 1800, Some(1550)),
    ("black-beans-can", 160, None),
    ("eggs-dozen", 420, Some(360)),
    ("whole-milk-1l", 310, None),
    ("white-bread", 280, None),
    ("cooking-oil-1l", 650, Some(560)),
    ("sugar-2kg", 390, Some(330)),
];

/// (days until expiry, quantity) per lot, cycled across the catalog.
/// `None` expiry models shelf-stable stock.
const LOT_SHAPES: &[&[(Option<i64>, i64)]] = &[
    &[(Some(5), 12), (Some(45), 80), (None, 40)],
    &[(Some(20), 60), (None, 100)],
    &[(None, 150), (None, 90)],
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bodega=debug,sqlx=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./bodega_dev.db");
    let mut run_demo = true;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--no-demo" => {
                run_demo = false;
            }
            "--help" | "-h" => {
                println!("Bodega Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./bodega_dev.db)");
                println!("      --no-demo      Skip the demo checkout after seeding");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Bodega Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.lots().count_with_stock().await?;
    if existing > 0 {
        println!("⚠ Database already has {} stocked lots", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating stock lots...");

    let today = Utc::now().date_naive();
    let mut generated = 0;

    for (idx, (product_id, unit_price, wholesale_price)) in CATALOG.iter().enumerate() {
        let shape = LOT_SHAPES[idx % LOT_SHAPES.len()];

        for (lot_idx, (expiry_days, quantity)) in shape.iter().enumerate() {
            let mut lot = StockLot::new(generate_lot_id(), *product_id, *quantity, *unit_price);
            lot.lot_code = Some(format!("{}-L{:02}", product_id.to_uppercase(), lot_idx + 1));
            lot.wholesale_price_cents = *wholesale_price;
            lot.expires_on = expiry_days.map(|d| today + Duration::days(d));
            // Older lots arrived first so FIFO has something to order
            lot.received_at = Utc::now() - Duration::days((shape.len() - lot_idx) as i64 * 7);
            lot.updated_at = lot.received_at;

            if let Err(e) = db.lots().insert(&lot).await {
                eprintln!("Failed to insert lot for {}: {}", product_id, e);
                continue;
            }
            generated += 1;
        }
    }

    println!("✓ Generated {} lots across {} products", generated, CATALOG.len());

    if !run_demo {
        println!();
        println!("✓ Seed complete!");
        return Ok(());
    }

    // -- Demo checkout ----------------------------------------------------
    println!();
    println!("Running demo checkout...");

    let lines = vec![
        CheckoutLine::Automatic {
            product_id: "cola-2l".to_string(),
            quantity: 15,
        },
        CheckoutLine::Automatic {
            product_id: "black-beans-can".to_string(),
            quantity: 2,
        },
    ];

    let review = db.checkout().validate_cart(&lines).await?;
    println!("  Cart review: valid = {}", review.is_valid);
    for warning in &review.warnings {
        println!("    ⚠ line {}: {}", warning.line, warning.message);
    }
    for error in &review.errors {
        println!("    ✗ line {}: {}", error.line, error.message);
    }

    let receipt = db
        .checkout()
        .checkout(&lines, "seed-demo", Some(Discount::percentage(5)))
        .await?;

    println!();
    println!("  Receipt {}", receipt.sale_id);
    println!("  ----------------------------------------");
    for line in &receipt.line_items {
        println!(
            "  {:>3} × {:<20} @ {:>6}¢ [{:?}] = {:>7}¢",
            line.quantity_sold,
            line.product_id,
            line.price_applied_cents,
            line.price_tier,
            line.line_total_cents,
        );
    }
    println!("  ----------------------------------------");
    println!("  Subtotal: {:>7}¢", receipt.subtotal_cents);
    println!("  Discount: {:>7}¢", receipt.discount_cents);
    println!("  Total:    {:>7}¢", receipt.total_cents);
    if receipt.wholesale_savings_cents > 0 {
        println!("  Wholesale savings: {}¢", receipt.wholesale_savings_cents);
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
