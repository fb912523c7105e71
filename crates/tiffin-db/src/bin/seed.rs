//! # Seed Data Generator
//!
//! Populates the database with a demo restaurant for development.
//!
//! ## Usage
//! ```bash
//! # Default database path (./tiffin_dev.db)
//! cargo run -p tiffin-db --bin seed
//!
//! # Specify database path
//! cargo run -p tiffin-db --bin seed -- --db ./data/tiffin.db
//! ```
//!
//! ## Generated Data
//! - One restaurant: "Annapurna Tiffin House" (CGST+SGST @ 2.5% each,
//!   invoice prefix ANN)
//! - Eight dine-in tables T1..T8 with printable QR tokens
//! - A handful of placed orders on T1 and T2 for settlement testing

use chrono::Utc;
use std::env;
use tiffin_core::types::{GstMode, OrderStatus, OrderType, RateBps};
use tiffin_core::{Money, Order, OrderItem, Restaurant};
use tiffin_db::{Database, DbConfig};
use uuid::Uuid;

const RESTAURANT_ID: &str = "demo-annapurna";

/// (menu_item_id, name, unit price in paise)
const MENU: &[(&str, &str, i64)] = &[
    ("menu-tea", "Masala Tea", 1000),
    ("menu-samosa", "Samosa", 1500),
    ("menu-idli", "Idli (2 pc)", 4000),
    ("menu-dosa", "Masala Dosa", 8000),
    ("menu-thali", "Veg Thali", 15000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./tiffin_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tiffin Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./tiffin_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Tiffin Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if db.restaurants().get_by_id(RESTAURANT_ID).await?.is_some() {
        println!("⚠ Demo restaurant already seeded.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();
    db.restaurants()
        .insert(&Restaurant {
            id: RESTAURANT_ID.to_string(),
            name: "Annapurna Tiffin House".to_string(),
            gst_mode: GstMode::CgstSgst,
            cgst_rate_bps: RateBps::from_bps(250),
            sgst_rate_bps: RateBps::from_bps(250),
            igst_rate_bps: RateBps::from_bps(500),
            invoice_prefix: "ANN".to_string(),
            invoice_seq: 0,
            created_at: now,
            updated_at: now,
        })
        .await?;
    println!("✓ Restaurant created: {}", RESTAURANT_ID);

    for n in 1..=8 {
        let table = db
            .tables()
            .create(RESTAURANT_ID, &format!("T{n}"), 4)
            .await?;
        println!("✓ Table {} token: {}", table.table_no, table.public_token);
    }

    // Two orders on T1 (settlement will consolidate the teas) and one on T2.
    seed_order(&db, "T1", &[("menu-tea", 2), ("menu-samosa", 1)]).await?;
    seed_order(&db, "T1", &[("menu-tea", 1)]).await?;
    seed_order(&db, "T2", &[("menu-thali", 2)]).await?;
    println!("✓ Seeded 3 open orders");

    println!();
    println!("Done. Try: settle table T1 and watch Tea consolidate to qty 3.");
    Ok(())
}

async fn seed_order(
    db: &Database,
    table_no: &str,
    lines: &[(&str, i64)],
) -> Result<(), Box<dyn std::error::Error>> {
    let now = Utc::now();
    let order_id = Uuid::new_v4().to_string();

    let items: Vec<OrderItem> = lines
        .iter()
        .map(|(menu_id, qty)| {
            let (_, name, price) = MENU
                .iter()
                .find(|(id, _, _)| id == menu_id)
                .copied()
                .unwrap_or(("", "Unknown", 0));
            OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                menu_item_id: menu_id.to_string(),
                name_snapshot: name.to_string(),
                unit_price: Money::from_paise(price),
                qty: *qty,
                modifiers: vec![],
                notes: None,
                created_at: now,
            }
        })
        .collect();

    db.orders()
        .create(
            &Order {
                id: order_id,
                restaurant_id: RESTAURANT_ID.to_string(),
                order_type: OrderType::DineIn,
                table_no: Some(table_no.to_string()),
                status: OrderStatus::Placed,
                customer_name: None,
                customer_phone: None,
                delivery_address: None,
                linked_invoice_id: None,
                created_by: Some("seed".to_string()),
                created_at: now,
                updated_at: now,
            },
            &items,
        )
        .await?;

    Ok(())
}
