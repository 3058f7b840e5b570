//! # Seed Data Generator
//!
//! Populates a development database with suppliers, products, a running
//! promotion and a tax rate.
//!
//! ## Usage
//! ```bash
//! # Seed ./rxstock_dev.db with the default catalog
//! cargo run -p rxstock-db --bin seed
//!
//! # Limit the number of products
//! cargo run -p rxstock-db --bin seed -- --count 20
//!
//! # Specify database path and tax rate
//! cargo run -p rxstock-db --bin seed -- --db ./data/rxstock.db --tax 8.25
//! ```
//!
//! ## Generated Data
//! - One supplier per therapeutic category
//! - Products named `{medicine} {strength}`, price $1.50 - $13.49,
//!   stock 0 - 120, expiry 6 - 30 months out
//! - A 15% promotion on the first product of every category, running
//!   for the current month
//! - `tax_rate` setting (default 10)

use anyhow::Context;
use chrono::{Datelike, Duration, Local, NaiveDate};
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rxstock_core::{Money, NewProduct, NewPromotion, NewSupplier, Percentage, PromotionKind, TAX_RATE_KEY};
use rxstock_db::{Database, DbConfig};

/// Catalog for realistic test data: (category, unit, medicines).
const CATALOG: &[(&str, &str, &[&str])] = &[
    (
        "Analgesics",
        "Tablets",
        &["Paracetamol", "Ibuprofen", "Aspirin", "Naproxen", "Diclofenac"],
    ),
    (
        "Antibiotics",
        "Capsules",
        &["Amoxicillin", "Azithromycin", "Doxycycline", "Cephalexin", "Ciprofloxacin"],
    ),
    (
        "Antihistamines",
        "Tablets",
        &["Cetirizine", "Loratadine", "Fexofenadine", "Chlorphenamine"],
    ),
    (
        "Gastro",
        "Capsules",
        &["Omeprazole", "Pantoprazole", "Loperamide", "Ranitidine"],
    ),
    (
        "Supplements",
        "Tablets",
        &["Vitamin C", "Vitamin D3", "Zinc", "Folic Acid", "Iron"],
    ),
];

/// Strength variants with a price addon in cents.
const STRENGTHS: &[(&str, i64)] = &[("100mg", 0), ("250mg", 150), ("500mg", 400)];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = usize::MAX;
    let mut db_path = String::from("./rxstock_dev.db");
    let mut tax_rate = String::from("10");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1]
                        .parse()
                        .with_context(|| format!("invalid --count value '{}'", args[i + 1]))?;
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--tax" | "-t" => {
                if i + 1 < args.len() {
                    tax_rate = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("RxStock Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Maximum number of products (default: whole catalog)");
                println!("  -d, --db <PATH>    Database file path (default: ./rxstock_dev.db)");
                println!("  -t, --tax <RATE>   Tax rate percentage (default: 10)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => {
                anyhow::bail!("unknown argument '{other}' (see --help)");
            }
        }
        i += 1;
    }

    info!(path = %db_path, "Seeding database");

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("opening database at {db_path}"))?;

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let today = Local::now().date_naive();
    let start = std::time::Instant::now();
    let mut generated = 0usize;
    let mut promoted = Vec::new();

    'catalog: for (category_idx, (category, unit, medicines)) in CATALOG.iter().enumerate() {
        let supplier = db
            .suppliers()
            .create(&NewSupplier {
                name: format!("{category} Wholesale"),
                contact_person: Some("Sales Desk".to_string()),
                email: format!("orders+{}@{}.example.com", category_idx, category.to_lowercase()),
                phone: format!("555-01{:02}", category_idx),
                address: None,
            })
            .await
            .with_context(|| format!("creating supplier for {category}"))?;

        for (medicine_idx, medicine) in medicines.iter().enumerate() {
            for (strength_idx, (strength, addon)) in STRENGTHS.iter().enumerate() {
                if generated >= count {
                    break 'catalog;
                }

                let seed = category_idx * 100 + medicine_idx * 10 + strength_idx;
                let product = db
                    .products()
                    .create(&generate_product(&supplier.id, category, unit, medicine, strength, *addon, seed, today))
                    .await
                    .with_context(|| format!("creating {medicine} {strength}"))?;

                if medicine_idx == 0 && strength_idx == 0 {
                    promoted.push(product.id);
                }
                generated += 1;
            }
        }
    }

    println!("✓ Generated {} products in {:?}", generated, start.elapsed());

    if !promoted.is_empty() {
        let month_start = today.with_day(1).unwrap_or(today);
        let promotion = db
            .promotions()
            .create(&NewPromotion {
                name: "Monthly essentials".to_string(),
                description: "15% off one product per category".to_string(),
                promotion_type: PromotionKind::ProductPercentage,
                value: Percentage::from_bps(1500),
                start_date: month_start,
                end_date: month_start + Duration::days(30),
                is_active: true,
                product_ids: promoted,
            })
            .await?;
        println!("✓ Promotion '{}' covers {} products", promotion.name, promotion.product_ids.len());
    }

    db.settings().set(TAX_RATE_KEY, &tax_rate).await?;
    println!("✓ {} = {}", TAX_RATE_KEY, tax_rate);

    db.close().await;
    println!("✓ Seed complete!");
    Ok(())
}

/// Builds one product with deterministic pseudo-random price, stock and expiry.
#[allow(clippy::too_many_arguments)]
fn generate_product(
    supplier_id: &str,
    category: &str,
    unit: &str,
    medicine: &str,
    strength: &str,
    price_addon: i64,
    seed: usize,
    today: NaiveDate,
) -> NewProduct {
    // $1.50 - $9.49 base, plus the strength addon
    let base_price = 150 + ((seed * 37) % 800) as i64;
    let quantity = ((seed * 13) % 121) as i64;
    let shelf_life_days = 180 + ((seed * 29) % 720) as i64;

    NewProduct {
        supplier_id: supplier_id.to_string(),
        name: format!("{medicine} {strength}"),
        category: category.to_string(),
        batch_number: format!("{}-{:04}", &category[..3].to_uppercase(), seed),
        expiry_date: today + Duration::days(shelf_life_days),
        unit: unit.to_string(),
        price: Money::from_cents(base_price + price_addon),
        quantity,
    }
}
