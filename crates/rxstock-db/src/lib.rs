//! # rxstock-db: Database Layer for RxStock
//!
//! SQLite storage, repositories, and the transactional workflows (sale
//! creation, restocking) that must commit or roll back as one group.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        RxStock Data Flow                                │
//! │                                                                         │
//! │  REST handler (POST /api/sales)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     rxstock-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌───────────────┐   ┌───────────────┐    │   │
//! │  │   │ SaleProcessor │   │  Repositories │   │  Migrations   │    │   │
//! │  │   │ Inventory     │   │  products     │   │  (embedded)   │    │   │
//! │  │   │ Service       │   │  promotions   │   │               │    │   │
//! │  │   └───────┬───────┘   │  settings ... │   │ 0001_initial  │    │   │
//! │  │           │           └───────┬───────┘   └───────────────┘    │   │
//! │  │           ▼                   │                                 │   │
//! │  │   ┌───────────────┐           │                                 │   │
//! │  │   │  UnitOfWork   │◄──────────┘  shared query functions        │   │
//! │  │   │  + WriteGate  │                                            │   │
//! │  │   └───────┬───────┘                                             │   │
//! │  │           ▼                                                     │   │
//! │  │   Database { SqlitePool }                                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL)                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and service error types
//! - [`repository`] - Repository implementations
//! - [`unit_of_work`] - Transaction wrapper and single-writer gate
//! - [`checkout`] - Sale transaction processor
//! - [`inventory`] - Restocking
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rxstock_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("rxstock.db")).await?;
//!
//! let products = db.products().list(50).await?;
//! let sale = db.checkout().create_sale(new_sale, today).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod inventory;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod unit_of_work;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::SaleProcessor;
pub use error::{DbError, DbResult, ServiceError, ServiceResult};
pub use inventory::InventoryService;
pub use pool::{Database, DbConfig};
pub use unit_of_work::{UnitOfWork, WriteGate};

// Repository re-exports for convenience
pub use repository::product::{ProductRepository, StockDecrement};
pub use repository::promotion::PromotionRepository;
pub use repository::restock::RestockRepository;
pub use repository::sale::SaleRepository;
pub use repository::setting::SettingRepository;
pub use repository::supplier::SupplierRepository;

// =============================================================================
// Test Fixtures
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;
    use rxstock_core::{
        CartLine, Money, NewProduct, NewPromotion, NewSupplier, Percentage, Product,
        PromotionKind, Supplier,
    };
    use tempfile::TempDir;

    use crate::{Database, DbConfig};

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Fixed business date used by sale tests.
    pub fn today() -> NaiveDate {
        date(2026, 3, 10)
    }

    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// File-backed database with several pooled connections.
    pub async fn file_db(dir: &TempDir) -> Database {
        Database::new(DbConfig::new(dir.path().join("rxstock.db")).max_connections(4))
            .await
            .unwrap()
    }

    pub fn new_supplier(email: &str) -> NewSupplier {
        NewSupplier {
            name: "MedSupply Co".to_string(),
            contact_person: Some("Dana".to_string()),
            email: email.to_string(),
            phone: "555-0100".to_string(),
            address: None,
        }
    }

    pub async fn seed_supplier(db: &Database, email: &str) -> Supplier {
        db.suppliers().create(&new_supplier(email)).await.unwrap()
    }

    pub fn new_product(supplier_id: &str, name: &str, price_cents: i64, quantity: i64) -> NewProduct {
        NewProduct {
            supplier_id: supplier_id.to_string(),
            name: name.to_string(),
            category: "General".to_string(),
            batch_number: "B-001".to_string(),
            expiry_date: date(2028, 12, 31),
            unit: "Tablets".to_string(),
            price: Money::from_cents(price_cents),
            quantity,
        }
    }

    /// Creates a product under a fresh supplier.
    pub async fn seed_product(db: &Database, name: &str, price_cents: i64, quantity: i64) -> Product {
        let email = format!("{}@example.com", uuid::Uuid::new_v4());
        let supplier = seed_supplier(db, &email).await;
        db.products()
            .create(&new_product(&supplier.id, name, price_cents, quantity))
            .await
            .unwrap()
    }

    /// A promotion running all of 2026.
    pub fn new_promotion(name: &str, value_bps: u32, product_ids: &[&str]) -> NewPromotion {
        NewPromotion {
            name: name.to_string(),
            description: String::new(),
            promotion_type: PromotionKind::ProductPercentage,
            value: Percentage::from_bps(value_bps),
            start_date: date(2026, 1, 1),
            end_date: date(2026, 12, 31),
            is_active: true,
            product_ids: product_ids.iter().map(|id| id.to_string()).collect(),
        }
    }

    pub fn line(product_id: &str, quantity: i64, unit_price_cents: i64) -> CartLine {
        CartLine {
            product_id: product_id.to_string(),
            quantity,
            unit_price: Money::from_cents(unit_price_cents),
        }
    }
}
