//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD on catalog details
//! - Stock movements (conditional decrement, increment)
//!
//! ## Stock Movements
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Sale line: take 3 units of product P                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE products                                                        │
//! │     SET quantity = quantity - 3                                         │
//! │   WHERE id = P AND quantity >= 3      ← the check IS the update        │
//! │       │                                                                 │
//! │       ├── 1 row  → Applied                                              │
//! │       └── 0 rows → re-read quantity → Insufficient { available }        │
//! │                                                                         │
//! │  Stock can never go negative, even without the writer gate.            │
//! │  (CHECK (quantity >= 0) backs this up at the schema level.)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::unit_of_work::WriteGate;
use rxstock_core::{NewProduct, Product, ProductUpdate};

const PRODUCT_COLUMNS: &str = r#"
    id,
    supplier_id,
    name,
    category,
    batch_number,
    expiry_date,
    unit,
    price_cents AS price,
    quantity,
    created_at,
    updated_at
"#;

/// Outcome of a conditional stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDecrement {
    Applied,
    /// Not enough units; nothing was changed.
    Insufficient { available: i64 },
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    gate: WriteGate,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool, gate: WriteGate) -> Self {
        ProductRepository { pool, gate }
    }

    /// Creates a product. The supplier must exist.
    ///
    /// ## Errors
    /// - `DbError::ForeignKeyViolation` for an unknown supplier
    pub async fn create(&self, new: &NewProduct) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            supplier_id: new.supplier_id.trim().to_string(),
            name: new.name.trim().to_string(),
            category: new.category.trim().to_string(),
            batch_number: new.batch_number.trim().to_string(),
            expiry_date: new.expiry_date,
            unit: new.unit.trim().to_string(),
            price: new.price,
            quantity: new.quantity,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        let _writer = self.gate.acquire().await;
        sqlx::query(
            r#"
            INSERT INTO products (
                id, supplier_id, name, category, batch_number, expiry_date,
                unit, price_cents, quantity, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&product.id)
        .bind(&product.supplier_id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.batch_number)
        .bind(product.expiry_date)
        .bind(&product.unit)
        .bind(product.price)
        .bind(product.quantity)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        fetch_product(&self.pool, id).await
    }

    /// Lists products ordered by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name, id LIMIT ?1");
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Updates catalog details. Stock is not touched.
    ///
    /// ## Errors
    /// - `DbError::NotFound` if the product doesn't exist
    pub async fn update_details(&self, id: &str, update: &ProductUpdate) -> DbResult<Product> {
        debug!(id = %id, "Updating product details");

        let _writer = self.gate.acquire().await;
        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                category = ?3,
                batch_number = ?4,
                expiry_date = ?5,
                unit = ?6,
                price_cents = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(update.name.trim())
        .bind(update.category.trim())
        .bind(update.batch_number.trim())
        .bind(update.expiry_date)
        .bind(update.unit.trim())
        .bind(update.price)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        fetch_product(&self.pool, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Shared Queries (pool or transaction)
// =============================================================================

pub(crate) async fn fetch_product<'e, E>(executor: E, id: &str) -> DbResult<Option<Product>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(product)
}

pub(crate) async fn decrement_quantity(
    conn: &mut SqliteConnection,
    id: &str,
    amount: i64,
) -> DbResult<StockDecrement> {
    let result = sqlx::query(
        r#"
        UPDATE products SET
            quantity = quantity - ?2,
            updated_at = ?3
        WHERE id = ?1 AND quantity >= ?2
        "#,
    )
    .bind(id)
    .bind(amount)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 1 {
        debug!(id = %id, amount, "Stock decremented");
        return Ok(StockDecrement::Applied);
    }

    let available: Option<i64> = sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match available {
        Some(available) => Ok(StockDecrement::Insufficient { available }),
        None => Err(DbError::not_found("Product", id)),
    }
}

pub(crate) async fn increment_quantity<'e, E>(executor: E, id: &str, amount: i64) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE products SET
            quantity = quantity + ?2,
            updated_at = ?3
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .bind(amount)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

// =============================================================================
// Unit Tests
// =============================================================================
