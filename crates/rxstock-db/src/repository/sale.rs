//! # Sale Repository
//!
//! Read side of sales, plus the insert queries the checkout unit of work
//! uses. Sales are immutable: there is no update or delete.
//!
//! ## Stored Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sales                                 sale_items                       │
//! │  ─────                                 ──────────                       │
//! │  id ◄──────────────────────────────── sale_id                           │
//! │  user_name                             position   (0, 1, 2, ...)        │
//! │  subtotal_cents                        product_id                       │
//! │  promotion_discount_cents              product_name     ← snapshot      │
//! │  discount_type, discount_value_*       quantity                         │
//! │  discount_cents, tax_cents             unit_price_cents ← snapshot      │
//! │  total_cents                           line_total_cents                 │
//! │  created_at                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{DbError, DbResult};
use rxstock_core::{DiscountType, ManualDiscount, Money, Sale, SaleItem};

/// Flat `sales` row; items are attached afterwards.
#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    user_name: String,
    subtotal: Money,
    promotion_discount_amount: Money,
    discount_type: DiscountType,
    discount_value_hundredths: i64,
    discount_amount: Money,
    tax_amount: Money,
    total_amount: Money,
    created_at: DateTime<Utc>,
}

impl SaleRow {
    fn into_sale(self, items: Vec<SaleItem>) -> DbResult<Sale> {
        let discount = ManualDiscount::from_parts(self.discount_type, self.discount_value_hundredths)
            .ok_or_else(|| DbError::CorruptRow {
                entity: "Sale".to_string(),
                id: self.id.clone(),
                reason: format!(
                    "discount value {} is not valid for type {:?}",
                    self.discount_value_hundredths, self.discount_type
                ),
            })?;

        Ok(Sale {
            id: self.id,
            user_name: self.user_name,
            subtotal: self.subtotal,
            promotion_discount_amount: self.promotion_discount_amount,
            discount_type: self.discount_type,
            discount_value: discount.value(),
            discount_amount: self.discount_amount,
            tax_amount: self.tax_amount,
            total_amount: self.total_amount,
            created_at: self.created_at,
            items,
        })
    }
}

const SALE_COLUMNS: &str = r#"
    id,
    user_name,
    subtotal_cents AS subtotal,
    promotion_discount_cents AS promotion_discount_amount,
    discount_type,
    discount_value_hundredths,
    discount_cents AS discount_amount,
    tax_cents AS tax_amount,
    total_cents AS total_amount,
    created_at
"#;

const SALE_ITEM_COLUMNS: &str = r#"
    id,
    sale_id,
    position,
    product_id,
    product_name,
    quantity,
    unit_price_cents AS unit_price,
    line_total_cents AS line_total
"#;

/// Repository for reading sales.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale with its items in cart order.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let mut conn = self.pool.acquire().await?;
        fetch_sale(&mut conn, id).await
    }

    /// Most recent sales first, each with its items.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales ORDER BY created_at DESC, rowid DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let items = sqlx::query_as::<_, SaleItem>(&format!(
            r#"
            SELECT {SALE_ITEM_COLUMNS}
            FROM sale_items
            WHERE sale_id IN (
                SELECT id FROM sales ORDER BY created_at DESC, rowid DESC LIMIT ?1
            )
            ORDER BY sale_id, position
            "#
        ))
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;

        let mut by_sale: HashMap<String, Vec<SaleItem>> = HashMap::new();
        for item in items {
            by_sale.entry(item.sale_id.clone()).or_default().push(item);
        }

        debug!(count = rows.len(), "Loaded recent sales");

        rows.into_iter()
            .map(|row| {
                let items = by_sale.remove(&row.id).unwrap_or_default();
                row.into_sale(items)
            })
            .collect()
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Shared Queries (pool or transaction)
// =============================================================================

async fn fetch_sale(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Sale>> {
    let row = sqlx::query_as::<_, SaleRow>(&format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let items = sqlx::query_as::<_, SaleItem>(&format!(
        "SELECT {SALE_ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY position"
    ))
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    row.into_sale(items).map(Some)
}

/// Inserts the sale header. Items are inserted separately.
pub(crate) async fn insert_sale<'e, E>(executor: E, sale: &Sale) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %sale.id, total = %sale.total_amount, "Inserting sale");

    // Hundredths: cents for fixed amounts, basis points for percentages.
    let discount_value = Money::from_decimal(sale.discount_value)
        .map(|value| value.cents())
        .ok_or_else(|| DbError::CorruptRow {
            entity: "Sale".to_string(),
            id: sale.id.clone(),
            reason: format!("discount value {} has more than 2 decimal places", sale.discount_value),
        })?;

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, user_name,
            subtotal_cents, promotion_discount_cents,
            discount_type, discount_value_hundredths, discount_cents,
            tax_cents, total_cents, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.user_name)
    .bind(sale.subtotal)
    .bind(sale.promotion_discount_amount)
    .bind(sale.discount_type)
    .bind(discount_value)
    .bind(sale.discount_amount)
    .bind(sale.tax_amount)
    .bind(sale.total_amount)
    .bind(sale.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

pub(crate) async fn insert_sale_item<'e, E>(executor: E, item: &SaleItem) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO sale_items (
            id, sale_id, position, product_id, product_name,
            quantity, unit_price_cents, line_total_cents
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&item.id)
    .bind(&item.sale_id)
    .bind(item.position)
    .bind(&item.product_id)
    .bind(&item.product_name)
    .bind(item.quantity)
    .bind(item.unit_price)
    .bind(item.line_total)
    .execute(executor)
    .await?;

    Ok(())
}
