//! # Promotion Repository
//!
//! Database operations for promotions and the products they cover.
//!
//! ## Storage
//! ```text
//! ┌──────────────────────┐        ┌────────────────────────────┐
//! │ promotions           │ 1    N │ promotion_products         │
//! │  id, value_bps,      │───────►│  (promotion_id, product_id)│
//! │  start/end, active   │        └────────────────────────────┘
//! └──────────────────────┘
//! ```
//!
//! A promotion is always read together with its product list. Rows are
//! loaded first, then one query fetches the links for all of them.

use chrono::{NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::unit_of_work::WriteGate;
use rxstock_core::{NewPromotion, Promotion};

/// Repository for promotion database operations.
#[derive(Debug, Clone)]
pub struct PromotionRepository {
    pool: SqlitePool,
    gate: WriteGate,
}

impl PromotionRepository {
    pub fn new(pool: SqlitePool, gate: WriteGate) -> Self {
        PromotionRepository { pool, gate }
    }

    /// Creates a promotion and links it to its products in one transaction.
    ///
    /// Duplicate product IDs are collapsed.
    ///
    /// ## Errors
    /// - `DbError::NotFound` if a listed product doesn't exist (nothing is written)
    pub async fn create(&self, new: &NewPromotion) -> DbResult<Promotion> {
        let mut product_ids: Vec<String> = Vec::with_capacity(new.product_ids.len());
        for id in &new.product_ids {
            let id = id.trim();
            if !product_ids.iter().any(|existing| existing == id) {
                product_ids.push(id.to_string());
            }
        }

        let promotion = Promotion {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            description: new.description.trim().to_string(),
            promotion_type: new.promotion_type,
            value: new.value,
            start_date: new.start_date,
            end_date: new.end_date,
            is_active: new.is_active,
            product_ids,
            created_at: Utc::now(),
        };

        debug!(
            id = %promotion.id,
            name = %promotion.name,
            products = promotion.product_ids.len(),
            "Inserting promotion"
        );

        let _writer = self.gate.acquire().await;
        let mut tx = self.pool.begin().await?;

        for product_id in &promotion.product_ids {
            let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM products WHERE id = ?1")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?;
            if exists.is_none() {
                return Err(DbError::not_found("Product", product_id));
            }
        }

        sqlx::query(
            r#"
            INSERT INTO promotions (
                id, name, description, promotion_type, value_bps,
                start_date, end_date, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&promotion.id)
        .bind(&promotion.name)
        .bind(&promotion.description)
        .bind(promotion.promotion_type)
        .bind(promotion.value)
        .bind(promotion.start_date)
        .bind(promotion.end_date)
        .bind(promotion.is_active)
        .bind(promotion.created_at)
        .execute(&mut *tx)
        .await?;

        for product_id in &promotion.product_ids {
            sqlx::query(
                "INSERT INTO promotion_products (promotion_id, product_id) VALUES (?1, ?2)",
            )
            .bind(&promotion.id)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(promotion)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Promotion>> {
        let mut conn = self.pool.acquire().await?;
        fetch_promotion(&mut conn, id).await
    }

    /// Lists promotions, most recent window first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Promotion>> {
        let mut conn = self.pool.acquire().await?;

        let mut promotions = sqlx::query_as::<_, Promotion>(&format!(
            "SELECT {PROMOTION_COLUMNS} FROM promotions ORDER BY start_date DESC, id LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;

        let links: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT promotion_id, product_id
            FROM promotion_products
            ORDER BY promotion_id, product_id
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        attach_products(&mut promotions, links);
        Ok(promotions)
    }

    /// Turns a promotion on or off.
    ///
    /// ## Errors
    /// - `DbError::NotFound` if the promotion doesn't exist
    pub async fn set_active(&self, id: &str, is_active: bool) -> DbResult<Promotion> {
        debug!(id = %id, is_active, "Updating promotion flag");

        let _writer = self.gate.acquire().await;
        let mut conn = self.pool.acquire().await?;

        let result = sqlx::query("UPDATE promotions SET is_active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(is_active)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Promotion", id));
        }

        fetch_promotion(&mut conn, id)
            .await?
            .ok_or_else(|| DbError::not_found("Promotion", id))
    }

    /// Promotions running on `today`, outside any transaction.
    pub async fn active_on(&self, today: NaiveDate) -> DbResult<Vec<Promotion>> {
        let mut conn = self.pool.acquire().await?;
        fetch_active(&mut conn, today).await
    }
}

// =============================================================================
// Shared Queries (pool or transaction)
// =============================================================================

const PROMOTION_COLUMNS: &str = r#"
    id,
    name,
    description,
    promotion_type,
    value_bps AS value,
    start_date,
    end_date,
    is_active,
    created_at
"#;

async fn fetch_promotion(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Promotion>> {
    let promotion = sqlx::query_as::<_, Promotion>(&format!(
        "SELECT {PROMOTION_COLUMNS} FROM promotions WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(mut promotion) = promotion else {
        return Ok(None);
    };

    promotion.product_ids = sqlx::query_scalar(
        "SELECT product_id FROM promotion_products WHERE promotion_id = ?1 ORDER BY product_id",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Some(promotion))
}

/// Active promotions whose inclusive window contains `today`.
pub(crate) async fn fetch_active(
    conn: &mut SqliteConnection,
    today: NaiveDate,
) -> DbResult<Vec<Promotion>> {
    let mut promotions = sqlx::query_as::<_, Promotion>(&format!(
        r#"
        SELECT {PROMOTION_COLUMNS}
        FROM promotions
        WHERE is_active = 1 AND start_date <= ?1 AND end_date >= ?1
        ORDER BY id
        "#
    ))
    .bind(today)
    .fetch_all(&mut *conn)
    .await?;

    if promotions.is_empty() {
        return Ok(promotions);
    }

    let links: Vec<(String, String)> = sqlx::query_as(
        r#"
        SELECT pp.promotion_id, pp.product_id
        FROM promotion_products pp
        JOIN promotions p ON p.id = pp.promotion_id
        WHERE p.is_active = 1 AND p.start_date <= ?1 AND p.end_date >= ?1
        ORDER BY pp.promotion_id, pp.product_id
        "#,
    )
    .bind(today)
    .fetch_all(&mut *conn)
    .await?;

    attach_products(&mut promotions, links);

    debug!(count = promotions.len(), %today, "Loaded active promotions");
    Ok(promotions)
}

fn attach_products(promotions: &mut [Promotion], links: Vec<(String, String)>) {
    let mut by_promotion: HashMap<String, Vec<String>> = HashMap::new();
    for (promotion_id, product_id) in links {
        by_promotion.entry(promotion_id).or_default().push(product_id);
    }

    for promotion in promotions.iter_mut() {
        promotion.product_ids = by_promotion.remove(&promotion.id).unwrap_or_default();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
