//! # Restock Repository
//!
//! Restock history. Entries are written by
//! [`InventoryService::restock`](crate::inventory::InventoryService::restock)
//! inside a unit of work and only read here.

use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use rxstock_core::RestockEntry;

/// Repository for reading restock history.
#[derive(Debug, Clone)]
pub struct RestockRepository {
    pool: SqlitePool,
}

impl RestockRepository {
    pub fn new(pool: SqlitePool) -> Self {
        RestockRepository { pool }
    }

    /// Newest entries first, with the product's current name.
    pub async fn history(&self, limit: u32) -> DbResult<Vec<RestockEntry>> {
        let entries = sqlx::query_as::<_, RestockEntry>(
            r#"
            SELECT
                r.id,
                r.product_id,
                p.name AS product_name,
                r.supplier_id,
                r.user_name,
                r.quantity_added,
                r.cost_per_unit_cents AS cost_per_unit,
                r.notes,
                r.restocked_at
            FROM restock_history r
            JOIN products p ON p.id = r.product_id
            ORDER BY r.restocked_at DESC, r.rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

pub(crate) async fn insert_entry<'e, E>(executor: E, entry: &RestockEntry) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(
        id = %entry.id,
        product_id = %entry.product_id,
        quantity_added = entry.quantity_added,
        "Inserting restock entry"
    );

    sqlx::query(
        r#"
        INSERT INTO restock_history (
            id, product_id, supplier_id, user_name,
            quantity_added, cost_per_unit_cents, notes, restocked_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.product_id)
    .bind(&entry.supplier_id)
    .bind(&entry.user_name)
    .bind(entry.quantity_added)
    .bind(entry.cost_per_unit)
    .bind(&entry.notes)
    .bind(entry.restocked_at)
    .execute(executor)
    .await?;

    Ok(())
}
