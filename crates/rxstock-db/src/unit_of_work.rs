//! # Unit of Work
//!
//! One SQLite transaction plus the writer gate, exposing exactly the store
//! operations a transactional workflow needs.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  db.begin()                                                             │
//! │    ├── acquire WriteGate   (waits for any other writer to finish)      │
//! │    └── BEGIN               (sqlx Transaction)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  uow.active_promotions(today)   ─┐                                      │
//! │  uow.get_setting("tax_rate")     │  all on the same connection,        │
//! │  uow.insert_sale(..)             │  all inside the same transaction    │
//! │  uow.get_product(..)             │                                      │
//! │  uow.decrement_quantity(..)      │                                      │
//! │  uow.insert_sale_item(..)       ─┘                                      │
//! │       │                                                                 │
//! │       ├── uow.commit()    → COMMIT, gate released                      │
//! │       └── uow.rollback()  → ROLLBACK, gate released                    │
//! │           (or drop)                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::product::{self, StockDecrement};
use crate::repository::{promotion, restock, sale, setting};
use rxstock_core::{Product, Promotion, RestockEntry, Sale, SaleItem};

// =============================================================================
// Write Gate
// =============================================================================

/// In-process single-writer lock shared by every handle to one database.
#[derive(Debug, Clone, Default)]
pub struct WriteGate(Arc<Mutex<()>>);

impl WriteGate {
    /// Waits until no other writer holds the gate.
    pub async fn acquire(&self) -> OwnedMutexGuard<()> {
        self.0.clone().lock_owned().await
    }
}

// =============================================================================
// Unit of Work
// =============================================================================

/// An open write transaction. Commit or roll back as one group.
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
    _gate: OwnedMutexGuard<()>,
}

impl UnitOfWork {
    pub(crate) async fn begin(pool: &SqlitePool, gate: &WriteGate) -> DbResult<Self> {
        let guard = gate.acquire().await;
        let tx = pool.begin().await?;
        debug!("Unit of work started");

        Ok(UnitOfWork { tx, _gate: guard })
    }

    // -------------------------------------------------------------------------
    // Product catalog
    // -------------------------------------------------------------------------

    pub async fn get_product(&mut self, id: &str) -> DbResult<Option<Product>> {
        product::fetch_product(&mut *self.tx, id).await
    }

    /// Takes `amount` units from stock if, and only if, enough are on hand.
    pub async fn decrement_quantity(&mut self, id: &str, amount: i64) -> DbResult<StockDecrement> {
        product::decrement_quantity(&mut self.tx, id, amount).await
    }

    /// Adds `amount` units to stock. Returns `false` if the product is unknown.
    pub async fn increment_quantity(&mut self, id: &str, amount: i64) -> DbResult<bool> {
        product::increment_quantity(&mut *self.tx, id, amount).await
    }

    // -------------------------------------------------------------------------
    // Promotion store
    // -------------------------------------------------------------------------

    pub async fn active_promotions(&mut self, today: NaiveDate) -> DbResult<Vec<Promotion>> {
        promotion::fetch_active(&mut self.tx, today).await
    }

    // -------------------------------------------------------------------------
    // Settings store
    // -------------------------------------------------------------------------

    pub async fn get_setting(&mut self, key: &str) -> DbResult<Option<String>> {
        setting::fetch_value(&mut *self.tx, key).await
    }

    // -------------------------------------------------------------------------
    // Sales & history
    // -------------------------------------------------------------------------

    pub async fn insert_sale(&mut self, sale: &Sale) -> DbResult<()> {
        sale::insert_sale(&mut *self.tx, sale).await
    }

    pub async fn insert_sale_item(&mut self, item: &SaleItem) -> DbResult<()> {
        sale::insert_sale_item(&mut *self.tx, item).await
    }

    pub async fn insert_restock(&mut self, entry: &RestockEntry) -> DbResult<()> {
        restock::insert_entry(&mut *self.tx, entry).await
    }

    // -------------------------------------------------------------------------
    // Completion
    // -------------------------------------------------------------------------

    pub async fn commit(self) -> DbResult<()> {
        self.tx.commit().await?;
        debug!("Unit of work committed");
        Ok(())
    }

    pub async fn rollback(self) -> DbResult<()> {
        self.tx.rollback().await?;
        debug!("Unit of work rolled back");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::test_support::{seed_product, test_db};

    #[tokio::test]
    async fn test_rollback_discards_changes() {
        let db = test_db().await;
        let product = seed_product(&db, "Cetirizine 10mg", 1000, 5).await;

        let mut uow = db.begin().await.unwrap();
        assert!(uow.increment_quantity(&product.id, 10).await.unwrap());
        uow.rollback().await.unwrap();

        let reloaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.quantity, 5);
    }

    #[tokio::test]
    async fn test_drop_without_commit_rolls_back() {
        let db = test_db().await;
        let product = seed_product(&db, "Loratadine 10mg", 800, 5).await;

        {
            let mut uow = db.begin().await.unwrap();
            uow.increment_quantity(&product.id, 3).await.unwrap();
        }

        let reloaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.quantity, 5);
    }

    #[tokio::test]
    async fn test_commit_persists_changes() {
        let db = test_db().await;
        let product = seed_product(&db, "Vitamin C 500mg", 450, 5).await;

        let mut uow = db.begin().await.unwrap();
        uow.increment_quantity(&product.id, 7).await.unwrap();
        uow.commit().await.unwrap();

        let reloaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.quantity, 12);
    }
}
