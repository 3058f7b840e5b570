//! # Restocking
//!
//! Adds stock to a product and records the event, in one unit of work.
//!
//! ```text
//! restock(product_id, request, user)
//!      │
//!      ├── validate_restock          quantity_added >= 1, cost >= 0
//!      ▼
//!  UnitOfWork
//!      ├── get_product               missing → ProductNotFound
//!      ├── increment_quantity
//!      ├── insert_restock            RestockEntry
//!      └── commit                    → updated Product
//! ```

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ServiceResult;
use crate::pool::Database;
use crate::unit_of_work::UnitOfWork;
use rxstock_core::validation::validate_restock;
use rxstock_core::{CoreError, Product, RestockEntry, RestockRequest};

/// Stock replenishment.
#[derive(Debug, Clone)]
pub struct InventoryService {
    db: Database,
}

impl InventoryService {
    pub fn new(db: Database) -> Self {
        InventoryService { db }
    }

    /// Adds `request.quantity_added` units to a product and appends a
    /// restock history entry. Returns the product with its new quantity.
    ///
    /// ## Errors
    /// - `CoreError::Validation` for a non-positive quantity or negative cost
    /// - `CoreError::ProductNotFound` for an unknown product
    /// - `DbError::ForeignKeyViolation` for an unknown supplier
    pub async fn restock(
        &self,
        product_id: &str,
        request: RestockRequest,
        user_name: Option<String>,
    ) -> ServiceResult<Product> {
        validate_restock(&request)?;

        let mut uow = self.db.begin().await?;

        match apply_restock(&mut uow, product_id, request, user_name).await {
            Ok((product, added)) => {
                uow.commit().await?;
                info!(
                    product_id = %product.id,
                    added,
                    quantity = product.quantity,
                    "Product restocked"
                );
                Ok(product)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback().await {
                    warn!(error = %rollback_err, "Rollback after failed restock did not complete");
                }
                Err(err)
            }
        }
    }
}

async fn apply_restock(
    uow: &mut UnitOfWork,
    product_id: &str,
    request: RestockRequest,
    user_name: Option<String>,
) -> ServiceResult<(Product, i64)> {
    let product = uow
        .get_product(product_id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

    uow.increment_quantity(&product.id, request.quantity_added)
        .await?;

    let entry = RestockEntry {
        id: Uuid::new_v4().to_string(),
        product_id: product.id.clone(),
        product_name: product.name.clone(),
        supplier_id: request
            .supplier_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty()),
        user_name,
        quantity_added: request.quantity_added,
        cost_per_unit: request.cost_per_unit,
        notes: request.notes.trim().to_string(),
        restocked_at: Utc::now(),
    };
    uow.insert_restock(&entry).await?;

    let updated = uow
        .get_product(&product.id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(product.id.clone()))?;

    Ok((updated, entry.quantity_added))
}
