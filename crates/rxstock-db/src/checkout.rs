//! # Sale Transaction Processor
//!
//! Turns a validated cart into a persisted sale, all or nothing.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_sale(NewSale, today)                                            │
//! │       │                                                                 │
//! │       ├── validate cart + manual discount  (nothing touched yet)       │
//! │       ▼                                                                 │
//! │  db.begin()  ─────────────────────────────── one UnitOfWork ─────────┐  │
//! │       │                                                              │  │
//! │       ├── active_promotions(today) → PromotionIndex                  │  │
//! │       ├── get_setting("tax_rate")  → resolve_tax_rate (0% fallback)  │  │
//! │       ├── price_sale(..)           → SaleTotals                      │  │
//! │       ├── insert_sale(header)                                        │  │
//! │       └── for each line, in cart order:                              │  │
//! │             get_product        ── missing → ProductNotFound          │  │
//! │             decrement_quantity ── short   → InsufficientStock        │  │
//! │             insert_sale_item (name + price snapshot, position)       │  │
//! │       │                                                              │  │
//! │       ├── Ok  → commit                                               │  │
//! │       └── Err → rollback: no sale, no items, no stock change ────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart lines for the same product are applied one after another, so the
//! second line sees the stock left by the first.

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ServiceResult;
use crate::pool::Database;
use crate::repository::product::StockDecrement;
use crate::unit_of_work::UnitOfWork;
use rxstock_core::validation::{validate_cart, validate_manual_discount};
use rxstock_core::{
    price_sale, resolve_tax_rate, CoreError, NewSale, PromotionIndex, Sale, SaleItem,
    TaxRateSource, TAX_RATE_KEY,
};

/// Creates sales inside a single unit of work.
#[derive(Debug, Clone)]
pub struct SaleProcessor {
    db: Database,
}

impl SaleProcessor {
    pub fn new(db: Database) -> Self {
        SaleProcessor { db }
    }

    /// Creates a sale, decrementing stock for every line.
    ///
    /// `today` selects which promotions are running.
    ///
    /// ## Errors
    /// - `CoreError::Validation` for an empty cart or bad line/discount values
    /// - `CoreError::ProductNotFound` for an unknown product id
    /// - `CoreError::InsufficientStock` if any line asks for more than is on hand
    /// - `DbError` for store failures
    ///
    /// On any error nothing is persisted.
    pub async fn create_sale(&self, new_sale: NewSale, today: NaiveDate) -> ServiceResult<Sale> {
        validate_cart(&new_sale.lines)?;
        validate_manual_discount(&new_sale.discount)?;

        let mut uow = self.db.begin().await?;

        match record_sale(&mut uow, new_sale, today).await {
            Ok(sale) => {
                uow.commit().await?;
                info!(
                    sale_id = %sale.id,
                    user = %sale.user_name,
                    items = sale.items.len(),
                    total = %sale.total_amount,
                    "Sale created"
                );
                Ok(sale)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback().await {
                    warn!(error = %rollback_err, "Rollback after failed sale did not complete");
                }
                debug!(error = %err, "Sale aborted");
                Err(err)
            }
        }
    }
}

async fn record_sale(
    uow: &mut UnitOfWork,
    new_sale: NewSale,
    today: NaiveDate,
) -> ServiceResult<Sale> {
    let promotions = uow.active_promotions(today).await?;
    let index = PromotionIndex::build(today, &promotions);

    let raw_rate = uow.get_setting(TAX_RATE_KEY).await?;
    let tax_rate = resolve_tax_rate(raw_rate.as_deref());
    match &tax_rate.source {
        TaxRateSource::Configured { rounded: true } => {
            warn!(rate = %tax_rate.rate, "Tax rate had more than 2 decimal places; rounded");
        }
        TaxRateSource::Configured { rounded: false } => {}
        TaxRateSource::Missing => {
            warn!(key = TAX_RATE_KEY, "Tax rate setting missing; using 0%");
        }
        TaxRateSource::Malformed { raw, problem } => {
            warn!(key = TAX_RATE_KEY, raw = %raw, ?problem, "Tax rate setting unusable; using 0%");
        }
    }

    let totals = price_sale(&new_sale.lines, &index, new_sale.discount, tax_rate.rate);

    debug!(
        subtotal = %totals.subtotal,
        promotion_discount = %totals.promotion_discount,
        discount = %totals.discount_amount,
        tax = %totals.tax_amount,
        total = %totals.total_amount,
        promotions = index.len(),
        "Sale priced"
    );

    let mut sale = Sale {
        id: Uuid::new_v4().to_string(),
        user_name: new_sale.user_name,
        subtotal: totals.subtotal,
        promotion_discount_amount: totals.promotion_discount,
        discount_type: new_sale.discount.discount_type(),
        discount_value: new_sale.discount.value(),
        discount_amount: totals.discount_amount,
        tax_amount: totals.tax_amount,
        total_amount: totals.total_amount,
        created_at: Utc::now(),
        items: Vec::with_capacity(new_sale.lines.len()),
    };

    uow.insert_sale(&sale).await?;

    for (position, line) in new_sale.lines.iter().enumerate() {
        let product = uow
            .get_product(&line.product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

        if let StockDecrement::Insufficient { available } =
            uow.decrement_quantity(&product.id, line.quantity).await?
        {
            return Err(CoreError::InsufficientStock {
                product_id: product.id,
                product_name: product.name,
                available,
                requested: line.quantity,
            }
            .into());
        }

        let item = SaleItem {
            id: Uuid::new_v4().to_string(),
            sale_id: sale.id.clone(),
            position: position as i64,
            product_id: product.id,
            product_name: product.name,
            quantity: line.quantity,
            unit_price: line.unit_price,
            line_total: line.line_total(),
        };
        uow.insert_sale_item(&item).await?;
        sale.items.push(item);
    }

    Ok(sale)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::test_support::{file_db, line, new_promotion, seed_product, test_db, today};
    use rust_decimal::Decimal;
    use rxstock_core::{DiscountType, ManualDiscount, Money, Percentage, ValidationError};

    fn sale(lines: Vec<rxstock_core::CartLine>, discount: ManualDiscount) -> NewSale {
        NewSale {
            lines,
            discount,
            user_name: "pharmacist".to_string(),
        }
    }

    #[tokio::test]
    async fn test_plain_sale_with_tax() {
        let db = test_db().await;
        db.settings().set(TAX_RATE_KEY, "10").await.unwrap();
        let a = seed_product(&db, "Paracetamol 500mg", 1000, 10).await;

        let created = db
            .checkout()
            .create_sale(sale(vec![line(&a.id, 2, 1000)], ManualDiscount::None), today())
            .await
            .unwrap();

        assert_eq!(created.subtotal.to_string(), "20.00");
        assert_eq!(created.promotion_discount_amount, Money::zero());
        assert_eq!(created.discount_amount, Money::zero());
        assert_eq!(created.tax_amount.to_string(), "2.00");
        assert_eq!(created.total_amount.to_string(), "22.00");
        assert!(created.is_balanced());

        assert_eq!(created.items.len(), 1);
        assert_eq!(created.items[0].product_name, "Paracetamol 500mg");
        assert_eq!(created.items[0].unit_price.cents(), 1000);

        let reloaded = db.products().get_by_id(&a.id).await.unwrap().unwrap();
        assert_eq!(reloaded.quantity, 8);
    }

    #[tokio::test]
    async fn test_promotion_applied_before_tax() {
        let db = test_db().await;
        db.settings().set(TAX_RATE_KEY, "10").await.unwrap();
        let a = seed_product(&db, "Ibuprofen 400mg", 1000, 10).await;
        db.promotions()
            .create(&new_promotion("Pain relief", 2000, &[a.id.as_str()]))
            .await
            .unwrap();

        let created = db
            .checkout()
            .create_sale(sale(vec![line(&a.id, 2, 1000)], ManualDiscount::None), today())
            .await
            .unwrap();

        assert_eq!(created.promotion_discount_amount.to_string(), "4.00");
        assert_eq!(created.tax_amount.to_string(), "1.60");
        assert_eq!(created.total_amount.to_string(), "17.60");
    }

    #[tokio::test]
    async fn test_fixed_discount_clamps_to_price() {
        let db = test_db().await;
        db.settings().set(TAX_RATE_KEY, "10").await.unwrap();
        let a = seed_product(&db, "Glucose meter", 10000, 3).await;

        let created = db
            .checkout()
            .create_sale(
                sale(
                    vec![line(&a.id, 1, 10000)],
                    ManualDiscount::Fixed(Money::from_cents(15000)),
                ),
                today(),
            )
            .await
            .unwrap();

        assert_eq!(created.discount_type, DiscountType::Fixed);
        assert_eq!(created.discount_value, Decimal::new(15000, 2));
        assert_eq!(created.discount_amount.to_string(), "100.00");
        assert_eq!(created.tax_amount, Money::zero());
        assert_eq!(created.total_amount, Money::zero());
    }

    #[tokio::test]
    async fn test_missing_tax_rate_falls_back_to_zero() {
        let db = test_db().await;
        let a = seed_product(&db, "Bandages", 550, 10).await;

        let created = db
            .checkout()
            .create_sale(sale(vec![line(&a.id, 2, 550)], ManualDiscount::None), today())
            .await
            .unwrap();
        assert_eq!(created.tax_amount, Money::zero());
        assert_eq!(created.total_amount.cents(), 1100);

        db.settings().set(TAX_RATE_KEY, "ten percent").await.unwrap();
        let created = db
            .checkout()
            .create_sale(sale(vec![line(&a.id, 1, 550)], ManualDiscount::None), today())
            .await
            .unwrap();
        assert_eq!(created.tax_amount, Money::zero());
    }

    #[tokio::test]
    async fn test_shortage_rolls_back_everything() {
        let db = test_db().await;
        let a = seed_product(&db, "Amoxicillin 500mg", 1200, 5).await;
        let b = seed_product(&db, "Insulin pen", 4500, 2).await;

        let err = db
            .checkout()
            .create_sale(
                sale(
                    vec![line(&a.id, 2, 1200), line(&b.id, 3, 4500)],
                    ManualDiscount::None,
                ),
                today(),
            )
            .await
            .unwrap_err();

        match err {
            ServiceError::Core(CoreError::InsufficientStock {
                product_id,
                product_name,
                available,
                requested,
            }) => {
                assert_eq!(product_id, b.id);
                assert_eq!(product_name, "Insulin pen");
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        assert_eq!(db.sales().count().await.unwrap(), 0);
        let a_after = db.products().get_by_id(&a.id).await.unwrap().unwrap();
        assert_eq!(a_after.quantity, 5);
    }

    #[tokio::test]
    async fn test_duplicate_lines_draw_down_sequentially() {
        let db = test_db().await;
        let a = seed_product(&db, "Saline 0.9%", 300, 4).await;

        let err = db
            .checkout()
            .create_sale(
                sale(vec![line(&a.id, 3, 300), line(&a.id, 2, 300)], ManualDiscount::None),
                today(),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Core(CoreError::InsufficientStock { available: 1, requested: 2, .. })
        ));
        let after = db.products().get_by_id(&a.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 4);
    }

    #[tokio::test]
    async fn test_unknown_product_rejected() {
        let db = test_db().await;

        let err = db
            .checkout()
            .create_sale(sale(vec![line("missing", 1, 100)], ManualDiscount::None), today())
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Core(CoreError::ProductNotFound(ref id)) if id == "missing"));
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_input_rejected_before_persistence() {
        let db = test_db().await;
        let a = seed_product(&db, "Eye drops", 800, 5).await;

        let empty = db
            .checkout()
            .create_sale(sale(vec![], ManualDiscount::None), today())
            .await
            .unwrap_err();
        assert!(matches!(
            empty,
            ServiceError::Core(CoreError::Validation(ValidationError::Empty { .. }))
        ));

        let over = db
            .checkout()
            .create_sale(
                sale(
                    vec![line(&a.id, 1, 800)],
                    ManualDiscount::Percentage(Percentage::from_bps(10_001)),
                ),
                today(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            over,
            ServiceError::Core(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_huge_quantity_rejected_without_overflow() {
        let db = test_db().await;
        let a = seed_product(&db, "Omeprazole 20mg", 1100, 5).await;

        let err = db
            .checkout()
            .create_sale(
                sale(vec![line(&a.id, 10_000_000_000_000, 9_999_999)], ManualDiscount::None),
                today(),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Core(CoreError::Validation(ValidationError::OutOfRange { ref field, .. }))
                if field == "items[0].quantity"
        ));
        assert_eq!(db.sales().count().await.unwrap(), 0);
        let after = db.products().get_by_id(&a.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 5);
    }

    #[tokio::test]
    async fn test_round_trip_and_listing() {
        let db = test_db().await;
        db.settings().set(TAX_RATE_KEY, "8.25").await.unwrap();
        let a = seed_product(&db, "Vitamin D3", 1299, 20).await;
        let b = seed_product(&db, "Zinc 50mg", 499, 20).await;

        let first = db
            .checkout()
            .create_sale(
                sale(
                    vec![line(&b.id, 3, 499), line(&a.id, 1, 1299)],
                    ManualDiscount::Percentage(Percentage::from_bps(1000)),
                ),
                today(),
            )
            .await
            .unwrap();

        let reloaded = db.sales().get_by_id(&first.id).await.unwrap().unwrap();
        assert_eq!(reloaded.items, first.items);
        assert_eq!(reloaded.subtotal, first.subtotal);
        assert_eq!(reloaded.discount_amount, first.discount_amount);
        assert_eq!(reloaded.tax_amount, first.tax_amount);
        assert_eq!(reloaded.total_amount, first.total_amount);
        assert_eq!(reloaded.discount_value, Decimal::new(1000, 2));
        assert_eq!(reloaded.items[0].product_name, "Zinc 50mg");
        assert_eq!(reloaded.items[1].position, 1);
        assert!(reloaded.is_balanced());

        let second = db
            .checkout()
            .create_sale(sale(vec![line(&a.id, 1, 1299)], ManualDiscount::None), today())
            .await
            .unwrap();

        let recent = db.sales().list_recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, second.id);
        assert_eq!(recent[1].items.len(), 2);
        assert!(db.sales().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_sales_cannot_oversell() {
        let dir = tempfile::tempdir().unwrap();
        let db = file_db(&dir).await;
        let a = seed_product(&db, "Epinephrine auto-injector", 9000, 5).await;

        let spawn_sale = |db: Database, product_id: String| {
            tokio::spawn(async move {
                db.checkout()
                    .create_sale(
                        sale(vec![line(&product_id, 3, 9000)], ManualDiscount::None),
                        today(),
                    )
                    .await
            })
        };

        let first = spawn_sale(db.clone(), a.id.clone());
        let second = spawn_sale(db.clone(), a.id.clone());
        let results = [first.await.unwrap(), second.await.unwrap()];

        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(succeeded, 1);
        assert!(results.iter().any(|r| matches!(
            r,
            Err(ServiceError::Core(CoreError::InsufficientStock { available: 2, requested: 3, .. }))
        )));

        let after = db.products().get_by_id(&a.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 2);
        assert_eq!(db.sales().count().await.unwrap(), 1);
        db.close().await;
    }
}
