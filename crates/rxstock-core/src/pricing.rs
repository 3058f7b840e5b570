//! # Sale Pricing
//!
//! Computes every monetary field of a sale from the cart, the promotion
//! index, the manual discount and the tax rate.
//!
//! ## Order of Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. subtotal            = Σ unit_price × quantity            (exact)   │
//! │  2. promotion_discount  = Σ line × promo%                    (round)   │
//! │  3. after_promotions    = subtotal - promotion_discount                 │
//! │  4. discount_amount     = min(after_promotions, manual)      (round %) │
//! │  5. taxable             = after_promotions - discount_amount            │
//! │  6. tax                 = taxable × tax_rate                 (round)   │
//! │  7. total               = taxable + tax                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each derived amount is rounded once, half-to-even, where it is computed.
//! Later steps consume the rounded value, so
//! `total = subtotal - promotion_discount - discount_amount + tax` holds to
//! the cent.

use crate::money::Money;
use crate::promotion::PromotionIndex;
use crate::types::{CartLine, ManualDiscount, Percentage};

/// The computed monetary fields of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub promotion_discount: Money,
    pub discount_amount: Money,
    pub taxable_amount: Money,
    pub tax_amount: Money,
    pub total_amount: Money,
}

impl SaleTotals {
    /// Price after automatic promotions, before the manual discount.
    pub fn price_after_promotions(&self) -> Money {
        self.subtotal - self.promotion_discount
    }
}

/// Prices a validated cart.
///
/// Inputs are assumed valid (non-negative prices, percentages within
/// 0-100); see [`crate::validation::validate_cart`].
///
/// ```rust
/// use chrono::NaiveDate;
/// use rxstock_core::money::Money;
/// use rxstock_core::pricing::price_sale;
/// use rxstock_core::promotion::PromotionIndex;
/// use rxstock_core::types::{CartLine, ManualDiscount, Percentage};
///
/// let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
/// let lines = vec![CartLine { product_id: "A".into(), quantity: 2, unit_price: Money::from_cents(1000) }];
/// let index = PromotionIndex::build(today, &[]);
///
/// let totals = price_sale(&lines, &index, ManualDiscount::None, Percentage::from_bps(1000));
/// assert_eq!(totals.subtotal.cents(), 2000);
/// assert_eq!(totals.tax_amount.cents(), 200);
/// assert_eq!(totals.total_amount.cents(), 2200);
/// ```
pub fn price_sale(
    lines: &[CartLine],
    promotions: &PromotionIndex<'_>,
    discount: ManualDiscount,
    tax_rate: Percentage,
) -> SaleTotals {
    let subtotal: Money = lines.iter().map(CartLine::line_total).sum();

    let promotion_discount = promotions.discount_for(lines);
    let after_promotions = subtotal - promotion_discount;

    let discount_amount = discount.amount_on(after_promotions).min(after_promotions);
    let taxable_amount = after_promotions - discount_amount;

    let tax_amount = taxable_amount.percent_of(tax_rate);
    let total_amount = taxable_amount + tax_amount;

    SaleTotals {
        subtotal,
        promotion_discount,
        discount_amount,
        taxable_amount,
        tax_amount,
        total_amount,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Promotion, PromotionKind};
    use chrono::{NaiveDate, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn line(product: &str, quantity: i64, cents: i64) -> CartLine {
        CartLine {
            product_id: product.to_string(),
            quantity,
            unit_price: Money::from_cents(cents),
        }
    }

    fn promo_on(product: &str, bps: u32) -> Promotion {
        Promotion {
            id: format!("promo-{product}"),
            name: "Promo".to_string(),
            description: String::new(),
            promotion_type: PromotionKind::ProductPercentage,
            value: Percentage::from_bps(bps),
            start_date: today(),
            end_date: today(),
            is_active: true,
            product_ids: vec![product.to_string()],
            created_at: Utc::now(),
        }
    }

    fn assert_balanced(totals: &SaleTotals) {
        assert_eq!(
            totals.total_amount,
            totals.subtotal - totals.promotion_discount - totals.discount_amount + totals.tax_amount
        );
        assert!(totals.discount_amount <= totals.price_after_promotions());
    }

    #[test]
    fn test_no_promotion_no_discount_with_tax() {
        let index = PromotionIndex::build(today(), &[]);
        let totals = price_sale(
            &[line("A", 2, 1000)],
            &index,
            ManualDiscount::None,
            Percentage::from_bps(1000),
        );

        assert_eq!(totals.subtotal.cents(), 2000);
        assert_eq!(totals.promotion_discount.cents(), 0);
        assert_eq!(totals.discount_amount.cents(), 0);
        assert_eq!(totals.tax_amount.cents(), 200);
        assert_eq!(totals.total_amount.cents(), 2200);
        assert_balanced(&totals);
    }

    #[test]
    fn test_promotion_reduces_taxable_amount() {
        let promos = vec![promo_on("A", 2000)];
        let index = PromotionIndex::build(today(), &promos);
        let totals = price_sale(
            &[line("A", 2, 1000)],
            &index,
            ManualDiscount::None,
            Percentage::from_bps(1000),
        );

        assert_eq!(totals.promotion_discount.cents(), 400);
        assert_eq!(totals.taxable_amount.cents(), 1600);
        assert_eq!(totals.tax_amount.cents(), 160);
        assert_eq!(totals.total_amount.cents(), 1760);
        assert_balanced(&totals);
    }

    #[test]
    fn test_fixed_discount_clamps_to_price_after_promotions() {
        let index = PromotionIndex::build(today(), &[]);
        let totals = price_sale(
            &[line("A", 1, 10_000)],
            &index,
            ManualDiscount::Fixed(Money::from_cents(15_000)),
            Percentage::from_bps(1000),
        );

        assert_eq!(totals.discount_amount.cents(), 10_000);
        assert!(totals.taxable_amount.is_zero());
        assert!(totals.tax_amount.is_zero());
        assert!(totals.total_amount.is_zero());
        assert_balanced(&totals);
    }

    #[test]
    fn test_percentage_discount_applies_after_promotions() {
        let promos = vec![promo_on("A", 1000)];
        let index = PromotionIndex::build(today(), &promos);
        let totals = price_sale(
            &[line("A", 1, 10_000), line("B", 1, 5_000)],
            &index,
            ManualDiscount::Percentage(Percentage::from_bps(1000)),
            Percentage::zero(),
        );

        // 150.00 - 10.00 promo = 140.00; 10% manual = 14.00
        assert_eq!(totals.promotion_discount.cents(), 1_000);
        assert_eq!(totals.discount_amount.cents(), 1_400);
        assert_eq!(totals.total_amount.cents(), 12_600);
        assert_balanced(&totals);
    }

    #[test]
    fn test_each_step_rounds_half_even() {
        let index = PromotionIndex::build(today(), &[]);
        // 0.25 × 10% manual = 0.025 → 0.02; taxable 0.23 × 50% = 0.115 → 0.12
        let totals = price_sale(
            &[line("A", 1, 25)],
            &index,
            ManualDiscount::Percentage(Percentage::from_bps(1000)),
            Percentage::from_bps(5000),
        );

        assert_eq!(totals.discount_amount.cents(), 2);
        assert_eq!(totals.taxable_amount.cents(), 23);
        assert_eq!(totals.tax_amount.cents(), 12);
        assert_eq!(totals.total_amount.cents(), 35);
        assert_balanced(&totals);
    }

    #[test]
    fn test_full_percentage_discount_zeroes_total() {
        let index = PromotionIndex::build(today(), &[]);
        let totals = price_sale(
            &[line("A", 3, 333)],
            &index,
            ManualDiscount::Percentage(Percentage::HUNDRED),
            Percentage::from_bps(825),
        );
        assert!(totals.total_amount.is_zero());
        assert_balanced(&totals);
    }
}
