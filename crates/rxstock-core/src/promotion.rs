//! # Promotion Resolver
//!
//! Picks at most one automatic promotion per product and turns it into a
//! discount over the cart.
//!
//! ## Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  promotions (any set)          today                                    │
//! │       │                          │                                      │
//! │       ▼                          ▼                                      │
//! │  keep: is_active && start_date <= today <= end_date                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  for each covered product id:                                           │
//! │       keep the promotion that ranks first by                            │
//! │         1. highest value                                                │
//! │         2. latest start_date                                            │
//! │         3. smallest promotion id                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PromotionIndex { product_id → &Promotion }                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The ranking is total, so the chosen promotion never depends on the order
//! the store returned rows in.
//!
//! ## Discount
//! Each covered line contributes `line_total × value`. The contributions are
//! summed exactly (in cent·basis-point units) and rounded to the cent once,
//! half-to-even. Resolution cannot fail; an empty promotion set simply yields
//! a zero discount.

use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::money::{div_round_half_even, Money};
use crate::types::{CartLine, Promotion, PromotionKind, BPS_PER_WHOLE};

// =============================================================================
// Promotion Index
// =============================================================================

/// Map from product id to the single promotion that applies to it today.
#[derive(Debug, Default)]
pub struct PromotionIndex<'a> {
    by_product: HashMap<&'a str, &'a Promotion>,
}

impl<'a> PromotionIndex<'a> {
    /// Builds the index for `today`.
    ///
    /// Promotions that are inactive or outside their window are ignored, so
    /// callers may pass a superset of the running promotions.
    pub fn build(today: NaiveDate, promotions: &'a [Promotion]) -> Self {
        let mut by_product: HashMap<&'a str, &'a Promotion> = HashMap::new();

        for promotion in promotions.iter().filter(|p| p.is_running_on(today)) {
            for product_id in &promotion.product_ids {
                by_product
                    .entry(product_id.as_str())
                    .and_modify(|current| {
                        if outranks(promotion, *current) {
                            *current = promotion;
                        }
                    })
                    .or_insert(promotion);
            }
        }

        PromotionIndex { by_product }
    }

    /// Returns the promotion covering `product_id`, if any.
    pub fn promotion_for(&self, product_id: &str) -> Option<&'a Promotion> {
        self.by_product.get(product_id).copied()
    }

    /// Number of products covered.
    pub fn len(&self) -> usize {
        self.by_product.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_product.is_empty()
    }

    /// Total automatic discount over `lines`, rounded once to the cent.
    ///
    /// ```rust
    /// use chrono::{NaiveDate, Utc};
    /// use rxstock_core::money::Money;
    /// use rxstock_core::promotion::PromotionIndex;
    /// use rxstock_core::types::{CartLine, Percentage, Promotion, PromotionKind};
    ///
    /// let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    /// let promos = vec![Promotion {
    ///     id: "p1".into(),
    ///     name: "Spring".into(),
    ///     description: String::new(),
    ///     promotion_type: PromotionKind::ProductPercentage,
    ///     value: Percentage::from_bps(2000),
    ///     start_date: today,
    ///     end_date: today,
    ///     is_active: true,
    ///     product_ids: vec!["A".into()],
    ///     created_at: Utc::now(),
    /// }];
    /// let lines = vec![CartLine { product_id: "A".into(), quantity: 2, unit_price: Money::from_cents(1000) }];
    ///
    /// let index = PromotionIndex::build(today, &promos);
    /// assert_eq!(index.discount_for(&lines).cents(), 400);
    /// ```
    pub fn discount_for(&self, lines: &[CartLine]) -> Money {
        let scaled: i128 = lines
            .iter()
            .map(|line| self.scaled_line_discount(line))
            .sum();

        Money::from_cents(div_round_half_even(scaled, BPS_PER_WHOLE as i128) as i64)
    }

    /// Line discount in cent·bps, unrounded.
    fn scaled_line_discount(&self, line: &CartLine) -> i128 {
        match self.promotion_for(&line.product_id) {
            Some(promotion) => match promotion.promotion_type {
                PromotionKind::ProductPercentage => {
                    line.line_total().cents() as i128 * promotion.value.bps() as i128
                }
            },
            None => 0,
        }
    }
}

/// Whether `candidate` should replace `current` for a product.
fn outranks(candidate: &Promotion, current: &Promotion) -> bool {
    let ordering = candidate
        .value
        .cmp(&current.value)
        .then_with(|| candidate.start_date.cmp(&current.start_date))
        .then_with(|| current.id.cmp(&candidate.id));

    ordering == Ordering::Greater
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Percentage;
    use chrono::Utc;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    fn promo(id: &str, bps: u32, start: u32, end: u32, products: &[&str]) -> Promotion {
        Promotion {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            promotion_type: PromotionKind::ProductPercentage,
            value: Percentage::from_bps(bps),
            start_date: date(start),
            end_date: date(end),
            is_active: true,
            product_ids: products.iter().map(|p| p.to_string()).collect(),
            created_at: Utc::now(),
        }
    }

    fn line(product: &str, quantity: i64, cents: i64) -> CartLine {
        CartLine {
            product_id: product.to_string(),
            quantity,
            unit_price: Money::from_cents(cents),
        }
    }

    #[test]
    fn test_empty_promotions_give_zero_discount() {
        let index = PromotionIndex::build(date(10), &[]);
        assert!(index.is_empty());
        assert!(index.discount_for(&[line("A", 2, 1000)]).is_zero());
    }

    #[test]
    fn test_single_promotion_applies_to_covered_lines_only() {
        let promos = vec![promo("p1", 2000, 1, 31, &["A"])];
        let index = PromotionIndex::build(date(10), &promos);

        let lines = vec![line("A", 2, 1000), line("B", 1, 500)];
        assert_eq!(index.discount_for(&lines).cents(), 400);
    }

    #[test]
    fn test_window_and_active_flag_respected() {
        let mut inactive = promo("p1", 5000, 1, 31, &["A"]);
        inactive.is_active = false;
        let promos = vec![inactive, promo("p2", 5000, 20, 31, &["A"])];

        let index = PromotionIndex::build(date(10), &promos);
        assert!(index.promotion_for("A").is_none());

        // End date is inclusive
        let index = PromotionIndex::build(date(31), &promos);
        assert_eq!(index.promotion_for("A").map(|p| p.id.as_str()), Some("p2"));
    }

    #[test]
    fn test_empty_product_set_participates_in_nothing() {
        let promos = vec![promo("p1", 5000, 1, 31, &[])];
        let index = PromotionIndex::build(date(10), &promos);
        assert!(index.is_empty());
    }

    #[test]
    fn test_tie_break_highest_value_wins() {
        let promos = vec![promo("p1", 1000, 1, 31, &["A"]), promo("p2", 2500, 1, 31, &["A"])];
        let index = PromotionIndex::build(date(10), &promos);
        assert_eq!(index.promotion_for("A").unwrap().id, "p2");
    }

    #[test]
    fn test_tie_break_latest_start_then_smallest_id() {
        let promos = vec![
            promo("p3", 2000, 1, 31, &["A"]),
            promo("p2", 2000, 5, 31, &["A"]),
            promo("p1", 2000, 5, 31, &["A"]),
        ];
        let index = PromotionIndex::build(date(10), &promos);
        assert_eq!(index.promotion_for("A").unwrap().id, "p1");

        // Same result whatever the input order
        let reversed: Vec<Promotion> = promos.into_iter().rev().collect();
        let index = PromotionIndex::build(date(10), &reversed);
        assert_eq!(index.promotion_for("A").unwrap().id, "p1");
    }

    #[test]
    fn test_discount_rounded_once_over_sum() {
        // Two lines of 0.25 at 10%: each 0.025, sum 0.05 exactly
        let promos = vec![promo("p1", 1000, 1, 31, &["A", "B"])];
        let index = PromotionIndex::build(date(10), &promos);
        let lines = vec![line("A", 1, 25), line("B", 1, 25)];
        assert_eq!(index.discount_for(&lines).cents(), 5);

        // Single line of 0.25 at 10% = 0.025 → 0.02 (half to even)
        assert_eq!(index.discount_for(&[line("A", 1, 25)]).cents(), 2);
    }
}
