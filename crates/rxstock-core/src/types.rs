//! # Domain Types
//!
//! Core domain types used throughout RxStock.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Supplier     │◄──│    Product      │◄──│  RestockEntry   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  quantity_added │       │
//! │  │  email (unique) │   │  batch, expiry  │   │  cost_per_unit  │       │
//! │  └─────────────────┘   │  price, qty     │   └─────────────────┘       │
//! │                        └────────▲────────┘                              │
//! │                                 │ covers (M:N)                          │
//! │  ┌─────────────────┐   ┌────────┴────────┐   ┌─────────────────┐       │
//! │  │      Sale       │──►│    Promotion    │   │    Setting      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  totals         │   │  value (%)      │   │  key → value    │       │
//! │  │  items[]        │   │  window, active │   │  "tax_rate"     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every entity uses a UUID v4 string as its identity. Request types
//! (`New*`, `*Input`) live at the bottom of this file.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::money::Money;

/// Basis points in 100%.
pub const BPS_PER_WHOLE: u32 = 10_000;

// =============================================================================
// Percentage
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// 1 basis point = 0.01%, so `825` is 8.25% and `10_000` is 100%.
/// Used for promotion values, manual percentage discounts and the tax rate.
///
/// Serializes like [`Money`]: a two-place decimal string (`"8.25"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Percentage(u32);

impl Percentage {
    /// 100%.
    pub const HUNDRED: Percentage = Percentage(BPS_PER_WHOLE);

    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percentage(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Percentage(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Converts a decimal percentage (`20`, `8.25`) to basis points.
    ///
    /// Returns `None` for negative values or more than two decimal places.
    /// The 0-100 range is a validation concern and is not checked here.
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        if value < Decimal::ZERO || value.round_dp(2) != value {
            return None;
        }
        value
            .checked_mul(Decimal::ONE_HUNDRED)?
            .to_u32()
            .map(Percentage)
    }

    /// Returns the percentage as a decimal with two places.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0 as i64, 2)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Percentage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Percentage::from_decimal(value).ok_or_else(|| {
            D::Error::custom(format!(
                "invalid percentage {value}: must be non-negative with at most 2 decimal places"
            ))
        })
    }
}

// =============================================================================
// Supplier
// =============================================================================

/// A company products are bought from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact_person: Option<String>,
    /// Unique across suppliers.
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A stocked product (one batch of a medicine or retail item).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Supplier this product is bought from.
    #[serde(rename = "supplier")]
    pub supplier_id: String,

    /// Display name shown to the cashier and on the sale.
    pub name: String,

    pub category: String,

    /// Manufacturer batch number. May be empty.
    pub batch_number: String,

    pub expiry_date: NaiveDate,

    /// Unit label ("Tablets", "ml", "Strips", ...).
    pub unit: String,

    /// Shelf price.
    pub price: Money,

    /// Units on hand. Never negative.
    pub quantity: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Checks whether `requested` units can be taken from stock.
    #[inline]
    pub fn has_stock_for(&self, requested: i64) -> bool {
        self.quantity >= requested
    }

    /// Checks whether the batch is past its expiry date on `today`.
    #[inline]
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        self.expiry_date < today
    }
}

// =============================================================================
// Restock Entry
// =============================================================================

/// One restocking event: units added to a product's stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct RestockEntry {
    pub id: String,
    #[serde(rename = "product")]
    pub product_id: String,
    /// Product name at read time (joined, not stored).
    pub product_name: String,
    #[serde(rename = "supplier")]
    pub supplier_id: Option<String>,
    pub user_name: Option<String>,
    pub quantity_added: i64,
    pub cost_per_unit: Money,
    pub notes: String,
    pub restocked_at: DateTime<Utc>,
}

// =============================================================================
// Promotion
// =============================================================================

/// The kind of automatic promotion.
///
/// Only `product_percentage` exists today: a percentage off the line total
/// of every covered product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PromotionKind {
    #[default]
    ProductPercentage,
}

/// An automatic, catalog-driven discount.
///
/// ## Applicability
/// ```text
/// is_active ── AND ── start_date <= today <= end_date ── AND ── product ∈ product_ids
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Promotion {
    pub id: String,
    pub name: String,
    pub description: String,
    pub promotion_type: PromotionKind,
    /// Percentage off, 0-100.
    pub value: Percentage,
    pub start_date: NaiveDate,
    /// Inclusive.
    pub end_date: NaiveDate,
    pub is_active: bool,
    #[serde(rename = "products")]
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub product_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Promotion {
    /// Checks the active flag and the inclusive date window.
    pub fn is_running_on(&self, today: NaiveDate) -> bool {
        self.is_active && self.start_date <= today && today <= self.end_date
    }

    pub fn covers(&self, product_id: &str) -> bool {
        self.product_ids.iter().any(|id| id == product_id)
    }
}

// =============================================================================
// Manual Discount
// =============================================================================

/// Persisted tag of the manual discount on a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    #[default]
    None,
    Percentage,
    Fixed,
}

/// Operator-chosen discount applied after promotions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManualDiscount {
    #[default]
    None,
    /// Percentage of the price after promotions.
    Percentage(Percentage),
    /// Fixed amount, clamped to the price after promotions.
    Fixed(Money),
}

impl ManualDiscount {
    pub fn discount_type(&self) -> DiscountType {
        match self {
            ManualDiscount::None => DiscountType::None,
            ManualDiscount::Percentage(_) => DiscountType::Percentage,
            ManualDiscount::Fixed(_) => DiscountType::Fixed,
        }
    }

    /// The raw entered value in hundredths (bps for percentages, cents for
    /// fixed amounts). This is the persisted representation.
    pub fn value_hundredths(&self) -> i64 {
        match self {
            ManualDiscount::None => 0,
            ManualDiscount::Percentage(pct) => pct.bps() as i64,
            ManualDiscount::Fixed(amount) => amount.cents(),
        }
    }

    /// The raw entered value as a two-place decimal (`"20.00"`).
    pub fn value(&self) -> Decimal {
        Decimal::new(self.value_hundredths(), 2)
    }

    /// Rebuilds a discount from its persisted parts.
    pub fn from_parts(discount_type: DiscountType, hundredths: i64) -> Option<Self> {
        match discount_type {
            DiscountType::None => Some(ManualDiscount::None),
            DiscountType::Percentage => u32::try_from(hundredths)
                .ok()
                .map(|bps| ManualDiscount::Percentage(Percentage::from_bps(bps))),
            DiscountType::Fixed => Some(ManualDiscount::Fixed(Money::from_cents(hundredths))),
        }
    }

    /// Amount this discount takes off `base`, before clamping.
    pub fn amount_on(&self, base: Money) -> Money {
        match self {
            ManualDiscount::None => Money::zero(),
            ManualDiscount::Percentage(pct) => base.percent_of(*pct),
            ManualDiscount::Fixed(amount) => *amount,
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A completed point-of-sale transaction. Immutable once created.
///
/// ## Totals
/// ```text
/// total_amount = subtotal - promotion_discount_amount - discount_amount + tax_amount
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    /// Who rang up the sale.
    pub user_name: String,
    pub subtotal: Money,
    pub promotion_discount_amount: Money,
    pub discount_type: DiscountType,
    /// Raw value entered for the manual discount (percent or amount).
    pub discount_value: Decimal,
    /// Manual discount actually applied.
    pub discount_amount: Money,
    pub tax_amount: Money,
    pub total_amount: Money,
    pub created_at: DateTime<Utc>,
    pub items: Vec<SaleItem>,
}

impl Sale {
    /// Checks the total invariant.
    pub fn is_balanced(&self) -> bool {
        self.total_amount
            == self.subtotal - self.promotion_discount_amount - self.discount_amount
                + self.tax_amount
    }
}

/// One line of a sale. Name and price are snapshots taken at sale time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    /// Zero-based position of the line within the sale.
    pub position: i64,
    #[serde(rename = "product")]
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

// =============================================================================
// Setting
// =============================================================================

/// A key/value configuration entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Setting {
    pub key: String,
    pub value: String,
}

// =============================================================================
// Requests
// =============================================================================

/// A validated cart line, ready for pricing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: Money,
}

impl CartLine {
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// A validated sale request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSale {
    pub lines: Vec<CartLine>,
    pub discount: ManualDiscount,
    pub user_name: String,
}

/// A cart line exactly as submitted by a client.
///
/// Fields are optional so that missing values are reported by name
/// instead of as a generic decoding failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CartLineInput {
    #[serde(alias = "product_id")]
    pub product: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price: Option<Decimal>,
}

/// A sale request exactly as submitted by a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleInput {
    #[serde(default)]
    pub items: Vec<CartLineInput>,
    #[serde(default)]
    pub discount_type: DiscountType,
    #[serde(default)]
    pub discount_value: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    #[serde(default)]
    pub contact_person: Option<String>,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    #[serde(alias = "supplier")]
    pub supplier_id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub batch_number: String,
    pub expiry_date: NaiveDate,
    pub unit: String,
    pub price: Money,
    /// Opening stock.
    #[serde(default)]
    pub quantity: i64,
}

/// Editable product details. Stock is only changed by restocks and sales.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductUpdate {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub batch_number: String,
    pub expiry_date: NaiveDate,
    pub unit: String,
    pub price: Money,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestockRequest {
    pub quantity_added: i64,
    #[serde(default, alias = "supplier")]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub cost_per_unit: Money,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPromotion {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub promotion_type: PromotionKind,
    pub value: Percentage,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, alias = "products")]
    pub product_ids: Vec<String>,
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn promotion(is_active: bool) -> Promotion {
        Promotion {
            id: "promo-1".to_string(),
            name: "Winter".to_string(),
            description: String::new(),
            promotion_type: PromotionKind::ProductPercentage,
            value: Percentage::from_bps(2000),
            start_date: date(2026, 1, 1),
            end_date: date(2026, 1, 31),
            is_active,
            product_ids: vec!["a".to_string()],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_percentage_from_decimal() {
        assert_eq!(Percentage::from_decimal(Decimal::new(825, 2)), Some(Percentage::from_bps(825)));
        assert_eq!(Percentage::from_decimal(Decimal::new(20, 0)), Some(Percentage::from_bps(2000)));
        assert_eq!(Percentage::from_decimal(Decimal::new(-1, 0)), None);
        assert_eq!(Percentage::from_decimal(Decimal::new(8125, 3)), None);
        assert_eq!(Percentage::from_bps(825).to_string(), "8.25");
        assert_eq!(Percentage::from_decimal(Decimal::from_str("-0.00").unwrap()), Some(Percentage::zero()));
    }

    #[test]
    fn test_percentage_json() {
        let pct: Percentage = serde_json::from_str("\"8.25\"").unwrap();
        assert_eq!(pct.bps(), 825);
        let whole: Percentage = serde_json::from_str("20").unwrap();
        assert_eq!(whole.bps(), 2000);
        assert_eq!(serde_json::to_string(&whole).unwrap(), "\"20.00\"");

        assert!(serde_json::from_str::<Percentage>("\"-5\"").is_err());
        assert!(serde_json::from_str::<Percentage>("\"8.125\"").is_err());
    }

    #[test]
    fn test_promotion_window_is_inclusive() {
        let promo = promotion(true);
        assert!(promo.is_running_on(date(2026, 1, 1)));
        assert!(promo.is_running_on(date(2026, 1, 31)));
        assert!(!promo.is_running_on(date(2026, 2, 1)));
        assert!(!promotion(false).is_running_on(date(2026, 1, 15)));
        assert!(promo.covers("a"));
        assert!(!promo.covers("b"));
    }

    #[test]
    fn test_manual_discount_parts() {
        let pct = ManualDiscount::Percentage(Percentage::from_bps(2000));
        assert_eq!(pct.discount_type(), DiscountType::Percentage);
        assert_eq!(pct.value().to_string(), "20.00");
        assert_eq!(ManualDiscount::from_parts(DiscountType::Percentage, 2000), Some(pct));

        let fixed = ManualDiscount::Fixed(Money::from_cents(15000));
        assert_eq!(fixed.amount_on(Money::from_cents(100)).cents(), 15000);
        assert_eq!(ManualDiscount::None.value().to_string(), "0.00");
    }

    #[test]
    fn test_discount_type_serde() {
        assert_eq!(serde_json::to_string(&DiscountType::Fixed).unwrap(), "\"fixed\"");
        let parsed: DiscountType = serde_json::from_str("\"percentage\"").unwrap();
        assert_eq!(parsed, DiscountType::Percentage);
        assert_eq!(
            serde_json::to_string(&PromotionKind::ProductPercentage).unwrap(),
            "\"product_percentage\""
        );
    }

    #[test]
    fn test_sale_item_serializes_product_reference() {
        let item = SaleItem {
            id: "i".to_string(),
            sale_id: "s".to_string(),
            position: 0,
            product_id: "p".to_string(),
            product_name: "Paracetamol".to_string(),
            quantity: 2,
            unit_price: Money::from_cents(1000),
            line_total: Money::from_cents(2000),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["product"], "p");
        assert_eq!(json["unit_price"], "10.00");
    }
}
