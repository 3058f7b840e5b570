//! # Validation Module
//!
//! Input validation for RxStock. Everything here runs before any database
//! work, so a rejected request never leaves partial state behind.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: JSON decoding (serde)                                         │
//! │  └── Types, enum tags, dates                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Required fields, lengths                                           │
//! │  ├── Quantities >= 1, prices >= 0, at most 2 decimal places            │
//! │  └── Percentages within 0-100, date windows                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                        │
//! │  ├── CHECK (quantity >= 0)                                              │
//! │  ├── UNIQUE (suppliers.email)                                           │
//! │  └── Foreign keys (product → supplier, promotion → products)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rxstock_core::validation::{validate_quantity, validate_sale_input};
//! use rxstock_core::types::SaleInput;
//!
//! assert!(validate_quantity("quantity", 5).is_ok());
//!
//! // An empty cart is rejected with the field name
//! let err = validate_sale_input(&SaleInput::default(), "alice").unwrap_err();
//! assert_eq!(err.field(), "items");
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{
    CartLine, CartLineInput, DiscountType, ManualDiscount, NewProduct, NewPromotion, NewSale,
    NewSupplier, Percentage, ProductUpdate, RestockRequest, SaleInput,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length for names and other short text fields.
pub const MAX_TEXT_LEN: usize = 200;

/// Decimal places allowed on money and percentage inputs.
pub const MAX_DECIMAL_PLACES: u32 = 2;

/// Largest quantity accepted on a cart line, a restock or a stock level.
pub const MAX_QUANTITY: i64 = 1_000_000;

/// Largest price, cost or fixed discount accepted, in whole currency units.
pub const MAX_AMOUNT_UNITS: i64 = 10_000_000;

/// Most lines a single sale may carry.
///
/// With the quantity and amount ceilings this keeps every sale total well
/// inside `i64` cents.
pub const MAX_CART_LINES: usize = 1_000;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required, bounded text field.
///
/// ```rust
/// use rxstock_core::validation::validate_required_text;
///
/// assert!(validate_required_text("name", "Paracetamol 500mg", 200).is_ok());
/// assert!(validate_required_text("name", "   ", 200).is_err());
/// ```
pub fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates an email address (loosely: `local@domain`).
pub fn validate_email(email: &str) -> ValidationResult<()> {
    validate_required_text("email", email, 254)?;

    match email.trim().split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@domain".to_string(),
        }),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity in `1..=MAX_QUANTITY`.
pub fn validate_quantity(field: &str, qty: i64) -> ValidationResult<()> {
    if qty < 1 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    if qty > MAX_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a stock level in `0..=MAX_QUANTITY`.
pub fn validate_stock_level(field: &str, qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    if qty > MAX_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a price or cost in `0..=MAX_AMOUNT_UNITS`. Zero is allowed
/// (free items).
pub fn validate_price(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    if amount.cents() > MAX_AMOUNT_UNITS * 100 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_UNITS,
        });
    }
    Ok(())
}

fn validate_line_count(count: usize) -> ValidationResult<()> {
    if count > MAX_CART_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_CART_LINES as i64,
        });
    }
    Ok(())
}

/// Validates a percentage within 0-100.
pub fn validate_percentage(field: &str, pct: Percentage) -> ValidationResult<()> {
    if pct > Percentage::HUNDRED {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 100,
        });
    }
    Ok(())
}

/// Converts a decimal amount to [`Money`], rejecting extra decimal places.
///
/// ```rust
/// use rust_decimal::Decimal;
/// use rxstock_core::validation::money_from_decimal;
///
/// assert_eq!(money_from_decimal("unit_price", Decimal::new(1050, 2)).unwrap().cents(), 1050);
/// assert!(money_from_decimal("unit_price", Decimal::new(10505, 3)).is_err());
/// ```
pub fn money_from_decimal(field: &str, value: Decimal) -> ValidationResult<Money> {
    if value.round_dp(MAX_DECIMAL_PLACES) != value {
        return Err(ValidationError::TooManyDecimalPlaces {
            field: field.to_string(),
            max: MAX_DECIMAL_PLACES,
        });
    }

    Money::from_decimal(value).ok_or_else(|| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "amount is too large".to_string(),
    })
}

/// Converts a decimal percentage to [`Percentage`], enforcing 0-100 and
/// two decimal places.
pub fn percentage_from_decimal(field: &str, value: Decimal) -> ValidationResult<Percentage> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 100,
        });
    }

    if value.round_dp(MAX_DECIMAL_PLACES) != value {
        return Err(ValidationError::TooManyDecimalPlaces {
            field: field.to_string(),
            max: MAX_DECIMAL_PLACES,
        });
    }

    // In range and at most two places, so conversion cannot fail
    Percentage::from_decimal(value).ok_or_else(|| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "not a percentage".to_string(),
    })
}

/// Validates an inclusive `[start, end]` date window.
pub fn validate_date_window(start: NaiveDate, end: NaiveDate) -> ValidationResult<()> {
    if start > end {
        return Err(ValidationError::InvalidOrder {
            first: "start_date".to_string(),
            second: "end_date".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Sale Validators
// =============================================================================

/// Validates an already-typed cart.
///
/// ## Rules
/// - At least one line
/// - At most [`MAX_CART_LINES`] lines
/// - Every line has a product id, quantity in `1..=MAX_QUANTITY` and a unit
///   price in `0..=MAX_AMOUNT_UNITS`
///
/// Duplicate product ids are allowed; each line is checked against stock
/// as it is applied.
pub fn validate_cart(lines: &[CartLine]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }
    validate_line_count(lines.len())?;

    for (index, line) in lines.iter().enumerate() {
        if line.product_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: format!("items[{index}].product"),
            });
        }
        validate_quantity(&format!("items[{index}].quantity"), line.quantity)?;
        validate_price(&format!("items[{index}].unit_price"), line.unit_price)?;
    }

    Ok(())
}

/// Validates a typed manual discount.
pub fn validate_manual_discount(discount: &ManualDiscount) -> ValidationResult<()> {
    match discount {
        ManualDiscount::None => Ok(()),
        ManualDiscount::Percentage(pct) => validate_percentage("discount_value", *pct),
        ManualDiscount::Fixed(amount) => validate_price("discount_value", *amount),
    }
}

/// Builds a [`ManualDiscount`] from the submitted tag and value.
///
/// A missing value counts as zero. With `none`, the value is ignored.
pub fn manual_discount_from_input(
    discount_type: DiscountType,
    value: Option<Decimal>,
) -> ValidationResult<ManualDiscount> {
    let value = value.unwrap_or(Decimal::ZERO);

    match discount_type {
        DiscountType::None => Ok(ManualDiscount::None),
        DiscountType::Percentage => {
            percentage_from_decimal("discount_value", value).map(ManualDiscount::Percentage)
        }
        DiscountType::Fixed => {
            let amount = money_from_decimal("discount_value", value)?;
            validate_price("discount_value", amount)?;
            Ok(ManualDiscount::Fixed(amount))
        }
    }
}

fn cart_line_from_input(index: usize, input: &CartLineInput) -> ValidationResult<CartLine> {
    let field = |name: &str| format!("items[{index}].{name}");

    let product_id = match input.product.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            return Err(ValidationError::Required {
                field: field("product"),
            })
        }
    };

    let quantity = input.quantity.ok_or_else(|| ValidationError::Required {
        field: field("quantity"),
    })?;
    validate_quantity(&field("quantity"), quantity)?;

    let raw_price = input.unit_price.ok_or_else(|| ValidationError::Required {
        field: field("unit_price"),
    })?;
    let unit_price = money_from_decimal(&field("unit_price"), raw_price)?;
    validate_price(&field("unit_price"), unit_price)?;

    Ok(CartLine {
        product_id,
        quantity,
        unit_price,
    })
}

/// Turns a raw sale request into a validated [`NewSale`].
///
/// ## Flow
/// ```text
/// SaleInput (as posted)
///      │
///      ├── items empty?            → Empty { items }
///      ├── items[i] field missing? → Required { items[i].<field> }
///      ├── too many items?         → OutOfRange { items }
///      ├── quantity < 1?           → MustBePositive
///      ├── quantity / price huge?  → OutOfRange
///      ├── > 2 decimal places?     → TooManyDecimalPlaces
///      └── discount out of range?  → OutOfRange / Negative
///      │
///      ▼
/// NewSale { lines, discount, user_name }
/// ```
pub fn validate_sale_input(input: &SaleInput, user_name: &str) -> ValidationResult<NewSale> {
    if input.items.is_empty() {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }
    validate_line_count(input.items.len())?;

    let lines = input
        .items
        .iter()
        .enumerate()
        .map(|(index, line)| cart_line_from_input(index, line))
        .collect::<ValidationResult<Vec<_>>>()?;

    let discount = manual_discount_from_input(input.discount_type, input.discount_value)?;

    Ok(NewSale {
        lines,
        discount,
        user_name: user_name.to_string(),
    })
}

// =============================================================================
// Catalog Validators
// =============================================================================

pub fn validate_new_supplier(supplier: &NewSupplier) -> ValidationResult<()> {
    validate_required_text("name", &supplier.name, MAX_TEXT_LEN)?;
    validate_email(&supplier.email)?;
    validate_required_text("phone", &supplier.phone, 20)?;
    Ok(())
}

pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_required_text("supplier", &product.supplier_id, MAX_TEXT_LEN)?;
    validate_required_text("name", &product.name, MAX_TEXT_LEN)?;
    validate_required_text("category", &product.category, 100)?;
    validate_required_text("unit", &product.unit, 50)?;
    validate_price("price", product.price)?;
    validate_stock_level("quantity", product.quantity)?;
    Ok(())
}

pub fn validate_product_update(update: &ProductUpdate) -> ValidationResult<()> {
    validate_required_text("name", &update.name, MAX_TEXT_LEN)?;
    validate_required_text("category", &update.category, 100)?;
    validate_required_text("unit", &update.unit, 50)?;
    validate_price("price", update.price)?;
    Ok(())
}

pub fn validate_restock(request: &RestockRequest) -> ValidationResult<()> {
    validate_quantity("quantity_added", request.quantity_added)?;
    validate_price("cost_per_unit", request.cost_per_unit)?;
    Ok(())
}

/// Validates a new promotion. Product existence is checked by the store.
pub fn validate_new_promotion(promotion: &NewPromotion) -> ValidationResult<()> {
    validate_required_text("name", &promotion.name, MAX_TEXT_LEN)?;
    validate_percentage("value", promotion.value)?;
    validate_date_window(promotion.start_date, promotion.end_date)?;

    if let Some(index) = promotion
        .product_ids
        .iter()
        .position(|id| id.trim().is_empty())
    {
        return Err(ValidationError::Required {
            field: format!("products[{index}]"),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
