//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Integer Minor Units
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    "12.50"  ──parse──►  1250 cents  ──math──►  ...  ──format──► "x.yz" │
//! │                                                                         │
//! │  Decimal strings are only touched at the edges (JSON in / JSON out).   │
//! │  Every computation in between is i64 / i128 integer arithmetic.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Money serializes as a decimal string with exactly two places (`"22.00"`),
//! and deserializes from either a string or a JSON number. Inputs with more
//! than two decimal places are rejected rather than silently rounded.
//!
//! ## Usage
//! ```rust
//! use rxstock_core::money::Money;
//! use rxstock_core::types::Percentage;
//!
//! let price = Money::from_cents(1000); // 10.00
//! let line = price.multiply_quantity(2); // 20.00
//! let tax = line.percent_of(Percentage::from_bps(1000)); // 10% of 20.00
//! assert_eq!(tax.cents(), 200);
//! assert_eq!(line.to_string(), "20.00");
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::{Percentage, BPS_PER_WHOLE};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.price ──► CartLine.unit_price ──► SaleItem.line_total          │
/// │                                                                         │
/// │  Sale.subtotal ─► promotion discount ─► manual discount ─► tax ─► total │
/// │                                                                         │
/// │  RestockEntry.cost_per_unit                                            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use rxstock_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Converts an exact decimal amount into cents.
    ///
    /// Returns `None` when the value carries more than two decimal places
    /// (after trailing zeros are ignored) or does not fit in an `i64`.
    ///
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use rxstock_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(Decimal::new(1250, 2)), Some(Money::from_cents(1250)));
    /// assert_eq!(Money::from_decimal(Decimal::new(12500, 3)), Some(Money::from_cents(1250)));
    /// assert_eq!(Money::from_decimal(Decimal::new(12505, 3)), None);
    /// ```
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        if value.round_dp(2) != value {
            return None;
        }
        value
            .checked_mul(Decimal::ONE_HUNDRED)?
            .to_i64()
            .map(Money)
    }

    /// Returns the amount as a decimal with exactly two places.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Unit price: 10.00
    /// Quantity:   2
    ///      │
    ///      ▼
    /// multiply_quantity(2) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line total: 20.00
    /// ```
    ///
    /// Operands are expected inside the validation ceilings
    /// (`MAX_QUANTITY`, `MAX_AMOUNT_UNITS`).
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Computes `self × rate`, rounded once to the cent with round-half-to-even.
    ///
    /// ## Bankers Rounding
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  Half-cent results round to the nearest EVEN cent:                  │
    /// │    0.125 → 0.12      0.135 → 0.14      0.825 → 0.82               │
    /// │                                                                     │
    /// │  Over many sales this keeps rounding from drifting in one direction│
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// ```rust
    /// use rxstock_core::money::Money;
    /// use rxstock_core::types::Percentage;
    ///
    /// // 10.00 × 8.25% = 0.825 → 0.82 (2 is even)
    /// let tax = Money::from_cents(1000).percent_of(Percentage::from_bps(825));
    /// assert_eq!(tax.cents(), 82);
    /// ```
    pub fn percent_of(&self, rate: Percentage) -> Money {
        let scaled = self.0 as i128 * rate.bps() as i128;
        Money(div_round_half_even(scaled, BPS_PER_WHOLE as i128) as i64)
    }
}

/// Integer division rounding to nearest, ties to even.
///
/// `denominator` must be positive. Works for negative numerators
/// symmetrically (`-1.5 → -2`, `-2.5 → -2`).
pub(crate) fn div_round_half_even(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    let twice_remainder = remainder.abs() * 2;

    if twice_remainder > denominator || (twice_remainder == denominator && quotient % 2 != 0) {
        quotient + numerator.signum()
    } else {
        quotient
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain two-place decimal (`"22.00"`, `"-5.50"`). No currency symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Money::from_decimal(value).ok_or_else(|| {
            D::Error::custom(format!(
                "invalid amount {value}: at most 2 decimal places are allowed"
            ))
        })
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(2200).to_string(), "22.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(250);

        assert_eq!((a + b).cents(), 1250);
        assert_eq!((a - b).cents(), 750);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 1500);
    }

    #[test]
    fn test_round_half_even() {
        assert_eq!(div_round_half_even(25, 10), 2);
        assert_eq!(div_round_half_even(35, 10), 4);
        assert_eq!(div_round_half_even(26, 10), 3);
        assert_eq!(div_round_half_even(24, 10), 2);
        assert_eq!(div_round_half_even(-15, 10), -2);
        assert_eq!(div_round_half_even(-25, 10), -2);
        assert_eq!(div_round_half_even(5, 10), 0);
    }

    #[test]
    fn test_percent_of() {
        // 20.00 at 10% = 2.00
        assert_eq!(Money::from_cents(2000).percent_of(Percentage::from_bps(1000)).cents(), 200);
        // 10.00 at 8.25% = 0.825 → 0.82
        assert_eq!(Money::from_cents(1000).percent_of(Percentage::from_bps(825)).cents(), 82);
        // 30.00 at 8.25% = 2.475 → 2.48
        assert_eq!(Money::from_cents(3000).percent_of(Percentage::from_bps(825)).cents(), 248);
        assert!(Money::from_cents(1999).percent_of(Percentage::zero()).is_zero());
    }

    #[test]
    fn test_from_decimal() {
        assert_eq!(Money::from_decimal(Decimal::new(10, 0)), Some(Money::from_cents(1000)));
        assert_eq!(Money::from_decimal(Decimal::new(1999, 2)), Some(Money::from_cents(1999)));
        assert_eq!(Money::from_decimal(Decimal::new(10001, 3)), None);
        assert_eq!(Money::from_cents(1999).to_decimal().to_string(), "19.99");
    }

    #[test]
    fn test_serde_string_format() {
        let json = serde_json::to_string(&Money::from_cents(2200)).unwrap();
        assert_eq!(json, "\"22.00\"");

        let from_str: Money = serde_json::from_str("\"12.5\"").unwrap();
        assert_eq!(from_str.cents(), 1250);

        let from_number: Money = serde_json::from_str("3").unwrap();
        assert_eq!(from_number.cents(), 300);

        assert!(serde_json::from_str::<Money>("\"1.005\"").is_err());
        assert!(serde_json::from_str::<Money>("\"abc\"").is_err());
    }
}
