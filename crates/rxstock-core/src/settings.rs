//! # Settings
//!
//! Interpretation of the string values kept in the settings table.
//!
//! The sale processor reads `"tax_rate"` as a decimal percentage (`"10"`,
//! `"8.25"`). A missing or unusable value never blocks a sale: it falls
//! back to 0% and the caller logs the reason at warn level.
//!
//! ```text
//! raw setting          resolved rate     source
//! ───────────────      ─────────────     ──────────────────────
//! None                 0%                Missing
//! "10"                 10.00%            Configured
//! " 8.25 "             8.25%             Configured
//! "8.125"              8.12%             Configured { rounded }
//! "ten"                0%                Malformed(NotANumber)
//! "-5" / "150"         0%                Malformed(OutOfRange)
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::types::Percentage;

/// Settings key holding the sales tax percentage.
pub const TAX_RATE_KEY: &str = "tax_rate";

/// Why a configured tax rate could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxRateProblem {
    NotANumber,
    OutOfRange,
}

/// Where the resolved tax rate came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaxRateSource {
    /// Parsed from the setting. `rounded` is set when the value carried more
    /// than two decimal places and was rounded half-to-even.
    Configured { rounded: bool },
    /// No `tax_rate` row.
    Missing,
    /// The row exists but its value is unusable.
    Malformed { raw: String, problem: TaxRateProblem },
}

/// Result of interpreting the `tax_rate` setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTaxRate {
    pub rate: Percentage,
    pub source: TaxRateSource,
}

impl ResolvedTaxRate {
    /// Whether the rate is a 0% fallback rather than a configured value.
    pub fn is_fallback(&self) -> bool {
        !matches!(self.source, TaxRateSource::Configured { .. })
    }
}

/// Interprets the raw `tax_rate` setting.
///
/// ```rust
/// use rxstock_core::settings::resolve_tax_rate;
///
/// assert_eq!(resolve_tax_rate(Some("10")).rate.bps(), 1000);
/// assert_eq!(resolve_tax_rate(None).rate.bps(), 0);
/// assert!(resolve_tax_rate(Some("abc")).is_fallback());
/// ```
pub fn resolve_tax_rate(raw: Option<&str>) -> ResolvedTaxRate {
    let Some(raw) = raw else {
        return ResolvedTaxRate {
            rate: Percentage::zero(),
            source: TaxRateSource::Missing,
        };
    };

    let malformed = |problem| ResolvedTaxRate {
        rate: Percentage::zero(),
        source: TaxRateSource::Malformed {
            raw: raw.to_string(),
            problem,
        },
    };

    let value = match Decimal::from_str(raw.trim()) {
        Ok(value) => value,
        Err(_) => return malformed(TaxRateProblem::NotANumber),
    };

    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return malformed(TaxRateProblem::OutOfRange);
    }

    let rounded_value = value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);

    match Percentage::from_decimal(rounded_value) {
        Some(rate) => ResolvedTaxRate {
            rate,
            source: TaxRateSource::Configured {
                rounded: rounded_value != value,
            },
        },
        None => malformed(TaxRateProblem::OutOfRange),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_rates() {
        let resolved = resolve_tax_rate(Some("10"));
        assert_eq!(resolved.rate, Percentage::from_bps(1000));
        assert_eq!(resolved.source, TaxRateSource::Configured { rounded: false });

        assert_eq!(resolve_tax_rate(Some(" 8.25 ")).rate.bps(), 825);
        assert_eq!(resolve_tax_rate(Some("0")).rate.bps(), 0);
        assert_eq!(resolve_tax_rate(Some("100")).rate.bps(), 10_000);
    }

    #[test]
    fn test_negative_zero_is_zero_rate() {
        for raw in ["-0", "-0.00"] {
            let resolved = resolve_tax_rate(Some(raw));
            assert!(resolved.rate.is_zero());
            assert_eq!(resolved.source, TaxRateSource::Configured { rounded: false });
        }
        assert!(resolve_tax_rate(Some("-0.01")).is_fallback());
    }

    #[test]
    fn test_extra_places_round_half_even() {
        let resolved = resolve_tax_rate(Some("8.125"));
        assert_eq!(resolved.rate.bps(), 812);
        assert_eq!(resolved.source, TaxRateSource::Configured { rounded: true });

        assert_eq!(resolve_tax_rate(Some("8.135")).rate.bps(), 814);
    }

    #[test]
    fn test_missing_falls_back_to_zero() {
        let resolved = resolve_tax_rate(None);
        assert!(resolved.rate.is_zero());
        assert_eq!(resolved.source, TaxRateSource::Missing);
        assert!(resolved.is_fallback());
    }

    #[test]
    fn test_malformed_falls_back_to_zero() {
        for raw in ["", "ten", "8.25%"] {
            let resolved = resolve_tax_rate(Some(raw));
            assert!(resolved.rate.is_zero(), "{raw:?} should fall back");
            assert!(matches!(
                resolved.source,
                TaxRateSource::Malformed {
                    problem: TaxRateProblem::NotANumber,
                    ..
                }
            ));
        }

        for raw in ["-5", "150"] {
            let resolved = resolve_tax_rate(Some(raw));
            assert!(resolved.rate.is_zero());
            assert!(matches!(
                resolved.source,
                TaxRateSource::Malformed {
                    problem: TaxRateProblem::OutOfRange,
                    ..
                }
            ));
        }
    }
}
