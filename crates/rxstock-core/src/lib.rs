//! # rxstock-core: Pure Business Logic for RxStock
//!
//! This crate holds the business rules of the pharmacy inventory & sales
//! backend as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        RxStock Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/api (axum REST)                         │   │
//! │  │    POST /api/sales, /api/products/{id}/restock, ...             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    rxstock-db                                   │   │
//! │  │    Unit of work, repositories, sale processor                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ rxstock-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌───────────┐ ┌──────────┐         │   │
//! │  │   │  money   │ │promotion │ │  pricing  │ │validation│         │   │
//! │  │   │  Money   │ │ Resolver │ │ SaleTotals│ │  rules   │         │   │
//! │  │   └──────────┘ └──────────┘ └───────────┘ └──────────┘         │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Promotion, Sale, Percentage, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`promotion`] - Promotion resolver (one promotion per product)
//! - [`pricing`] - Subtotal, discounts, tax and total for a cart
//! - [`settings`] - Interpretation of the `tax_rate` setting
//! - [`validation`] - Input validation with field-level errors
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rxstock_core::{price_sale, resolve_tax_rate, CartLine, ManualDiscount, Money, PromotionIndex};
//!
//! let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
//! let lines = vec![CartLine {
//!     product_id: "A".into(),
//!     quantity: 1,
//!     unit_price: Money::from_cents(10_000),
//! }];
//!
//! let totals = price_sale(
//!     &lines,
//!     &PromotionIndex::build(today, &[]),
//!     ManualDiscount::Fixed(Money::from_cents(15_000)),
//!     resolve_tax_rate(Some("10")).rate,
//! );
//!
//! // The fixed discount is clamped to the price, so nothing is left to tax
//! assert_eq!(totals.discount_amount.cents(), 10_000);
//! assert!(totals.total_amount.is_zero());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod promotion;
pub mod settings;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{price_sale, SaleTotals};
pub use promotion::PromotionIndex;
pub use settings::{resolve_tax_rate, ResolvedTaxRate, TaxRateProblem, TaxRateSource, TAX_RATE_KEY};
pub use types::*;
pub use validation::ValidationResult;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// User name recorded when a request carries no identity.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Default page size for list endpoints.
pub const DEFAULT_LIST_LIMIT: u32 = 100;
