//! # Error Types
//!
//! Domain-specific error types for rxstock-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  rxstock-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule failures, unknown references     │
//! │  └── ValidationError  - Input validation failures (field-level)        │
//! │                                                                         │
//! │  rxstock-db errors (separate crate)                                    │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── ServiceError     - CoreError | DbError from transactional ops     │
//! │                                                                         │
//! │  REST errors (in app)                                                  │
//! │  └── ApiError         - code + message + HTTP status                   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → ApiError → client  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Supplier not found: {0}")]
    SupplierNotFound(String),

    #[error("Promotion not found: {0}")]
    PromotionNotFound(String),

    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// A cart line asks for more units than are on hand.
    ///
    /// ## User Workflow
    /// ```text
    /// Sell 3 × Amoxicillin 500mg
    ///      │
    ///      ▼
    /// Stock check: available = 2
    ///      │
    ///      ▼
    /// InsufficientStock { product_name: "Amoxicillin 500mg", available: 2, requested: 3 }
    ///      │
    ///      ▼
    /// Whole sale rolled back, nothing persisted
    /// ```
    #[error(
        "Insufficient stock for {product_name} ({product_id}): available {available}, requested {requested}"
    )]
    InsufficientStock {
        product_id: String,
        product_name: String,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Every variant names the offending field so clients can point at it.
/// Cart fields use an indexed path such as `items[2].quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A collection that must have at least one entry is empty.
    #[error("{field} must contain at least one entry")]
    Empty { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be > 0.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be >= 0.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Decimal input with more places than the field allows.
    #[error("{field} must have at most {max} decimal places")]
    TooManyDecimalPlaces { field: String, max: u32 },

    /// Invalid format (e.g. malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Two related fields are in the wrong order.
    #[error("{first} must not be after {second}")]
    InvalidOrder { first: String, second: String },
}

impl ValidationError {
    /// The field (or the first of two fields) this error is about.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::Empty { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::Negative { field }
            | ValidationError::TooManyDecimalPlaces { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
            ValidationError::InvalidOrder { first, .. } => first,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message() {
        let err = CoreError::InsufficientStock {
            product_id: "p-1".to_string(),
            product_name: "Ibuprofen 200mg".to_string(),
            available: 2,
            requested: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Ibuprofen 200mg (p-1): available 2, requested 3"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "items[0].unit_price".to_string(),
        };
        assert_eq!(err.to_string(), "items[0].unit_price is required");
        assert_eq!(err.field(), "items[0].unit_price");

        let err = ValidationError::TooManyDecimalPlaces {
            field: "discount_value".to_string(),
            max: 2,
        };
        assert_eq!(err.to_string(), "discount_value must have at most 2 decimal places");

        let err = ValidationError::InvalidOrder {
            first: "start_date".to_string(),
            second: "end_date".to_string(),
        };
        assert_eq!(err.to_string(), "start_date must not be after end_date");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::Empty {
            field: "items".to_string(),
        }
        .into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
