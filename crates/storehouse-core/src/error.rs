//! Errors raised by the domain rules.
//!
//! [`ValidationError`] covers malformed input and is produced before any
//! storage work. [`CoreError`] covers refusals that need the current state
//! (stock on hand, existing ids). `storehouse-db` wraps `CoreError` as
//! `DbError::Rejected` and the API turns that into a 400 with a specific
//! error code.
//!
//! Messages name the product, line or field at fault; they are shown to
//! the client verbatim.

use thiserror::Error;

use crate::money::Money;
use crate::types::Counterparty;

/// Raised while an invoice or adjustment is being written, any of these
/// aborts the whole write.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A line references a product id that does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// A sale line asks for more than is on the shelf. `available` is the
    /// stock seen inside the invoice transaction, after earlier lines of the
    /// same invoice were applied.
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// A purchase line would push stock past `MAX_STOCK`.
    #[error("Stock limit exceeded for {product}: {current} on hand, {requested} more would pass {max}")]
    StockLimitExceeded {
        product: String,
        current: i64,
        requested: i64,
        max: i64,
    },

    /// A product references a category id that does not exist.
    #[error("Category not found: {0}")]
    CategoryNotFound(i64),

    /// The customer (sale) or supplier (purchase) does not exist.
    #[error("{role} not found: {id}")]
    CounterpartyNotFound { role: Counterparty, id: i64 },

    /// A line item failed validation. `line` is 1-based.
    #[error("Invalid line item {line}: {reason}")]
    InvalidLineItem { line: usize, reason: String },

    /// An invoice was submitted without any lines.
    #[error("Invoice must contain at least one item")]
    EmptyInvoice,

    /// An invoice has more lines than allowed.
    #[error("Invoice cannot have more than {max} items")]
    TooManyLines { max: usize },

    /// Discount larger than the invoice total would make the net negative.
    #[error("Discount {discount} exceeds invoice total {total}")]
    DiscountExceedsTotal { discount: Money, total: Money },

    /// A stock adjustment would not change anything.
    #[error("No stock change: product already has {stock} units")]
    NoStockChange { stock: i64 },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} must not be negative")]
    Negative { field: String },

    #[error("{field} must not exceed {max}")]
    TooLarge { field: String, max: Money },

    /// e.g. a price with three fractional digits.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product: "Widget".to_string(),
            available: 10,
            requested: 20,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Widget: available 10, requested 20"
        );

        let err = CoreError::CounterpartyNotFound {
            role: Counterparty::Supplier,
            id: 7,
        };
        assert_eq!(err.to_string(), "Supplier not found: 7");

        let err = CoreError::DiscountExceedsTotal {
            discount: Money::from_cents(500),
            total: Money::from_cents(300),
        };
        assert_eq!(err.to_string(), "Discount 5.00 exceeds invoice total 3.00");

        let err = CoreError::StockLimitExceeded {
            product: "Widget".to_string(),
            current: 999_999_998,
            requested: 5,
            max: 1_000_000_000,
        };
        assert_eq!(
            err.to_string(),
            "Stock limit exceeded for Widget: 999999998 on hand, 5 more would pass 1000000000"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::Negative {
            field: "discount_amount".to_string(),
        };
        assert_eq!(err.to_string(), "discount_amount must not be negative");

        let err = ValidationError::TooLarge {
            field: "unit_price".to_string(),
            max: Money::from_cents(1_000_000_000),
        };
        assert_eq!(err.to_string(), "unit_price must not exceed 10000000.00");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "code".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
