//! # Validation Module
//!
//! Field-level input validation for Storehouse.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (axum + serde)                                │
//! │  ├── Shape and type checks (integer quantity, date format)             │
//! │  └── Malformed JSON → 400 before any handler runs                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE + invoice rules                                  │
//! │  ├── Ranges, lengths, non-negative amounts                             │
//! │  └── Runs before any storage work                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (current_stock >= 0), CHECK (quantity > 0)                  │
//! │  ├── UNIQUE (code), UNIQUE (invoice_number)                            │
//! │  └── Foreign keys                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storehouse_core::validation::{validate_product_code, validate_quantity};
//!
//! assert!(validate_product_code("WID-001").is_ok());
//! assert!(validate_quantity(4).is_ok());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_LINE_QUANTITY, MAX_NOTES_LENGTH, MAX_PRICE_CENTS, MAX_STOCK};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product code.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Letters, digits, hyphens and underscores only
///
/// ## Example
/// ```rust
/// use storehouse_core::validation::validate_product_code;
///
/// assert!(validate_product_code("WID-001").is_ok());
/// assert!(validate_product_code("").is_err());
/// assert!(validate_product_code("has space").is_err());
/// ```
pub fn validate_product_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.chars().count() > 50 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 50,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a display name (products, customers, suppliers).
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates an optional free-text field against a maximum length.
pub fn validate_optional_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

/// Validates invoice or adjustment notes.
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<()> {
    validate_optional_text("notes", notes, MAX_NOTES_LENGTH)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY
///
/// ## Example
/// ```rust
/// use storehouse_core::validation::validate_quantity;
///
/// assert!(validate_quantity(1).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(-3).is_err());
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates that an amount is zero or more.
///
/// ## Example
/// ```rust
/// use storehouse_core::money::Money;
/// use storehouse_core::validation::validate_non_negative;
///
/// assert!(validate_non_negative("unit_price", Money::zero()).is_ok());
/// assert!(validate_non_negative("unit_price", Money::from_cents(-1)).is_err());
/// ```
pub fn validate_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates an amount that must lie in `0..=max`.
///
/// ## Example
/// ```rust
/// use storehouse_core::money::Money;
/// use storehouse_core::validation::validate_amount;
///
/// let max = Money::from_cents(10_000);
/// assert!(validate_amount("tax_amount", Money::from_cents(10_000), max).is_ok());
/// assert!(validate_amount("tax_amount", Money::from_cents(10_001), max).is_err());
/// ```
pub fn validate_amount(field: &str, amount: Money, max: Money) -> ValidationResult<()> {
    validate_non_negative(field, amount)?;

    if amount > max {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a unit or list price against `MAX_PRICE_CENTS`.
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    validate_amount(field, price, Money::from_cents(MAX_PRICE_CENTS))
}

/// Validates a stock level or threshold (`0..=MAX_STOCK`).
pub fn validate_stock_level(field: &str, level: i64) -> ValidationResult<()> {
    if level < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    if level > MAX_STOCK {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_STOCK,
        });
    }

    Ok(())
}

/// Validates min/max stock thresholds.
///
/// ## Rules
/// - Both within `0..=MAX_STOCK`
/// - `max_stock`, when set, is not below `min_stock`
pub fn validate_stock_thresholds(min_stock: i64, max_stock: Option<i64>) -> ValidationResult<()> {
    validate_stock_level("min_stock", min_stock)?;

    if let Some(max) = max_stock {
        validate_stock_level("max_stock", max)?;
        if max < min_stock {
            return Err(ValidationError::OutOfRange {
                field: "max_stock".to_string(),
                min: min_stock,
                max: MAX_STOCK,
            });
        }
    }

    Ok(())
}

/// Validates a database id supplied by a client.
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_code() {
        assert!(validate_product_code("WID-001").is_ok());
        assert!(validate_product_code("ABC123").is_ok());
        assert!(validate_product_code("bolt_m6").is_ok());

        assert!(validate_product_code("").is_err());
        assert!(validate_product_code("   ").is_err());
        assert!(validate_product_code("has space").is_err());
        assert!(validate_product_code(&"A".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Acme Trading").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());

        assert!(matches!(
            validate_quantity(0),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(validate_quantity(-1).is_err());
        assert!(matches!(
            validate_quantity(MAX_LINE_QUANTITY + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_stock_thresholds() {
        assert!(validate_stock_thresholds(0, None).is_ok());
        assert!(validate_stock_thresholds(5, Some(50)).is_ok());
        assert!(validate_stock_thresholds(5, Some(5)).is_ok());

        assert!(validate_stock_thresholds(-1, None).is_err());
        assert!(validate_stock_thresholds(10, Some(5)).is_err());
        assert!(validate_stock_thresholds(0, Some(MAX_STOCK)).is_ok());
        assert!(validate_stock_thresholds(0, Some(MAX_STOCK + 1)).is_err());
    }

    #[test]
    fn test_validate_stock_level_is_bounded() {
        assert!(validate_stock_level("current_stock", 0).is_ok());
        assert!(validate_stock_level("current_stock", MAX_STOCK).is_ok());
        assert!(matches!(
            validate_stock_level("current_stock", MAX_STOCK + 1),
            Err(ValidationError::OutOfRange { max: MAX_STOCK, .. })
        ));
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price("unit_price", Money::zero()).is_ok());
        assert!(validate_price("unit_price", Money::from_cents(MAX_PRICE_CENTS)).is_ok());
        assert!(matches!(
            validate_price("unit_price", Money::from_cents(i64::MAX)),
            Err(ValidationError::TooLarge { .. })
        ));
        assert!(matches!(
            validate_price("unit_price", Money::from_cents(-1)),
            Err(ValidationError::Negative { .. })
        ));
    }

    #[test]
    fn test_validate_notes() {
        assert!(validate_notes(None).is_ok());
        assert!(validate_notes(Some("deliver friday")).is_ok());
        assert!(validate_notes(Some(&"x".repeat(MAX_NOTES_LENGTH + 1))).is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("customer_id", 1).is_ok());
        assert!(validate_id("customer_id", 0).is_err());
    }
}
