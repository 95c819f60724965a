//! Fixed-point money.
//!
//! Amounts are whole cents in an `i64`. Line totals, invoice sums,
//! discounts and tax are all integer arithmetic, so
//! `net = total - discount + tax` holds to the cent and a total always
//! equals the sum of its lines. Tax is the one place a fraction appears;
//! it is rounded half-up once per invoice.
//!
//! Decimal numbers only appear at the JSON boundary, see
//! [`Money::try_from_decimal`] and [`Money::to_decimal`].
//!
//! ## Usage
//! ```rust
//! use storehouse_core::money::Money;
//!
//! let price = Money::from_cents(800); // 8.00
//! let line_total = price.multiply_quantity(4);
//! assert_eq!(line_total.cents(), 3200);
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

use crate::error::ValidationError;
use crate::types::TaxRate;
use crate::validation::ValidationResult;

/// An amount in cents.
///
/// Signed so that intermediate results such as `total - discount` can be
/// formed and then checked. There is a single currency; nothing here
/// tracks which one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use storehouse_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a decimal amount received from a client into cents.
    ///
    /// ## Rules
    /// - At most two fractional digits (`8.5` and `8.50` are fine, `8.505` is not)
    /// - Must fit in `i64` cents
    ///
    /// Trailing zeros beyond the second digit are accepted (`8.500`).
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use storehouse_core::money::Money;
    ///
    /// let price = Money::try_from_decimal("unit_price", Decimal::new(850, 2)).unwrap();
    /// assert_eq!(price.cents(), 850);
    ///
    /// assert!(Money::try_from_decimal("unit_price", Decimal::new(8505, 3)).is_err());
    /// ```
    pub fn try_from_decimal(field: &str, value: Decimal) -> ValidationResult<Money> {
        if value.normalize().scale() > 2 {
            return Err(ValidationError::InvalidFormat {
                field: field.to_string(),
                reason: "at most 2 decimal places are allowed".to_string(),
            });
        }

        value
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .map(Money)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: field.to_string(),
                min: i64::MIN / 100,
                max: i64::MAX / 100,
            })
    }

    /// Renders the value as a two-decimal amount for clients.
    ///
    /// ## Example
    /// ```rust
    /// use storehouse_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(3200).to_decimal().to_string(), "32.00");
    /// ```
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax at the given rate, rounding half-up to the cent.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`.
    /// The +5000 provides rounding (5000/10000 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use storehouse_core::money::Money;
    /// use storehouse_core::types::TaxRate;
    ///
    /// let amount = Money::from_cents(1003);      // 10.03
    /// let rate = TaxRate::from_bps(1400);        // 14%
    ///
    /// // 10.03 × 14% = 1.4042 → 1.40
    /// assert_eq!(amount.calculate_tax(rate).cents(), 140);
    /// ```
    ///
    /// ## User Workflow
    /// ```text
    /// Sale total: 32.00, discount: 2.00
    ///      │
    ///      ▼
    /// after discount: 30.00
    ///      │
    ///      ▼
    /// calculate_tax(14%) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Tax: 4.20  →  Net: 34.20
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 so large invoices cannot overflow the intermediate product
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// Callers bound the quantity first (see `MAX_LINE_QUANTITY`); use
    /// [`Money::checked_multiply_quantity`] when the bound is not known.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Multiplies money by a quantity, returning `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use storehouse_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(400).checked_multiply_quantity(5), Some(Money::from_cents(2000)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_multiply_quantity(2), None);
    /// ```
    #[inline]
    pub fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Adds two values, returning `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Subtracts, returning `None` on overflow.
    #[inline]
    pub fn checked_sub(&self, other: Money) -> Option<Self> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Adds two values, clamping at the `i64` bounds.
    ///
    /// For report figures that are read, never stored.
    #[inline]
    pub fn saturating_add(&self, other: Money) -> Self {
        Money(self.0.saturating_add(other.0))
    }

    /// Multiplies by a quantity, clamping at the `i64` bounds.
    ///
    /// ## Example
    /// ```rust
    /// use storehouse_core::money::Money;
    ///
    /// let huge = Money::from_cents(100_000_000).saturating_multiply_quantity(1_000_000_000_000);
    /// assert_eq!(huge.cents(), i64::MAX);
    /// ```
    #[inline]
    pub fn saturating_multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount with two decimals, no currency symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, cents / 100, cents % 100)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
