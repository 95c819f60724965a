//! # Totals Calculator
//!
//! Turns an invoice's line total plus its discount into tax and net amounts.
//!
//! ## The Two Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SALE (tax computed here)                                               │
//! │    after_discount = total - discount                                    │
//! │    tax            = after_discount × 14%   if invoice_type == tax       │
//! │                   = 0                      otherwise                    │
//! │    net            = after_discount + tax                                │
//! │                                                                         │
//! │  PURCHASE (tax supplied by the caller, taken verbatim)                  │
//! │    net            = total - discount + tax                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The asymmetry is part of the business: suppliers state their own tax on
//! the bill, while our sales tax is always derived from the fixed rate.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{InvoiceKind, InvoiceType};
use crate::validation::{validate_amount, ValidationResult};
use crate::{MAX_AMOUNT_CENTS, SALES_TAX_RATE};

const MAX_AMOUNT: Money = Money::from_cents(MAX_AMOUNT_CENTS);

fn too_large(field: &str) -> ValidationError {
    ValidationError::TooLarge {
        field: field.to_string(),
        max: MAX_AMOUNT,
    }
}

/// Kind-specific terms of an invoice: which totals rule applies and what
/// it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceTerms {
    /// Sales tax is computed from the fixed rate for `Tax` invoices.
    Sale { invoice_type: InvoiceType },
    /// Tax amount printed on the supplier's bill.
    Purchase { tax: Money },
}

impl InvoiceTerms {
    pub fn kind(&self) -> InvoiceKind {
        match self {
            InvoiceTerms::Sale { .. } => InvoiceKind::Sale,
            InvoiceTerms::Purchase { .. } => InvoiceKind::Purchase,
        }
    }

    /// The sale invoice type; `None` for purchases.
    pub fn invoice_type(&self) -> Option<InvoiceType> {
        match self {
            InvoiceTerms::Sale { invoice_type } => Some(*invoice_type),
            InvoiceTerms::Purchase { .. } => None,
        }
    }

    /// Checks the caller-supplied parts of the terms.
    pub fn validate(&self) -> ValidationResult<()> {
        match self {
            InvoiceTerms::Sale { .. } => Ok(()),
            InvoiceTerms::Purchase { tax } => validate_amount("tax_amount", *tax, MAX_AMOUNT),
        }
    }

    /// Applies the totals rule.
    ///
    /// ## Errors
    /// - `Validation` when an amount is negative or above `MAX_AMOUNT_CENTS`
    /// - `DiscountExceedsTotal` when the discount is larger than the total
    ///
    /// ## Example
    /// ```rust
    /// use storehouse_core::{InvoiceTerms, InvoiceType, Money};
    ///
    /// let terms = InvoiceTerms::Sale { invoice_type: InvoiceType::Tax };
    /// let totals = terms.settle(Money::from_cents(3200), Money::from_cents(200)).unwrap();
    ///
    /// assert_eq!(totals.tax.cents(), 420);   // 30.00 × 14%
    /// assert_eq!(totals.net.cents(), 3420);
    /// ```
    pub fn settle(&self, total: Money, discount: Money) -> CoreResult<InvoiceTotals> {
        validate_amount("total_amount", total, MAX_AMOUNT)?;
        validate_amount("discount_amount", discount, MAX_AMOUNT)?;
        self.validate()?;

        if discount > total {
            return Err(CoreError::DiscountExceedsTotal { discount, total });
        }

        let after_discount = total
            .checked_sub(discount)
            .ok_or_else(|| too_large("total_amount"))?;

        let tax = match self {
            InvoiceTerms::Sale {
                invoice_type: InvoiceType::Tax,
            } => after_discount.calculate_tax(SALES_TAX_RATE),
            InvoiceTerms::Sale {
                invoice_type: InvoiceType::Regular,
            } => Money::zero(),
            InvoiceTerms::Purchase { tax } => *tax,
        };

        let net = after_discount
            .checked_add(tax)
            .ok_or_else(|| too_large("net_amount"))?;

        Ok(InvoiceTotals {
            total,
            discount,
            tax,
            net,
        })
    }
}

/// Aggregate amounts written to an invoice header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Sum of line totals.
    pub total: Money,
    pub discount: Money,
    pub tax: Money,
    pub net: Money,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(invoice_type: InvoiceType) -> InvoiceTerms {
        InvoiceTerms::Sale { invoice_type }
    }

    #[test]
    fn test_regular_sale_has_no_tax() {
        let totals = sale(InvoiceType::Regular)
            .settle(Money::from_cents(3200), Money::zero())
            .unwrap();

        assert_eq!(totals.total.cents(), 3200);
        assert_eq!(totals.tax.cents(), 0);
        assert_eq!(totals.net.cents(), 3200);
    }

    #[test]
    fn test_tax_sale_applies_rate_after_discount() {
        let totals = sale(InvoiceType::Tax)
            .settle(Money::from_cents(10_000), Money::from_cents(1_000))
            .unwrap();

        assert_eq!(totals.tax.cents(), 1_260); // 90.00 × 14%
        assert_eq!(totals.net.cents(), 10_260);
        assert_eq!(totals.net, totals.total - totals.discount + totals.tax);
    }

    #[test]
    fn test_purchase_takes_supplied_tax_verbatim() {
        let terms = InvoiceTerms::Purchase {
            tax: Money::from_cents(100),
        };
        let totals = terms
            .settle(Money::from_cents(2_000), Money::from_cents(200))
            .unwrap();

        assert_eq!(totals.tax.cents(), 100);
        assert_eq!(totals.discount.cents(), 200);
        assert_eq!(totals.net.cents(), 1_900);
    }

    #[test]
    fn test_purchase_ignores_sales_tax_rate() {
        let terms = InvoiceTerms::Purchase { tax: Money::zero() };
        let totals = terms.settle(Money::from_cents(5_000), Money::zero()).unwrap();
        assert_eq!(totals.net.cents(), 5_000);
    }

    #[test]
    fn test_discount_equal_to_total_is_allowed() {
        let totals = sale(InvoiceType::Tax)
            .settle(Money::from_cents(500), Money::from_cents(500))
            .unwrap();
        assert_eq!(totals.net, Money::zero());
    }

    #[test]
    fn test_discount_above_total_is_rejected() {
        let err = sale(InvoiceType::Regular)
            .settle(Money::from_cents(500), Money::from_cents(501))
            .unwrap_err();
        assert!(matches!(err, CoreError::DiscountExceedsTotal { .. }));
    }

    #[test]
    fn test_negative_amounts_are_rejected() {
        let err = sale(InvoiceType::Regular)
            .settle(Money::from_cents(500), Money::from_cents(-1))
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let terms = InvoiceTerms::Purchase {
            tax: Money::from_cents(-1),
        };
        assert!(terms.settle(Money::from_cents(500), Money::zero()).is_err());
    }

    #[test]
    fn test_oversized_purchase_is_rejected_not_overflowed() {
        let terms = InvoiceTerms::Purchase {
            tax: Money::from_cents(100),
        };
        let err = terms
            .settle(Money::from_cents(i64::MAX), Money::zero())
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::TooLarge { ref field, .. }) if field == "total_amount"
        ));

        let terms = InvoiceTerms::Purchase {
            tax: Money::from_cents(i64::MAX),
        };
        assert!(terms.settle(Money::from_cents(100), Money::zero()).is_err());
    }

    #[test]
    fn test_largest_amounts_still_settle() {
        let max = Money::from_cents(MAX_AMOUNT_CENTS);

        let totals = InvoiceTerms::Purchase { tax: max }
            .settle(max, Money::zero())
            .unwrap();
        assert_eq!(totals.net.cents(), 2 * MAX_AMOUNT_CENTS);

        let totals = sale(InvoiceType::Tax).settle(max, Money::zero()).unwrap();
        assert_eq!(totals.net, totals.total + totals.tax);
    }

    #[test]
    fn test_terms_expose_kind() {
        assert_eq!(sale(InvoiceType::Tax).kind(), InvoiceKind::Sale);
        assert_eq!(sale(InvoiceType::Tax).invoice_type(), Some(InvoiceType::Tax));

        let purchase = InvoiceTerms::Purchase { tax: Money::zero() };
        assert_eq!(purchase.kind(), InvoiceKind::Purchase);
        assert_eq!(purchase.invoice_type(), None);
    }
}
