//! # Invoice Drafts
//!
//! The request side of invoice creation: a header, kind-specific terms and
//! the ordered line items, validated before any storage work begins.
//!
//! ## Draft Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP body ──► InvoiceDraft ──► validate() ──► InvoiceEngine::create()  │
//! │                     │               │                                   │
//! │                     │               ├── EmptyInvoice                    │
//! │                     │               ├── TooManyLines                    │
//! │                     │               ├── InvalidLineItem { line, .. }    │
//! │                     │               └── Validation (discount, notes)    │
//! │                     │                                                   │
//! │                     └── terms: Sale { invoice_type } | Purchase { tax } │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::totals::InvoiceTerms;
use crate::types::{InvoiceKind, InvoiceType};
use crate::validation::{
    validate_amount, validate_id, validate_notes, validate_price, validate_quantity,
};
use crate::{MAX_AMOUNT_CENTS, MAX_INVOICE_LINES};

// =============================================================================
// Line Item
// =============================================================================

/// One requested line: a product, how many, and the agreed unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Money,
}

impl LineItem {
    pub fn new(product_id: i64, quantity: i64, unit_price: Money) -> Self {
        LineItem {
            product_id,
            quantity,
            unit_price,
        }
    }

    /// Validates the line. `line` is its 1-based position, used in the error.
    ///
    /// ## Rules
    /// - `product_id` positive
    /// - `quantity` in `1..=MAX_LINE_QUANTITY`
    /// - `unit_price` in `0..=MAX_PRICE_CENTS`
    pub fn validate(&self, line: usize) -> CoreResult<()> {
        let invalid = |e: ValidationError| CoreError::InvalidLineItem {
            line,
            reason: e.to_string(),
        };

        validate_id("product_id", self.product_id).map_err(invalid)?;
        validate_quantity(self.quantity).map_err(invalid)?;
        validate_price("unit_price", self.unit_price).map_err(invalid)

    }

    /// `quantity × unit_price`. Only meaningful on a validated line.
    #[inline]
    pub fn total_price(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// Signed change this line applies to `current_stock`.
    #[inline]
    pub fn stock_delta(&self, kind: InvoiceKind) -> i64 {
        kind.stock_sign() * self.quantity
    }
}

// =============================================================================
// Header
// =============================================================================

/// Header fields shared by sales and purchases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceHeader {
    /// customer_id for a sale, supplier_id for a purchase.
    pub counterparty_id: i64,
    /// Acting employee. Not checked against any directory.
    pub employee_id: Option<i64>,
    /// Defaults to today when absent.
    pub date: Option<NaiveDate>,
    pub discount: Money,
    pub notes: Option<String>,
}

// =============================================================================
// Draft
// =============================================================================

/// A complete invoice request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDraft {
    pub terms: InvoiceTerms,
    pub header: InvoiceHeader,
    /// In submission order; processed in this order.
    pub lines: Vec<LineItem>,
}

impl InvoiceDraft {
    /// Builds a sale draft.
    pub fn sale(header: InvoiceHeader, invoice_type: InvoiceType, lines: Vec<LineItem>) -> Self {
        InvoiceDraft {
            terms: InvoiceTerms::Sale { invoice_type },
            header,
            lines,
        }
    }

    /// Builds a purchase draft with the supplier's stated tax.
    pub fn purchase(header: InvoiceHeader, tax: Money, lines: Vec<LineItem>) -> Self {
        InvoiceDraft {
            terms: InvoiceTerms::Purchase { tax },
            header,
            lines,
        }
    }

    #[inline]
    pub fn kind(&self) -> InvoiceKind {
        self.terms.kind()
    }

    /// Validates everything that can be checked without storage.
    ///
    /// ## Example
    /// ```rust
    /// use storehouse_core::{CoreError, InvoiceDraft, InvoiceHeader, InvoiceType, LineItem, Money};
    ///
    /// let header = InvoiceHeader { counterparty_id: 1, ..Default::default() };
    ///
    /// let empty = InvoiceDraft::sale(header.clone(), InvoiceType::Regular, vec![]);
    /// assert!(matches!(empty.validate(), Err(CoreError::EmptyInvoice)));
    ///
    /// let ok = InvoiceDraft::sale(
    ///     header,
    ///     InvoiceType::Regular,
    ///     vec![LineItem::new(1, 4, Money::from_cents(800))],
    /// );
    /// assert!(ok.validate().is_ok());
    /// ```
    pub fn validate(&self) -> CoreResult<()> {
        if self.lines.is_empty() {
            return Err(CoreError::EmptyInvoice);
        }

        if self.lines.len() > MAX_INVOICE_LINES {
            return Err(CoreError::TooManyLines {
                max: MAX_INVOICE_LINES,
            });
        }

        let counterparty_field = match self.kind() {
            InvoiceKind::Sale => "customer_id",
            InvoiceKind::Purchase => "supplier_id",
        };
        validate_id(counterparty_field, self.header.counterparty_id)?;
        let max_amount = Money::from_cents(MAX_AMOUNT_CENTS);
        validate_amount("discount_amount", self.header.discount, max_amount)?;
        validate_notes(self.header.notes.as_deref())?;
        self.terms.validate()?;

        let mut total = Money::zero();
        for (index, line) in self.lines.iter().enumerate() {
            line.validate(index + 1)?;
            total = total + line.total_price();
        }
        validate_amount("total_amount", total, max_amount)?;

        Ok(())
    }

    /// Sum of all line totals.
    pub fn lines_total(&self) -> Money {
        self.lines.iter().map(LineItem::total_price).sum()
    }

    /// The invoice date, falling back to `today`.
    pub fn invoice_date(&self, today: NaiveDate) -> NaiveDate {
        self.header.date.unwrap_or(today)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MAX_LINE_QUANTITY, MAX_PRICE_CENTS};

    fn header(counterparty_id: i64) -> InvoiceHeader {
        InvoiceHeader {
            counterparty_id,
            ..Default::default()
        }
    }

    fn line(product_id: i64, quantity: i64, cents: i64) -> LineItem {
        LineItem::new(product_id, quantity, Money::from_cents(cents))
    }

    #[test]
    fn test_line_total_and_delta() {
        let l = line(1, 4, 800);
        assert_eq!(l.total_price().cents(), 3_200);
        assert_eq!(l.stock_delta(InvoiceKind::Sale), -4);
        assert_eq!(l.stock_delta(InvoiceKind::Purchase), 4);
    }

    #[test]
    fn test_empty_invoice_rejected() {
        let draft = InvoiceDraft::purchase(header(1), Money::zero(), vec![]);
        assert!(matches!(draft.validate(), Err(CoreError::EmptyInvoice)));
    }

    #[test]
    fn test_too_many_lines_rejected() {
        let lines = vec![line(1, 1, 100); MAX_INVOICE_LINES + 1];
        let draft = InvoiceDraft::sale(header(1), InvoiceType::Regular, lines);
        assert!(matches!(draft.validate(), Err(CoreError::TooManyLines { .. })));
    }

    #[test]
    fn test_invalid_line_names_position() {
        let draft = InvoiceDraft::sale(
            header(1),
            InvoiceType::Regular,
            vec![line(1, 2, 100), line(2, 0, 100)],
        );

        match draft.validate() {
            Err(CoreError::InvalidLineItem { line, reason }) => {
                assert_eq!(line, 2);
                assert_eq!(reason, "quantity must be positive");
            }
            other => panic!("expected InvalidLineItem, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_values_rejected() {
        let negative_qty =
            InvoiceDraft::sale(header(1), InvoiceType::Regular, vec![line(1, -3, 100)]);
        assert!(matches!(
            negative_qty.validate(),
            Err(CoreError::InvalidLineItem { line: 1, .. })
        ));

        let negative_price =
            InvoiceDraft::sale(header(1), InvoiceType::Regular, vec![line(1, 3, -100)]);
        assert!(matches!(
            negative_price.validate(),
            Err(CoreError::InvalidLineItem { line: 1, .. })
        ));

        let mut h = header(1);
        h.discount = Money::from_cents(-5);
        let negative_discount = InvoiceDraft::sale(h, InvoiceType::Regular, vec![line(1, 1, 100)]);
        assert!(matches!(
            negative_discount.validate(),
            Err(CoreError::Validation(ValidationError::Negative { .. }))
        ));
    }

    #[test]
    fn test_unit_price_above_ceiling_rejected() {
        let draft = InvoiceDraft::purchase(
            header(1),
            Money::from_cents(100),
            vec![line(1, 1, i64::MAX)],
        );
        match draft.validate() {
            Err(CoreError::InvalidLineItem { line, reason }) => {
                assert_eq!(line, 1);
                assert_eq!(reason, "unit_price must not exceed 10000000.00");
            }
            other => panic!("expected InvalidLineItem, got {:?}", other),
        }
    }

    #[test]
    fn test_invoice_total_above_ceiling_rejected() {
        // 500 maximal lines sum to 5e17 cents, under the ceiling
        let lines = vec![line(1, MAX_LINE_QUANTITY, MAX_PRICE_CENTS); MAX_INVOICE_LINES];
        let draft = InvoiceDraft::sale(header(1), InvoiceType::Tax, lines);
        assert!(draft.validate().is_ok());

        let mut h = header(1);
        h.discount = Money::from_cents(MAX_AMOUNT_CENTS + 1);
        let draft = InvoiceDraft::sale(h, InvoiceType::Regular, vec![line(1, 1, 100)]);
        assert!(matches!(
            draft.validate(),
            Err(CoreError::Validation(ValidationError::TooLarge { .. }))
        ));
    }

    #[test]
    fn test_free_line_allowed() {
        let draft = InvoiceDraft::sale(header(1), InvoiceType::Regular, vec![line(1, 1, 0)]);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_missing_counterparty_id_rejected() {
        let draft = InvoiceDraft::purchase(header(0), Money::zero(), vec![line(1, 1, 100)]);
        let err = draft.validate().unwrap_err();
        assert_eq!(err.to_string(), "Validation error: supplier_id must be positive");
    }

    #[test]
    fn test_lines_total() {
        let draft = InvoiceDraft::sale(
            header(1),
            InvoiceType::Regular,
            vec![line(1, 4, 800), line(2, 1, 250)],
        );
        assert_eq!(draft.lines_total().cents(), 3_450);
    }

    #[test]
    fn test_invoice_date_defaults_to_today() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut draft = InvoiceDraft::sale(header(1), InvoiceType::Regular, vec![line(1, 1, 1)]);
        assert_eq!(draft.invoice_date(today), today);

        let explicit = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        draft.header.date = Some(explicit);
        assert_eq!(draft.invoice_date(today), explicit);
    }
}
