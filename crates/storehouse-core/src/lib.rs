//! Storehouse domain rules.
//!
//! Everything the invoice engine decides without touching storage: money
//! arithmetic, draft validation, the discount and tax rules for each
//! invoice kind, invoice numbering and stock thresholds. The crate does no
//! I/O; `storehouse-db` calls into it from inside its transactions and
//! `apps/api` only converts JSON to and from these types.
//!
//! ## Modules
//! - [`types`] - Domain records (Product, Invoice, StockMovement, ...)
//! - [`money`] - integer cents and the tax rate
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level validation
//! - [`invoice`] - Invoice drafts and line item rules
//! - [`totals`] - Discount/tax/net rules per invoice kind
//! - [`numbering`] - Human-readable invoice numbers
//! - [`stock`] - Stock status, reorder and adjustment rules
//!
//! ## Example
//! ```rust
//! use storehouse_core::money::Money;
//! use storehouse_core::SALES_TAX_RATE;
//!
//! let after_discount = Money::from_cents(3200); // 32.00
//! let tax = after_discount.calculate_tax(SALES_TAX_RATE);
//!
//! // 14% of 32.00 = 4.48
//! assert_eq!(tax.cents(), 448);
//! ```

pub mod error;
pub mod invoice;
pub mod money;
pub mod numbering;
pub mod stock;
pub mod totals;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use invoice::{InvoiceDraft, InvoiceHeader, LineItem};
pub use money::Money;
pub use numbering::InvoiceNumber;
pub use totals::{InvoiceTerms, InvoiceTotals};
pub use types::*;

/// Sales tax applied to `tax` invoices (14%).
pub const SALES_TAX_RATE: TaxRate = TaxRate::from_bps(1400);

/// Maximum number of lines on a single invoice.
pub const MAX_INVOICE_LINES: usize = 500;

/// Maximum quantity on a single invoice line.
///
/// Keeps `quantity * unit_price` comfortably inside `i64` cents.
pub const MAX_LINE_QUANTITY: i64 = 1_000_000;

/// Maximum length of free-text notes on invoices and adjustments.
pub const MAX_NOTES_LENGTH: usize = 1000;

/// Largest unit or list price, in cents (10,000,000.00).
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;

/// Largest invoice amount (total, discount, tax, net), in cents.
///
/// `MAX_PRICE_CENTS × MAX_LINE_QUANTITY` equals this, so one maximal line
/// still fits.
pub const MAX_AMOUNT_CENTS: i64 = 1_000_000_000_000_000;

/// Largest stock level, threshold or counted stock.
///
/// With `MAX_PRICE_CENTS` this keeps a product's stock value inside `i64`
/// cents.
pub const MAX_STOCK: i64 = 1_000_000_000;
