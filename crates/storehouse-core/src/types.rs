//! # Domain Types
//!
//! Core domain types used throughout Storehouse.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Invoice      │   │ StockMovement   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  items[]        │   │  product_id ───►│ Product│
//! │  │  code (unique)  │   │  invoice_number │   │  movement_type  │       │
//! │  │  current_stock  │   │  net_amount     │   │  reference_*    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  InvoiceKind    │   │  InvoiceStatus  │   │  MovementType   │       │
//! │  │  Sale           │   │  Pending        │   │  In             │       │
//! │  │  Purchase       │   │  Completed      │   │  Out            │       │
//! │  └─────────────────┘   │  Cancelled      │   │  Adjustment     │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity uses an integer id assigned by the database. Invoices also
//! carry a human-readable `invoice_number` derived from that id.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1400 bps = 14%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Invoice Kind
// =============================================================================

/// Which side of the business an invoice records.
///
/// Sales and purchases are structurally identical; the kind decides the
/// stock direction, the ledger labels, the number prefix and the
/// counterparty directory.
///
/// ```text
///              stock      ledger   reference   prefix   counterparty
///   Sale       -qty       out      sale        INV      customer
///   Purchase   +qty       in       purchase    PUR      supplier
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceKind {
    Sale,
    Purchase,
}

impl InvoiceKind {
    /// Prefix for human-readable invoice numbers.
    pub const fn number_prefix(&self) -> &'static str {
        match self {
            InvoiceKind::Sale => "INV",
            InvoiceKind::Purchase => "PUR",
        }
    }

    /// Sign applied to a line quantity when it hits `current_stock`.
    pub const fn stock_sign(&self) -> i64 {
        match self {
            InvoiceKind::Sale => -1,
            InvoiceKind::Purchase => 1,
        }
    }

    /// Ledger movement type written for each line.
    pub const fn movement_type(&self) -> MovementType {
        match self {
            InvoiceKind::Sale => MovementType::Out,
            InvoiceKind::Purchase => MovementType::In,
        }
    }

    /// Ledger reference type pointing back at the invoice.
    pub const fn reference_type(&self) -> ReferenceType {
        match self {
            InvoiceKind::Sale => ReferenceType::Sale,
            InvoiceKind::Purchase => ReferenceType::Purchase,
        }
    }

    /// Directory the invoice's counterparty lives in.
    pub const fn counterparty(&self) -> Counterparty {
        match self {
            InvoiceKind::Sale => Counterparty::Customer,
            InvoiceKind::Purchase => Counterparty::Supplier,
        }
    }

    /// Whether selling must be checked against available stock.
    pub const fn requires_stock(&self) -> bool {
        matches!(self, InvoiceKind::Sale)
    }
}

impl fmt::Display for InvoiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceKind::Sale => write!(f, "sale"),
            InvoiceKind::Purchase => write!(f, "purchase"),
        }
    }
}

/// The other party on an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Counterparty {
    Customer,
    Supplier,
}

impl fmt::Display for Counterparty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Counterparty::Customer => write!(f, "Customer"),
            Counterparty::Supplier => write!(f, "Supplier"),
        }
    }
}

// =============================================================================
// Status and Label Enums
// =============================================================================

/// Sale invoice flavour. Only `Tax` invoices carry sales tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum InvoiceType {
    #[default]
    Regular,
    Tax,
}

/// Lifecycle of an invoice header.
///
/// `Pending` only exists inside the creating transaction; committed invoices
/// are `Completed`. `Cancelled` is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

/// Direction of a stock ledger entry. Quantities are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    In,
    Out,
    Adjustment,
}

impl MovementType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "in",
            MovementType::Out => "out",
            MovementType::Adjustment => "adjustment",
        }
    }
}

impl std::str::FromStr for MovementType {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(MovementType::In),
            "out" => Ok(MovementType::Out),
            "adjustment" => Ok(MovementType::Adjustment),
            _ => Err(crate::error::ValidationError::NotAllowed {
                field: "movement_type".to_string(),
                allowed: vec!["in".into(), "out".into(), "adjustment".into()],
            }),
        }
    }
}

/// What caused a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    Sale,
    Purchase,
    Adjustment,
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product with its live stock counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Unique business code.
    pub code: String,

    pub description: Option<String>,

    /// Unit of measure ("piece", "kg", ...).
    pub unit: String,

    pub category_id: Option<i64>,

    /// Joined from `categories`; `None` when uncategorized.
    pub category_name: Option<String>,

    /// Cost price in cents.
    pub purchase_price_cents: i64,

    /// List price in cents.
    pub selling_price_cents: i64,

    /// Reorder threshold.
    pub min_stock: i64,

    /// Optional stocking target.
    pub max_stock: Option<i64>,

    /// Units on hand. Never negative.
    pub current_stock: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the purchase price as Money.
    #[inline]
    pub fn purchase_price(&self) -> Money {
        Money::from_cents(self.purchase_price_cents)
    }

    /// Returns the selling price as Money.
    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_cents(self.selling_price_cents)
    }

    /// Checks if `quantity` units can leave the shelf.
    #[inline]
    pub fn can_supply(&self, quantity: i64) -> bool {
        self.current_stock >= quantity
    }
}

/// Fields for creating a product.
#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub category_id: Option<i64>,
    pub purchase_price: Money,
    pub selling_price: Money,
    pub min_stock: i64,
    pub max_stock: Option<i64>,
    /// Opening stock.
    pub current_stock: i64,
}

/// Partial product update. `None` leaves the field as it is.
///
/// Stock is not editable here; it only moves through invoices and
/// adjustments so the ledger stays complete.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub category_id: Option<i64>,
    pub purchase_price: Option<Money>,
    pub selling_price: Option<Money>,
    pub min_stock: Option<i64>,
    pub max_stock: Option<i64>,
    pub is_active: Option<bool>,
}

/// A product grouping, used by the catalog and the valuation report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Customer / Supplier
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub contact_person: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub tax_number: Option<String>,
    /// "customer" or "dealer".
    pub customer_type: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub contact_person: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub tax_number: Option<String>,
    pub commercial_register: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Contact details shared by customers and suppliers.
#[derive(Debug, Clone, Default)]
pub struct ContactDetails {
    pub name: String,
    pub contact_person: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub tax_number: Option<String>,
}

/// Partial contact update. `None` leaves the field as it is.
#[derive(Debug, Clone, Default)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub tax_number: Option<String>,
}

impl ContactPatch {
    /// Merges the patch over the stored details.
    pub fn apply(self, current: ContactDetails) -> ContactDetails {
        ContactDetails {
            name: self.name.unwrap_or(current.name),
            contact_person: self.contact_person.or(current.contact_person),
            address: self.address.or(current.address),
            phone: self.phone.or(current.phone),
            email: self.email.or(current.email),
            tax_number: self.tax_number.or(current.tax_number),
        }
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// A committed sale or purchase, as read back for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub kind: InvoiceKind,
    pub invoice_number: String,
    /// customer_id for sales, supplier_id for purchases.
    pub counterparty_id: i64,
    pub counterparty_name: Option<String>,
    pub employee_id: Option<i64>,
    pub invoice_date: NaiveDate,
    pub total_amount_cents: i64,
    pub discount_amount_cents: i64,
    pub tax_amount_cents: i64,
    pub net_amount_cents: i64,
    /// Sales only.
    pub invoice_type: Option<InvoiceType>,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Empty on list endpoints.
    pub items: Vec<InvoiceItem>,
}

impl Invoice {
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }

    #[inline]
    pub fn discount_amount(&self) -> Money {
        Money::from_cents(self.discount_amount_cents)
    }

    #[inline]
    pub fn tax_amount(&self) -> Money {
        Money::from_cents(self.tax_amount_cents)
    }

    #[inline]
    pub fn net_amount(&self) -> Money {
        Money::from_cents(self.net_amount_cents)
    }
}

/// A line on an invoice. The unit price is a snapshot taken when the
/// invoice was written, independent of the product's current price.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InvoiceItem {
    pub id: i64,
    pub invoice_id: i64,
    pub product_id: i64,
    pub product_name: Option<String>,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
}

impl InvoiceItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

// =============================================================================
// Stock Movement
// =============================================================================

/// An append-only stock ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockMovement {
    pub id: i64,
    pub product_id: i64,
    pub product_name: Option<String>,
    pub movement_type: MovementType,
    /// Always positive; direction is `movement_type`.
    pub quantity: i64,
    pub reference_type: ReferenceType,
    pub reference_id: Option<i64>,
    pub notes: Option<String>,
    pub employee_id: Option<i64>,
    pub movement_date: DateTime<Utc>,
}

/// A ledger entry about to be recorded.
#[derive(Debug, Clone)]
pub struct NewStockMovement {
    pub product_id: i64,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub reference_type: ReferenceType,
    pub reference_id: Option<i64>,
    pub employee_id: Option<i64>,
    pub notes: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
