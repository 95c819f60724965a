//! # Stock Rules
//!
//! Pure rules behind the inventory views and manual adjustments.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  current_stock vs thresholds                                            │
//! │                                                                         │
//! │   0 ──────────── min_stock ─────────────────── max_stock ──────────►    │
//! │   │                  │                             │                    │
//! │   out_of_stock       low_stock (≤ min)   normal    overstock (≥ max)    │
//! │                                                                         │
//! │  Reorder target = max_stock when set, else 2 × min_stock                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{MovementType, NewStockMovement, Product, ReferenceType};
use crate::validation::validate_stock_level;
use crate::MAX_STOCK;

// =============================================================================
// Status
// =============================================================================

/// Where a product's stock sits relative to its thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    Overstock,
    Normal,
}

impl StockStatus {
    /// Classifies a stock level. Empty shelves win over every other status.
    pub fn classify(current: i64, min_stock: i64, max_stock: Option<i64>) -> Self {
        if current == 0 {
            StockStatus::OutOfStock
        } else if current <= min_stock {
            StockStatus::LowStock
        } else if max_stock.is_some_and(|max| current >= max) {
            StockStatus::Overstock
        } else {
            StockStatus::Normal
        }
    }
}

/// True when the product should appear on the low-stock list.
#[inline]
pub fn is_low(current: i64, min_stock: i64) -> bool {
    current <= min_stock
}

/// Units missing to reach `min_stock` (never negative).
#[inline]
pub fn shortage(current: i64, min_stock: i64) -> i64 {
    (min_stock - current).max(0)
}

/// Quantity to order to bring the product back to its target level.
///
/// ## Example
/// ```rust
/// use storehouse_core::stock::reorder_quantity;
///
/// assert_eq!(reorder_quantity(2, 5, Some(40)), 38);
/// assert_eq!(reorder_quantity(2, 5, None), 8);      // target 2 × min
/// ```
pub fn reorder_quantity(current: i64, min_stock: i64, max_stock: Option<i64>) -> i64 {
    let target = max_stock
        .filter(|max| *max > 0)
        .unwrap_or_else(|| min_stock.saturating_mul(2));
    target.saturating_sub(current).max(0)
}

/// Cost of ordering `quantity` units at `unit_cost`. Saturates.
#[inline]
pub fn estimated_cost(quantity: i64, unit_cost: Money) -> Money {
    unit_cost.saturating_multiply_quantity(quantity)
}

/// Value of `stock` units at `unit_price`. Saturates.
#[inline]
pub fn stock_value(stock: i64, unit_price: Money) -> Money {
    unit_price.saturating_multiply_quantity(stock)
}

/// Whether `quantity` more units fit under `MAX_STOCK`.
///
/// ## Example
/// ```rust
/// use storehouse_core::stock::can_receive;
/// use storehouse_core::MAX_STOCK;
///
/// assert!(can_receive(MAX_STOCK - 5, 5));
/// assert!(!can_receive(MAX_STOCK - 1, 5));
/// ```
#[inline]
pub fn can_receive(current: i64, quantity: i64) -> bool {
    current <= MAX_STOCK.saturating_sub(quantity)
}

// =============================================================================
// Valuation
// =============================================================================

/// Which price an inventory valuation multiplies stock by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationMethod {
    #[default]
    PurchasePrice,
    SellingPrice,
}

impl ValuationMethod {
    pub fn unit_price(&self, product: &Product) -> Money {
        match self {
            ValuationMethod::PurchasePrice => product.purchase_price(),
            ValuationMethod::SellingPrice => product.selling_price(),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            ValuationMethod::PurchasePrice => "purchase_price",
            ValuationMethod::SellingPrice => "selling_price",
        }
    }
}

// =============================================================================
// Adjustment
// =============================================================================

/// A manual correction that sets a product's stock to a counted value.
///
/// The ledger stores `|difference|` as the movement quantity; the direction
/// is written into the default note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub old_stock: i64,
    pub new_stock: i64,
}

impl StockAdjustment {
    /// Plans an adjustment from the current to the counted stock.
    ///
    /// ## Errors
    /// - `Validation` if `new_stock` is negative
    /// - `NoStockChange` if nothing would change
    pub fn plan(old_stock: i64, new_stock: i64) -> CoreResult<Self> {
        validate_stock_level("new_stock", new_stock)?;

        if new_stock == old_stock {
            return Err(CoreError::NoStockChange { stock: old_stock });
        }

        Ok(StockAdjustment {
            old_stock,
            new_stock,
        })
    }

    /// Signed change (`new - old`).
    #[inline]
    pub fn difference(&self) -> i64 {
        self.new_stock - self.old_stock
    }

    /// Ledger quantity (always positive).
    #[inline]
    pub fn quantity(&self) -> i64 {
        self.difference().abs()
    }

    pub fn default_note(&self) -> String {
        format!(
            "Stock adjusted from {} to {}",
            self.old_stock, self.new_stock
        )
    }

    /// The ledger entry recording this adjustment.
    pub fn movement(
        &self,
        product_id: i64,
        employee_id: Option<i64>,
        notes: Option<String>,
    ) -> NewStockMovement {
        NewStockMovement {
            product_id,
            movement_type: MovementType::Adjustment,
            quantity: self.quantity(),
            reference_type: ReferenceType::Adjustment,
            reference_id: None,
            employee_id,
            notes: Some(notes.unwrap_or_else(|| self.default_note())),
        }
    }
}
