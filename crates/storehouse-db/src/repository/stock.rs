//! # Stock Repository
//!
//! The append-only stock ledger, manual adjustments, and the read-only
//! inventory views built on top of the catalog.
//!
//! ## Ledger Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stock_movements                                                        │
//! │                                                                         │
//! │  movement_type   reference_type   reference_id   written by             │
//! │  ─────────────   ──────────────   ────────────   ───────────────────    │
//! │  out             sale             sales.id       InvoiceEngine          │
//! │  in              purchase         purchases.id   InvoiceEngine          │
//! │  adjustment      adjustment       NULL           StockRepository::adjust│
//! │                                                                         │
//! │  quantity is always > 0. Rows are never updated or deleted.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::product::ProductRepository;
use storehouse_core::stock::{self, StockAdjustment, StockStatus, ValuationMethod};
use storehouse_core::validation::{validate_id, validate_notes};
use storehouse_core::{CoreError, Money, MovementType, NewStockMovement, Product, StockMovement};

/// Default page size for ledger listings.
pub const DEFAULT_PER_PAGE: u32 = 50;

/// Largest page size a caller may request.
pub const MAX_PER_PAGE: u32 = 200;

/// Valuation bucket for products without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

// =============================================================================
// Query / Result Types
// =============================================================================

/// Optional filters for [`StockRepository::list`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MovementFilter {
    pub product_id: Option<i64>,
    pub movement_type: Option<MovementType>,
}

/// A normalized page request (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    /// Applies defaults and bounds: page ≥ 1, per_page in `1..=MAX_PER_PAGE`.
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        PageRequest {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(None, None)
    }
}

/// One page of ledger entries.
#[derive(Debug, Clone, Serialize)]
pub struct MovementPage {
    pub movements: Vec<StockMovement>,
    pub total: i64,
    pub pages: i64,
    pub current_page: u32,
}

/// What an adjustment changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdjustmentOutcome {
    pub product_id: i64,
    pub old_stock: i64,
    pub new_stock: i64,
    /// Signed: negative when stock went down.
    pub difference: i64,
}

/// Totals for one movement type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct MovementSummary {
    pub movement_type: MovementType,
    pub total_quantity: i64,
    pub movement_count: i64,
}

/// A product at or below its minimum stock.
#[derive(Debug, Clone)]
pub struct LowStockEntry {
    pub product: Product,
    pub shortage: i64,
}

/// How much of a low product to order.
#[derive(Debug, Clone)]
pub struct ReorderSuggestion {
    pub product: Product,
    pub suggested_quantity: i64,
    pub estimated_cost: Money,
}

/// One line of the stock report.
#[derive(Debug, Clone)]
pub struct StockReportEntry {
    pub product: Product,
    pub status: StockStatus,
    pub stock_value: Money,
}

/// Counts and value across the whole report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StockReportSummary {
    pub total_products: usize,
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
    pub overstock_count: usize,
    pub total_value: Money,
}

#[derive(Debug, Clone)]
pub struct StockReport {
    pub summary: StockReportSummary,
    pub products: Vec<StockReportEntry>,
}

/// One product's contribution to an inventory valuation.
#[derive(Debug, Clone)]
pub struct ValuationEntry {
    pub product: Product,
    pub unit_price: Money,
    pub total_value: Money,
}

/// Stock on hand priced by one [`ValuationMethod`].
///
/// Sums saturate at the `i64` cent range.
#[derive(Debug, Clone)]
pub struct InventoryValuation {
    pub method: ValuationMethod,
    pub total_value: Money,
    /// Keyed by category name, [`UNCATEGORIZED`] for the rest.
    pub categories_value: BTreeMap<String, Money>,
    pub products: Vec<ValuationEntry>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for the stock ledger and inventory views.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Appends a ledger entry on the given connection.
    ///
    /// ## Returns
    /// The new movement id.
    pub async fn record_in(conn: &mut SqliteConnection, movement: &NewStockMovement) -> DbResult<i64> {
        validate_id("product_id", movement.product_id).map_err(CoreError::from)?;
        // Positive only: adjustments may exceed the per-line invoice cap.
        validate_id("quantity", movement.quantity).map_err(CoreError::from)?;
        validate_notes(movement.notes.as_deref()).map_err(CoreError::from)?;

        debug!(
            product_id = movement.product_id,
            movement_type = movement.movement_type.as_str(),
            quantity = movement.quantity,
            "Recording stock movement"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO stock_movements (
                product_id, movement_type, quantity,
                reference_type, reference_id,
                notes, employee_id, movement_date
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(movement.product_id)
        .bind(movement.movement_type)
        .bind(movement.quantity)
        .bind(movement.reference_type)
        .bind(movement.reference_id)
        .bind(&movement.notes)
        .bind(movement.employee_id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Appends a ledger entry in its own statement.
    pub async fn record(&self, movement: &NewStockMovement) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        Self::record_in(&mut conn, movement).await
    }

    /// Lists ledger entries newest first.
    pub async fn list(&self, filter: MovementFilter, page: PageRequest) -> DbResult<MovementPage> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM stock_movements
            WHERE (?1 IS NULL OR product_id = ?1)
              AND (?2 IS NULL OR movement_type = ?2)
            "#,
        )
        .bind(filter.product_id)
        .bind(filter.movement_type)
        .fetch_one(&self.pool)
        .await?;

        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT m.id, m.product_id, p.name AS product_name,
                   m.movement_type, m.quantity, m.reference_type, m.reference_id,
                   m.notes, m.employee_id, m.movement_date
            FROM stock_movements m
            LEFT JOIN products p ON p.id = m.product_id
            WHERE (?1 IS NULL OR m.product_id = ?1)
              AND (?2 IS NULL OR m.movement_type = ?2)
            ORDER BY m.movement_date DESC, m.id DESC
            LIMIT ?3 OFFSET ?4
            "#,
        )
        .bind(filter.product_id)
        .bind(filter.movement_type)
        .bind(i64::from(page.per_page))
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let per_page = i64::from(page.per_page);
        Ok(MovementPage {
            movements,
            total,
            pages: (total + per_page - 1) / per_page,
            current_page: page.page,
        })
    }

    /// Ledger entries written for one invoice, in insertion order.
    pub async fn for_reference(
        &self,
        reference_type: storehouse_core::ReferenceType,
        reference_id: i64,
    ) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT m.id, m.product_id, p.name AS product_name,
                   m.movement_type, m.quantity, m.reference_type, m.reference_id,
                   m.notes, m.employee_id, m.movement_date
            FROM stock_movements m
            LEFT JOIN products p ON p.id = m.product_id
            WHERE m.reference_type = ? AND m.reference_id = ?
            ORDER BY m.id
            "#,
        )
        .bind(reference_type)
        .bind(reference_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Sets a product's stock to a counted value and records the change.
    ///
    /// ## Errors
    /// - `NotFound` if the product does not exist
    /// - `Rejected(Validation)` if `new_stock` is negative
    /// - `Rejected(NoStockChange)` if the count equals the current stock
    pub async fn adjust(
        &self,
        product_id: i64,
        new_stock: i64,
        notes: Option<String>,
        employee_id: Option<i64>,
    ) -> DbResult<AdjustmentOutcome> {
        validate_notes(notes.as_deref()).map_err(CoreError::from)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        // Write first so the lock is held before the stock is read.
        sqlx::query("UPDATE products SET updated_at = updated_at WHERE id = ?")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        let product = ProductRepository::find_in(&mut tx, product_id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", product_id))?;

        let adjustment = StockAdjustment::plan(product.current_stock, new_stock)?;

        ProductRepository::set_stock(&mut tx, product_id, new_stock).await?;
        Self::record_in(&mut tx, &adjustment.movement(product_id, employee_id, notes)).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            product_id,
            old_stock = adjustment.old_stock,
            new_stock = adjustment.new_stock,
            "Stock adjusted"
        );

        Ok(AdjustmentOutcome {
            product_id,
            old_stock: adjustment.old_stock,
            new_stock: adjustment.new_stock,
            difference: adjustment.difference(),
        })
    }

    /// Quantity and count per movement type, optionally within an inclusive
    /// date range (by movement date).
    pub async fn summary(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> DbResult<Vec<MovementSummary>> {
        let rows = sqlx::query_as::<_, MovementSummary>(
            r#"
            SELECT movement_type,
                   COALESCE(SUM(quantity), 0) AS total_quantity,
                   COUNT(id) AS movement_count
            FROM stock_movements
            WHERE (?1 IS NULL OR date(movement_date) >= ?1)
              AND (?2 IS NULL OR date(movement_date) <= ?2)
            GROUP BY movement_type
            ORDER BY movement_type
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // =========================================================================
    // Inventory Views
    // =========================================================================

    async fn active_products(&self) -> DbResult<Vec<Product>> {
        ProductRepository::new(self.pool.clone()).list(false).await
    }

    /// Active products at or below their minimum stock.
    pub async fn low_stock(&self) -> DbResult<Vec<LowStockEntry>> {
        let entries = self
            .active_products()
            .await?
            .into_iter()
            .filter(|p| stock::is_low(p.current_stock, p.min_stock))
            .map(|product| LowStockEntry {
                shortage: stock::shortage(product.current_stock, product.min_stock),
                product,
            })
            .collect();

        Ok(entries)
    }

    /// Order quantities for every low-stock product.
    pub async fn reorder_suggestions(&self) -> DbResult<Vec<ReorderSuggestion>> {
        let suggestions = self
            .low_stock()
            .await?
            .into_iter()
            .map(|entry| {
                let product = entry.product;
                let suggested_quantity = stock::reorder_quantity(
                    product.current_stock,
                    product.min_stock,
                    product.max_stock,
                );
                ReorderSuggestion {
                    estimated_cost: stock::estimated_cost(
                        suggested_quantity,
                        product.purchase_price(),
                    ),
                    suggested_quantity,
                    product,
                }
            })
            .collect();

        Ok(suggestions)
    }

    /// Classifies every active product and values the stock on hand.
    pub async fn stock_report(&self) -> DbResult<StockReport> {
        let mut summary = StockReportSummary::default();
        let mut products = Vec::new();

        for product in self.active_products().await? {
            let status =
                StockStatus::classify(product.current_stock, product.min_stock, product.max_stock);
            match status {
                StockStatus::OutOfStock => summary.out_of_stock_count += 1,
                StockStatus::LowStock => summary.low_stock_count += 1,
                StockStatus::Overstock => summary.overstock_count += 1,
                StockStatus::Normal => {}
            }

            let stock_value = stock::stock_value(product.current_stock, product.purchase_price());
            summary.total_value = summary.total_value.saturating_add(stock_value);
            summary.total_products += 1;

            products.push(StockReportEntry {
                product,
                status,
                stock_value,
            });
        }

        Ok(StockReport { summary, products })
    }

    /// Values every active product's stock at the chosen price.
    pub async fn valuation(&self, method: ValuationMethod) -> DbResult<InventoryValuation> {
        let mut total_value = Money::zero();
        let mut categories_value: BTreeMap<String, Money> = BTreeMap::new();
        let mut products = Vec::new();

        for product in self.active_products().await? {
            let unit_price = method.unit_price(&product);
            let value = stock::stock_value(product.current_stock, unit_price);

            total_value = total_value.saturating_add(value);
            let category = product
                .category_name
                .clone()
                .unwrap_or_else(|| UNCATEGORIZED.to_string());
            let bucket = categories_value.entry(category).or_default();
            *bucket = bucket.saturating_add(value);

            products.push(ValuationEntry {
                product,
                unit_price,
                total_value: value,
            });
        }

        debug!(method = method.as_str(), products = products.len(), "Inventory valued");

        Ok(InventoryValuation {
            method,
            total_value,
            categories_value,
            products,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use storehouse_core::{NewProduct, ReferenceType, MAX_PRICE_CENTS, MAX_STOCK};

    async fn setup(stock: i64, min: i64, max: Option<i64>) -> (Database, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db
            .products()
            .create(&NewProduct {
                name: "Bolt".into(),
                code: "B-1".into(),
                purchase_price: Money::from_cents(500),
                selling_price: Money::from_cents(900),
                min_stock: min,
                max_stock: max,
                current_stock: stock,
                ..Default::default()
            })
            .await
            .unwrap();
        (db, product)
    }

    #[test]
    fn test_page_request_bounds() {
        assert_eq!(PageRequest::new(None, None), PageRequest { page: 1, per_page: 50 });
        assert_eq!(PageRequest::new(Some(0), Some(1_000)), PageRequest { page: 1, per_page: 200 });
        assert_eq!(PageRequest::new(Some(3), Some(0)).per_page, 1);
        assert_eq!(PageRequest::new(Some(3), Some(20)).offset(), 40);
    }

    #[tokio::test]
    async fn test_adjust_down_records_absolute_quantity() {
        let (db, product) = setup(10, 2, None).await;
        let stock = db.stock();

        let outcome = stock.adjust(product.id, 7, None, Some(3)).await.unwrap();
        assert_eq!(outcome.old_stock, 10);
        assert_eq!(outcome.new_stock, 7);
        assert_eq!(outcome.difference, -3);

        let reloaded = db.products().get_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.current_stock, 7);

        let page = stock.list(MovementFilter::default(), PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 1);
        let m = &page.movements[0];
        assert_eq!(m.movement_type, MovementType::Adjustment);
        assert_eq!(m.reference_type, ReferenceType::Adjustment);
        assert_eq!(m.quantity, 3);
        assert_eq!(m.reference_id, None);
        assert_eq!(m.employee_id, Some(3));
        assert_eq!(m.product_name.as_deref(), Some("Bolt"));
        assert_eq!(m.notes.as_deref(), Some("Stock adjusted from 10 to 7"));
    }

    #[tokio::test]
    async fn test_adjust_rejections_leave_no_trace() {
        let (db, product) = setup(10, 2, None).await;
        let stock = db.stock();

        assert!(matches!(
            stock.adjust(product.id, 10, None, None).await,
            Err(DbError::Rejected(CoreError::NoStockChange { stock: 10 }))
        ));
        assert!(matches!(
            stock.adjust(product.id, -1, None, None).await,
            Err(DbError::Rejected(CoreError::Validation(_)))
        ));
        assert!(matches!(
            stock.adjust(999, 5, None, None).await,
            Err(DbError::NotFound { .. })
        ));

        let page = stock.list(MovementFilter::default(), PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 0);
        let reloaded = db.products().get_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.current_stock, 10);
    }

    #[tokio::test]
    async fn test_list_filters_and_paginates() {
        let (db, product) = setup(0, 0, None).await;
        let stock = db.stock();

        for qty in 1..=5 {
            stock
                .record(&NewStockMovement {
                    product_id: product.id,
                    movement_type: MovementType::In,
                    quantity: qty,
                    reference_type: ReferenceType::Purchase,
                    reference_id: Some(qty),
                    employee_id: None,
                    notes: None,
                })
                .await
                .unwrap();
        }

        let page = stock
            .list(MovementFilter::default(), PageRequest::new(Some(2), Some(2)))
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.pages, 3);
        assert_eq!(page.current_page, 2);
        // Newest first: ids 5,4 | 3,2 | 1
        let ids: Vec<i64> = page.movements.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 2]);

        let outs = stock
            .list(
                MovementFilter {
                    movement_type: Some(MovementType::Out),
                    ..Default::default()
                },
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(outs.total, 0);
        assert_eq!(outs.pages, 0);
    }

    #[tokio::test]
    async fn test_record_rejects_non_positive_quantity() {
        let (db, product) = setup(0, 0, None).await;
        let err = db
            .stock()
            .record(&NewStockMovement {
                product_id: product.id,
                movement_type: MovementType::In,
                quantity: 0,
                reference_type: ReferenceType::Purchase,
                reference_id: None,
                employee_id: None,
                notes: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rejected(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_summary_groups_by_type() {
        let (db, product) = setup(10, 0, None).await;
        let stock = db.stock();
        stock.adjust(product.id, 4, None, None).await.unwrap();
        stock.adjust(product.id, 6, None, None).await.unwrap();

        let summary = stock.summary(None, None).await.unwrap();
        assert_eq!(
            summary,
            vec![MovementSummary {
                movement_type: MovementType::Adjustment,
                total_quantity: 8,
                movement_count: 2,
            }]
        );

        let today = Utc::now().date_naive();
        assert_eq!(stock.summary(Some(today), Some(today)).await.unwrap().len(), 1);

        let yesterday = today.pred_opt().unwrap();
        assert!(stock.summary(None, Some(yesterday)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_inventory_views() {
        let (db, low) = setup(3, 5, Some(20)).await;
        db.products()
            .create(&NewProduct {
                name: "Nut".into(),
                code: "N-1".into(),
                purchase_price: Money::from_cents(100),
                min_stock: 1,
                max_stock: Some(10),
                current_stock: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        let stock = db.stock();

        let low_list = stock.low_stock().await.unwrap();
        assert_eq!(low_list.len(), 1);
        assert_eq!(low_list[0].product.id, low.id);
        assert_eq!(low_list[0].shortage, 2);

        let suggestions = stock.reorder_suggestions().await.unwrap();
        assert_eq!(suggestions[0].suggested_quantity, 17);
        assert_eq!(suggestions[0].estimated_cost, Money::from_cents(8_500));

        let report = stock.stock_report().await.unwrap();
        assert_eq!(report.summary.total_products, 2);
        assert_eq!(report.summary.low_stock_count, 1);
        assert_eq!(report.summary.overstock_count, 1);
        assert_eq!(report.summary.out_of_stock_count, 0);
        // 3 × 5.00 + 10 × 1.00
        assert_eq!(report.summary.total_value, Money::from_cents(2_500));
        assert_eq!(suggestions[0].product.category_name, None);
    }

    #[tokio::test]
    async fn test_report_saturates_on_huge_stock_value() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        // Ten products at the price and stock ceilings are worth 1e19 cents,
        // more than i64 holds.
        for i in 0..10 {
            db.products()
                .create(&NewProduct {
                    name: format!("Ingot {i}"),
                    code: format!("I-{i}"),
                    purchase_price: Money::from_cents(MAX_PRICE_CENTS),
                    selling_price: Money::from_cents(MAX_PRICE_CENTS),
                    min_stock: MAX_STOCK,
                    current_stock: MAX_STOCK,
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        let stock = db.stock();

        let report = stock.stock_report().await.unwrap();
        assert_eq!(report.summary.total_products, 10);
        assert_eq!(report.summary.total_value, Money::from_cents(i64::MAX));
        assert_eq!(
            report.products[0].stock_value,
            Money::from_cents(MAX_PRICE_CENTS * MAX_STOCK)
        );

        let valuation = stock.valuation(ValuationMethod::SellingPrice).await.unwrap();
        assert_eq!(valuation.total_value, Money::from_cents(i64::MAX));
        assert_eq!(valuation.categories_value[UNCATEGORIZED], Money::from_cents(i64::MAX));

        // min_stock at the ceiling makes every product low, target 2 × min
        let suggestions = stock.reorder_suggestions().await.unwrap();
        assert_eq!(suggestions.len(), 10);
        assert_eq!(suggestions[0].suggested_quantity, MAX_STOCK);
        assert_eq!(
            suggestions[0].estimated_cost,
            Money::from_cents(MAX_PRICE_CENTS * MAX_STOCK)
        );
    }

    #[tokio::test]
    async fn test_valuation_groups_by_category() {
        let (db, bolt) = setup(3, 0, None).await;
        let hardware = db.categories().create("Hardware", None).await.unwrap();
        db.products()
            .update(
                bolt.id,
                &storehouse_core::ProductPatch {
                    category_id: Some(hardware.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        db.products()
            .create(&NewProduct {
                name: "Glue".into(),
                code: "G-1".into(),
                purchase_price: Money::from_cents(250),
                selling_price: Money::from_cents(400),
                current_stock: 4,
                ..Default::default()
            })
            .await
            .unwrap();
        let stock = db.stock();

        let by_cost = stock.valuation(ValuationMethod::PurchasePrice).await.unwrap();
        assert_eq!(by_cost.method, ValuationMethod::PurchasePrice);
        // 3 × 5.00 + 4 × 2.50
        assert_eq!(by_cost.total_value, Money::from_cents(2_500));
        assert_eq!(by_cost.categories_value["Hardware"], Money::from_cents(1_500));
        assert_eq!(by_cost.categories_value[UNCATEGORIZED], Money::from_cents(1_000));

        let by_price = stock.valuation(ValuationMethod::SellingPrice).await.unwrap();
        // 3 × 9.00 + 4 × 4.00
        assert_eq!(by_price.total_value, Money::from_cents(4_300));
        let bolt_entry = by_price.products.iter().find(|e| e.product.id == bolt.id).unwrap();
        assert_eq!(bolt_entry.unit_price, Money::from_cents(900));
        assert_eq!(bolt_entry.total_value, Money::from_cents(2_700));
    }
}
