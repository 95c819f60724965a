//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - CRUD with soft delete
//! - Stock helpers that run on a caller-owned transaction
//!
//! ## Stock Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  current_stock only changes through:                                    │
//! │                                                                         │
//! │   InvoiceEngine (sale)      decrement_stock   WHERE current_stock >= ?  │
//! │   InvoiceEngine (purchase)  increment_stock   WHERE stock <= MAX - ?    │
//! │   StockRepository::adjust   set_stock                                   │
//! │                                                                         │
//! │  Each of these runs inside the transaction that also appends the       │
//! │  matching stock_movements row, so live stock and ledger commit          │
//! │  together or not at all.                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use storehouse_core::validation::{
    validate_id, validate_name, validate_optional_text, validate_price, validate_product_code,
    validate_stock_level, validate_stock_thresholds, ValidationResult,
};
use storehouse_core::{CoreError, NewProduct, Product, ProductPatch, MAX_STOCK};

/// Select list and source matching [`Product`]'s `FromRow` layout.
const PRODUCT_SELECT: &str = "SELECT p.id, p.name, p.code, p.description, p.unit, \
     p.category_id, c.name AS category_name, \
     p.purchase_price_cents, p.selling_price_cents, p.min_stock, p.max_stock, \
     p.current_stock, p.is_active, p.created_at, p.updated_at \
     FROM products p LEFT JOIN categories c ON c.id = p.category_id";

const DEFAULT_UNIT: &str = "piece";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let product = repo.get_by_id(42).await?;
/// let catalog = repo.list(false).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// The stored product with its assigned id.
    ///
    /// ## Errors
    /// - `Rejected(Validation)` for invalid fields
    /// - `Rejected(CategoryNotFound)` for an unknown `category_id`
    /// - `UniqueViolation` when the code is already taken
    pub async fn create(&self, product: &NewProduct) -> DbResult<Product> {
        validate_new_product(product).map_err(CoreError::from)?;
        self.ensure_category(product.category_id).await?;

        let code = product.code.trim();
        let now = Utc::now();

        debug!(code = %code, "Inserting product");

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                name, code, description, unit, category_id,
                purchase_price_cents, selling_price_cents,
                min_stock, max_stock, current_stock,
                is_active, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(product.name.trim())
        .bind(code)
        .bind(&product.description)
        .bind(product.unit.as_deref().unwrap_or(DEFAULT_UNIT))
        .bind(product.category_id)
        .bind(product.purchase_price.cents())
        .bind(product.selling_price.cents())
        .bind(product.min_stock)
        .bind(product.max_stock)
        .bind(product.current_stock)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_code(e, code))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Gets a product by ID, active or not.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("{PRODUCT_SELECT} WHERE p.id = ?");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists products ordered by name.
    ///
    /// ## Arguments
    /// * `include_inactive` - Also return soft-deleted products
    pub async fn list(&self, include_inactive: bool) -> DbResult<Vec<Product>> {
        let sql = if include_inactive {
            format!("{PRODUCT_SELECT} ORDER BY p.name, p.id")
        } else {
            format!("{PRODUCT_SELECT} WHERE p.is_active = 1 ORDER BY p.name, p.id")
        };

        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Applies a partial update.
    ///
    /// `current_stock` is never touched here.
    pub async fn update(&self, id: i64, patch: &ProductPatch) -> DbResult<Product> {
        let mut product = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        apply_patch(&mut product, patch);
        validate_product(&product).map_err(CoreError::from)?;
        self.ensure_category(patch.category_id).await?;

        debug!(id = %id, "Updating product");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?, code = ?, description = ?, unit = ?, category_id = ?,
                purchase_price_cents = ?, selling_price_cents = ?,
                min_stock = ?, max_stock = ?, is_active = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&product.name)
        .bind(&product.code)
        .bind(&product.description)
        .bind(&product.unit)
        .bind(product.category_id)
        .bind(product.purchase_price_cents)
        .bind(product.selling_price_cents)
        .bind(product.min_stock)
        .bind(product.max_stock)
        .bind(product.is_active)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_code(e, &product.code))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        // Re-read so category_name follows a category change.
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    async fn ensure_category(&self, category_id: Option<i64>) -> DbResult<()> {
        let Some(id) = category_id else {
            return Ok(());
        };
        validate_id("category_id", id).map_err(CoreError::from)?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        if !exists {
            return Err(CoreError::CategoryNotFound(id).into());
        }

        Ok(())
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// Historical invoice items and ledger rows still reference it.
    pub async fn deactivate(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "Deactivating product");

        let result = sqlx::query("UPDATE products SET is_active = 0, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Transactional stock helpers
    // =========================================================================

    /// Loads a product on the given connection (usually an open transaction).
    pub async fn find_in(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("{PRODUCT_SELECT} WHERE p.id = ?");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(product)
    }

    /// Removes `quantity` units if at least that many are on hand.
    ///
    /// ## Returns
    /// * `true` - stock was decremented
    /// * `false` - not enough stock (or no such product); nothing changed
    pub async fn decrement_stock(
        conn: &mut SqliteConnection,
        id: i64,
        quantity: i64,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET current_stock = current_stock - ?, updated_at = ?
            WHERE id = ? AND current_stock >= ?
            "#,
        )
        .bind(quantity)
        .bind(Utc::now())
        .bind(id)
        .bind(quantity)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Adds `quantity` units if the result stays within `MAX_STOCK`.
    ///
    /// ## Returns
    /// * `true` - stock was incremented
    /// * `false` - the limit would be passed (or no such product); nothing changed
    pub async fn increment_stock(
        conn: &mut SqliteConnection,
        id: i64,
        quantity: i64,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET current_stock = current_stock + ?1, updated_at = ?2
            WHERE id = ?3 AND current_stock <= ?4 - ?1
            "#,
        )
        .bind(quantity)
        .bind(Utc::now())
        .bind(id)
        .bind(MAX_STOCK)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Overwrites the stock level.
    pub async fn set_stock(conn: &mut SqliteConnection, id: i64, stock: i64) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE products SET current_stock = ?, updated_at = ? WHERE id = ?")
                .bind(stock)
                .bind(Utc::now())
                .bind(id)
                .execute(&mut *conn)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_name(&product.name)?;
    validate_product_code(&product.code)?;
    validate_optional_text("description", product.description.as_deref(), 1000)?;
    validate_optional_text("unit", product.unit.as_deref(), 50)?;
    validate_price("purchase_price", product.purchase_price)?;
    validate_price("selling_price", product.selling_price)?;
    validate_stock_thresholds(product.min_stock, product.max_stock)?;
    validate_stock_level("current_stock", product.current_stock)
}

fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_name(&product.name)?;
    validate_product_code(&product.code)?;
    validate_optional_text("description", product.description.as_deref(), 1000)?;
    validate_optional_text("unit", Some(product.unit.as_str()), 50)?;
    validate_price("purchase_price", product.purchase_price())?;
    validate_price("selling_price", product.selling_price())?;
    validate_stock_thresholds(product.min_stock, product.max_stock)
}

fn apply_patch(product: &mut Product, patch: &ProductPatch) {
    if let Some(name) = &patch.name {
        product.name = name.trim().to_string();
    }
    if let Some(code) = &patch.code {
        product.code = code.trim().to_string();
    }
    if let Some(description) = &patch.description {
        product.description = Some(description.clone());
    }
    if let Some(unit) = &patch.unit {
        product.unit = unit.clone();
    }
    if let Some(category_id) = patch.category_id {
        product.category_id = Some(category_id);
    }
    if let Some(price) = patch.purchase_price {
        product.purchase_price_cents = price.cents();
    }
    if let Some(price) = patch.selling_price {
        product.selling_price_cents = price.cents();
    }
    if let Some(min) = patch.min_stock {
        product.min_stock = min;
    }
    if let Some(max) = patch.max_stock {
        product.max_stock = Some(max);
    }
    if let Some(active) = patch.is_active {
        product.is_active = active;
    }
}

/// Names the offending code on a UNIQUE violation.
fn duplicate_code(err: sqlx::Error, code: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { .. } => DbError::duplicate("code", code),
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
