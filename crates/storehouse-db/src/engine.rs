//! # Invoice Engine
//!
//! Creates a sale or purchase as one atomic unit: header, number, items,
//! stock changes, ledger entries and totals commit together or not at all.
//!
//! ## Transaction Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  draft.validate()                   ← no storage touched on rejection   │
//! │       │                                                                 │
//! │  BEGIN                                                                  │
//! │   ├── INSERT header (pending, totals 0)   ← takes the SQLite write lock │
//! │   ├── counterparty exists?                → CounterpartyNotFound        │
//! │   ├── UPDATE invoice_number = PREFIX-{id:06}                            │
//! │   ├── for each line, in order:                                          │
//! │   │     ├── load product                  → ProductNotFound             │
//! │   │     ├── sale:     stock -= qty WHERE stock >= qty                   │
//! │   │     │                                 → InsufficientStock           │
//! │   │     ├── purchase: stock += qty WHERE stock + qty <= MAX_STOCK       │
//! │   │     │                                 → StockLimitExceeded          │
//! │   │     ├── INSERT item                                                 │
//! │   │     └── INSERT stock movement (out / in)                            │
//! │   ├── terms.settle(total, discount)       → DiscountExceedsTotal        │
//! │   └── UPDATE totals, status = completed                                 │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any error drops the transaction: every write above is rolled back.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! The header insert is the first statement, so the write lock is held
//! before any stock is read. Concurrent invoices of either kind queue on
//! the lock (up to the pool's busy timeout) and see each other's committed
//! stock. The conditional decrement is a second guard against overselling.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::directory::counterparty_exists;
use crate::repository::invoice::tables;
use crate::repository::product::ProductRepository;
use crate::repository::stock::StockRepository;
use storehouse_core::{
    CoreError, InvoiceDraft, InvoiceKind, InvoiceNumber, InvoiceStatus, InvoiceTerms,
    InvoiceTotals, LineItem, NewStockMovement, MAX_STOCK,
};

/// Result of a committed invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedInvoice {
    pub id: i64,
    pub kind: InvoiceKind,
    pub invoice_number: InvoiceNumber,
    pub totals: InvoiceTotals,
}

/// Write side for sales and purchases.
#[derive(Debug, Clone)]
pub struct InvoiceEngine {
    pool: SqlitePool,
}

impl InvoiceEngine {
    /// Creates a new engine on the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceEngine { pool }
    }

    /// Creates an invoice dated today (UTC) unless the draft carries a date.
    ///
    /// ## Errors
    /// - `Rejected(..)` for any business rule failure
    /// - storage variants for database failures
    ///
    /// ## Example
    /// ```rust,ignore
    /// let draft = InvoiceDraft::sale(header, InvoiceType::Regular, lines);
    /// let created = db.engine().create(&draft).await?;
    /// println!("{}", created.invoice_number); // INV-000001
    /// ```
    pub async fn create(&self, draft: &InvoiceDraft) -> DbResult<CreatedInvoice> {
        self.create_on(draft, Utc::now().date_naive()).await
    }

    /// Same as [`create`](Self::create) with an explicit "today".
    pub async fn create_on(&self, draft: &InvoiceDraft, today: NaiveDate) -> DbResult<CreatedInvoice> {
        let kind = draft.kind();

        match self.run(draft, today).await {
            Ok(created) => {
                info!(
                    kind = %kind,
                    id = created.id,
                    invoice_number = %created.invoice_number,
                    net_amount = %created.totals.net,
                    "Invoice committed"
                );
                Ok(created)
            }
            Err(err) => {
                if err.is_rejection() {
                    warn!(kind = %kind, error = %err, "Invoice rejected");
                }
                Err(err)
            }
        }
    }

    async fn run(&self, draft: &InvoiceDraft, today: NaiveDate) -> DbResult<CreatedInvoice> {
        draft.validate()?;

        let kind = draft.kind();
        let counterparty_id = draft.header.counterparty_id;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let id = insert_header(&mut tx, draft, draft.invoice_date(today)).await?;

        if !counterparty_exists(&mut tx, kind.counterparty(), counterparty_id).await? {
            return Err(counterparty_missing(kind, counterparty_id));
        }

        let invoice_number = InvoiceNumber::for_sequence(kind, id);
        let t = tables(kind);
        sqlx::query(&format!("UPDATE {} SET invoice_number = ? WHERE id = ?", t.header))
            .bind(invoice_number.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        debug!(id, invoice_number = %invoice_number, lines = draft.lines.len(), "Processing lines");

        for line in &draft.lines {
            apply_line(&mut tx, kind, id, draft.header.employee_id, line).await?;
        }

        let totals = draft.terms.settle(draft.lines_total(), draft.header.discount)?;

        sqlx::query(&format!(
            r#"
            UPDATE {} SET
                total_amount_cents = ?,
                discount_amount_cents = ?,
                tax_amount_cents = ?,
                net_amount_cents = ?,
                status = ?
            WHERE id = ?
            "#,
            t.header
        ))
        .bind(totals.total.cents())
        .bind(totals.discount.cents())
        .bind(totals.tax.cents())
        .bind(totals.net.cents())
        .bind(InvoiceStatus::Completed)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(CreatedInvoice {
            id,
            kind,
            invoice_number,
            totals,
        })
    }
}

// =============================================================================
// Steps
// =============================================================================

fn counterparty_missing(kind: InvoiceKind, id: i64) -> DbError {
    CoreError::CounterpartyNotFound {
        role: kind.counterparty(),
        id,
    }
    .into()
}

/// Inserts the pending header and returns its id.
async fn insert_header(
    conn: &mut SqliteConnection,
    draft: &InvoiceDraft,
    date: NaiveDate,
) -> DbResult<i64> {
    let header = &draft.header;
    let now = Utc::now();

    let query = match draft.terms {
        InvoiceTerms::Sale { invoice_type } => sqlx::query(
            r#"
            INSERT INTO sales (customer_id, employee_id, sale_date, invoice_type, status, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(header.counterparty_id)
        .bind(header.employee_id)
        .bind(date)
        .bind(invoice_type),
        InvoiceTerms::Purchase { .. } => sqlx::query(
            r#"
            INSERT INTO purchases (supplier_id, employee_id, purchase_date, status, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(header.counterparty_id)
        .bind(header.employee_id)
        .bind(date),
    };

    let result = query
        .bind(InvoiceStatus::Pending)
        .bind(&header.notes)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(|e| match DbError::from(e) {
            // The counterparty column is the header's only foreign key.
            DbError::ForeignKeyViolation { .. } => {
                counterparty_missing(draft.kind(), header.counterparty_id)
            }
            other => other,
        })?;

    Ok(result.last_insert_rowid())
}

/// Moves stock for one line, then records the item and the ledger entry.
async fn apply_line(
    conn: &mut SqliteConnection,
    kind: InvoiceKind,
    invoice_id: i64,
    employee_id: Option<i64>,
    line: &LineItem,
) -> DbResult<()> {
    let product = ProductRepository::find_in(conn, line.product_id)
        .await?
        .ok_or(CoreError::ProductNotFound(line.product_id))?;

    let insufficient = |available: i64| CoreError::InsufficientStock {
        product: product.name.clone(),
        available,
        requested: line.quantity,
    };

    match kind {
        InvoiceKind::Sale => {
            if !product.can_supply(line.quantity) {
                return Err(insufficient(product.current_stock).into());
            }
            if !ProductRepository::decrement_stock(conn, product.id, line.quantity).await? {
                return Err(insufficient(product.current_stock).into());
            }
        }
        InvoiceKind::Purchase => {
            if !ProductRepository::increment_stock(conn, product.id, line.quantity).await? {
                return Err(CoreError::StockLimitExceeded {
                    product: product.name.clone(),
                    current: product.current_stock,
                    requested: line.quantity,
                    max: MAX_STOCK,
                }
                .into());
            }
        }
    }

    let t = tables(kind);
    sqlx::query(&format!(
        r#"
        INSERT INTO {items} ({owner}, product_id, quantity, unit_price_cents, total_price_cents)
        VALUES (?, ?, ?, ?, ?)
        "#,
        items = t.items,
        owner = t.owner_column,
    ))
    .bind(invoice_id)
    .bind(product.id)
    .bind(line.quantity)
    .bind(line.unit_price.cents())
    .bind(line.total_price().cents())
    .execute(&mut *conn)
    .await?;

    StockRepository::record_in(
        conn,
        &NewStockMovement {
            product_id: product.id,
            movement_type: kind.movement_type(),
            quantity: line.quantity,
            reference_type: kind.reference_type(),
            reference_id: Some(invoice_id),
            employee_id,
            notes: None,
        },
    )
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::stock::{MovementFilter, PageRequest};
    use storehouse_core::{
        ContactDetails, Counterparty, InvoiceHeader, InvoiceType, Money, MovementType, NewProduct,
        ReferenceType,
    };

    struct Fixture {
        db: Database,
        customer_id: i64,
        supplier_id: i64,
    }

    async fn fixture() -> Fixture {
        fixture_on(Database::new(DbConfig::in_memory()).await.unwrap()).await
    }

    async fn fixture_on(db: Database) -> Fixture {
        let contact = |name: &str| ContactDetails {
            name: name.to_string(),
            ..Default::default()
        };
        let customer_id = db.customers().create(&contact("Acme"), None).await.unwrap().id;
        let supplier_id = db.suppliers().create(&contact("Parts Co"), None).await.unwrap().id;
        Fixture {
            db,
            customer_id,
            supplier_id,
        }
    }

    impl Fixture {
        async fn product(&self, code: &str, stock: i64) -> i64 {
            self.db
                .products()
                .create(&NewProduct {
                    name: format!("Product {code}"),
                    code: code.to_string(),
                    purchase_price: Money::from_cents(400),
                    selling_price: Money::from_cents(800),
                    current_stock: stock,
                    ..Default::default()
                })
                .await
                .unwrap()
                .id
        }

        async fn stock_of(&self, id: i64) -> i64 {
            self.db.products().get_by_id(id).await.unwrap().unwrap().current_stock
        }

        async fn movement_count(&self) -> i64 {
            self.db
                .stock()
                .list(MovementFilter::default(), PageRequest::default())
                .await
                .unwrap()
                .total
        }

        fn sale(&self, invoice_type: InvoiceType, lines: Vec<LineItem>) -> InvoiceDraft {
            InvoiceDraft::sale(
                InvoiceHeader {
                    counterparty_id: self.customer_id,
                    employee_id: Some(7),
                    ..Default::default()
                },
                invoice_type,
                lines,
            )
        }

        fn purchase(&self, discount: i64, tax: i64, lines: Vec<LineItem>) -> InvoiceDraft {
            InvoiceDraft::purchase(
                InvoiceHeader {
                    counterparty_id: self.supplier_id,
                    discount: Money::from_cents(discount),
                    ..Default::default()
                },
                Money::from_cents(tax),
                lines,
            )
        }
    }

    fn line(product_id: i64, quantity: i64, cents: i64) -> LineItem {
        LineItem::new(product_id, quantity, Money::from_cents(cents))
    }

    #[tokio::test]
    async fn test_sale_decrements_stock_and_records_ledger() {
        let fx = fixture().await;
        let p = fx.product("W-1", 10).await;

        let created = fx
            .db
            .engine()
            .create(&fx.sale(InvoiceType::Regular, vec![line(p, 4, 800)]))
            .await
            .unwrap();

        assert_eq!(created.invoice_number.as_str(), "INV-000001");
        assert_eq!(created.totals.total, Money::from_cents(3_200));
        assert_eq!(created.totals.tax, Money::zero());
        assert_eq!(created.totals.net, Money::from_cents(3_200));
        assert_eq!(fx.stock_of(p).await, 6);

        let sale = fx.db.sales().get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(sale.status, InvoiceStatus::Completed);
        assert_eq!(sale.invoice_type, Some(InvoiceType::Regular));
        assert_eq!(sale.counterparty_name.as_deref(), Some("Acme"));
        assert_eq!(sale.net_amount_cents, 3_200);
        assert_eq!(sale.items.len(), 1);
        assert_eq!(sale.items[0].total_price_cents, 3_200);
        assert_eq!(sale.items[0].product_name.as_deref(), Some("Product W-1"));

        let movements = fx
            .db
            .stock()
            .for_reference(ReferenceType::Sale, created.id)
            .await
            .unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].movement_type, MovementType::Out);
        assert_eq!(movements[0].quantity, 4);
        assert_eq!(movements[0].employee_id, Some(7));
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_everything() {
        let fx = fixture().await;
        let p = fx.product("W-1", 10).await;

        let err = fx
            .db
            .engine()
            .create(&fx.sale(InvoiceType::Regular, vec![line(p, 20, 800)]))
            .await
            .unwrap_err();

        match err {
            DbError::Rejected(CoreError::InsufficientStock {
                product,
                available,
                requested,
            }) => {
                assert_eq!(product, "Product W-1");
                assert_eq!(available, 10);
                assert_eq!(requested, 20);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        assert_eq!(fx.stock_of(p).await, 10);
        assert_eq!(fx.db.sales().count().await.unwrap(), 0);
        assert_eq!(fx.movement_count().await, 0);
    }

    #[tokio::test]
    async fn test_purchase_takes_supplied_tax() {
        let fx = fixture().await;
        let p = fx.product("W-1", 0).await;

        let created = fx
            .db
            .engine()
            .create(&fx.purchase(200, 100, vec![line(p, 5, 400)]))
            .await
            .unwrap();

        assert_eq!(created.invoice_number.as_str(), "PUR-000001");
        assert_eq!(created.totals.total, Money::from_cents(2_000));
        assert_eq!(created.totals.net, Money::from_cents(1_900));
        assert_eq!(fx.stock_of(p).await, 5);

        let purchase = fx.db.purchases().get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(purchase.invoice_type, None);
        assert_eq!(purchase.counterparty_name.as_deref(), Some("Parts Co"));
        assert_eq!(purchase.tax_amount_cents, 100);

        let movements = fx
            .db
            .stock()
            .for_reference(ReferenceType::Purchase, created.id)
            .await
            .unwrap();
        assert_eq!(movements[0].movement_type, MovementType::In);
        assert_eq!(movements[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_tax_sale_applies_rate_after_discount() {
        let fx = fixture().await;
        let p = fx.product("W-1", 10).await;

        let mut draft = fx.sale(InvoiceType::Tax, vec![line(p, 4, 800)]);
        draft.header.discount = Money::from_cents(200);

        let created = fx.db.engine().create(&draft).await.unwrap();
        assert_eq!(created.totals.tax, Money::from_cents(420));
        assert_eq!(created.totals.net, Money::from_cents(3_420));
    }

    #[tokio::test]
    async fn test_numbers_are_sequential_per_kind() {
        let fx = fixture().await;
        let p = fx.product("W-1", 100).await;
        let engine = fx.db.engine();

        let mut numbers = Vec::new();
        for _ in 0..3 {
            let created = engine
                .create(&fx.sale(InvoiceType::Regular, vec![line(p, 1, 100)]))
                .await
                .unwrap();
            numbers.push(created.invoice_number.into_string());
        }
        let purchase = engine
            .create(&fx.purchase(0, 0, vec![line(p, 1, 100)]))
            .await
            .unwrap();

        assert_eq!(numbers, vec!["INV-000001", "INV-000002", "INV-000003"]);
        assert_eq!(purchase.invoice_number.as_str(), "PUR-000001");

        // Newest first
        let listed: Vec<i64> = fx.db.sales().list().await.unwrap().iter().map(|s| s.id).collect();
        assert_eq!(listed, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_failure_on_later_line_leaves_nothing() {
        let fx = fixture().await;
        let a = fx.product("A", 10).await;

        let err = fx
            .db
            .engine()
            .create(&fx.sale(InvoiceType::Regular, vec![line(a, 3, 100), line(999, 1, 100)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rejected(CoreError::ProductNotFound(999))));

        assert_eq!(fx.stock_of(a).await, 10);
        assert_eq!(fx.db.sales().count().await.unwrap(), 0);
        assert!(fx.db.sales().items(1).await.unwrap().is_empty());
        assert_eq!(fx.movement_count().await, 0);

        // The rolled-back number is not burned
        let created = fx
            .db
            .engine()
            .create(&fx.sale(InvoiceType::Regular, vec![line(a, 3, 100)]))
            .await
            .unwrap();
        assert_eq!(created.invoice_number.as_str(), "INV-000001");
    }

    #[tokio::test]
    async fn test_same_product_twice_sees_earlier_line() {
        let fx = fixture().await;
        let p = fx.product("W-1", 5).await;

        let err = fx
            .db
            .engine()
            .create(&fx.sale(InvoiceType::Regular, vec![line(p, 3, 100), line(p, 3, 100)]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Rejected(CoreError::InsufficientStock {
                available: 2,
                requested: 3,
                ..
            })
        ));
        assert_eq!(fx.stock_of(p).await, 5);
    }

    #[tokio::test]
    async fn test_unknown_counterparty_is_rejected() {
        let fx = fixture().await;
        let p = fx.product("W-1", 5).await;

        let mut draft = fx.sale(InvoiceType::Regular, vec![line(p, 1, 100)]);
        draft.header.counterparty_id = 42;

        let err = fx.db.engine().create(&draft).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Rejected(CoreError::CounterpartyNotFound {
                role: Counterparty::Customer,
                id: 42
            })
        ));
        assert_eq!(fx.stock_of(p).await, 5);
    }

    #[tokio::test]
    async fn test_discount_above_total_rolls_back_stock() {
        let fx = fixture().await;
        let p = fx.product("W-1", 5).await;

        let err = fx
            .db
            .engine()
            .create(&fx.purchase(10_000, 0, vec![line(p, 1, 100)]))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Rejected(CoreError::DiscountExceedsTotal { .. })));
        assert_eq!(fx.stock_of(p).await, 5);
        assert_eq!(fx.db.purchases().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_three_line_sale_keeps_order_and_ledger() {
        let fx = fixture().await;
        let a = fx.product("A", 10).await;
        let b = fx.product("B", 10).await;
        let c = fx.product("C", 10).await;

        // Submitted out of id order
        let lines = vec![line(c, 1, 250), line(a, 2, 800), line(b, 3, 199)];
        let created = fx
            .db
            .engine()
            .create(&fx.sale(InvoiceType::Tax, lines))
            .await
            .unwrap();

        let sale = fx.db.sales().get_by_id(created.id).await.unwrap().unwrap();
        let products: Vec<i64> = sale.items.iter().map(|i| i.product_id).collect();
        assert_eq!(products, vec![c, a, b]);

        let items_total: i64 = sale.items.iter().map(|i| i.total_price_cents).sum();
        assert_eq!(items_total, 250 + 1_600 + 597);
        assert_eq!(items_total, sale.total_amount_cents);
        assert_eq!(created.totals.total.cents(), sale.total_amount_cents);
        assert_eq!(
            sale.net_amount_cents,
            sale.total_amount_cents - sale.discount_amount_cents + sale.tax_amount_cents
        );

        let movements = fx
            .db
            .stock()
            .for_reference(ReferenceType::Sale, created.id)
            .await
            .unwrap();
        assert_eq!(movements.len(), 3);
        for (movement, item) in movements.iter().zip(&sale.items) {
            assert_eq!(movement.movement_type, MovementType::Out);
            assert_eq!(movement.reference_id, Some(sale.id));
            assert_eq!(movement.product_id, item.product_id);
            assert_eq!(movement.quantity, item.quantity);
        }

        assert_eq!(fx.stock_of(a).await, 8);
        assert_eq!(fx.stock_of(b).await, 7);
        assert_eq!(fx.stock_of(c).await, 9);
    }

    #[tokio::test]
    async fn test_three_line_purchase_keeps_order_and_ledger() {
        let fx = fixture().await;
        let a = fx.product("A", 0).await;
        let b = fx.product("B", 0).await;

        // The same product twice stays two lines
        let lines = vec![line(b, 5, 400), line(a, 1, 1_000), line(b, 2, 350)];
        let created = fx
            .db
            .engine()
            .create(&fx.purchase(100, 50, lines))
            .await
            .unwrap();

        let purchase = fx.db.purchases().get_by_id(created.id).await.unwrap().unwrap();
        let shape: Vec<(i64, i64)> = purchase.items.iter().map(|i| (i.product_id, i.quantity)).collect();
        assert_eq!(shape, vec![(b, 5), (a, 1), (b, 2)]);

        let items_total: i64 = purchase.items.iter().map(|i| i.total_price_cents).sum();
        assert_eq!(items_total, 2_000 + 1_000 + 700);
        assert_eq!(items_total, purchase.total_amount_cents);
        assert_eq!(purchase.net_amount_cents, 3_700 - 100 + 50);

        let movements = fx
            .db
            .stock()
            .for_reference(ReferenceType::Purchase, created.id)
            .await
            .unwrap();
        assert_eq!(movements.len(), 3);
        for (movement, item) in movements.iter().zip(&purchase.items) {
            assert_eq!(movement.movement_type, MovementType::In);
            assert_eq!(movement.reference_id, Some(purchase.id));
            assert_eq!(movement.product_id, item.product_id);
            assert_eq!(movement.quantity, item.quantity);
        }

        assert_eq!(fx.stock_of(a).await, 1);
        assert_eq!(fx.stock_of(b).await, 7);
    }

    #[tokio::test]
    async fn test_oversized_unit_price_is_rejected() {
        let fx = fixture().await;
        let p = fx.product("W-1", 0).await;

        let err = fx
            .db
            .engine()
            .create(&fx.purchase(0, 100, vec![line(p, 1, i64::MAX)]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Rejected(CoreError::InvalidLineItem { line: 1, .. })
        ));
        assert_eq!(fx.stock_of(p).await, 0);
        assert_eq!(fx.db.purchases().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_purchase_past_stock_limit_rolls_back() {
        let fx = fixture().await;
        let full = fx.product("FULL", MAX_STOCK - 1).await;
        let other = fx.product("OTHER", 0).await;

        let err = fx
            .db
            .engine()
            .create(&fx.purchase(0, 0, vec![line(other, 3, 100), line(full, 5, 100)]))
            .await
            .unwrap_err();

        match err {
            DbError::Rejected(CoreError::StockLimitExceeded {
                product,
                current,
                requested,
                max,
            }) => {
                assert_eq!(product, "Product FULL");
                assert_eq!(current, MAX_STOCK - 1);
                assert_eq!(requested, 5);
                assert_eq!(max, MAX_STOCK);
            }
            other => panic!("expected StockLimitExceeded, got {other:?}"),
        }

        assert_eq!(fx.stock_of(full).await, MAX_STOCK - 1);
        assert_eq!(fx.stock_of(other).await, 0);
        assert_eq!(fx.db.purchases().count().await.unwrap(), 0);
        assert_eq!(fx.movement_count().await, 0);

        let stored = fx.db.products().get_by_id(full).await.unwrap().unwrap();
        assert_eq!(stored.current_stock, MAX_STOCK - 1);
    }

    #[tokio::test]
    async fn test_invalid_draft_never_opens_a_transaction() {
        let fx = fixture().await;
        let err = fx
            .db
            .engine()
            .create(&fx.sale(InvoiceType::Regular, vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rejected(CoreError::EmptyInvoice)));
    }

    #[tokio::test]
    async fn test_explicit_date_is_kept() {
        let fx = fixture().await;
        let p = fx.product("W-1", 5).await;
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();

        let mut draft = fx.purchase(0, 0, vec![line(p, 1, 100)]);
        draft.header.date = Some(date);
        let created = fx.db.engine().create(&draft).await.unwrap();

        let purchase = fx.db.purchases().get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(purchase.invoice_date, date);
    }

    #[tokio::test]
    async fn test_concurrent_sales_never_oversell() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("concurrency.db")))
            .await
            .unwrap();
        let fx = fixture_on(db).await;
        let p = fx.product("W-1", 10).await;

        let mut handles = Vec::new();
        for _ in 0..5 {
            let engine = fx.db.engine();
            let draft = fx.sale(InvoiceType::Regular, vec![line(p, 4, 800)]);
            handles.push(tokio::spawn(async move { engine.create(&draft).await }));
        }

        let mut numbers = Vec::new();
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(created) => numbers.push(created.invoice_number.into_string()),
                Err(DbError::Rejected(CoreError::InsufficientStock { .. })) => rejected += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        numbers.sort();
        assert_eq!(numbers, vec!["INV-000001", "INV-000002"]);
        assert_eq!(rejected, 3);
        assert_eq!(fx.stock_of(p).await, 2);
        assert_eq!(fx.movement_count().await, 2);

        fx.db.close().await;
    }
}
