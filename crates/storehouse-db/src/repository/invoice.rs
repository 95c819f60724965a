//! # Invoice Repository
//!
//! Read side for committed sales and purchases. Writes go through
//! [`InvoiceEngine`](crate::engine::InvoiceEngine).
//!
//! Sales and purchases live in parallel tables with the same shape; the
//! [`InvoiceTables`] mapping lets one implementation serve both kinds.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::error::DbResult;
use storehouse_core::{Invoice, InvoiceItem, InvoiceKind, InvoiceStatus, InvoiceType};

// =============================================================================
// Table Mapping
// =============================================================================

/// Table and column names for one invoice kind.
#[derive(Debug, Clone, Copy)]
pub(crate) struct InvoiceTables {
    pub header: &'static str,
    pub items: &'static str,
    /// Foreign key column in the items table.
    pub owner_column: &'static str,
    pub counterparty_table: &'static str,
    pub counterparty_column: &'static str,
    pub date_column: &'static str,
    /// Select expression for the sale-only invoice_type column.
    pub invoice_type_expr: &'static str,
}

const SALE_TABLES: InvoiceTables = InvoiceTables {
    header: "sales",
    items: "sale_items",
    owner_column: "sale_id",
    counterparty_table: "customers",
    counterparty_column: "customer_id",
    date_column: "sale_date",
    invoice_type_expr: "h.invoice_type",
};

const PURCHASE_TABLES: InvoiceTables = InvoiceTables {
    header: "purchases",
    items: "purchase_items",
    owner_column: "purchase_id",
    counterparty_table: "suppliers",
    counterparty_column: "supplier_id",
    date_column: "purchase_date",
    invoice_type_expr: "NULL",
};

pub(crate) const fn tables(kind: InvoiceKind) -> &'static InvoiceTables {
    match kind {
        InvoiceKind::Sale => &SALE_TABLES,
        InvoiceKind::Purchase => &PURCHASE_TABLES,
    }
}

// =============================================================================
// Row Type
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: i64,
    invoice_number: Option<String>,
    counterparty_id: i64,
    counterparty_name: Option<String>,
    employee_id: Option<i64>,
    invoice_date: NaiveDate,
    total_amount_cents: i64,
    discount_amount_cents: i64,
    tax_amount_cents: i64,
    net_amount_cents: i64,
    invoice_type: Option<InvoiceType>,
    status: InvoiceStatus,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl InvoiceRow {
    fn into_invoice(self, kind: InvoiceKind, items: Vec<InvoiceItem>) -> Invoice {
        Invoice {
            id: self.id,
            kind,
            invoice_number: self.invoice_number.unwrap_or_default(),
            counterparty_id: self.counterparty_id,
            counterparty_name: self.counterparty_name,
            employee_id: self.employee_id,
            invoice_date: self.invoice_date,
            total_amount_cents: self.total_amount_cents,
            discount_amount_cents: self.discount_amount_cents,
            tax_amount_cents: self.tax_amount_cents,
            net_amount_cents: self.net_amount_cents,
            invoice_type: self.invoice_type,
            status: self.status,
            notes: self.notes,
            created_at: self.created_at,
            items,
        }
    }
}

fn header_select(t: &InvoiceTables) -> String {
    format!(
        r#"
        SELECT h.id, h.invoice_number,
               h.{cp_col} AS counterparty_id, c.name AS counterparty_name,
               h.employee_id, h.{date_col} AS invoice_date,
               h.total_amount_cents, h.discount_amount_cents,
               h.tax_amount_cents, h.net_amount_cents,
               {invoice_type} AS invoice_type,
               h.status, h.notes, h.created_at
        FROM {header} h
        LEFT JOIN {cp_table} c ON c.id = h.{cp_col}
        "#,
        cp_col = t.counterparty_column,
        date_col = t.date_column,
        invoice_type = t.invoice_type_expr,
        header = t.header,
        cp_table = t.counterparty_table,
    )
}

// =============================================================================
// Repository
// =============================================================================

/// Read access to one kind of invoice.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
    kind: InvoiceKind,
}

impl InvoiceRepository {
    /// Creates a repository for the given invoice kind.
    pub fn new(pool: SqlitePool, kind: InvoiceKind) -> Self {
        InvoiceRepository { pool, kind }
    }

    pub fn kind(&self) -> InvoiceKind {
        self.kind
    }

    /// Lists invoices newest first, without items.
    pub async fn list(&self) -> DbResult<Vec<Invoice>> {
        let sql = format!("{} ORDER BY h.id DESC", header_select(tables(self.kind)));

        let rows = sqlx::query_as::<_, InvoiceRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| row.into_invoice(self.kind, Vec::new()))
            .collect())
    }

    /// Gets one invoice with its items in submission order.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Invoice>> {
        let sql = format!("{} WHERE h.id = ?", header_select(tables(self.kind)));

        let row = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let items = self.items(id).await?;
                Ok(Some(row.into_invoice(self.kind, items)))
            }
            None => Ok(None),
        }
    }

    /// Items of one invoice, in insertion order, with product names.
    pub async fn items(&self, invoice_id: i64) -> DbResult<Vec<InvoiceItem>> {
        let t = tables(self.kind);
        let sql = format!(
            r#"
            SELECT i.id, i.{owner} AS invoice_id, i.product_id, p.name AS product_name,
                   i.quantity, i.unit_price_cents, i.total_price_cents
            FROM {items} i
            LEFT JOIN products p ON p.id = i.product_id
            WHERE i.{owner} = ?
            ORDER BY i.id
            "#,
            owner = t.owner_column,
            items = t.items,
        );

        let items = sqlx::query_as::<_, InvoiceItem>(&sql)
            .bind(invoice_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Number of invoices of this kind.
    pub async fn count(&self) -> DbResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", tables(self.kind).header);
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }
}
