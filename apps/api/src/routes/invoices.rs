//! # Sales & Purchases
//!
//! Create, list and fetch invoices. Creation goes through the
//! [`InvoiceEngine`](storehouse_db::InvoiceEngine); this module only maps
//! the request body onto an [`InvoiceDraft`].
//!
//! ## Create Sale
//! ```text
//! POST /api/sales
//! {
//!   "customer_id": 1,
//!   "invoice_type": "tax",          // optional, "regular" by default
//!   "discount_amount": 2.50,        // optional
//!   "items": [{ "product_id": 7, "quantity": 4, "unit_price": 8.00 }]
//! }
//!
//! 201 { "message": "Sale created successfully", "id": 12, "invoice_number": "INV-000012" }
//! 400 { "code": "INSUFFICIENT_STOCK", "message": "Insufficient stock for ..." }
//! ```
//!
//! Purchases take `supplier_id` and a caller-supplied `tax_amount` instead
//! of `customer_id` and `invoice_type`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{money_or_zero, Created};
use crate::error::{ApiError, ApiJson, ApiPath, ApiResult};
use crate::state::AppState;
use storehouse_core::{
    Invoice, InvoiceDraft, InvoiceHeader, InvoiceItem, InvoiceStatus, InvoiceType, LineItem,
    Money,
};
use storehouse_db::CreatedInvoice;

// =============================================================================
// Requests
// =============================================================================

/// One requested line.
#[derive(Debug, Clone, Deserialize)]
pub struct LineRequest {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSaleRequest {
    pub customer_id: i64,
    pub employee_id: Option<i64>,
    pub sale_date: Option<NaiveDate>,
    pub invoice_type: Option<InvoiceType>,
    pub discount_amount: Option<Decimal>,
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<LineRequest>,
}

impl CreateSaleRequest {
    pub fn into_draft(self) -> ApiResult<InvoiceDraft> {
        let header = InvoiceHeader {
            counterparty_id: self.customer_id,
            employee_id: self.employee_id,
            date: self.sale_date,
            discount: money_or_zero("discount_amount", self.discount_amount)?,
            notes: self.notes,
        };
        let lines = to_lines(self.items)?;
        Ok(InvoiceDraft::sale(
            header,
            self.invoice_type.unwrap_or_default(),
            lines,
        ))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePurchaseRequest {
    pub supplier_id: i64,
    pub employee_id: Option<i64>,
    pub purchase_date: Option<NaiveDate>,
    pub discount_amount: Option<Decimal>,
    pub tax_amount: Option<Decimal>,
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<LineRequest>,
}

impl CreatePurchaseRequest {
    pub fn into_draft(self) -> ApiResult<InvoiceDraft> {
        let header = InvoiceHeader {
            counterparty_id: self.supplier_id,
            employee_id: self.employee_id,
            date: self.purchase_date,
            discount: money_or_zero("discount_amount", self.discount_amount)?,
            notes: self.notes,
        };
        let tax = money_or_zero("tax_amount", self.tax_amount)?;
        let lines = to_lines(self.items)?;
        Ok(InvoiceDraft::purchase(header, tax, lines))
    }
}

fn to_lines(items: Vec<LineRequest>) -> ApiResult<Vec<LineItem>> {
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            let field = format!("items[{}].unit_price", idx + 1);
            let unit_price = Money::try_from_decimal(&field, item.unit_price)?;
            Ok(LineItem::new(item.product_id, item.quantity, unit_price))
        })
        .collect()
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceItemDto {
    pub id: i64,
    pub product_id: i64,
    pub product_name: Option<String>,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

impl From<InvoiceItem> for InvoiceItemDto {
    fn from(item: InvoiceItem) -> Self {
        InvoiceItemDto {
            id: item.id,
            product_id: item.product_id,
            unit_price: item.unit_price().to_decimal(),
            total_price: item.total_price().to_decimal(),
            product_name: item.product_name,
            quantity: item.quantity,
        }
    }
}

/// A sale as returned by the list and detail endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct SaleDto {
    pub id: i64,
    pub invoice_number: String,
    pub customer_id: i64,
    pub customer_name: Option<String>,
    pub employee_id: Option<i64>,
    pub sale_date: NaiveDate,
    pub total_amount: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub net_amount: Decimal,
    pub invoice_type: InvoiceType,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Omitted on list entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<InvoiceItemDto>>,
}

impl SaleDto {
    fn from_invoice(invoice: Invoice, with_items: bool) -> Self {
        SaleDto {
            id: invoice.id,
            customer_id: invoice.counterparty_id,
            employee_id: invoice.employee_id,
            sale_date: invoice.invoice_date,
            total_amount: invoice.total_amount().to_decimal(),
            discount_amount: invoice.discount_amount().to_decimal(),
            tax_amount: invoice.tax_amount().to_decimal(),
            net_amount: invoice.net_amount().to_decimal(),
            invoice_type: invoice.invoice_type.unwrap_or_default(),
            status: invoice.status,
            created_at: invoice.created_at,
            items: with_items.then(|| invoice.items.into_iter().map(Into::into).collect()),
            invoice_number: invoice.invoice_number,
            customer_name: invoice.counterparty_name,
            notes: invoice.notes,
        }
    }
}

/// A purchase as returned by the list and detail endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseDto {
    pub id: i64,
    pub invoice_number: String,
    pub supplier_id: i64,
    pub supplier_name: Option<String>,
    pub employee_id: Option<i64>,
    pub purchase_date: NaiveDate,
    pub total_amount: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub net_amount: Decimal,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<InvoiceItemDto>>,
}

impl PurchaseDto {
    fn from_invoice(invoice: Invoice, with_items: bool) -> Self {
        PurchaseDto {
            id: invoice.id,
            supplier_id: invoice.counterparty_id,
            employee_id: invoice.employee_id,
            purchase_date: invoice.invoice_date,
            total_amount: invoice.total_amount().to_decimal(),
            discount_amount: invoice.discount_amount().to_decimal(),
            tax_amount: invoice.tax_amount().to_decimal(),
            net_amount: invoice.net_amount().to_decimal(),
            status: invoice.status,
            created_at: invoice.created_at,
            items: with_items.then(|| invoice.items.into_iter().map(Into::into).collect()),
            invoice_number: invoice.invoice_number,
            supplier_name: invoice.counterparty_name,
            notes: invoice.notes,
        }
    }
}

fn created(message: &str, invoice: CreatedInvoice) -> (StatusCode, Json<Created>) {
    (
        StatusCode::CREATED,
        Json(Created {
            message: message.to_string(),
            id: invoice.id,
            invoice_number: Some(invoice.invoice_number.into_string()),
        }),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /api/sales`
pub async fn create_sale(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateSaleRequest>,
) -> ApiResult<(StatusCode, Json<Created>)> {
    debug!(customer_id = request.customer_id, lines = request.items.len(), "Create sale");
    let draft = request.into_draft()?;
    let invoice = state.db.engine().create(&draft).await?;
    Ok(created("Sale created successfully", invoice))
}

/// `GET /api/sales`
pub async fn list_sales(State(state): State<AppState>) -> ApiResult<Json<Vec<SaleDto>>> {
    let sales = state.db.sales().list().await?;
    Ok(Json(
        sales
            .into_iter()
            .map(|sale| SaleDto::from_invoice(sale, false))
            .collect(),
    ))
}

/// `GET /api/sales/{id}`
pub async fn get_sale(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<SaleDto>> {
    let sale = state
        .db
        .sales()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", id))?;
    Ok(Json(SaleDto::from_invoice(sale, true)))
}

/// `POST /api/purchases`
pub async fn create_purchase(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreatePurchaseRequest>,
) -> ApiResult<(StatusCode, Json<Created>)> {
    debug!(supplier_id = request.supplier_id, lines = request.items.len(), "Create purchase");
    let draft = request.into_draft()?;
    let invoice = state.db.engine().create(&draft).await?;
    Ok(created("Purchase created successfully", invoice))
}

/// `GET /api/purchases`
pub async fn list_purchases(State(state): State<AppState>) -> ApiResult<Json<Vec<PurchaseDto>>> {
    let purchases = state.db.purchases().list().await?;
    Ok(Json(
        purchases
            .into_iter()
            .map(|purchase| PurchaseDto::from_invoice(purchase, false))
            .collect(),
    ))
}

/// `GET /api/purchases/{id}`
pub async fn get_purchase(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<PurchaseDto>> {
    let purchase = state
        .db
        .purchases()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Purchase", id))?;
    Ok(Json(PurchaseDto::from_invoice(purchase, true)))
}
