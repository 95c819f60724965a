//! # Inventory Endpoints
//!
//! Stock ledger browsing, manual adjustments, the stock views built
//! from product thresholds, and inventory valuation.
//!
//! ## Adjustment
//! ```text
//! POST /api/inventory/stock-adjustment
//! { "product_id": 7, "new_stock": 12, "notes": "Shelf count" }
//!
//! 200 { "message": "...", "product_id": 7, "old_stock": 15, "new_stock": 12, "difference": -3 }
//! ```
//! The ledger row stores `quantity = 3`; the sign is only in `difference`
//! and in the default note.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiJson, ApiQuery, ApiResult};
use crate::state::AppState;
use storehouse_core::stock::{StockStatus, ValuationMethod};
use storehouse_core::MovementType;
use storehouse_db::repository::stock::{
    InventoryValuation, LowStockEntry, ReorderSuggestion, StockReportEntry, StockReportSummary,
    ValuationEntry,
};
use storehouse_db::{AdjustmentOutcome, MovementFilter, MovementPage, MovementSummary, PageRequest};

/// Routes nested under `/api/inventory`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stock-movements", get(list_movements))
        .route("/stock-adjustment", post(adjust_stock))
        .route("/low-stock", get(low_stock))
        .route("/reorder-suggestions", get(reorder_suggestions))
        .route("/stock-report", get(stock_report))
        .route("/valuation", get(valuation))
        .route("/movement-summary", get(movement_summary))
}

// =============================================================================
// Ledger
// =============================================================================

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct MovementQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub product_id: Option<i64>,
    pub movement_type: Option<MovementType>,
}

/// `GET /api/inventory/stock-movements`
pub async fn list_movements(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<MovementQuery>,
) -> ApiResult<Json<MovementPage>> {
    let filter = MovementFilter {
        product_id: query.product_id,
        movement_type: query.movement_type,
    };
    let page = PageRequest::new(query.page, query.per_page);

    Ok(Json(state.db.stock().list(filter, page).await?))
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdjustmentRequest {
    pub product_id: i64,
    pub new_stock: i64,
    pub notes: Option<String>,
    pub employee_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdjustmentResponse {
    pub message: String,
    #[serde(flatten)]
    pub outcome: AdjustmentOutcome,
}

/// `POST /api/inventory/stock-adjustment`
pub async fn adjust_stock(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AdjustmentRequest>,
) -> ApiResult<Json<AdjustmentResponse>> {
    let outcome = state
        .db
        .stock()
        .adjust(
            request.product_id,
            request.new_stock,
            request.notes,
            request.employee_id,
        )
        .await?;

    Ok(Json(AdjustmentResponse {
        message: "Stock adjusted successfully".to_string(),
        outcome,
    }))
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SummaryQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// `GET /api/inventory/movement-summary`
pub async fn movement_summary(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SummaryQuery>,
) -> ApiResult<Json<Vec<MovementSummary>>> {
    if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
        if start > end {
            return Err(ApiError::validation(
                "start_date must not be after end_date",
            ));
        }
    }

    Ok(Json(
        state
            .db
            .stock()
            .summary(query.start_date, query.end_date)
            .await?,
    ))
}

// =============================================================================
// Stock Views
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct LowStockDto {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub unit: String,
    pub current_stock: i64,
    pub min_stock: i64,
    pub shortage: i64,
}

impl From<LowStockEntry> for LowStockDto {
    fn from(entry: LowStockEntry) -> Self {
        let p = entry.product;
        LowStockDto {
            id: p.id,
            name: p.name,
            code: p.code,
            unit: p.unit,
            current_stock: p.current_stock,
            min_stock: p.min_stock,
            shortage: entry.shortage,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReorderDto {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub category_name: Option<String>,
    pub current_stock: i64,
    pub min_stock: i64,
    pub max_stock: Option<i64>,
    pub suggested_quantity: i64,
    pub purchase_price: Decimal,
    pub estimated_cost: Decimal,
}

impl From<ReorderSuggestion> for ReorderDto {
    fn from(suggestion: ReorderSuggestion) -> Self {
        let p = suggestion.product;
        ReorderDto {
            purchase_price: p.purchase_price().to_decimal(),
            id: p.id,
            name: p.name,
            code: p.code,
            category_name: p.category_name,
            current_stock: p.current_stock,
            min_stock: p.min_stock,
            max_stock: p.max_stock,
            suggested_quantity: suggestion.suggested_quantity,
            estimated_cost: suggestion.estimated_cost.to_decimal(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StockReportLineDto {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub current_stock: i64,
    pub min_stock: i64,
    pub max_stock: Option<i64>,
    pub status: StockStatus,
    pub stock_value: Decimal,
}

impl From<StockReportEntry> for StockReportLineDto {
    fn from(entry: StockReportEntry) -> Self {
        let p = entry.product;
        StockReportLineDto {
            id: p.id,
            name: p.name,
            code: p.code,
            current_stock: p.current_stock,
            min_stock: p.min_stock,
            max_stock: p.max_stock,
            status: entry.status,
            stock_value: entry.stock_value.to_decimal(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StockReportSummaryDto {
    pub total_products: usize,
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
    pub overstock_count: usize,
    pub total_value: Decimal,
}

impl From<StockReportSummary> for StockReportSummaryDto {
    fn from(summary: StockReportSummary) -> Self {
        StockReportSummaryDto {
            total_products: summary.total_products,
            low_stock_count: summary.low_stock_count,
            out_of_stock_count: summary.out_of_stock_count,
            overstock_count: summary.overstock_count,
            total_value: summary.total_value.to_decimal(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StockReportDto {
    pub summary: StockReportSummaryDto,
    pub products: Vec<StockReportLineDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValuationLineDto {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub current_stock: i64,
    pub unit_price: Decimal,
    pub total_value: Decimal,
    pub category_name: Option<String>,
}

impl From<ValuationEntry> for ValuationLineDto {
    fn from(entry: ValuationEntry) -> Self {
        let p = entry.product;
        ValuationLineDto {
            id: p.id,
            name: p.name,
            code: p.code,
            current_stock: p.current_stock,
            unit_price: entry.unit_price.to_decimal(),
            total_value: entry.total_value.to_decimal(),
            category_name: p.category_name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValuationDto {
    pub method: ValuationMethod,
    pub total_value: Decimal,
    pub categories_value: BTreeMap<String, Decimal>,
    pub products: Vec<ValuationLineDto>,
}

impl From<InventoryValuation> for ValuationDto {
    fn from(valuation: InventoryValuation) -> Self {
        ValuationDto {
            method: valuation.method,
            total_value: valuation.total_value.to_decimal(),
            categories_value: valuation
                .categories_value
                .into_iter()
                .map(|(name, value)| (name, value.to_decimal()))
                .collect(),
            products: valuation.products.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ValuationQuery {
    #[serde(default)]
    pub method: ValuationMethod,
}

/// `GET /api/inventory/low-stock`
pub async fn low_stock(State(state): State<AppState>) -> ApiResult<Json<Vec<LowStockDto>>> {
    let entries = state.db.stock().low_stock().await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// `GET /api/inventory/reorder-suggestions`
pub async fn reorder_suggestions(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ReorderDto>>> {
    let suggestions = state.db.stock().reorder_suggestions().await?;
    Ok(Json(suggestions.into_iter().map(Into::into).collect()))
}

/// `GET /api/inventory/stock-report`
pub async fn stock_report(State(state): State<AppState>) -> ApiResult<Json<StockReportDto>> {
    let report = state.db.stock().stock_report().await?;
    Ok(Json(StockReportDto {
        summary: report.summary.into(),
        products: report.products.into_iter().map(Into::into).collect(),
    }))
}

/// `GET /api/inventory/valuation`
pub async fn valuation(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ValuationQuery>,
) -> ApiResult<Json<ValuationDto>> {
    let valuation = state.db.stock().valuation(query.method).await?;
    Ok(Json(valuation.into()))
}
