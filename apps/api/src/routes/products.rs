//! Product catalog endpoints.
//!
//! Stock is read-only here. It changes only through invoices and
//! `POST /api/inventory/stock-adjustment`, so every unit on hand has a
//! ledger entry behind it. Opening stock on create is the one exception.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{money_opt, Created, Message};
use crate::error::{ApiError, ApiJson, ApiPath, ApiQuery, ApiResult};
use crate::state::AppState;
use storehouse_core::{Money, NewProduct, Product, ProductPatch};

/// Product as sent to clients, with decimal prices.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDto {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub unit: String,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub purchase_price: Decimal,
    pub selling_price: Decimal,
    pub min_stock: i64,
    pub max_stock: Option<i64>,
    pub current_stock: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        ProductDto {
            purchase_price: p.purchase_price().to_decimal(),
            selling_price: p.selling_price().to_decimal(),
            id: p.id,
            name: p.name,
            code: p.code,
            description: p.description,
            unit: p.unit,
            category_id: p.category_id,
            category_name: p.category_name,
            min_stock: p.min_stock,
            max_stock: p.max_stock,
            current_stock: p.current_stock,
            is_active: p.is_active,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub category_id: Option<i64>,
    pub purchase_price: Decimal,
    pub selling_price: Decimal,
    #[serde(default)]
    pub min_stock: i64,
    pub max_stock: Option<i64>,
    #[serde(default)]
    pub current_stock: i64,
}

impl CreateProductRequest {
    fn into_new_product(self) -> ApiResult<NewProduct> {
        Ok(NewProduct {
            purchase_price: Money::try_from_decimal("purchase_price", self.purchase_price)?,
            selling_price: Money::try_from_decimal("selling_price", self.selling_price)?,
            name: self.name,
            code: self.code,
            description: self.description,
            unit: self.unit,
            category_id: self.category_id,
            min_stock: self.min_stock,
            max_stock: self.max_stock,
            current_stock: self.current_stock,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub category_id: Option<i64>,
    pub purchase_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub min_stock: Option<i64>,
    pub max_stock: Option<i64>,
    pub is_active: Option<bool>,
    /// Accepted only to be refused with a clear message.
    pub current_stock: Option<i64>,
}

impl UpdateProductRequest {
    fn into_patch(self) -> ApiResult<ProductPatch> {
        if self.current_stock.is_some() {
            return Err(ApiError::validation(
                "current_stock cannot be edited directly; use a stock adjustment",
            ));
        }

        Ok(ProductPatch {
            purchase_price: money_opt("purchase_price", self.purchase_price)?,
            selling_price: money_opt("selling_price", self.selling_price)?,
            name: self.name,
            code: self.code,
            description: self.description,
            unit: self.unit,
            category_id: self.category_id,
            min_stock: self.min_stock,
            max_stock: self.max_stock,
            is_active: self.is_active,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListProductsQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// `POST /api/products`
pub async fn create_product(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<Created>)> {
    let product = state
        .db
        .products()
        .create(&request.into_new_product()?)
        .await?;

    tracing::info!(id = product.id, code = %product.code, "Product created");

    Ok((
        StatusCode::CREATED,
        Json(Created::new("Product created successfully", product.id)),
    ))
}

/// `GET /api/products`
pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListProductsQuery>,
) -> ApiResult<Json<Vec<ProductDto>>> {
    let products = state.db.products().list(query.include_inactive).await?;
    Ok(Json(products.into_iter().map(ProductDto::from).collect()))
}

/// `GET /api/products/{id}`
pub async fn get_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<ProductDto>> {
    let product = state
        .db
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))?;
    Ok(Json(product.into()))
}

/// `PUT /api/products/{id}`
pub async fn update_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateProductRequest>,
) -> ApiResult<Json<Message>> {
    state.db.products().update(id, &request.into_patch()?).await?;
    Ok(Json(Message::new("Product updated successfully")))
}

/// `DELETE /api/products/{id}`: soft delete.
pub async fn delete_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Message>> {
    state.db.products().deactivate(id).await?;
    Ok(Json(Message::new("Product deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_not_patchable() {
        let request = UpdateProductRequest {
            current_stock: Some(99),
            ..Default::default()
        };
        let err = request.into_patch().unwrap_err();
        assert!(err.message.contains("stock adjustment"));
    }

    #[test]
    fn test_create_request_converts_prices() {
        let request: CreateProductRequest = serde_json::from_str(
            r#"{"name": "Widget", "code": "W-1", "purchase_price": 5, "selling_price": 8.25}"#,
        )
        .unwrap();

        let product = request.into_new_product().unwrap();
        assert_eq!(product.purchase_price, Money::from_cents(500));
        assert_eq!(product.selling_price, Money::from_cents(825));
        assert_eq!(product.min_stock, 0);
        assert_eq!(product.current_stock, 0);
    }
}
