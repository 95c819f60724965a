//! # HTTP Routes
//!
//! All endpoints live under `/api`.
//!
//! ## Route Map
//! ```text
//! /api
//! ├── /health                               GET
//! ├── /sales              POST GET          /{id} GET
//! ├── /purchases          POST GET          /{id} GET
//! ├── /products           POST GET          /{id} GET PUT DELETE
//! ├── /categories         POST GET
//! ├── /customers          POST GET          /{id} GET PUT DELETE
//! ├── /suppliers          POST GET          /{id} GET PUT DELETE
//! └── /inventory
//!     ├── /stock-movements                  GET
//!     ├── /stock-adjustment                 POST
//!     ├── /low-stock                        GET
//!     ├── /reorder-suggestions              GET
//!     ├── /stock-report                     GET
//!     ├── /valuation                        GET  ?method=purchase_price|selling_price
//!     └── /movement-summary                 GET
//! ```
//!
//! Handlers only translate: JSON in, domain call, JSON out. Amounts cross
//! the wire as decimals and are converted to integer cents here.

pub mod categories;
pub mod directory;
pub mod health;
pub mod inventory;
pub mod invoices;
pub mod products;

use axum::routing::{get, post};
use axum::Router;
use rust_decimal::Decimal;
use serde::Serialize;
use storehouse_core::Money;

use crate::error::ApiResult;
use crate::state::AppState;

/// Builds the `/api` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/sales", post(invoices::create_sale).get(invoices::list_sales))
        .route("/sales/{id}", get(invoices::get_sale))
        .route(
            "/purchases",
            post(invoices::create_purchase).get(invoices::list_purchases),
        )
        .route("/purchases/{id}", get(invoices::get_purchase))
        .route(
            "/products",
            post(products::create_product).get(products::list_products),
        )
        .route(
            "/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route(
            "/customers",
            post(directory::create_customer).get(directory::list_customers),
        )
        .route(
            "/categories",
            post(categories::create_category).get(categories::list_categories),
        )
        .route(
            "/customers/{id}",
            get(directory::get_customer)
                .put(directory::update_customer)
                .delete(directory::delete_customer),
        )
        .route(
            "/suppliers",
            post(directory::create_supplier).get(directory::list_suppliers),
        )
        .route(
            "/suppliers/{id}",
            get(directory::get_supplier)
                .put(directory::update_supplier)
                .delete(directory::delete_supplier),
        )
        .nest("/inventory", inventory::routes())
}

// =============================================================================
// Shared response shapes
// =============================================================================

/// Body of a 201 response.
#[derive(Debug, Clone, Serialize)]
pub struct Created {
    pub message: String,
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
}

impl Created {
    pub fn new(message: impl Into<String>, id: i64) -> Self {
        Created {
            message: message.into(),
            id,
            invoice_number: None,
        }
    }
}

/// Body of a plain acknowledgement.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Message {
            message: message.into(),
        }
    }
}

/// Converts an optional wire amount, treating absent as zero.
pub(crate) fn money_or_zero(field: &str, value: Option<Decimal>) -> ApiResult<Money> {
    match value {
        Some(amount) => Ok(Money::try_from_decimal(field, amount)?),
        None => Ok(Money::zero()),
    }
}

pub(crate) fn money_opt(field: &str, value: Option<Decimal>) -> ApiResult<Option<Money>> {
    Ok(value
        .map(|amount| Money::try_from_decimal(field, amount))
        .transpose()?)
}
