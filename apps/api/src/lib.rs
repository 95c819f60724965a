//! # Storehouse API
//!
//! JSON HTTP server for the storehouse back office.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Storehouse API                                  │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  Invoices      │  │  Catalog       │  │  Inventory                 ││
//! │  │                │  │                │  │                            ││
//! │  │ • create sale  │  │ • products     │  │ • stock movements          ││
//! │  │ • create purch.│  │ • categories   │  │ • stock adjustment         ││
//! │  │ • list / get   │  │ • customers    │  │ • low stock / reorder      ││
//! │  └────────────────┘  │ • suppliers    │  │ • report / summary         ││
//! │                      └────────────────┘  │ • valuation                ││
//! │                                          └────────────────────────────┘│
//! │                                                                         │
//! │  request_span middleware: request_id + method + path on every log line │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  storehouse-db: InvoiceEngine, repositories, SQLite pool         │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::ApiConfig`]. Environment variables:
//! - `STOREHOUSE_CONFIG` - TOML config file path
//! - `STOREHOUSE_BIND_ADDR` - Listen address (default: 0.0.0.0)
//! - `STOREHOUSE_PORT` - HTTP port (default: 5000)
//! - `STOREHOUSE_DB_PATH` - SQLite file (default: storehouse.db)
//! - `STOREHOUSE_DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `STOREHOUSE_LOG` - Log filter when `RUST_LOG` is unset

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use tracing::{debug, info_span, Instrument};
use uuid::Uuid;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ErrorCode};
pub use state::AppState;

/// Response header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Builds the full application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::api_routes())
        .layer(middleware::from_fn(request_span))
        .with_state(state)
}

/// Runs each request inside a span with a fresh request id.
async fn request_span(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!(
        "request",
        %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    async move {
        let mut response = next.run(request).await;
        debug!(status = response.status().as_u16(), "Request completed");

        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}
