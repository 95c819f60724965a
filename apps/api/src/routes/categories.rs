//! Product category endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::Created;
use crate::error::{ApiJson, ApiResult};
use crate::state::AppState;
use storehouse_core::Category;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

/// `POST /api/categories`
pub async fn create_category(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<Created>)> {
    let category = state
        .db
        .categories()
        .create(&request.name, request.description.as_deref())
        .await?;

    tracing::info!(id = category.id, name = %category.name, "Category created");

    Ok((
        StatusCode::CREATED,
        Json(Created::new("Category created successfully", category.id)),
    ))
}

/// `GET /api/categories`
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.db.categories().list().await?))
}
