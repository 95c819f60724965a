//! Product categories.
//!
//! A flat list of names. Products point at one through `category_id`; the
//! valuation report groups by it.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use storehouse_core::validation::{validate_optional_text, ValidationResult};
use storehouse_core::{Category, CoreError, ValidationError};

const MAX_NAME_LENGTH: usize = 100;

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Inserts a category.
    ///
    /// ## Errors
    /// - `Rejected(Validation)` for a blank or overlong name
    /// - `UniqueViolation` when the name is taken
    pub async fn create(&self, name: &str, description: Option<&str>) -> DbResult<Category> {
        let name = name.trim();
        validate_category_name(name).map_err(CoreError::from)?;
        validate_optional_text("description", description, 1000).map_err(CoreError::from)?;

        debug!(name = %name, "Inserting category");

        let result = sqlx::query(
            "INSERT INTO categories (name, description, created_at) VALUES (?, ?, ?)",
        )
        .bind(name)
        .bind(description)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("name", name),
            other => other,
        })?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, created_at FROM categories WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// All categories by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, created_at FROM categories ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }
}

fn validate_category_name(name: &str) -> ValidationResult<()> {
    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    validate_optional_text("name", Some(name), MAX_NAME_LENGTH)
}
