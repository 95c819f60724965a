//! # Directory Repositories
//!
//! Customers (who we sell to) and suppliers (who we buy from).
//!
//! Both are thin single-table stores. The invoice engine only needs to
//! know that a referenced row exists, which [`counterparty_exists`] answers
//! on the engine's own transaction.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use storehouse_core::validation::{validate_name, validate_optional_text, ValidationResult};
use storehouse_core::{ContactDetails, ContactPatch, CoreError, Counterparty, Customer, Supplier};

const DEFAULT_CUSTOMER_TYPE: &str = "customer";

/// Checks that a customer or supplier row exists.
pub async fn counterparty_exists(
    conn: &mut SqliteConnection,
    role: Counterparty,
    id: i64,
) -> DbResult<bool> {
    let sql = match role {
        Counterparty::Customer => "SELECT EXISTS (SELECT 1 FROM customers WHERE id = ?)",
        Counterparty::Supplier => "SELECT EXISTS (SELECT 1 FROM suppliers WHERE id = ?)",
    };

    let exists: bool = sqlx::query_scalar(sql)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(exists)
}

/// Soft-deletes a directory row. Past invoices keep pointing at it.
async fn deactivate_row(pool: &SqlitePool, role: Counterparty, id: i64) -> DbResult<()> {
    let sql = match role {
        Counterparty::Customer => "UPDATE customers SET is_active = 0, updated_at = ? WHERE id = ?",
        Counterparty::Supplier => "UPDATE suppliers SET is_active = 0, updated_at = ? WHERE id = ?",
    };

    debug!(%role, id, "Deactivating");

    let result = sqlx::query(sql).bind(Utc::now()).bind(id).execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(DbError::not_found(role.to_string(), id));
    }

    Ok(())
}

fn validate_contact(contact: &ContactDetails) -> ValidationResult<()> {
    validate_name(&contact.name)?;
    validate_optional_text("contact_person", contact.contact_person.as_deref(), 200)?;
    validate_optional_text("address", contact.address.as_deref(), 500)?;
    validate_optional_text("phone", contact.phone.as_deref(), 50)?;
    validate_optional_text("email", contact.email.as_deref(), 200)?;
    validate_optional_text("tax_number", contact.tax_number.as_deref(), 50)
}

// =============================================================================
// Customers
// =============================================================================

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a customer.
    ///
    /// ## Arguments
    /// * `contact` - Name and contact fields
    /// * `customer_type` - Defaults to `"customer"`
    pub async fn create(
        &self,
        contact: &ContactDetails,
        customer_type: Option<&str>,
    ) -> DbResult<Customer> {
        validate_contact(contact).map_err(CoreError::from)?;
        validate_optional_text("customer_type", customer_type, 50).map_err(CoreError::from)?;

        debug!(name = %contact.name, "Inserting customer");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO customers (
                name, contact_person, address, phone, email, tax_number,
                customer_type, is_active, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(contact.name.trim())
        .bind(&contact.contact_person)
        .bind(&contact.address)
        .bind(&contact.phone)
        .bind(&contact.email)
        .bind(&contact.tax_number)
        .bind(customer_type.unwrap_or(DEFAULT_CUSTOMER_TYPE))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, contact_person, address, phone, email, tax_number,
                   customer_type, is_active, created_at, updated_at
            FROM customers
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists active customers by name.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, contact_person, address, phone, email, tax_number,
                   customer_type, is_active, created_at, updated_at
            FROM customers
            WHERE is_active = 1
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }
    /// Applies a partial update to the contact fields and `customer_type`.
    pub async fn update(
        &self,
        id: i64,
        patch: ContactPatch,
        customer_type: Option<&str>,
    ) -> DbResult<Customer> {
        let current = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))?;

        let contact = patch.apply(ContactDetails {
            name: current.name,
            contact_person: current.contact_person,
            address: current.address,
            phone: current.phone,
            email: current.email,
            tax_number: current.tax_number,
        });
        validate_contact(&contact).map_err(CoreError::from)?;
        validate_optional_text("customer_type", customer_type, 50).map_err(CoreError::from)?;

        debug!(id, "Updating customer");

        sqlx::query(
            r#"
            UPDATE customers SET
                name = ?, contact_person = ?, address = ?, phone = ?, email = ?,
                tax_number = ?, customer_type = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(contact.name.trim())
        .bind(&contact.contact_person)
        .bind(&contact.address)
        .bind(&contact.phone)
        .bind(&contact.email)
        .bind(&contact.tax_number)
        .bind(customer_type.unwrap_or(&current.customer_type))
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Soft delete: hidden from [`list`](Self::list), still valid on old sales.
    pub async fn deactivate(&self, id: i64) -> DbResult<()> {
        deactivate_row(&self.pool, Counterparty::Customer, id).await
    }
}

// =============================================================================
// Suppliers
// =============================================================================

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    /// Creates a new SupplierRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    /// Inserts a supplier.
    pub async fn create(
        &self,
        contact: &ContactDetails,
        commercial_register: Option<&str>,
    ) -> DbResult<Supplier> {
        validate_contact(contact).map_err(CoreError::from)?;
        validate_optional_text("commercial_register", commercial_register, 100)
            .map_err(CoreError::from)?;

        debug!(name = %contact.name, "Inserting supplier");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO suppliers (
                name, contact_person, address, phone, email, tax_number,
                commercial_register, is_active, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(contact.name.trim())
        .bind(&contact.contact_person)
        .bind(&contact.address)
        .bind(&contact.phone)
        .bind(&contact.email)
        .bind(&contact.tax_number)
        .bind(commercial_register)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))
    }

    /// Gets a supplier by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, name, contact_person, address, phone, email, tax_number,
                   commercial_register, is_active, created_at, updated_at
            FROM suppliers
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(supplier)
    }

    /// Lists active suppliers by name.
    pub async fn list(&self) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, name, contact_person, address, phone, email, tax_number,
                   commercial_register, is_active, created_at, updated_at
            FROM suppliers
            WHERE is_active = 1
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }
    /// Applies a partial update to the contact fields and `commercial_register`.
    pub async fn update(
        &self,
        id: i64,
        patch: ContactPatch,
        commercial_register: Option<&str>,
    ) -> DbResult<Supplier> {
        let current = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))?;

        let contact = patch.apply(ContactDetails {
            name: current.name,
            contact_person: current.contact_person,
            address: current.address,
            phone: current.phone,
            email: current.email,
            tax_number: current.tax_number,
        });
        validate_contact(&contact).map_err(CoreError::from)?;
        validate_optional_text("commercial_register", commercial_register, 100)
            .map_err(CoreError::from)?;

        debug!(id, "Updating supplier");

        sqlx::query(
            r#"
            UPDATE suppliers SET
                name = ?, contact_person = ?, address = ?, phone = ?, email = ?,
                tax_number = ?, commercial_register = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(contact.name.trim())
        .bind(&contact.contact_person)
        .bind(&contact.address)
        .bind(&contact.phone)
        .bind(&contact.email)
        .bind(&contact.tax_number)
        .bind(commercial_register.or(current.commercial_register.as_deref()))
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))
    }

    pub async fn deactivate(&self, id: i64) -> DbResult<()> {
        deactivate_row(&self.pool, Counterparty::Supplier, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn contact(name: &str) -> ContactDetails {
        ContactDetails {
            name: name.to_string(),
            phone: Some("0100".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_customer_roundtrip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        let created = repo.create(&contact("Acme"), None).await.unwrap();
        assert_eq!(created.customer_type, "customer");

        let dealer = repo.create(&contact("Bolt"), Some("dealer")).await.unwrap();
        assert_eq!(dealer.customer_type, "dealer");

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Acme", "Bolt"]);
        assert!(repo.get_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_supplier_requires_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db.suppliers().create(&contact("  "), None).await.unwrap_err();
        assert!(matches!(err, DbError::Rejected(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_counterparty_exists() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let supplier = db.suppliers().create(&contact("Parts Co"), Some("CR-1")).await.unwrap();
        assert_eq!(supplier.commercial_register.as_deref(), Some("CR-1"));

        let mut conn = db.pool().acquire().await.unwrap();
        assert!(counterparty_exists(&mut conn, Counterparty::Supplier, supplier.id).await.unwrap());
        assert!(!counterparty_exists(&mut conn, Counterparty::Customer, supplier.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_customer_update_is_partial() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();
        let created = repo.create(&contact("Acme"), None).await.unwrap();

        let patch = ContactPatch {
            email: Some("sales@acme.test".to_string()),
            ..Default::default()
        };
        let updated = repo.update(created.id, patch, Some("dealer")).await.unwrap();
        assert_eq!(updated.name, "Acme");
        assert_eq!(updated.phone.as_deref(), Some("0100"));
        assert_eq!(updated.email.as_deref(), Some("sales@acme.test"));
        assert_eq!(updated.customer_type, "dealer");

        let renamed = repo
            .update(
                created.id,
                ContactPatch {
                    name: Some("Acme Ltd".to_string()),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Acme Ltd");
        assert_eq!(renamed.customer_type, "dealer");

        let blank = ContactPatch {
            name: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            repo.update(created.id, blank, None).await,
            Err(DbError::Rejected(CoreError::Validation(_)))
        ));
        assert!(matches!(
            repo.update(99, ContactPatch::default(), None).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_deactivate_hides_from_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let suppliers = db.suppliers();
        let supplier = suppliers.create(&contact("Parts Co"), Some("CR-1")).await.unwrap();

        let updated = suppliers
            .update(supplier.id, ContactPatch::default(), None)
            .await
            .unwrap();
        assert_eq!(updated.commercial_register.as_deref(), Some("CR-1"));

        suppliers.deactivate(supplier.id).await.unwrap();
        assert!(suppliers.list().await.unwrap().is_empty());
        let stored = suppliers.get_by_id(supplier.id).await.unwrap().unwrap();
        assert!(!stored.is_active);

        assert!(matches!(
            db.customers().deactivate(42).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
