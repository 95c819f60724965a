//! Customer and supplier endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::{Created, Message};
use crate::error::{ApiError, ApiJson, ApiPath, ApiResult};
use crate::state::AppState;
use storehouse_core::{ContactDetails, ContactPatch, Customer, Supplier};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub contact_person: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub tax_number: Option<String>,
    pub customer_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSupplierRequest {
    pub name: String,
    pub contact_person: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub tax_number: Option<String>,
    pub commercial_register: Option<String>,
}

impl CreateCustomerRequest {
    fn contact(&self) -> ContactDetails {
        ContactDetails {
            name: self.name.clone(),
            contact_person: self.contact_person.clone(),
            address: self.address.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            tax_number: self.tax_number.clone(),
        }
    }
}

impl CreateSupplierRequest {
    fn contact(&self) -> ContactDetails {
        ContactDetails {
            name: self.name.clone(),
            contact_person: self.contact_person.clone(),
            address: self.address.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            tax_number: self.tax_number.clone(),
        }
    }
}

/// Partial update body shared by `PUT /api/customers/{id}` and
/// `PUT /api/suppliers/{id}`. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContactRequest {
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub tax_number: Option<String>,
    pub customer_type: Option<String>,
    pub commercial_register: Option<String>,
}

impl UpdateContactRequest {
    fn patch(&self) -> ContactPatch {
        ContactPatch {
            name: self.name.clone(),
            contact_person: self.contact_person.clone(),
            address: self.address.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            tax_number: self.tax_number.clone(),
        }
    }
}

/// `POST /api/customers`
pub async fn create_customer(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateCustomerRequest>,
) -> ApiResult<(StatusCode, Json<Created>)> {
    let customer = state
        .db
        .customers()
        .create(&request.contact(), request.customer_type.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Created::new("Customer created successfully", customer.id)),
    ))
}

/// `GET /api/customers`
pub async fn list_customers(State(state): State<AppState>) -> ApiResult<Json<Vec<Customer>>> {
    Ok(Json(state.db.customers().list().await?))
}

/// `GET /api/customers/{id}`
pub async fn get_customer(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Customer>> {
    state
        .db
        .customers()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Customer", id))
}

/// `PUT /api/customers/{id}`
pub async fn update_customer(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateContactRequest>,
) -> ApiResult<Json<Message>> {
    state
        .db
        .customers()
        .update(id, request.patch(), request.customer_type.as_deref())
        .await?;
    Ok(Json(Message::new("Customer updated successfully")))
}

/// `DELETE /api/customers/{id}`: soft delete.
pub async fn delete_customer(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Message>> {
    state.db.customers().deactivate(id).await?;
    Ok(Json(Message::new("Customer deleted successfully")))
}

/// `POST /api/suppliers`
pub async fn create_supplier(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateSupplierRequest>,
) -> ApiResult<(StatusCode, Json<Created>)> {
    let supplier = state
        .db
        .suppliers()
        .create(&request.contact(), request.commercial_register.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Created::new("Supplier created successfully", supplier.id)),
    ))
}

/// `GET /api/suppliers`
pub async fn list_suppliers(State(state): State<AppState>) -> ApiResult<Json<Vec<Supplier>>> {
    Ok(Json(state.db.suppliers().list().await?))
}

/// `GET /api/suppliers/{id}`
pub async fn get_supplier(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Supplier>> {
    state
        .db
        .suppliers()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Supplier", id))
}

/// `PUT /api/suppliers/{id}`
pub async fn update_supplier(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateContactRequest>,
) -> ApiResult<Json<Message>> {
    state
        .db
        .suppliers()
        .update(id, request.patch(), request.commercial_register.as_deref())
        .await?;
    Ok(Json(Message::new("Supplier updated successfully")))
}

/// `DELETE /api/suppliers/{id}`: soft delete.
pub async fn delete_supplier(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Message>> {
    state.db.suppliers().deactivate(id).await?;
    Ok(Json(Message::new("Supplier deleted successfully")))
}
