//! `/api/customers` and `/api/customer/{customer_id}` handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::app::AppState;
use crate::domain::{
    AppError, CreatedCustomer, CustomerDto, CustomerRequest, Envelope, ErrorResponse, ListParams,
    ValidationErrorResponse,
};

/// List customers in creation order
#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "customers",
    params(ListParams),
    responses(
        (status = 200, description = "Page of customers in `data`", body = [CustomerDto]),
        (status = 400, description = "Invalid pagination parameters", body = ErrorResponse),
        (status = 404, description = "No customer on this page", body = ErrorResponse)
    )
)]
pub async fn list_customers(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Envelope<Vec<CustomerDto>>>, AppError> {
    let customers = state.customers.index(params.page()?).await?;
    Ok(Json(Envelope::new(200, "Customers retrieved", customers)))
}

/// Get a single customer
#[utoipa::path(
    get,
    path = "/api/customers/{customer_id}",
    tag = "customers",
    params(("customer_id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer in `data`", body = CustomerDto),
        (status = 400, description = "Malformed UUID", body = ErrorResponse),
        (status = 404, description = "Customer not found", body = ErrorResponse)
    )
)]
pub async fn get_customer(
    State(state): State<Arc<AppState>>,
    ApiPath(customer_id): ApiPath<Uuid>,
) -> Result<Json<Envelope<CustomerDto>>, AppError> {
    let customer = state.customers.get(customer_id).await?;
    Ok(Json(Envelope::new(200, "Customer retrieved", customer)))
}

/// Register a customer and issue its bearer token
#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "customers",
    request_body = CustomerRequest,
    responses(
        (status = 201, description = "Identifier and token in `data`", body = CreatedCustomer,
            headers(("Location" = String, description = "Path of the new customer"))),
        (status = 400, description = "Validation error", body = ValidationErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_customer(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<CustomerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = state.customers.create(&request).await?;
    let location = format!("/api/customers/{}", created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(Envelope::new(201, "Customer created", created)),
    ))
}

/// Replace a customer's details
#[utoipa::path(
    put,
    path = "/api/customer/{customer_id}",
    tag = "customers",
    params(("customer_id" = Uuid, Path, description = "Customer ID")),
    request_body = CustomerRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated customer in `data`", body = CustomerDto),
        (status = 400, description = "Validation error or missing token", body = ValidationErrorResponse),
        (status = 401, description = "Bad credentials", body = ErrorResponse),
        (status = 404, description = "Customer not found", body = ErrorResponse)
    )
)]
pub async fn update_customer(
    State(state): State<Arc<AppState>>,
    ApiPath(customer_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<CustomerRequest>,
) -> Result<Json<Envelope<CustomerDto>>, AppError> {
    let customer = state.customers.update(customer_id, &request).await?;
    Ok(Json(Envelope::new(200, "Customer updated", customer)))
}

/// Delete a customer together with its accounts, unless one has transactions
#[utoipa::path(
    delete,
    path = "/api/customer/{customer_id}",
    tag = "customers",
    params(("customer_id" = Uuid, Path, description = "Customer ID")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Customer deleted, `data` is null"),
        (status = 400, description = "An account has transactions", body = ErrorResponse),
        (status = 401, description = "Bad credentials", body = ErrorResponse),
        (status = 404, description = "Customer not found", body = ErrorResponse)
    )
)]
pub async fn delete_customer(
    State(state): State<Arc<AppState>>,
    ApiPath(customer_id): ApiPath<Uuid>,
) -> Result<Json<Envelope<()>>, AppError> {
    state.customers.delete(customer_id).await?;
    Ok(Json(Envelope::empty(200, "Customer deleted")))
}
