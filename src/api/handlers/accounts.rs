//! `/api/customer/{customer_id}/account(s)` handlers. Every route here sits
//! behind the bearer-token guard; single-account routes also behind the
//! ownership guard.

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
    Account, AppError, CreateAccountRequest, Envelope, ErrorResponse, ListParams,
    UpdateAccountRequest, ValidationErrorResponse,
};

#[utoipa::path(
    get,
    path = "/api/customer/{customer_id}/accounts",
    tag = "accounts",
    params(("customer_id" = Uuid, Path, description = "Customer ID"), ListParams),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Page of accounts in `data`", body = [Account]),
        (status = 401, description = "Bad credentials", body = ErrorResponse),
        (status = 404, description = "No account on this page", body = ErrorResponse)
    )
)]
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    ApiPath(customer_id): ApiPath<Uuid>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Envelope<Vec<Account>>>, AppError> {
    let accounts = state.accounts.index(customer_id, params.page()?).await?;
    Ok(Json(Envelope::new(200, "Accounts retrieved", accounts)))
}

#[utoipa::path(
    get,
    path = "/api/customer/{customer_id}/account/{account_id}",
    tag = "accounts",
    params(
        ("customer_id" = Uuid, Path, description = "Customer ID"),
        ("account_id" = Uuid, Path, description = "Account ID")
    ),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Account in `data`", body = Account),
        (status = 401, description = "Bad credentials or not the owner", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse)
    )
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    ApiPath((customer_id, account_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<Envelope<Account>>, AppError> {
    let account = state.accounts.get(customer_id, account_id).await?;
    Ok(Json(Envelope::new(200, "Account retrieved", account)))
}

/// Open an account; the response body is empty, `Location` points at it
#[utoipa::path(
    post,
    path = "/api/customer/{customer_id}/accounts",
    tag = "accounts",
    params(("customer_id" = Uuid, Path, description = "Customer ID")),
    request_body = CreateAccountRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Account created",
            headers(("Location" = String, description = "Path of the new account"))),
        (status = 400, description = "Validation error", body = ValidationErrorResponse),
        (status = 401, description = "Bad credentials", body = ErrorResponse)
    )
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    ApiPath(customer_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<CreateAccountRequest>,
) -> Result<impl IntoResponse, AppError> {
    let account = state.accounts.create(customer_id, &request).await?;
    let location = format!("/api/customer/{customer_id}/account/{}", account.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)]))
}

/// Change type, currency, status and interest rate. The balance is not
/// part of the body.
#[utoipa::path(
    put,
    path = "/api/customer/{customer_id}/account/{account_id}",
    tag = "accounts",
    params(
        ("customer_id" = Uuid, Path, description = "Customer ID"),
        ("account_id" = Uuid, Path, description = "Account ID")
    ),
    request_body = UpdateAccountRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated account in `data`", body = Account),
        (status = 400, description = "Validation error", body = ValidationErrorResponse),
        (status = 401, description = "Bad credentials or not the owner", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse)
    )
)]
pub async fn update_account(
    State(state): State<Arc<AppState>>,
    ApiPath((customer_id, account_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(request): ApiJson<UpdateAccountRequest>,
) -> Result<Json<Envelope<Account>>, AppError> {
    let account = state
        .accounts
        .update(customer_id, account_id, &request)
        .await?;
    Ok(Json(Envelope::new(200, "Account updated", account)))
}

#[utoipa::path(
    delete,
    path = "/api/customer/{customer_id}/account/{account_id}",
    tag = "accounts",
    params(
        ("customer_id" = Uuid, Path, description = "Customer ID"),
        ("account_id" = Uuid, Path, description = "Account ID")
    ),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Account deleted, `data` is null"),
        (status = 400, description = "Account has transactions", body = ErrorResponse),
        (status = 401, description = "Bad credentials or not the owner", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse)
    )
)]
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    ApiPath((customer_id, account_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<Envelope<()>>, AppError> {
    state.accounts.delete(customer_id, account_id).await?;
    Ok(Json(Envelope::empty(200, "Account deleted")))
}
