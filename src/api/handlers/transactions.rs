//! Transaction handlers.

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
    AppError, CreateTransactionRequest, Envelope, ErrorResponse, Transaction,
    TransactionListParams, ValidationErrorResponse,
};

/// List transactions, optionally those sent or received by one account
#[utoipa::path(
    get,
    path = "/api/transactions",
    tag = "transactions",
    params(TransactionListParams),
    responses(
        (status = 200, description = "Page of transactions in `data`", body = [Transaction]),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 404, description = "No transaction on this page", body = ErrorResponse)
    )
)]
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<TransactionListParams>,
) -> Result<Json<Envelope<Vec<Transaction>>>, AppError> {
    let transactions = state
        .transactions
        .index(params.account_id()?, params.page()?)
        .await?;
    Ok(Json(Envelope::new(200, "Transactions retrieved", transactions)))
}

#[utoipa::path(
    get,
    path = "/api/transactions/{transaction_id}",
    tag = "transactions",
    params(("transaction_id" = Uuid, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Transaction in `data`", body = Transaction),
        (status = 404, description = "Transaction not found", body = ErrorResponse)
    )
)]
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    ApiPath(transaction_id): ApiPath<Uuid>,
) -> Result<Json<Envelope<Transaction>>, AppError> {
    let transaction = state.transactions.get(transaction_id).await?;
    Ok(Json(Envelope::new(200, "Transaction retrieved", transaction)))
}

/// Send money from `{account_id}`; without a receiver this is a withdrawal
#[utoipa::path(
    post,
    path = "/api/customer/{customer_id}/account/{account_id}/transactions",
    tag = "transactions",
    params(
        ("customer_id" = Uuid, Path, description = "Customer ID"),
        ("account_id" = Uuid, Path, description = "Sender account ID")
    ),
    request_body = CreateTransactionRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Transaction applied",
            headers(("Location" = String, description = "Path of the new transaction"))),
        (status = 400, description = "Validation error, inactive account or insufficient funds",
            body = ValidationErrorResponse),
        (status = 401, description = "Bad credentials or not the owner", body = ErrorResponse),
        (status = 404, description = "Sender or receiver account not found", body = ErrorResponse)
    )
)]
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    ApiPath((_customer_id, account_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(request): ApiJson<CreateTransactionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let transaction = state.transactions.create(account_id, &request).await?;
    let location = format!("/api/transaction/{}", transaction.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)]))
}
