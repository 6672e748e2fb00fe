//! HTTP request handlers with OpenAPI documentation.

pub mod accounts;
pub mod customers;
pub mod health;
pub mod transactions;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;
use utoipa::OpenApi;

use crate::domain::{
    Account, AccountStatus, AccountType, AppError, CreateAccountRequest,
    CreateTransactionRequest, CreatedCustomer, Currency, CustomerDto, CustomerRequest,
    ErrorResponse, HealthResponse, HealthStatus, RateLimitResponse, Transaction,
    TransactionStatus, UpdateAccountRequest, ValidationErrorResponse,
};

pub use accounts::{create_account, delete_account, get_account, list_accounts, update_account};
pub use customers::{create_customer, delete_customer, get_customer, list_customers, update_customer};
pub use health::{health_check_handler, liveness_handler, openapi_handler, readiness_handler};
pub use transactions::{create_transaction, get_transaction, list_transactions};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bank Demo API",
        version = "0.1.0",
        description = "Customers, accounts and transactions over PostgreSQL. \
            Successful responses are wrapped in `{message, status, data}`.",
        license(name = "MIT")
    ),
    paths(
        customers::list_customers,
        customers::get_customer,
        customers::create_customer,
        customers::update_customer,
        customers::delete_customer,
        accounts::list_accounts,
        accounts::get_account,
        accounts::create_account,
        accounts::update_account,
        accounts::delete_account,
        transactions::list_transactions,
        transactions::get_transaction,
        transactions::create_transaction,
        health::health_check_handler,
        health::liveness_handler,
        health::readiness_handler,
    ),
    components(
        schemas(
            CustomerDto,
            CustomerRequest,
            CreatedCustomer,
            Account,
            AccountType,
            AccountStatus,
            Currency,
            CreateAccountRequest,
            UpdateAccountRequest,
            Transaction,
            TransactionStatus,
            CreateTransactionRequest,
            HealthResponse,
            HealthStatus,
            ErrorResponse,
            ValidationErrorResponse,
            RateLimitResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "customers", description = "Customer management"),
        (name = "accounts", description = "Accounts owned by a customer"),
        (name = "transactions", description = "Money movements between accounts"),
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` security scheme referenced by protected paths.
struct BearerAuth;

impl utoipa::Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self, "Server error");
        }

        match self {
            AppError::Validation(errors) => (
                status,
                Json(ValidationErrorResponse {
                    message: "Failed to validate request".to_string(),
                    status: status.as_u16(),
                    errors,
                }),
            )
                .into_response(),
            other => (
                status,
                Json(ErrorResponse {
                    error_message: other.to_string(),
                    code: status.as_u16(),
                }),
            )
                .into_response(),
        }
    }
}
