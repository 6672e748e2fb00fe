//! Domain layer containing core business types, traits, and error definitions.

pub mod account;
pub mod customer;
pub mod error;
pub mod traits;
pub mod transaction;
pub mod types;
pub mod validation;

pub use account::{
    Account, AccountStatus, AccountType, CreateAccountRequest, Currency, UpdateAccountRequest,
};
pub use customer::{CreatedCustomer, Customer, CustomerDto, CustomerRequest};
pub use error::{AppError, ConfigError, DatabaseError};
pub use traits::{AccountRepository, CustomerRepository, DatabaseHealth, TransactionRepository};
pub use transaction::{CreateTransactionRequest, Transaction, TransactionStatus};
pub use types::{
    Envelope, ErrorResponse, HealthResponse, HealthStatus, ListParams, Page, RateLimitResponse,
    TransactionListParams, ValidationErrorResponse,
};
