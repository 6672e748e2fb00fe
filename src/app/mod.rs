//! Application layer containing business logic and shared state.

pub mod account_service;
pub mod customer_service;
pub mod state;
pub mod transaction_service;

pub use account_service::AccountService;
pub use customer_service::{CustomerService, generate_token};
pub use state::AppState;
pub use transaction_service::TransactionService;
