//! Domain traits defining contracts for the relational store.
//!
//! Every method returns the raw [`DatabaseError`]; classifying it into an
//! [`AppError`](super::AppError) is the service layer's job.

use async_trait::async_trait;
use uuid::Uuid;

use super::account::Account;
use super::customer::Customer;
use super::error::DatabaseError;
use super::transaction::Transaction;
use super::types::Page;

/// Connectivity check for the store.
#[async_trait]
pub trait DatabaseHealth: Send + Sync {
    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// Persistence contract for customers.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Get a customer by ID, `NotFound` when absent
    async fn get_customer(&self, id: Uuid) -> Result<Customer, DatabaseError>;

    /// List customers in creation order, `NotFound` when the page is empty
    async fn list_customers(&self, page: Page) -> Result<Vec<Customer>, DatabaseError>;

    /// Insert a customer, returning the number of rows affected
    async fn create_customer(&self, customer: &Customer) -> Result<u64, DatabaseError>;

    /// Overwrite the mutable fields, `NotFound` when zero rows are affected
    async fn update_customer(&self, customer: &Customer) -> Result<(), DatabaseError>;

    /// Delete a customer, `NotFound` when zero rows are affected
    async fn delete_customer(&self, id: Uuid) -> Result<(), DatabaseError>;

    /// Whether a customer with this ID holds this token
    async fn customer_has_token(&self, id: Uuid, token: &str) -> Result<bool, DatabaseError>;
}

/// Persistence contract for accounts. Accounts are always scoped to their
/// owning customer except for [`find_account`](Self::find_account).
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn get_account(&self, id: Uuid, customer_id: Uuid) -> Result<Account, DatabaseError>;

    /// Look up any account by ID regardless of owner
    async fn find_account(&self, id: Uuid) -> Result<Account, DatabaseError>;

    async fn list_accounts(
        &self,
        customer_id: Uuid,
        page: Page,
    ) -> Result<Vec<Account>, DatabaseError>;

    async fn create_account(&self, account: &Account) -> Result<u64, DatabaseError>;

    /// Overwrite type, currency, status and interest rate. Never the balance.
    async fn update_account(&self, account: &Account) -> Result<(), DatabaseError>;

    async fn delete_account(&self, id: Uuid, customer_id: Uuid) -> Result<(), DatabaseError>;

    async fn account_owned_by(&self, id: Uuid, customer_id: Uuid) -> Result<bool, DatabaseError>;
}

/// Persistence contract for the append-only transaction log.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn get_transaction(&self, id: Uuid) -> Result<Transaction, DatabaseError>;

    /// List transactions in creation order, optionally only those sent or
    /// received by `account_id`
    async fn list_transactions(
        &self,
        account_id: Option<Uuid>,
        page: Page,
    ) -> Result<Vec<Transaction>, DatabaseError>;

    /// Atomically debit the sender, credit the receiver and record the
    /// transaction. Fails with `InsufficientFunds` without mutating anything
    /// when the sender's balance is lower than the amount.
    async fn create_transaction(&self, transaction: &Transaction) -> Result<u64, DatabaseError>;
}
