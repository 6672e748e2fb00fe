//! Mock implementations for testing.
//!
//! [`MockStore`] keeps every table in memory, in insertion order, and
//! implements all repository traits so it can stand in for
//! [`PostgresClient`](crate::infra::PostgresClient) anywhere.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::domain::{
    Account, AccountRepository, Customer, CustomerRepository, DatabaseError, DatabaseHealth, Page,
    Transaction, TransactionRepository,
};

/// Configuration for mock behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// If true, operations will fail.
    pub should_fail: bool,
    /// Custom error message for failures.
    pub error_message: Option<String>,
}

impl MockConfig {
    #[must_use]
    pub fn success() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            should_fail: true,
            error_message: Some(message.into()),
        }
    }
}

/// In-memory store for testing.
///
/// # Example
///
/// ```
/// use bank_demo_api::test_utils::{MockConfig, MockStore};
///
/// let store = MockStore::new();
/// let failing = MockStore::with_config(MockConfig::failure("DB error"));
/// ```
pub struct MockStore {
    customers: Mutex<Vec<Customer>>,
    accounts: Mutex<Vec<Account>>,
    transactions: Mutex<Vec<Transaction>>,
    config: MockConfig,
    call_count: AtomicU64,
    is_healthy: AtomicBool,
}

impl MockStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            customers: Mutex::new(Vec::new()),
            accounts: Mutex::new(Vec::new()),
            transactions: Mutex::new(Vec::new()),
            config,
            call_count: AtomicU64::new(0),
            is_healthy: AtomicBool::new(true),
        }
    }

    /// Creates a mock whose every operation fails with `Query`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    /// Gets the number of times any repository method was called.
    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.is_healthy.store(healthy, Ordering::Relaxed);
    }

    pub fn customers(&self) -> Vec<Customer> {
        self.customers.lock().unwrap().clone()
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.accounts.lock().unwrap().clone()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions.lock().unwrap().clone()
    }

    pub fn find_customer(&self, id: Uuid) -> Option<Customer> {
        self.customers
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    pub fn find_account_by_id(&self, id: Uuid) -> Option<Account> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    /// Seeds a customer without going through the service layer.
    pub fn insert_customer(&self, customer: Customer) {
        self.customers.lock().unwrap().push(customer);
    }

    /// Seeds an account without going through the service layer.
    pub fn insert_account(&self, account: Account) {
        self.accounts.lock().unwrap().push(account);
    }

    fn increment_call_count(&self) {
        self.call_count.fetch_add(1, Ordering::Relaxed);
    }

    fn check_should_fail(&self) -> Result<(), DatabaseError> {
        self.increment_call_count();
        if self.config.should_fail {
            let msg = self
                .config
                .error_message
                .clone()
                .unwrap_or_else(|| "Mock database error".to_string());
            return Err(DatabaseError::Query(msg));
        }
        Ok(())
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

fn paged<T: Clone>(items: &[T], page: Page, what: &str) -> Result<Vec<T>, DatabaseError> {
    let page = page.apply(items);
    if page.is_empty() {
        return Err(DatabaseError::NotFound(format!("no {what} rows")));
    }
    Ok(page)
}

fn references(transactions: &[Transaction], account_id: Uuid) -> bool {
    transactions.iter().any(|t| {
        t.sender_account_id == account_id || t.receiver_account_id == Some(account_id)
    })
}

#[async_trait]
impl DatabaseHealth for MockStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        if !self.is_healthy.load(Ordering::Relaxed) {
            return Err(DatabaseError::Connection(
                "Mock database unhealthy".to_string(),
            ));
        }
        self.check_should_fail()
    }
}

#[async_trait]
impl CustomerRepository for MockStore {
    async fn get_customer(&self, id: Uuid) -> Result<Customer, DatabaseError> {
        self.check_should_fail()?;
        self.find_customer(id)
            .ok_or_else(|| DatabaseError::NotFound(id.to_string()))
    }

    async fn list_customers(&self, page: Page) -> Result<Vec<Customer>, DatabaseError> {
        self.check_should_fail()?;
        paged(&self.customers.lock().unwrap(), page, "customer")
    }

    async fn create_customer(&self, customer: &Customer) -> Result<u64, DatabaseError> {
        self.check_should_fail()?;
        let mut customers = self.customers.lock().unwrap();
        if customers
            .iter()
            .any(|c| c.id == customer.id || c.token == customer.token)
        {
            return Err(DatabaseError::Duplicate(customer.id.to_string()));
        }
        customers.push(customer.clone());
        Ok(1)
    }

    async fn update_customer(&self, customer: &Customer) -> Result<(), DatabaseError> {
        self.check_should_fail()?;
        let mut customers = self.customers.lock().unwrap();
        let stored = customers
            .iter_mut()
            .find(|c| c.id == customer.id)
            .ok_or_else(|| DatabaseError::NotFound(customer.id.to_string()))?;
        // Same column set as the UPDATE statement.
        stored.first_name = customer.first_name.clone();
        stored.last_name = customer.last_name.clone();
        stored.birthday = customer.birthday;
        stored.email = customer.email.clone();
        stored.phone = customer.phone.clone();
        stored.state = customer.state.clone();
        stored.address = customer.address.clone();
        Ok(())
    }

    async fn delete_customer(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.check_should_fail()?;
        let mut customers = self.customers.lock().unwrap();
        if !customers.iter().any(|c| c.id == id) {
            return Err(DatabaseError::NotFound(id.to_string()));
        }

        // Accounts cascade, transactions restrict, as in the schema.
        let mut accounts = self.accounts.lock().unwrap();
        let owned: Vec<Uuid> = accounts
            .iter()
            .filter(|a| a.customer_id == id)
            .map(|a| a.id)
            .collect();
        let transactions = self.transactions.lock().unwrap();
        if let Some(account_id) = owned.iter().find(|a| references(&transactions, **a)) {
            return Err(DatabaseError::ForeignKey(format!(
                "account {account_id} is referenced by transactions"
            )));
        }
        accounts.retain(|a| a.customer_id != id);
        customers.retain(|c| c.id != id);
        Ok(())
    }

    async fn customer_has_token(&self, id: Uuid, token: &str) -> Result<bool, DatabaseError> {
        self.check_should_fail()?;
        Ok(self
            .customers
            .lock()
            .unwrap()
            .iter()
            .any(|c| c.id == id && c.token == token))
    }
}

#[async_trait]
impl AccountRepository for MockStore {
    async fn get_account(&self, id: Uuid, customer_id: Uuid) -> Result<Account, DatabaseError> {
        self.check_should_fail()?;
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id && a.customer_id == customer_id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(id.to_string()))
    }

    async fn find_account(&self, id: Uuid) -> Result<Account, DatabaseError> {
        self.check_should_fail()?;
        self.find_account_by_id(id)
            .ok_or_else(|| DatabaseError::NotFound(id.to_string()))
    }

    async fn list_accounts(
        &self,
        customer_id: Uuid,
        page: Page,
    ) -> Result<Vec<Account>, DatabaseError> {
        self.check_should_fail()?;
        let owned: Vec<Account> = self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.customer_id == customer_id)
            .cloned()
            .collect();
        paged(&owned, page, "account")
    }

    async fn create_account(&self, account: &Account) -> Result<u64, DatabaseError> {
        self.check_should_fail()?;
        if self.find_customer(account.customer_id).is_none() {
            return Err(DatabaseError::ForeignKey(format!(
                "customer {} does not exist",
                account.customer_id
            )));
        }
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|a| a.id == account.id) {
            return Err(DatabaseError::Duplicate(account.id.to_string()));
        }
        accounts.push(account.clone());
        Ok(1)
    }

    async fn update_account(&self, account: &Account) -> Result<(), DatabaseError> {
        self.check_should_fail()?;
        let mut accounts = self.accounts.lock().unwrap();
        let stored = accounts
            .iter_mut()
            .find(|a| a.id == account.id && a.customer_id == account.customer_id)
            .ok_or_else(|| DatabaseError::NotFound(account.id.to_string()))?;
        stored.account_type = account.account_type;
        stored.currency = account.currency;
        stored.status = account.status;
        stored.interest_rate = account.interest_rate;
        Ok(())
    }

    async fn delete_account(&self, id: Uuid, customer_id: Uuid) -> Result<(), DatabaseError> {
        self.check_should_fail()?;
        let mut accounts = self.accounts.lock().unwrap();
        if !accounts.iter().any(|a| a.id == id && a.customer_id == customer_id) {
            return Err(DatabaseError::NotFound(id.to_string()));
        }
        if references(&self.transactions.lock().unwrap(), id) {
            return Err(DatabaseError::ForeignKey(format!(
                "account {id} is referenced by transactions"
            )));
        }
        accounts.retain(|a| a.id != id);
        Ok(())
    }

    async fn account_owned_by(&self, id: Uuid, customer_id: Uuid) -> Result<bool, DatabaseError> {
        self.check_should_fail()?;
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .any(|a| a.id == id && a.customer_id == customer_id))
    }
}

#[async_trait]
impl TransactionRepository for MockStore {
    async fn get_transaction(&self, id: Uuid) -> Result<Transaction, DatabaseError> {
        self.check_should_fail()?;
        self.transactions
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(id.to_string()))
    }

    async fn list_transactions(
        &self,
        account_id: Option<Uuid>,
        page: Page,
    ) -> Result<Vec<Transaction>, DatabaseError> {
        self.check_should_fail()?;
        let matching: Vec<Transaction> = self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .filter(|t| {
                account_id.is_none_or(|id| {
                    t.sender_account_id == id || t.receiver_account_id == Some(id)
                })
            })
            .cloned()
            .collect();
        paged(&matching, page, "transaction")
    }

    async fn create_transaction(&self, transaction: &Transaction) -> Result<u64, DatabaseError> {
        self.check_should_fail()?;
        // Both locks are held for the whole unit, mirroring the database transaction.
        let mut accounts = self.accounts.lock().unwrap();
        let mut transactions = self.transactions.lock().unwrap();

        let sender = accounts
            .iter()
            .position(|a| a.id == transaction.sender_account_id)
            .ok_or_else(|| DatabaseError::InsufficientFunds(transaction.sender_account_id.to_string()))?;
        if accounts[sender].balance < transaction.amount {
            return Err(DatabaseError::InsufficientFunds(
                transaction.sender_account_id.to_string(),
            ));
        }
        let receiver = match transaction.receiver_account_id {
            Some(id) => Some(
                accounts
                    .iter()
                    .position(|a| a.id == id)
                    .ok_or_else(|| DatabaseError::NotFound(format!("receiver account {id}")))?,
            ),
            None => None,
        };

        accounts[sender].balance -= transaction.amount;
        accounts[sender].last_transaction_date = Some(transaction.created_at);
        if let Some(receiver) = receiver {
            accounts[receiver].balance += transaction.amount;
            accounts[receiver].last_transaction_date = Some(transaction.created_at);
        }
        transactions.push(transaction.clone());
        Ok(1)
    }
}
